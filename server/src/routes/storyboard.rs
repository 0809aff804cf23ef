//! Storyboard jobs: start in the background, follow over SSE.

use std::convert::Infallible;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::{self, Stream};
use serde::Serialize;
use tokio::sync::mpsc;

use cinevision::{require_script, AnalysisService, JobId, JobSnapshot};

use super::ScriptRequest;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub(super) struct GenerateResponse {
    message: &'static str,
    id: JobId,
}

pub(super) async fn generate(
    State(state): State<AppState>,
    body: Result<Json<ScriptRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = body?;
    let script_text = require_script(request.script_text.as_deref())?;
    let id = state.service.start_storyboard(script_text)?;

    Ok(Json(GenerateResponse {
        message: "Analysis started",
        id,
    }))
}

/// Releases the lease when the response stream is dropped, which is how a
/// client disconnect shows up.
struct SubscriptionGuard {
    service: AnalysisService,
    id: JobId,
    lease: Option<u64>,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(lease) = self.lease {
            if self.service.unsubscribe(&self.id, lease) {
                tracing::info!(job_id = %self.id, lease, "Progress client went away, job abandoned");
            }
        }
    }
}

fn snapshot_event(snapshot: &JobSnapshot) -> Event {
    match serde_json::to_string(snapshot) {
        Ok(data) => Event::default().data(data),
        Err(e) => {
            tracing::warn!(job_id = %snapshot.id, "Failed to serialize snapshot: {}", e);
            Event::default().comment("unserializable snapshot")
        }
    }
}

pub(super) async fn progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let id = JobId::from(id);
    let subscription = state.service.subscribe(&id)?;
    tracing::debug!(job_id = %id, lease = ?subscription.lease, "Progress stream opened");

    let guard = SubscriptionGuard {
        service: state.service.clone(),
        id,
        lease: subscription.lease,
    };

    let frames = stream::unfold(
        (subscription.receiver, guard),
        |(mut receiver, guard): (mpsc::UnboundedReceiver<JobSnapshot>, SubscriptionGuard)| async move {
            let snapshot = receiver.recv().await?;
            Some((Ok(snapshot_event(&snapshot)), (receiver, guard)))
        },
    );

    Ok(Sse::new(frames).keep_alive(KeepAlive::default()))
}
