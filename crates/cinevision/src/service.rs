//! Entry points shared by every front end.

use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{debug, info, info_span, Instrument};

use crate::analysis::{AnalysisKind, ScriptReport};
use crate::config::Config;
use crate::error::{AnalysisError, RegistryError};
use crate::jobs::{JobId, JobRegistry, Subscription};
use crate::worker::{ProgressEvent, WorkerInvoker, WorkerKind};

/// Rejects missing or whitespace-only script text.
pub fn require_script(script_text: Option<&str>) -> Result<&str, AnalysisError> {
    match script_text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AnalysisError::EmptyScript),
    }
}

#[derive(Clone)]
pub struct AnalysisService {
    invoker: WorkerInvoker,
    registry: Arc<JobRegistry>,
}

impl AnalysisService {
    pub fn new(invoker: WorkerInvoker, registry: Arc<JobRegistry>) -> Self {
        Self { invoker, registry }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            WorkerInvoker::from_config(config),
            Arc::new(JobRegistry::new()),
        )
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn invoker(&self) -> &WorkerInvoker {
        &self.invoker
    }

    /// Runs one synchronous analysis, through its external worker when one
    /// is configured.
    pub async fn analyze(
        &self,
        kind: AnalysisKind,
        script_text: &str,
    ) -> Result<serde_json::Value, AnalysisError> {
        let script_text = require_script(Some(script_text))?;
        let worker_kind = kind.worker_kind();

        async {
            if self.invoker.has_worker(worker_kind) {
                debug!("Delegating to external worker");
                self.invoker.collect(script_text, worker_kind).await
            } else {
                Ok(kind.run_builtin(script_text)?)
            }
        }
        .instrument(info_span!("analyze", %kind, bytes = script_text.len()))
        .await
    }

    /// Roles, budget and camera plan in one response.
    pub fn upload(&self, script_text: &str) -> Result<ScriptReport, AnalysisError> {
        let script_text = require_script(Some(script_text))?;
        let _span = info_span!("upload", bytes = script_text.len()).entered();
        Ok(ScriptReport::build(script_text))
    }

    /// Registers a storyboard job and runs it in the background.
    ///
    /// Returns as soon as the job exists; progress goes through the registry.
    pub fn start_storyboard(&self, script_text: &str) -> Result<JobId, AnalysisError> {
        let script_text = require_script(Some(script_text))?;
        let id = JobId::new();
        self.registry.create(id.clone());

        let mut run = match self.invoker.invoke(script_text, WorkerKind::Storyboard) {
            Ok(run) => run,
            Err(e) => {
                self.registry.push(&id, &ProgressEvent::error(e.to_string()));
                return Err(e);
            }
        };

        let registry = self.registry.clone();
        let job_id = id.clone();
        tokio::spawn(
            async move {
                let mut terminal = false;
                while let Some(event) = run.next().await {
                    terminal |= event.is_terminal();
                    registry.push(&job_id, &event);
                }

                if !terminal {
                    // The worker exited without saying how it went.
                    let event = match run.finish().await {
                        Some(outcome) if outcome.succeeded() => {
                            ProgressEvent::completed("Storyboard generation finished")
                        }
                        _ => ProgressEvent::error("Storyboard worker ended without a result"),
                    };
                    registry.push(&job_id, &event);
                }
                info!("Storyboard job finished");
            }
            .instrument(info_span!("storyboard_job", job_id = %id)),
        );

        info!(job_id = %id, "Storyboard job started");
        Ok(id)
    }

    pub fn subscribe(&self, id: &JobId) -> Result<Subscription, RegistryError> {
        self.registry.subscribe(id)
    }

    pub fn unsubscribe(&self, id: &JobId, lease: u64) -> bool {
        self.registry.unsubscribe(id, lease)
    }
}
