//! In-flight storyboard jobs and their progress subscribers.

pub mod registry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::worker::{JobStatus, ProgressEvent};

pub use registry::{JobRegistry, Subscription};

/// Opaque job identifier (a UUID v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a subscriber receives: `{ id, status, message, ...result }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub status: JobStatus,
    pub message: String,
    #[serde(flatten)]
    pub result: Map<String, Value>,
}

impl JobSnapshot {
    /// Placeholder for ids the registry does not know.
    pub fn unknown(id: JobId) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            message: String::new(),
            result: Map::new(),
        }
    }
}

/// The live connection attached to a job.
#[derive(Debug)]
pub(crate) struct Subscriber {
    pub lease: u64,
    pub tx: mpsc::UnboundedSender<JobSnapshot>,
}

impl Subscriber {
    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// A job's accumulated state.
#[derive(Debug)]
pub struct AnalysisJob {
    pub id: JobId,
    pub status: JobStatus,
    pub last_message: String,
    pub result: Map<String, Value>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub(crate) subscriber: Option<Subscriber>,
    /// Set once the job is terminal or abandoned; the entry is on its way out
    /// of the registry.
    pub(crate) closed: bool,
}

impl AnalysisJob {
    pub fn new(id: JobId) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Pending,
            last_message: String::new(),
            result: Map::new(),
            started_at: now,
            updated_at: now,
            subscriber: None,
            closed: false,
        }
    }

    /// Merges an event: status always, message when present, every other key
    /// into the result (later values overwrite earlier ones).
    pub fn apply(&mut self, event: &ProgressEvent) {
        self.status = event.status;
        if let Some(message) = &event.message {
            self.last_message = message.clone();
        }
        for (key, value) in &event.extra {
            // `id` belongs to the registry.
            if key == "id" {
                continue;
            }
            self.result.insert(key.clone(), value.clone());
        }
        self.updated_at = Utc::now();
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id.clone(),
            status: self.status,
            message: self.last_message.clone(),
            result: self.result.clone(),
        }
    }

    /// Time from creation to the last applied event.
    pub fn elapsed(&self) -> chrono::Duration {
        self.updated_at - self.started_at
    }
}
