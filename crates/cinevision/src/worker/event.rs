//! Progress events emitted by analyzer workers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle state of a long-running job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }

    /// `completed` and `error` end a job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    /// Parses a status string reported by a worker.
    ///
    /// Accepts `complete` and `failed` as aliases. Anything unrecognized is
    /// logged and treated as still processing.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "pending" => JobStatus::Pending,
            "processing" => JobStatus::Processing,
            "completed" | "complete" => JobStatus::Completed,
            "error" | "failed" => JobStatus::Error,
            other => {
                tracing::warn!(
                    status = other,
                    "Unknown worker status, defaulting to processing"
                );
                JobStatus::Processing
            }
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One incremental status/message/result update for a job.
///
/// Keys other than `status` and `message` are carried in `extra` and are
/// merged into the job's accumulated result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProgressEvent {
    pub fn new(status: JobStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            extra: Map::new(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::new(JobStatus::Processing, message)
    }

    pub fn completed(message: impl Into<String>) -> Self {
        Self::new(JobStatus::Completed, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(JobStatus::Error, message)
    }

    /// Adds a result field.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Builds an event from a decoded JSON value. Only objects qualify; a
    /// missing `status` means processing.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            return None;
        };

        let status = match map.remove("status") {
            Some(Value::String(s)) => JobStatus::parse_lenient(&s),
            Some(other) => JobStatus::parse_lenient(&other.to_string()),
            None => JobStatus::Processing,
        };
        let message = match map.remove("message") {
            Some(Value::String(s)) => Some(s),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        Some(Self {
            status,
            message,
            extra: map,
        })
    }

    /// Parses one line of worker output. Lines not starting with `{` are not
    /// events and yield `Ok(None)`.
    pub fn from_line(line: &str) -> Result<Option<Self>, serde_json::Error> {
        let line = line.trim();
        if !line.starts_with('{') {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(line)?;
        Ok(Self::from_value(value))
    }
}
