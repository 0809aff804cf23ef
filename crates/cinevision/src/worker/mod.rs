//! Analyzer workers and the invoker that runs them.
//!
//! A worker reads a persisted copy of the script and reports progress as
//! [`ProgressEvent`]s. External workers are subprocesses speaking
//! newline-delimited JSON on stdout; the storyboard has a built-in fallback.

pub mod event;
pub mod invoker;
pub mod process;
pub mod scratch;
pub mod storyboard;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::WorkerError;

pub use event::{JobStatus, ProgressEvent};
pub use invoker::{WorkerInvoker, WorkerRun};
pub use process::ProcessWorker;
pub use scratch::{ScratchDir, ScratchSpace};
pub use storyboard::{BuiltinStoryboardWorker, StoryboardPanel};

/// Which analysis a worker performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    Characters,
    Budget,
    Camera,
    Suggestions,
    Storyboard,
}

impl WorkerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerKind::Characters => "characters",
            WorkerKind::Budget => "budget",
            WorkerKind::Camera => "camera",
            WorkerKind::Suggestions => "suggestions",
            WorkerKind::Storyboard => "storyboard",
        }
    }

    /// Generation workers get an output directory next to the script.
    pub fn is_generation(&self) -> bool {
        matches!(self, WorkerKind::Storyboard)
    }

    pub fn scratch_prefix(&self) -> &'static str {
        if self.is_generation() {
            "storyboard_"
        } else {
            "analysis_"
        }
    }
}

impl std::fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a worker is given to work on.
#[derive(Debug, Clone)]
pub struct WorkerInput {
    pub kind: WorkerKind,
    pub script_path: PathBuf,
    pub output_dir: Option<PathBuf>,
}

/// How a worker run ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerOutcome {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl WorkerOutcome {
    pub fn success() -> Self {
        Self {
            exit_code: Some(0),
            ..Default::default()
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn code_label(&self) -> String {
        match self.exit_code {
            Some(code) => code.to_string(),
            None => "signal".to_string(),
        }
    }
}

/// Where a worker sends its progress events.
///
/// Sending never blocks: the channel is unbounded so output is drained as
/// fast as the worker produces it.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that drops every event.
    pub fn discard() -> Self {
        Self { tx: None }
    }

    /// False when events would go nowhere.
    pub fn is_listening(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    pub fn send(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                tracing::trace!("Progress event dropped, receiver gone");
            }
        }
    }
}

/// An analyzer capability. Production workers shell out; tests use
/// in-process fakes.
#[async_trait]
pub trait AnalyzerWorker: Send + Sync {
    /// Runs to completion, reporting progress through `events`.
    async fn run(&self, input: &WorkerInput, events: EventSink)
        -> Result<WorkerOutcome, WorkerError>;
}
