//! Runs analyzer workers inside scoped scratch directories.

use std::collections::HashMap;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info_span, Instrument};

use super::{
    AnalyzerWorker, BuiltinStoryboardWorker, EventSink, ProcessWorker, ProgressEvent,
    ScratchDir, ScratchSpace, WorkerInput, WorkerKind, WorkerOutcome,
};
use crate::config::Config;
use crate::error::{AnalysisError, WorkerError};

/// Picks the worker for a kind and runs it against a fresh scratch copy of
/// the script.
#[derive(Clone)]
pub struct WorkerInvoker {
    scratch: ScratchSpace,
    workers: HashMap<WorkerKind, Arc<dyn AnalyzerWorker>>,
}

impl WorkerInvoker {
    /// An invoker with no external workers; only the built-in storyboard.
    pub fn new(scratch: ScratchSpace) -> Self {
        Self {
            scratch,
            workers: HashMap::new(),
        }
    }

    /// Registers a [`ProcessWorker`] for every configured kind.
    pub fn from_config(config: &Config) -> Self {
        let mut invoker = Self::new(ScratchSpace::new(&config.scratch_root));
        for (kind, command) in &config.workers {
            invoker = invoker.with_worker(*kind, Arc::new(ProcessWorker::new(*kind, command.clone())));
        }
        invoker
    }

    pub fn with_worker(mut self, kind: WorkerKind, worker: Arc<dyn AnalyzerWorker>) -> Self {
        self.workers.insert(kind, worker);
        self
    }

    /// Whether an external (or injected) worker handles this kind.
    pub fn has_worker(&self, kind: WorkerKind) -> bool {
        self.workers.contains_key(&kind)
    }

    fn worker_for(&self, kind: WorkerKind) -> Result<Arc<dyn AnalyzerWorker>, WorkerError> {
        match self.workers.get(&kind) {
            Some(worker) => Ok(worker.clone()),
            None if kind == WorkerKind::Storyboard => Ok(Arc::new(BuiltinStoryboardWorker)),
            None => Err(WorkerError::NotConfigured { kind }),
        }
    }

    /// Starts a worker in the background and streams its progress events.
    ///
    /// Worker failures arrive as a final `error` event rather than as an
    /// `Err`; only setting up the scratch directory can fail here. The
    /// directory is removed once the worker has finished, before the stream
    /// ends.
    pub fn invoke(&self, script_text: &str, kind: WorkerKind) -> Result<WorkerRun, AnalysisError> {
        let worker = self.worker_for(kind)?;
        let scratch = self.scratch.create(kind, script_text)?;
        let input = worker_input(kind, &scratch);
        let (sink, events) = EventSink::channel();

        let span = info_span!("worker_run", %kind);
        let task = tokio::spawn(
            async move {
                let result = worker.run(&input, sink.clone()).await;
                if let Err(e) = &result {
                    error!(error = %e, "Worker failed");
                    sink.send(ProgressEvent::error(e.to_string()));
                }
                // Removal failures are logged by close() and must not mask
                // the worker's own result.
                let _ = scratch.close();
                result.ok()
            }
            .instrument(span),
        );

        Ok(WorkerRun { events, task })
    }

    /// Runs a worker to completion and parses its whole stdout as one JSON
    /// document.
    pub async fn collect(
        &self,
        script_text: &str,
        kind: WorkerKind,
    ) -> Result<serde_json::Value, AnalysisError> {
        let worker = self.worker_for(kind)?;
        let scratch = self.scratch.create(kind, script_text)?;
        let input = worker_input(kind, &scratch);

        let result = worker
            .run(&input, EventSink::discard())
            .instrument(info_span!("worker_collect", %kind))
            .await;
        let _ = scratch.close();
        let outcome = result?;

        if !outcome.succeeded() {
            return Err(WorkerError::Failed {
                kind,
                code: outcome.code_label(),
                stderr: outcome.stderr.trim().to_string(),
            }
            .into());
        }

        serde_json::from_str(outcome.stdout.trim())
            .map_err(|source| WorkerError::InvalidOutput { kind, source }.into())
    }
}

fn worker_input(kind: WorkerKind, scratch: &ScratchDir) -> WorkerInput {
    WorkerInput {
        kind,
        script_path: scratch.script_path().to_path_buf(),
        output_dir: scratch.output_dir().map(Path::to_path_buf),
    }
}

/// A running worker. Yields events in the order the worker emitted them and
/// ends once the worker has finished and its scratch directory is gone.
pub struct WorkerRun {
    events: mpsc::UnboundedReceiver<ProgressEvent>,
    task: JoinHandle<Option<WorkerOutcome>>,
}

impl WorkerRun {
    /// Waits for the background task. `None` if the worker failed or panicked.
    pub async fn finish(self) -> Option<WorkerOutcome> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Worker task did not complete");
                None
            }
        }
    }
}

impl Stream for WorkerRun {
    type Item = ProgressEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}
