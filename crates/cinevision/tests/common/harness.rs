//! Isolated service for integration tests.
//!
//! Every harness owns a temporary scratch root, so tests can assert that all
//! per-request directories are gone when work finishes.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use cinevision::worker::{AnalyzerWorker, ScratchSpace};
use cinevision::{
    AnalysisService, Config, JobId, JobRegistry, JobSnapshot, WorkerCommand, WorkerInvoker,
    WorkerKind,
};

pub struct TestHarness {
    temp_dir: TempDir,
    pub scratch_root: PathBuf,
    pub service: AnalysisService,
}

impl TestHarness {
    /// A service with only built-in analyzers.
    pub fn new() -> Self {
        Self::build(|invoker| invoker)
    }

    /// A service with an injected worker for one kind.
    pub fn with_worker(kind: WorkerKind, worker: Arc<dyn AnalyzerWorker>) -> Self {
        Self::build(|invoker| invoker.with_worker(kind, worker))
    }

    fn build(setup: impl FnOnce(WorkerInvoker) -> WorkerInvoker) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let scratch_root = temp_dir.path().join("scratch");
        let invoker = setup(WorkerInvoker::new(ScratchSpace::new(&scratch_root)));

        Self {
            service: AnalysisService::new(invoker, Arc::new(JobRegistry::new())),
            scratch_root,
            temp_dir,
        }
    }

    /// A service built from config, with process workers run through `sh -c`.
    pub fn with_shell_workers(scripts: &[(WorkerKind, &str)]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let scratch_root = temp_dir.path().join("scratch");

        let workers: HashMap<WorkerKind, WorkerCommand> = scripts
            .iter()
            .map(|(kind, script)| {
                (
                    *kind,
                    WorkerCommand {
                        program: "sh".to_string(),
                        args: vec![
                            "-c".to_string(),
                            script.to_string(),
                            "worker".to_string(),
                            "$script".to_string(),
                            "$output".to_string(),
                        ],
                        env: HashMap::new(),
                    },
                )
            })
            .collect();

        let config = Config {
            scratch_root: scratch_root.clone(),
            workers,
            ..Config::default()
        };

        Self {
            service: AnalysisService::from_config(&config),
            scratch_root,
            temp_dir,
        }
    }

    /// Number of scratch directories still on disk.
    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(&self.scratch_root)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Subscribes and collects every frame until the stream closes.
    pub async fn collect_progress(&self, id: &JobId) -> Vec<JobSnapshot> {
        let mut subscription = self
            .service
            .subscribe(id)
            .expect("Subscription was rejected");
        let mut frames = Vec::new();
        loop {
            match tokio::time::timeout(Duration::from_secs(10), subscription.receiver.recv()).await
            {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => break,
                Err(_) => panic!("Timed out waiting for progress of job {}", id),
            }
        }
        frames
    }

    /// Polls until the job has left the registry.
    pub async fn wait_until_gone(&self, id: &JobId) {
        for _ in 0..200 {
            if !self.service.registry().contains(id) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Job {} never left the registry", id);
    }

    /// Polls until every scratch directory has been removed.
    pub async fn wait_for_clean_scratch(&self) {
        for _ in 0..200 {
            if self.scratch_entries() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Scratch root still has {} entries", self.scratch_entries());
    }
}
