//! Process-wide table of in-flight jobs.
//!
//! The table lock is only held to look up, insert or remove entries; each
//! job has its own lock, so pushing to one job never waits on another.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tokio::sync::mpsc;

use super::{AnalysisJob, JobId, JobSnapshot, Subscriber};
use crate::error::RegistryError;
use crate::worker::ProgressEvent;

/// An attached progress stream.
#[derive(Debug)]
pub struct Subscription {
    pub id: JobId,
    /// `None` for unknown jobs; their stream holds one snapshot and ends.
    pub lease: Option<u64>,
    pub receiver: mpsc::UnboundedReceiver<JobSnapshot>,
}

#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Arc<Mutex<AnalysisJob>>>>,
    next_lease: AtomicU64,
}

fn lock_job(job: &Mutex<AnalysisJob>) -> MutexGuard<'_, AnalysisJob> {
    match job.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Job lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, id: &JobId) -> Option<Arc<Mutex<AnalysisJob>>> {
        let jobs = match self.jobs.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job registry lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        jobs.get(id).cloned()
    }

    /// Removes the entry, but only if it is still `job`.
    fn remove(&self, id: &JobId, job: &Arc<Mutex<AnalysisJob>>) {
        let mut jobs = match self.jobs.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job registry lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        if jobs.get(id).is_some_and(|current| Arc::ptr_eq(current, job)) {
            jobs.remove(id);
        }
    }

    /// Registers a new job in `pending` state.
    pub fn create(&self, id: JobId) {
        let job = Arc::new(Mutex::new(AnalysisJob::new(id.clone())));
        let mut jobs = match self.jobs.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job registry lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        if jobs.insert(id.clone(), job).is_some() {
            log::warn!("Job {} was registered twice, replacing", id);
        }
        log::debug!("Created job {}", id);
    }

    /// Attaches the only subscriber a job may have and sends it the current
    /// state straight away.
    ///
    /// Fails if another subscriber is still connected. A subscriber whose
    /// connection has gone away loses its lease to the newcomer. Unknown or
    /// finished jobs get a single pending snapshot and a closed stream.
    pub fn subscribe(&self, id: &JobId) -> Result<Subscription, RegistryError> {
        let (tx, receiver) = mpsc::unbounded_channel();

        let Some(job) = self.get(id) else {
            log::debug!("Subscribe to unknown job {}", id);
            let _ = tx.send(JobSnapshot::unknown(id.clone()));
            return Ok(Subscription {
                id: id.clone(),
                lease: None,
                receiver,
            });
        };

        let mut job = lock_job(&job);
        if job.closed {
            let _ = tx.send(JobSnapshot::unknown(id.clone()));
            return Ok(Subscription {
                id: id.clone(),
                lease: None,
                receiver,
            });
        }

        if let Some(existing) = &job.subscriber {
            if existing.is_connected() {
                log::warn!(
                    "Rejecting second subscriber for job {} (lease {} is active)",
                    id,
                    existing.lease
                );
                return Err(RegistryError::AlreadySubscribed { id: id.to_string() });
            }
            log::debug!("Lease {} for job {} is stale, replacing", existing.lease, id);
        }

        let lease = self.next_lease.fetch_add(1, Ordering::Relaxed) + 1;
        let _ = tx.send(job.snapshot());
        job.subscriber = Some(Subscriber { lease, tx });
        log::debug!("Job {} subscribed with lease {}", id, lease);

        Ok(Subscription {
            id: id.clone(),
            lease: Some(lease),
            receiver,
        })
    }

    /// Merges an event into the job and forwards the new snapshot.
    ///
    /// A terminal event closes the subscriber's stream and removes the job.
    /// Returns false when the job is unknown or already finished; that is an
    /// expected race, not an error.
    pub fn push(&self, id: &JobId, event: &ProgressEvent) -> bool {
        let Some(entry) = self.get(id) else {
            log::trace!("Push to unknown job {} ignored", id);
            return false;
        };

        let finished = {
            let mut job = lock_job(&entry);
            if job.closed {
                return false;
            }

            job.apply(event);
            if let Some(subscriber) = &job.subscriber {
                if subscriber.tx.send(job.snapshot()).is_err() {
                    log::debug!("Subscriber for job {} has gone away", id);
                }
            }

            if event.is_terminal() {
                job.closed = true;
                // Dropping the sender ends the subscriber's stream.
                job.subscriber = None;
            }
            job.closed.then(|| job.elapsed())
        };

        if let Some(elapsed) = finished {
            self.remove(id, &entry);
            log::info!(
                "Job {} finished with status {} after {}ms",
                id,
                event.status,
                elapsed.num_milliseconds()
            );
        }
        true
    }

    /// Detaches a subscriber after its client disconnected and abandons the
    /// job. The worker is not stopped; its later pushes are no-ops.
    ///
    /// Only the current lease holder can do this.
    pub fn unsubscribe(&self, id: &JobId, lease: u64) -> bool {
        let Some(entry) = self.get(id) else {
            return false;
        };

        let elapsed = {
            let mut job = lock_job(&entry);
            match &job.subscriber {
                Some(subscriber) if subscriber.lease == lease => {}
                _ => {
                    log::debug!("Stale unsubscribe for job {} (lease {})", id, lease);
                    return false;
                }
            }
            job.subscriber = None;
            job.closed = true;
            job.elapsed()
        };

        self.remove(id, &entry);
        log::info!(
            "Job {} abandoned by its subscriber after {}ms",
            id,
            elapsed.num_milliseconds()
        );
        true
    }

    /// Current state of a job, if it is still in flight.
    pub fn snapshot(&self, id: &JobId) -> Option<JobSnapshot> {
        let entry = self.get(id)?;
        let job = lock_job(&entry);
        (!job.closed).then(|| job.snapshot())
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.snapshot(id).is_some()
    }

    pub fn len(&self) -> usize {
        match self.jobs.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
