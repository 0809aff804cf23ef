//! Screenplay fixtures and in-process workers.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use cinevision::worker::{AnalyzerWorker, EventSink, WorkerInput, WorkerOutcome};
use cinevision::{ProgressEvent, WorkerError};

pub const KITCHEN: &str = "INT. KITCHEN - DAY\nJOHN\nWhere is the knife?\n";

pub const HEIST: &str = "\
INT. BANK VAULT - NIGHT
(lit by a single flashlight)
The crew moves in. A fight breaks out near the table.

RITA
Grab the laptop.

VIC (V.O.)
(whispering)
Too late.

EXT. ROOFTOP - NIGHT
(AERIAL)
Rain. The helicopter circles as lightning splits the sky.

RITA
Jump!

EXT. HARBOR - DAY
(WIDE SHOT)
A car explodes in a huge explosion. Crowds of extras scatter.

VIC
We did it.
";

/// Emits a fixed list of events, optionally waiting for a go signal first.
pub struct ScriptedWorker {
    pub events: Vec<ProgressEvent>,
    pub gate: Option<Arc<Notify>>,
    pub delay: Duration,
}

impl ScriptedWorker {
    pub fn new(events: Vec<ProgressEvent>) -> Arc<Self> {
        Arc::new(Self {
            events,
            gate: None,
            delay: Duration::ZERO,
        })
    }

    /// Holds the events back until `gate` is notified.
    pub fn gated(events: Vec<ProgressEvent>, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            events,
            gate: Some(gate),
            delay: Duration::from_millis(10),
        })
    }
}

#[async_trait]
impl AnalyzerWorker for ScriptedWorker {
    async fn run(
        &self,
        _input: &WorkerInput,
        events: EventSink,
    ) -> Result<WorkerOutcome, WorkerError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        for event in &self.events {
            events.send(event.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }
        Ok(WorkerOutcome::success())
    }
}
