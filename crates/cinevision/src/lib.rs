pub mod analysis;
pub mod config;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod screenplay;
pub mod service;
pub mod worker;

pub use analysis::{AnalysisKind, BudgetEstimate, CameraPlan, RoleReport, ScriptReport};
pub use config::{
    load_config, load_config_or_default, Config, LoadedConfig, LogFormat, WorkerCommand,
};
pub use error::{AnalysisError, ConfigError, RegistryError, StorageError, WorkerError};
pub use jobs::{JobId, JobRegistry, JobSnapshot, Subscription};
pub use screenplay::{parse, ParsedScript};
pub use service::{require_script, AnalysisService};
pub use worker::{
    AnalyzerWorker, EventSink, JobStatus, ProgressEvent, WorkerInvoker, WorkerKind, WorkerRun,
};
