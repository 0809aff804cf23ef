use std::path::PathBuf;
use thiserror::Error;

use crate::worker::WorkerKind;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Failures creating, filling or removing per-request scratch space.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove directory '{path}': {source}")]
    RemoveDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to spawn worker '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("{kind} worker failed with code {code}: {stderr}")]
    Failed {
        kind: WorkerKind,
        code: String,
        stderr: String,
    },

    #[error("{kind} worker produced invalid output: {source}")]
    InvalidOutput {
        kind: WorkerKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("No {kind} worker configured")]
    NotConfigured { kind: WorkerKind },

    #[error("Worker channel closed unexpectedly")]
    ChannelClosed,
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No script text provided")]
    EmptyScript,

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to serialize analysis: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Returns true for caller mistakes (as opposed to internal failures).
    pub fn is_validation(&self) -> bool {
        matches!(self, AnalysisError::EmptyScript)
    }
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Job {id} already has an active progress subscriber")]
    AlreadySubscribed { id: String },
}
