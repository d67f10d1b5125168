//! Error types for pipeline execution.
//!
//! All failures surfaced by the pipeline subsystem carry the offending
//! stage's full command line so a failed run can be diagnosed from the
//! logs without re-running it.

use std::process::ExitStatus;

use thiserror::Error;

/// Errors that can occur while building or executing a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The pipeline contained no stages at all.
    #[error("no pipeline stages defined")]
    EmptyPipeline,

    /// A `|`-delimited segment tokenized to zero tokens.
    #[error("empty pipeline stage")]
    EmptyStage,

    /// A success condition is not a valid regular expression.
    ///
    /// Reported when the pipeline is constructed, before any process starts.
    #[error("invalid success pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The OS rejected process creation for a stage.
    #[error("failed to start '{command}': {source}")]
    StageStart {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on a running stage failed.
    #[error("failed to wait for '{command}': {source}")]
    StageWait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A stage exited with a failure status and no success condition
    /// rescued it.
    #[error("'{command}' exited with {status}")]
    StageFailed {
        command: String,
        status: ExitStatus,
    },
}
