//! Pipeline execution for external commands.
//!
//! This module runs a linear chain of OS processes, wiring each stage's
//! stdout into the next stage's stdin the way a shell pipe does, while a
//! monitor task per captured stream forwards output to the logging sink
//! and checks it against configurable success conditions.
//!
//! # Architecture
//!
//! - **Command**: whitespace tokenization of pipe-delimited command
//!   strings into [`Stage`]s
//! - **Stack**: prepared, unstarted process descriptors with their
//!   streams arranged for chaining
//! - **Conditions**: compiled regex patterns with a sticky per-stream
//!   match tracker
//! - **Monitor**: one task per captured stream; logs lines and reports a
//!   single verdict at end-of-stream
//! - **Runner**: sequential driver that spawns stages eagerly, waits on
//!   each process, joins its monitors, and surfaces the leftmost failure
//!
//! A stage that exits non-zero is still treated as successful when any
//! line it produced matched a success condition, which is useful for
//! tools that report a benign outcome through a failure exit status.
//!
//! # Example
//!
//! ```rust,ignore
//! use pipeforge::pipeline;
//!
//! // Plain pipe, current working directory.
//! pipeline::run("cat notes.txt | wc -l", &[]).await?;
//!
//! // A failing stage rescued by a success condition.
//! pipeline::run_in_dir(
//!     "terraform apply",
//!     "./infra",
//!     &["No changes.".to_string()],
//! )
//! .await?;
//! ```
//!
//! No cancellation or timeout primitive is provided: a caller wanting
//! bounded execution wraps the invocation in its own deadline and accepts
//! that processes already started keep running.

pub mod command;
pub mod conditions;
pub mod config;
pub mod monitor;
pub mod runner;
pub mod stack;

// Re-export main types for convenience
pub use command::{split_pipeline, Stage};
pub use conditions::{ConditionTracker, SuccessConditions};
pub use config::RunOptions;
pub use monitor::{monitor_stream, RepeatFilter};
pub use runner::{execute, run, run_in_dir, run_with_args, run_with_options};
pub use stack::{RunStack, RunningStage, StagedCommand};
