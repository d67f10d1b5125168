//! Command-line interface for pipeforge.
//!
//! Provides the `run` and `exec` commands over the pipeline runner.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
