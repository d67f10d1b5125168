//! Pipeline runner: spawns each stage, keeps the pipe chain fed, and
//! reconciles exit statuses against monitor verdicts.
//!
//! The runner's control flow is sequential. For each stage it launches the
//! stream monitors, starts the next stage immediately (so the pipe between
//! the two has a consumer before the current stage can fill the buffer and
//! block), waits for the process to exit, then joins every monitor it
//! launched for that stage before deciding the outcome. Joining all
//! monitors guarantees each verdict is consumed exactly once and no
//! monitor task is left behind.
//!
//! The first failure in left-to-right stage order is the one surfaced;
//! later stages are still started, waited on and drained so no process is
//! left as a zombie.

use std::path::Path;

use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::command::split_pipeline;
use super::conditions::SuccessConditions;
use super::config::RunOptions;
use super::monitor::monitor_stream;
use super::stack::RunStack;
use crate::error::PipelineError;

/// Runs a pipe-delimited command string from the current working
/// directory.
///
/// # Errors
///
/// See [`execute`].
pub async fn run(command: &str, success_patterns: &[String]) -> Result<(), PipelineError> {
    run_in_dir(command, ".", success_patterns).await
}

/// Runs a pipe-delimited command string with an explicit working directory
/// applied to every stage.
///
/// # Errors
///
/// See [`execute`].
pub async fn run_in_dir(
    command: &str,
    dir: impl AsRef<Path>,
    success_patterns: &[String],
) -> Result<(), PipelineError> {
    let stages = split_pipeline(command, dir.as_ref())?;
    execute(RunStack::from_stages(stages), success_patterns).await
}

/// Runs a single program with the supplied arguments.
///
/// The arguments are joined with the program into one command line and
/// re-tokenized on whitespace, so arguments that themselves contain
/// whitespace are not safe here; a `|` argument splits the pipeline just
/// as it does in [`run`]. Callers needing exact arguments should build a
/// [`RunStack`] from structured stages instead.
///
/// # Errors
///
/// See [`execute`].
pub async fn run_with_args(
    program: &str,
    args: &[String],
    dir: impl AsRef<Path>,
    success_patterns: &[String],
) -> Result<(), PipelineError> {
    let command = if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    };
    run_in_dir(&command, dir, success_patterns).await
}

/// Runs a pipe-delimited command string with [`RunOptions`].
///
/// # Errors
///
/// See [`execute`].
pub async fn run_with_options(command: &str, options: &RunOptions) -> Result<(), PipelineError> {
    run_in_dir(command, &options.dir, &options.success_patterns).await
}

/// Executes an already-built stack.
///
/// Captured output is streamed to the logging sink as it arrives rather
/// than returned; the result only says whether the pipeline as a whole
/// succeeded.
///
/// # Errors
///
/// - [`PipelineError::InvalidPattern`] before any process starts.
/// - [`PipelineError::EmptyPipeline`] for a stack with no stages.
/// - [`PipelineError::StageStart`] when the OS rejects a stage.
/// - [`PipelineError::StageWait`] when waiting on a stage fails.
/// - [`PipelineError::StageFailed`] when a stage exits non-zero and no
///   success condition rescued it.
pub async fn execute(stack: RunStack, success_patterns: &[String]) -> Result<(), PipelineError> {
    let conditions = SuccessConditions::compile(success_patterns)?;

    let mut pending = stack.into_stages().into_iter();
    let head = match pending.next() {
        Some(head) => head,
        None => {
            let err = PipelineError::EmptyPipeline;
            error!(error = %err, "Refusing to run pipeline");
            return Err(err);
        }
    };

    debug!(
        command = %head.command_line(),
        dir = %head.stage().dir().display(),
        "Running"
    );
    let mut current = match head.spawn(None) {
        Ok(running) => running,
        Err(err) => {
            error!(error = %err, "Failed to start pipeline");
            return Err(err);
        }
    };

    let mut first_error: Option<PipelineError> = None;

    loop {
        let mut monitors: Vec<JoinHandle<bool>> = Vec::with_capacity(2);
        if let Some(stderr) = current.take_stderr() {
            monitors.push(tokio::spawn(monitor_stream(
                stderr,
                "stderr",
                conditions.tracker(),
            )));
        }

        // Start the next stage (if any) before waiting on the current one,
        // so the pipe between them is being drained while the current stage
        // is still producing. Only the final stage's stdout is monitored.
        let mut next = None;
        let mut start_error = None;
        match pending.next() {
            Some(staged) => {
                debug!("| piping output to next command");
                debug!(
                    command = %staged.command_line(),
                    dir = %staged.stage().dir().display(),
                    "Running"
                );
                match staged.spawn(current.take_stdout()) {
                    Ok(running) => next = Some(running),
                    Err(err) => start_error = Some(err),
                }
            }
            None => {
                if let Some(stdout) = current.take_stdout() {
                    monitors.push(tokio::spawn(monitor_stream(
                        stdout,
                        "stdout",
                        conditions.tracker(),
                    )));
                }
            }
        }

        let wait_result = current.wait().await;

        // Every monitor launched for this stage reports exactly once at
        // end-of-stream; process exit closes the pipes they read, so these
        // joins always complete.
        let mut rescued = false;
        for monitor in monitors {
            match monitor.await {
                Ok(matched) => rescued = rescued || matched,
                Err(err) => warn!(error = %err, "Output monitor task failed"),
            }
        }

        if first_error.is_none() {
            match wait_result {
                Ok(status) if status.success() || rescued => {}
                Ok(status) => {
                    first_error = Some(PipelineError::StageFailed {
                        command: current.command_line(),
                        status,
                    });
                }
                Err(source) => {
                    first_error = Some(PipelineError::StageWait {
                        command: current.command_line(),
                        source,
                    });
                }
            }
        }

        // A stage that could not be started ends the pipeline, but only
        // after the stage to its left has been reconciled: the leftmost
        // failure wins.
        if first_error.is_none() {
            if let Some(err) = start_error {
                first_error = Some(err);
            }
        }

        match next {
            Some(running) => current = running,
            None => break,
        }
    }

    match first_error {
        Some(err) => {
            error!(error = %err, "Pipeline failed");
            Err(err)
        }
        None => Ok(()),
    }
}
