//! Run stacks: ordered sequences of prepared, unstarted stage commands.
//!
//! Building a stack is total and side-effect-free: it only configures OS
//! process descriptors. No process exists until the runner spawns the
//! stack, and all start failures surface there. Adjacent stages are
//! connected at spawn time, since a pipe's read end only exists once the
//! upstream process is running; the connection is always made before the
//! downstream stage starts.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, ChildStderr, ChildStdout, Command};

use super::command::Stage;
use crate::error::PipelineError;

/// A prepared, unstarted stage: the configured OS command plus the
/// [`Stage`] it was built from.
///
/// Every stage captures stderr and stdout; an intermediate stage's stdout
/// is handed to the next stage as stdin, and only the final stage's stdout
/// is monitored directly.
#[derive(Debug)]
pub struct StagedCommand {
    stage: Stage,
    command: Command,
}

impl StagedCommand {
    fn new(stage: Stage) -> Self {
        let mut command = Command::new(stage.program());
        command
            .args(stage.args())
            .current_dir(stage.dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        Self { stage, command }
    }

    /// The stage this command was built from.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// The full command line, for diagnostics.
    pub fn command_line(&self) -> String {
        self.stage.command_line()
    }

    /// Spawns the stage, attaching `stdin` (the previous stage's captured
    /// stdout) when given.
    ///
    /// Consumes the descriptor so the parent holds no stray pipe endpoints
    /// once the child is running: a stage whose consumer exits must see its
    /// pipe close rather than block on a full buffer.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::StageStart`] when the OS rejects process
    /// creation (missing executable, permissions, bad working directory).
    pub(crate) fn spawn(mut self, stdin: Option<ChildStdout>) -> Result<RunningStage, PipelineError> {
        if let Some(upstream) = stdin {
            let stdio: Stdio = upstream.try_into().map_err(|source| PipelineError::StageStart {
                command: self.stage.command_line(),
                source,
            })?;
            self.command.stdin(stdio);
        }
        let child = self
            .command
            .spawn()
            .map_err(|source| PipelineError::StageStart {
                command: self.stage.command_line(),
                source,
            })?;
        Ok(RunningStage {
            stage: self.stage,
            child,
        })
    }
}

/// A spawned stage: the OS process plus its still-unclaimed stream
/// endpoints. Owned exclusively by the runner and reaped before the
/// invocation returns.
#[derive(Debug)]
pub struct RunningStage {
    stage: Stage,
    child: Child,
}

impl RunningStage {
    /// The full command line, for diagnostics.
    pub fn command_line(&self) -> String {
        self.stage.command_line()
    }

    pub(crate) fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub(crate) fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    pub(crate) async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }
}

/// An ordered chain of unstarted stage commands, head at index 0.
#[derive(Debug)]
pub struct RunStack {
    stages: Vec<StagedCommand>,
}

impl RunStack {
    /// Builds a stack from one command line per stage, all sharing the
    /// same working directory. Each line is tokenized on whitespace runs.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyStage`] when any command line
    /// tokenizes to nothing.
    pub fn build(command_lines: &[String], dir: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let dir = dir.as_ref();
        let stages = command_lines
            .iter()
            .map(|line| Stage::parse(line, dir))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_stages(stages))
    }

    /// Builds a stack from already-structured stages, for callers whose
    /// arguments cannot round-trip through whitespace tokenization.
    pub fn from_stages(stages: Vec<Stage>) -> Self {
        Self {
            stages: stages.into_iter().map(StagedCommand::new).collect(),
        }
    }

    /// Number of stages in the stack.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the stack has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub(crate) fn into_stages(self) -> Vec<StagedCommand> {
        self.stages
    }
}
