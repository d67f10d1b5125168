//! Command string tokenization.
//!
//! Splits a pipe-delimited command string into [`Stage`]s. Tokenization is
//! whitespace-only: no quoting or escaping is supported, so an argument
//! containing whitespace cannot be expressed here. Callers that need such
//! arguments construct their [`Stage`]s directly.

use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// One executable step in a pipeline: a program, its arguments, and the
/// working directory it runs from. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    program: String,
    args: Vec<String>,
    dir: PathBuf,
}

impl Stage {
    /// Creates a stage from already-structured parts.
    pub fn new(program: impl Into<String>, args: Vec<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            dir: dir.into(),
        }
    }

    /// Tokenizes a single stage command line.
    ///
    /// The segment is split on whitespace runs; the first token is the
    /// program and the rest are its arguments. Empty tokens are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyStage`] when the segment contains no
    /// tokens at all.
    pub fn parse(segment: &str, dir: &Path) -> Result<Self, PipelineError> {
        let mut tokens = segment.split_whitespace();
        let program = tokens.next().ok_or(PipelineError::EmptyStage)?;
        Ok(Self {
            program: program.to_string(),
            args: tokens.map(str::to_string).collect(),
            dir: dir.to_path_buf(),
        })
    }

    /// The program to execute.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The program's arguments, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The working directory the stage runs from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The full command line, for diagnostics.
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Splits a pipe-delimited command string into ordered stages, all sharing
/// the same working directory.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyStage`] when any `|` segment tokenizes to
/// nothing.
pub fn split_pipeline(command: &str, dir: &Path) -> Result<Vec<Stage>, PipelineError> {
    command
        .split('|')
        .map(|segment| Stage::parse(segment, dir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_program_and_args() {
        let stage = Stage::parse("ls -al /", Path::new(".")).unwrap();
        assert_eq!(stage.program(), "ls");
        assert_eq!(stage.args(), ["-al".to_string(), "/".to_string()]);
        assert_eq!(stage.dir(), Path::new("."));
    }

    #[test]
    fn test_parse_collapses_whitespace_runs() {
        let stage = Stage::parse("  echo   hello\tworld  ", Path::new(".")).unwrap();
        assert_eq!(stage.program(), "echo");
        assert_eq!(stage.args(), ["hello".to_string(), "world".to_string()]);
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        let result = Stage::parse("   ", Path::new("."));
        assert!(matches!(result, Err(PipelineError::EmptyStage)));
    }

    #[test]
    fn test_split_pipeline_two_stages() {
        let stages = split_pipeline("ls -al / | grep -i etc", Path::new(".")).unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].command_line(), "ls -al /");
        assert_eq!(stages[1].command_line(), "grep -i etc");
    }

    #[test]
    fn test_split_pipeline_rejects_empty_string() {
        assert!(matches!(
            split_pipeline("", Path::new(".")),
            Err(PipelineError::EmptyStage)
        ));
    }

    #[test]
    fn test_split_pipeline_rejects_dangling_pipe() {
        assert!(matches!(
            split_pipeline("cat notes.txt | ", Path::new(".")),
            Err(PipelineError::EmptyStage)
        ));
    }

    #[test]
    fn test_command_line_without_args() {
        let stage = Stage::new("wc", Vec::new(), ".");
        assert_eq!(stage.command_line(), "wc");
    }
}
