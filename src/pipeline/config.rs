//! Execution options for pipeline runs.

use std::path::PathBuf;

/// Options controlling how a pipeline run is executed.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Working directory applied to every stage.
    pub dir: PathBuf,
    /// Patterns that rescue a failing stage when any line of its captured
    /// output matches.
    pub success_patterns: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            success_patterns: Vec::new(),
        }
    }
}

impl RunOptions {
    /// Creates options with the current working directory and no success
    /// patterns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Adds one success pattern.
    pub fn with_success_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.success_patterns.push(pattern.into());
        self
    }

    /// Replaces the success patterns.
    pub fn with_success_patterns(mut self, patterns: Vec<String>) -> Self {
        self.success_patterns = patterns;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_options() {
        let options = RunOptions::new();
        assert_eq!(options.dir, Path::new("."));
        assert!(options.success_patterns.is_empty());
    }

    #[test]
    fn test_builder() {
        let options = RunOptions::new()
            .with_dir("/tmp")
            .with_success_pattern("deployed")
            .with_success_pattern("already up to date");
        assert_eq!(options.dir, Path::new("/tmp"));
        assert_eq!(options.success_patterns.len(), 2);
    }

    #[test]
    fn test_with_success_patterns_replaces() {
        let options = RunOptions::new()
            .with_success_pattern("old")
            .with_success_patterns(vec!["new".to_string()]);
        assert_eq!(options.success_patterns, vec!["new".to_string()]);
    }
}
