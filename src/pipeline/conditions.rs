//! Success conditions: regex patterns that can rescue a failing stage.
//!
//! A stage that exits non-zero is still treated as successful when any line
//! it produced on a captured stream matches one of the configured patterns.
//! Matching is an unanchored regex search with no precedence between
//! patterns.

use std::sync::Arc;

use regex::Regex;

use crate::error::PipelineError;

/// A compiled, order-independent set of success patterns.
///
/// Compiled once per pipeline invocation and read-only thereafter. Cloning
/// is cheap; the compiled patterns are shared.
#[derive(Debug, Clone)]
pub struct SuccessConditions {
    patterns: Arc<Vec<Regex>>,
}

impl SuccessConditions {
    /// Compiles the supplied patterns.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPattern`] for the first pattern that
    /// is not valid regex syntax. This is surfaced before any process is
    /// started.
    pub fn compile(patterns: &[String]) -> Result<Self, PipelineError> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let regex = Regex::new(pattern).map_err(|source| PipelineError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            compiled.push(regex);
        }
        Ok(Self {
            patterns: Arc::new(compiled),
        })
    }

    /// Whether the set contains no patterns. An empty set can never rescue
    /// a stage.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Creates a fresh per-stream tracker over these conditions.
    pub fn tracker(&self) -> ConditionTracker {
        ConditionTracker {
            conditions: self.clone(),
            matched: false,
        }
    }
}

/// Stateful per-stream matcher with a sticky aggregate: once any line has
/// matched, [`ConditionTracker::matched`] stays true for the rest of the
/// stream's lifetime.
#[derive(Debug)]
pub struct ConditionTracker {
    conditions: SuccessConditions,
    matched: bool,
}

impl ConditionTracker {
    /// Checks one line against every pattern, returning whether this line
    /// matched. A hit also latches the sticky aggregate.
    pub fn check(&mut self, line: &str) -> bool {
        let hit = self
            .conditions
            .patterns
            .iter()
            .any(|pattern| pattern.is_match(line));
        if hit {
            self.matched = true;
        }
        hit
    }

    /// The sticky aggregate: whether any line seen so far has matched.
    pub fn matched(&self) -> bool {
        self.matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(patterns: &[&str]) -> SuccessConditions {
        let owned: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        SuccessConditions::compile(&owned).unwrap()
    }

    #[test]
    fn test_single_pattern_matches_line() {
        let mut tracker = compile(&["line"]).tracker();
        assert!(tracker.check("This is a line of text"));
        assert!(tracker.matched());
    }

    #[test]
    fn test_single_pattern_misses_line() {
        let mut tracker = compile(&["moo"]).tracker();
        assert!(!tracker.check("This is a line of text"));
        assert!(!tracker.matched());
    }

    #[test]
    fn test_any_pattern_suffices() {
        let mut tracker = compile(&["moo", "line"]).tracker();
        assert!(tracker.check("This is a line of text"));
    }

    #[test]
    fn test_match_is_sticky() {
        let mut tracker = compile(&["cake(.*)carrot"]).tracker();
        assert!(tracker.check("chocolate cake cake carrot cake wafer"));
        assert!(!tracker.check("candy jujubes"));
        assert!(tracker.matched());
    }

    #[test]
    fn test_empty_set_never_matches() {
        let conditions = compile(&[]);
        assert!(conditions.is_empty());
        let mut tracker = conditions.tracker();
        assert!(!tracker.check("anything at all"));
        assert!(!tracker.matched());
    }

    #[test]
    fn test_unanchored_search() {
        let mut tracker = compile(&["foo"]).tracker();
        assert!(tracker.check("prefix foo suffix"));
    }

    #[test]
    fn test_invalid_pattern_fails_compilation() {
        let result = SuccessConditions::compile(&["[unclosed".to_string()]);
        match result {
            Err(PipelineError::InvalidPattern { pattern, .. }) => {
                assert_eq!(pattern, "[unclosed");
            }
            other => panic!("expected InvalidPattern, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_trackers_are_independent() {
        let conditions = compile(&["foo"]);
        let mut first = conditions.tracker();
        let mut second = conditions.tracker();
        assert!(first.check("foo"));
        assert!(!second.check("bar"));
        assert!(first.matched());
        assert!(!second.matched());
    }
}
