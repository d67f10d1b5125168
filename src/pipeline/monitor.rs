//! Output monitors: one concurrent task per captured stream.
//!
//! A monitor reads its stream line by line until end-of-input, forwards
//! each line to the logging sink (coalescing immediately-repeated
//! identical lines), feeds every line to the success-condition tracker,
//! and reports the tracker's sticky verdict exactly once when the stream
//! closes. Monitors own their stream and tracker exclusively and never
//! synchronize with each other.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

use super::conditions::ConditionTracker;

/// Suppresses a line identical to the immediately preceding one from the
/// same stream. Every line is still evaluated against the success
/// conditions; only the log forwarding is coalesced.
#[derive(Debug, Default)]
pub struct RepeatFilter {
    last: Option<String>,
}

impl RepeatFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the line should be forwarded to the logging sink.
    pub fn admit(&mut self, line: &str) -> bool {
        if self.last.as_deref() == Some(line) {
            return false;
        }
        self.last = Some(line.to_string());
        true
    }
}

/// Consumes `stream` to end-of-input and returns the sticky verdict:
/// whether any line matched the success conditions.
///
/// Runs as its own task so a slow or chatty stage cannot block sibling
/// streams or the runner's process-wait.
pub async fn monitor_stream<R>(stream: R, label: &'static str, mut tracker: ConditionTracker) -> bool
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    let mut filter = RepeatFilter::new();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                tracker.check(&line);
                if filter.admit(&line) {
                    debug!(stream = label, "| {}", line);
                }
            }
            Ok(None) => break,
            Err(error) => {
                debug!(stream = label, error = %error, "Stopped reading stream");
                break;
            }
        }
    }
    tracker.matched()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::conditions::SuccessConditions;

    fn tracker(patterns: &[&str]) -> ConditionTracker {
        let owned: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        SuccessConditions::compile(&owned).unwrap().tracker()
    }

    #[test]
    fn test_repeat_filter_admits_first_occurrence() {
        let mut filter = RepeatFilter::new();
        assert!(filter.admit("building layer 1/4"));
    }

    #[test]
    fn test_repeat_filter_suppresses_adjacent_duplicates() {
        let mut filter = RepeatFilter::new();
        assert!(filter.admit("waiting for lock"));
        assert!(!filter.admit("waiting for lock"));
        assert!(!filter.admit("waiting for lock"));
    }

    #[test]
    fn test_repeat_filter_resets_on_new_line() {
        let mut filter = RepeatFilter::new();
        assert!(filter.admit("a"));
        assert!(!filter.admit("a"));
        assert!(filter.admit("b"));
        assert!(filter.admit("a"));
    }

    #[tokio::test]
    async fn test_monitor_reports_match() {
        let input = b"Ice cream gingerbread wafer chocolate cake cake carrot cake wafer.\n";
        let matched = monitor_stream(&input[..], "stdout", tracker(&["cake(.*)carrot"])).await;
        assert!(matched);
    }

    #[tokio::test]
    async fn test_monitor_reports_miss() {
        let input = b"Candy donut powder sweet roll cookie bear claw.\n";
        let matched = monitor_stream(&input[..], "stdout", tracker(&["marsbar"])).await;
        assert!(!matched);
    }

    #[tokio::test]
    async fn test_monitor_match_survives_later_lines() {
        let input = b"deploy complete\nunrelated noise\nmore noise\n";
        let matched = monitor_stream(&input[..], "stdout", tracker(&["deploy complete"])).await;
        assert!(matched);
    }

    #[tokio::test]
    async fn test_monitor_evaluates_suppressed_duplicates() {
        // The second occurrence is coalesced in the log but still checked.
        let input = b"retrying\nretrying\n";
        let matched = monitor_stream(&input[..], "stderr", tracker(&["retrying"])).await;
        assert!(matched);
    }

    #[tokio::test]
    async fn test_monitor_empty_stream_reports_miss() {
        let matched = monitor_stream(&b""[..], "stdout", tracker(&[".*"])).await;
        assert!(!matched);
    }
}
