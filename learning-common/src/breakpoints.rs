//! Breakpoints: timestamps at which the viewer is paused and quizzed

use serde::{Deserialize, Serialize};

use crate::llm_json::extract_json_array;

/// Spacing of generated fallback breakpoints (10 minutes)
pub const FALLBACK_INTERVAL_SECS: f64 = 600.0;

/// A suggested pause point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Seconds from the start of the video
    pub timestamp: f64,
    #[serde(default)]
    pub reason: String,
}

/// Parse the breakpoint array out of an LLM reply
///
/// Anything unparseable yields an empty list. Negative or non-finite
/// timestamps are dropped; the rest are sorted and deduplicated.
pub fn parse_breakpoints(reply: &str) -> Vec<Breakpoint> {
    let parsed: Vec<Breakpoint> = extract_json_array(reply)
        .and_then(|json| serde_json::from_str(json).ok())
        .unwrap_or_default();
    normalize(parsed)
}

/// Sort by timestamp, drop invalid entries and duplicates
pub fn normalize(mut breakpoints: Vec<Breakpoint>) -> Vec<Breakpoint> {
    breakpoints.retain(|bp| bp.timestamp.is_finite() && bp.timestamp >= 0.0);
    breakpoints.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    breakpoints.dedup_by(|a, b| a.timestamp == b.timestamp);
    breakpoints
}

/// Evenly spaced breakpoints for when analysis produced nothing
pub fn fallback_breakpoints(duration: f64) -> Vec<Breakpoint> {
    if duration <= 0.0 {
        return Vec::new();
    }

    let mut breakpoints = Vec::new();
    let mut at = FALLBACK_INTERVAL_SECS;
    while at < duration {
        breakpoints.push(Breakpoint {
            timestamp: at,
            reason: format!("{} minute mark", (at / 60.0) as u64),
        });
        at += FALLBACK_INTERVAL_SECS;
    }

    breakpoints.push(Breakpoint {
        timestamp: duration,
        reason: "End of video".to_string(),
    });
    breakpoints
}

/// Decode the JSON stored on a source row
pub fn decode_stored(stored: Option<&str>) -> Vec<Breakpoint> {
    stored
        .and_then(|json| serde_json::from_str(json).ok())
        .map(normalize)
        .unwrap_or_default()
}

/// Stored breakpoints, or the fallback set when none were stored
pub fn effective_breakpoints(stored: Option<&str>, duration: f64) -> Vec<Breakpoint> {
    let decoded = decode_stored(stored);
    if decoded.is_empty() {
        fallback_breakpoints(duration)
    } else {
        decoded
    }
}

/// First breakpoint strictly after `after`
pub fn next_breakpoint(breakpoints: &[Breakpoint], after: f64) -> Option<&Breakpoint> {
    breakpoints.iter().find(|bp| bp.timestamp > after)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_with_prose() {
        let reply = "Sure!\n[{\"timestamp\": 600, \"reason\": \"topic shift\"}, \
                     {\"timestamp\": 125.5, \"reason\": \"example done\"}, \
                     {\"timestamp\": -3, \"reason\": \"bogus\"}]";
        let breakpoints = parse_breakpoints(reply);
        assert_eq!(breakpoints.len(), 2);
        assert_eq!(breakpoints[0].timestamp, 125.5);
        assert_eq!(breakpoints[1].reason, "topic shift");
    }

    #[test]
    fn test_parse_garbage_is_empty() {
        assert!(parse_breakpoints("I could not find any").is_empty());
        assert!(parse_breakpoints("[not json]").is_empty());
    }

    #[test]
    fn test_duplicates_removed() {
        let reply = r#"[{"timestamp": 60, "reason": "a"}, {"timestamp": 60, "reason": "b"}]"#;
        assert_eq!(parse_breakpoints(reply).len(), 1);
    }

    #[test]
    fn test_fallback_short_video() {
        let breakpoints = fallback_breakpoints(300.0);
        assert_eq!(breakpoints.len(), 1);
        assert_eq!(breakpoints[0].timestamp, 300.0);
    }

    #[test]
    fn test_fallback_long_video() {
        let timestamps: Vec<f64> = fallback_breakpoints(1500.0)
            .iter()
            .map(|bp| bp.timestamp)
            .collect();
        assert_eq!(timestamps, vec![600.0, 1200.0, 1500.0]);
        assert!(fallback_breakpoints(0.0).is_empty());
    }

    #[test]
    fn test_effective_prefers_stored() {
        let stored = r#"[{"timestamp": 42, "reason": "x"}]"#;
        assert_eq!(effective_breakpoints(Some(stored), 900.0)[0].timestamp, 42.0);
        assert_eq!(effective_breakpoints(Some("[]"), 900.0).len(), 2);
        assert_eq!(effective_breakpoints(None, 900.0).len(), 2);
    }

    #[test]
    fn test_next_breakpoint() {
        let breakpoints = fallback_breakpoints(1500.0);
        assert_eq!(next_breakpoint(&breakpoints, 0.0).unwrap().timestamp, 600.0);
        assert_eq!(next_breakpoint(&breakpoints, 600.0).unwrap().timestamp, 1200.0);
        assert!(next_breakpoint(&breakpoints, 1500.0).is_none());
    }
}
