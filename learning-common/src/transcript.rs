//! Transcript formatting and time-range extraction
//!
//! Stored transcripts are plain text, one segment per line, each line
//! prefixed with its start time: `[m:ss] text`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Character budget for the breakpoint-analysis prompt
pub const BREAKPOINT_PROMPT_CHARS: usize = 15_000;

/// Character budget for the challenge-generation prompt
pub const CHALLENGE_PROMPT_CHARS: usize = 5_000;

static TIMESTAMP_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\[(?:(\d+):)?(\d{1,3}):(\d{2})\]\s?(.*)$").expect("static regex")
});

/// One caption segment as returned by the transcript provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    /// Seconds from the start of the video
    pub start: f64,
    /// Seconds
    #[serde(default)]
    pub duration: f64,
}

/// A transcript line with its parsed start time
#[derive(Debug, Clone, PartialEq)]
pub struct TimedLine {
    pub seconds: u64,
    pub text: String,
}

/// Format seconds as `[m:ss]` (minutes keep counting past 59)
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("[{}:{:02}]", minutes, secs)
}

/// Render provider segments as timestamped lines
pub fn format_transcript(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| format!("{} {}", format_timestamp(segment.start), segment.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Estimate the video length from the last segment, in whole seconds
pub fn estimate_duration(segments: &[TranscriptSegment]) -> i64 {
    match segments.last() {
        Some(last) => (last.start + last.duration).max(0.0).ceil() as i64,
        None => 0,
    }
}

/// Parse a stored transcript back into timed lines
///
/// Lines without a timestamp continue the previous line. Untimed lines
/// before the first timestamp are placed at second 0.
pub fn parse_transcript(text: &str) -> Vec<TimedLine> {
    let mut lines: Vec<TimedLine> = Vec::new();

    for raw in text.lines() {
        if let Some(caps) = TIMESTAMP_LINE.captures(raw) {
            let hours: u64 = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
            let minutes: u64 = caps[2].parse().unwrap_or(0);
            let seconds: u64 = caps[3].parse().unwrap_or(0);
            lines.push(TimedLine {
                seconds: hours * 3600 + minutes * 60 + seconds,
                text: caps[4].trim_end().to_string(),
            });
            continue;
        }

        let continuation = raw.trim();
        if continuation.is_empty() {
            continue;
        }

        match lines.last_mut() {
            Some(previous) => {
                if !previous.text.is_empty() {
                    previous.text.push(' ');
                }
                previous.text.push_str(continuation);
            }
            None => lines.push(TimedLine {
                seconds: 0,
                text: continuation.to_string(),
            }),
        }
    }

    lines
}

/// Lines whose start time falls in `[start, end)`, re-rendered as `[m:ss] text`
///
/// Returns an empty string for an empty or inverted range.
pub fn extract_range(text: &str, start: f64, end: f64) -> String {
    if end <= start {
        return String::new();
    }

    parse_transcript(text)
        .into_iter()
        .filter(|line| {
            let t = line.seconds as f64;
            t >= start && t < end
        })
        .map(|line| format!("{} {}", format_timestamp(line.seconds as f64), line.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to at most `max_chars` characters without splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
