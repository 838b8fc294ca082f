//! YouTube URL parsing

use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)([^&\n?#]+)")
        .expect("static regex")
});

static BARE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z0-9_-]{11})$").expect("static regex"));

/// Extract the video ID from a watch/short/embed URL or a bare 11-char ID
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    for pattern in [&*URL_PATTERN, &*BARE_ID_PATTERN] {
        if let Some(caps) = pattern.captures(input) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }

    None
}

/// Canonical watch URL stored on the source row
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Thumbnail URL served by YouTube's image CDN for every public video
pub fn default_thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
}
