//! TranscriptAPI.com client

use async_trait::async_trait;
use learning_common::transcript::TranscriptSegment;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{TranscriptError, TranscriptSource};

pub const DEFAULT_BASE_URL: &str = "https://transcriptapi.com";

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    #[serde(default)]
    transcript: Vec<TranscriptSegment>,
}

/// TranscriptAPI client
pub struct TranscriptApiClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl TranscriptApiClient {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Result<Self, TranscriptError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TranscriptError::Failed(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn transcript_url(&self) -> String {
        format!("{}/api/v2/youtube/transcript", self.base_url)
    }
}

/// Map a provider status code to the user-facing error
fn status_error(status: u16) -> TranscriptError {
    match status {
        404 => TranscriptError::NotFound,
        429 => TranscriptError::RateLimited,
        other => TranscriptError::Failed(format!("HTTP {}", other)),
    }
}

#[async_trait]
impl TranscriptSource for TranscriptApiClient {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("TRANSCRIPT_API_KEY not set; cannot fetch transcript for {}", video_id);
            return Err(TranscriptError::Failed("TRANSCRIPT_API_KEY is not set".to_string()));
        };

        debug!(video_id = video_id, "Fetching transcript");

        let response = self
            .http_client
            .get(self.transcript_url())
            .query(&[("video_url", video_id), ("include_timestamp", "true")])
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| TranscriptError::Failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status.as_u16()));
        }

        let body: TranscriptResponse = response
            .json()
            .await
            .map_err(|e| TranscriptError::Failed(e.to_string()))?;

        debug!(video_id = video_id, segments = body.transcript.len(), "Transcript fetched");
        Ok(body.transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(status_error(404).to_string(), "Video not found or no transcript available");
        assert_eq!(status_error(429).to_string(), "Too many requests, please try again");
        assert_eq!(status_error(500).to_string(), "Failed to fetch transcript");
        assert_eq!(status_error(401).to_string(), "Failed to fetch transcript");
    }

    #[test]
    fn test_response_parse() {
        let body: TranscriptResponse = serde_json::from_str(
            r#"{"video_id":"x","transcript":[{"text":"hi","start":0.5,"duration":1.5}]}"#,
        )
        .unwrap();
        assert_eq!(body.transcript.len(), 1);
        assert_eq!(body.transcript[0].start, 0.5);
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let client = TranscriptApiClient::new(None, None).unwrap();
        let result = client.fetch("dQw4w9WgXcQ").await;
        assert!(matches!(result, Err(TranscriptError::Failed(_))));
    }
}
