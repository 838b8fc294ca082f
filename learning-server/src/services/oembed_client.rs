//! YouTube oEmbed metadata client

use async_trait::async_trait;
use learning_common::youtube::{default_thumbnail_url, watch_url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{VideoMetadata, VideoMetadataSource};

pub const DEFAULT_OEMBED_URL: &str = "https://www.youtube.com/oembed";

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
}

/// oEmbed client; needs no API key
pub struct OEmbedClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl OEmbedClient {
    pub fn new() -> reqwest::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http_client,
            endpoint: DEFAULT_OEMBED_URL.to_string(),
        })
    }

    async fn lookup(&self, video_id: &str) -> Result<OEmbedResponse, String> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("url", watch_url(video_id).as_str()), ("format", "json")])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status().as_u16()));
        }

        response.json().await.map_err(|e| e.to_string())
    }
}

/// Fill gaps in an oEmbed reply
fn to_metadata(video_id: &str, response: OEmbedResponse) -> VideoMetadata {
    match response.title.filter(|t| !t.trim().is_empty()) {
        Some(title) => VideoMetadata {
            title,
            thumbnail: response
                .thumbnail_url
                .or_else(|| Some(default_thumbnail_url(video_id))),
        },
        None => VideoMetadata {
            title: VideoMetadata::UNTITLED.to_string(),
            thumbnail: response.thumbnail_url,
        },
    }
}

#[async_trait]
impl VideoMetadataSource for OEmbedClient {
    async fn fetch(&self, video_id: &str) -> VideoMetadata {
        match self.lookup(video_id).await {
            Ok(response) => {
                debug!(video_id = video_id, "oEmbed metadata fetched");
                to_metadata(video_id, response)
            }
            Err(e) => {
                warn!("oEmbed fetch failed for {}: {}", video_id, e);
                VideoMetadata::untitled()
            }
        }
    }
}
