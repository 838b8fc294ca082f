//! External services: LLM, transcript provider, video metadata
//!
//! Each provider sits behind a trait so the HTTP layer can be tested with
//! in-process fakes.

pub mod anthropic_client;
pub mod breakpoint_analyzer;
pub mod challenge;
pub mod oembed_client;
pub mod prompts;
pub mod transcript_client;

use async_trait::async_trait;
use learning_common::transcript::TranscriptSegment;
use thiserror::Error;

pub use anthropic_client::AnthropicClient;
pub use oembed_client::OEmbedClient;
pub use transcript_client::TranscriptApiClient;

/// LLM call errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("ANTHROPIC_API_KEY is not set")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Single-prompt text completion
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Whether an API key is available
    fn is_configured(&self) -> bool;

    /// Send one user prompt and return the reply text
    async fn complete(&self, model: &str, max_tokens: u32, prompt: &str) -> Result<String, LlmError>;
}

/// Transcript fetch errors
///
/// Display strings are shown to the user verbatim.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Video not found or no transcript available")]
    NotFound,

    #[error("Too many requests, please try again")]
    RateLimited,

    /// Detail is logged, not returned
    #[error("Failed to fetch transcript")]
    Failed(String),
}

/// Source of timed captions for a video
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, TranscriptError>;
}

/// Title and thumbnail of a video
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub title: String,
    pub thumbnail: Option<String>,
}

impl VideoMetadata {
    pub const UNTITLED: &'static str = "Untitled Video";

    pub fn untitled() -> Self {
        Self {
            title: Self::UNTITLED.to_string(),
            thumbnail: None,
        }
    }
}

/// Video metadata lookup; degrades to `VideoMetadata::untitled()` instead of failing
#[async_trait]
pub trait VideoMetadataSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> VideoMetadata;
}
