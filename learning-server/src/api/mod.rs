//! HTTP API handlers for learning-server

pub mod challenge;
pub mod extract;
pub mod health;
pub mod sessions;
pub mod sources;
pub mod ui;
pub mod youtube;

pub use challenge::challenge_routes;
pub use extract::{ApiJson, ApiQuery};
pub use health::health_routes;
pub use sessions::session_routes;
pub use sources::source_routes;
pub use ui::ui_routes;
pub use youtube::youtube_routes;

/// Trimmed, non-empty string field
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
