//! # learning-common
//!
//! Shared code for the learning-app service:
//! - Database schema, models and initialization
//! - Configuration loading and root folder resolution
//! - YouTube URL parsing and transcript formatting
//! - Study-note helpers (transcript ranges, key concepts, breakpoints)
//! - Question validation and answer formatting
//! - The challenge step machine mirrored by the browser UI

pub mod breakpoints;
pub mod concepts;
pub mod config;
pub mod db;
pub mod error;
pub mod flow;
pub mod llm_json;
pub mod questions;
pub mod time;
pub mod transcript;
pub mod youtube;

pub use error::{Error, Result};
pub use flow::{ChallengeFlow, ChallengeStep};
pub use questions::{Answer, QuestionKind};
