//! Breakpoint analysis
//!
//! Never fails: any problem is logged and an empty list returned, which the
//! UI replaces with evenly spaced fallback breakpoints.

use learning_common::breakpoints::{parse_breakpoints, Breakpoint};
use learning_common::config::TaskModel;
use tracing::{debug, warn};

use super::{prompts, LlmClient};

/// Ask the LLM where to pause a video
pub async fn analyze_breakpoints(
    llm: &dyn LlmClient,
    model: &TaskModel,
    transcript: &str,
    duration: i64,
) -> Vec<Breakpoint> {
    if !llm.is_configured() {
        warn!("Skipping breakpoint analysis: ANTHROPIC_API_KEY is not set");
        return Vec::new();
    }

    let prompt = prompts::breakpoint_prompt(transcript, duration);
    let reply = match llm.complete(&model.model, model.max_tokens, &prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Breakpoint analysis failed: {}", e);
            return Vec::new();
        }
    };

    let breakpoints = parse_breakpoints(&reply);
    if breakpoints.is_empty() {
        warn!("Breakpoint analysis returned no usable breakpoints");
    } else {
        debug!(count = breakpoints.len(), "Breakpoints analyzed");
    }
    breakpoints
}
