//! Challenge generation and answer evaluation against the LLM

use learning_common::config::TaskModel;
use learning_common::llm_json::extract_json_object;
use learning_common::questions::ProblemSpec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{prompts, LlmClient, LlmError};

/// Tutor verdict for one answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub next_step: String,
}

/// Why a generation or evaluation produced nothing usable
#[derive(Debug, thiserror::Error)]
pub enum ChallengeError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Malformed reply: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct GeneratedProblems {
    #[serde(default)]
    problems: Vec<serde_json::Value>,
}

/// Parse `{"problems": [...]}`, dropping entries that fail validation
pub fn parse_problems(reply: &str) -> Result<Vec<ProblemSpec>, ChallengeError> {
    let json = extract_json_object(reply).map_err(|e| ChallengeError::Malformed(e.to_string()))?;
    let generated: GeneratedProblems =
        serde_json::from_str(json).map_err(|e| ChallengeError::Malformed(e.to_string()))?;

    let problems: Vec<ProblemSpec> = generated
        .problems
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<ProblemSpec>(value) {
            Ok(spec) => match spec.validate() {
                Ok(()) => Some(spec),
                Err(e) => {
                    warn!("Dropping generated problem: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Dropping unparseable problem: {}", e);
                None
            }
        })
        .collect();

    if problems.is_empty() {
        return Err(ChallengeError::Malformed("No usable problems in reply".to_string()));
    }
    Ok(problems)
}

/// Parse `{"isCorrect", "feedback", "nextStep"}`
pub fn parse_evaluation(reply: &str) -> Result<Evaluation, ChallengeError> {
    let json = extract_json_object(reply).map_err(|e| ChallengeError::Malformed(e.to_string()))?;
    serde_json::from_str(json).map_err(|e| ChallengeError::Malformed(e.to_string()))
}

/// Generate problems for a transcript excerpt
pub async fn generate_problems(
    llm: &dyn LlmClient,
    model: &TaskModel,
    title: &str,
    excerpt: &str,
) -> Result<Vec<ProblemSpec>, ChallengeError> {
    let prompt = prompts::challenge_prompt(title, excerpt);
    let reply = llm.complete(&model.model, model.max_tokens, &prompt).await?;
    let problems = parse_problems(&reply)?;
    debug!(count = problems.len(), "Problems generated");
    Ok(problems)
}

/// Grade one formatted answer
pub async fn evaluate_answer(
    llm: &dyn LlmClient,
    model: &TaskModel,
    question: &str,
    answer: &str,
) -> Result<Evaluation, ChallengeError> {
    let prompt = prompts::evaluation_prompt(question, answer);
    let reply = llm.complete(&model.model, model.max_tokens, &prompt).await?;
    parse_evaluation(&reply)
}
