//! Prompt templates for the three LLM tasks
//!
//! Models and output budgets come from `ModelConfig`; only the wording lives here.

use learning_common::questions::{QuestionKind, QuestionShape};
use learning_common::transcript::{truncate_chars, BREAKPOINT_PROMPT_CHARS};

/// Ask for natural pause points in a transcript
pub fn breakpoint_prompt(transcript: &str, duration: i64) -> String {
    format!(
        r#"Analyze this video transcript and identify natural breakpoints where it would be good to pause and test understanding. Look for:
- Topic transitions ("Now let's move on to...", "In the next section...")
- Completion of a concept or idea
- End of worked examples
- Natural pauses before new material

Video duration: {duration} seconds

Transcript:
{transcript}

Return ONLY a JSON array of breakpoints, no other text:
[{{ "timestamp": <seconds>, "reason": "<brief reason>" }}]

Aim for breakpoints roughly every 10-15 minutes for long videos, but prioritize natural transitions over arbitrary time intervals. For short videos (<10 min), identify 1-2 key breakpoints. Always include at least one breakpoint."#,
        duration = duration,
        transcript = truncate_chars(transcript, BREAKPOINT_PROMPT_CHARS),
    )
}

/// Ask for three deep-understanding problems about a transcript excerpt
///
/// The caller truncates `transcript` to its budget.
pub fn challenge_prompt(title: &str, transcript: &str) -> String {
    format!(
        r#"You are an expert educator who creates genuinely challenging problems that test deep understanding, not surface-level recall.

Based on the following video transcript titled "{title}", generate 3 challenging problems that:
1. Require 5-15 minutes of thought to solve
2. Test actual understanding, not memorization
3. Make the learner think "oh, I didn't see it that way before"
4. Are engaging and interesting to work on

TRANSCRIPT:
{transcript}

Create 3 problems of these types:
1. "construction" - Design/build something that satisfies constraints from the content
2. "application" - Apply a concept to a novel, unexpected scenario
3. "connection" - Connect ideas from the content to something broader or in a different domain

Output strictly valid JSON with this structure:
{{
  "problems": [
    {{
      "id": "p1",
      "type": "construction",
      "text": "...",
      "difficulty": "Medium"
    }},
    {{
      "id": "p2",
      "type": "application",
      "text": "...",
      "difficulty": "Hard"
    }},
    {{
      "id": "p3",
      "type": "connection",
      "text": "...",
      "difficulty": "Medium"
    }}
  ]
}}

A problem may instead use a structured type: "multiple_choice", "multi_select" or "ordering" (add "options": [...]), "true_false", or "matching" (add "columnA": [...] and "columnB": [...]). Structured problems may include "correctAnswer".

IMPORTANT:
- Problems must be specifically about the content in the transcript, not generic
- Each problem should require genuine thinking and creativity
- Do not include markdown formatting. Just the raw JSON string."#,
        title = title,
        transcript = transcript,
    )
}

/// Ask a tutor to grade one answer
pub fn evaluation_prompt(question: &str, answer: &str) -> String {
    format!(
        r#"You are an expert tutor. Evaluate the student's answer to the following question.

Question: "{question}"
Student Answer: "{answer}"

Determine if the answer is correct or demonstrates a good understanding.
Provide constructive feedback. If incorrect, explain why without giving the full answer immediately if possible, or guide them.
Suggest a brief "next step" or follow-up thought.

Output strictly valid JSON with this structure:
{{
  "isCorrect": boolean,
  "feedback": "string",
  "nextStep": "string"
}}
Do not include markdown formatting like ```json. Just the raw JSON string."#,
        question = question,
        answer = answer,
    )
}

fn lettered(options: &[String]) -> String {
    options
        .iter()
        .enumerate()
        .map(|(i, opt)| format!("{}. {}", (b'A' + (i % 26) as u8) as char, opt))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Question text plus whatever the grader needs to see the choices
pub fn describe_question<Q: QuestionShape + ?Sized>(question: &Q, text: &str) -> String {
    match question.kind() {
        QuestionKind::MultipleChoice | QuestionKind::MultiSelect => {
            format!("{}\nOptions:\n{}", text, lettered(question.options()))
        }
        QuestionKind::Ordering => {
            format!("{}\nItems to order:\n{}", text, lettered(question.options()))
        }
        QuestionKind::Matching => format!(
            "{}\nColumn A: {}\nColumn B: {}",
            text,
            question.column_a().join(", "),
            question.column_b().join(", ")
        ),
        QuestionKind::TrueFalse => format!("{} (True or False)", text),
        QuestionKind::Open(_) => text.to_string(),
    }
}
