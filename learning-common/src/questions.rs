//! Question kinds, answer validation and answer formatting
//!
//! Five structured kinds carry extra data (options, matching columns). Every
//! other kind string is an open-ended text question.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Error, Result};

/// Kind of a generated question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionKind {
    MultipleChoice,
    MultiSelect,
    TrueFalse,
    Matching,
    Ordering,
    /// construction, application, connection, recall, fill_blank, ...
    Open(String),
}

impl QuestionKind {
    pub fn as_str(&self) -> &str {
        match self {
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::MultiSelect => "multi_select",
            QuestionKind::TrueFalse => "true_false",
            QuestionKind::Matching => "matching",
            QuestionKind::Ordering => "ordering",
            QuestionKind::Open(kind) => kind,
        }
    }

    pub fn is_structured(&self) -> bool {
        !matches!(self, QuestionKind::Open(_))
    }
}

impl From<String> for QuestionKind {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "multiple_choice" => QuestionKind::MultipleChoice,
            "multi_select" => QuestionKind::MultiSelect,
            "true_false" => QuestionKind::TrueFalse,
            "matching" => QuestionKind::Matching,
            "ordering" => QuestionKind::Ordering,
            _ => QuestionKind::Open(value),
        }
    }
}

impl From<&str> for QuestionKind {
    fn from(value: &str) -> Self {
        QuestionKind::from(value.to_string())
    }
}

impl From<QuestionKind> for String {
    fn from(kind: QuestionKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A submitted answer; the JSON shape depends on the question kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Bool(bool),
    Index(i64),
    Indices(Vec<i64>),
    /// Column-A index (as a JSON object key) → column-B index
    Matches(BTreeMap<String, i64>),
    Text(String),
}

impl Answer {
    /// Shape-agnostic rendering used when the answer does not fit the kind
    pub fn to_plain_string(&self) -> String {
        match self {
            Answer::Bool(b) => b.to_string(),
            Answer::Index(i) => i.to_string(),
            Answer::Indices(list) => list
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(","),
            Answer::Matches(map) => serde_json::to_string(map).unwrap_or_default(),
            Answer::Text(text) => text.clone(),
        }
    }
}

/// Read access to the parts of a question that answer handling needs
pub trait QuestionShape {
    fn kind(&self) -> &QuestionKind;
    fn options(&self) -> &[String];
    fn column_a(&self) -> &[String];
    fn column_b(&self) -> &[String];
}

/// A question as emitted by the LLM (camelCase JSON)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSpec {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: QuestionKind,
    pub text: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub column_a: Option<Vec<String>>,
    #[serde(default)]
    pub column_b: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: Option<serde_json::Value>,
}

fn default_kind() -> QuestionKind {
    QuestionKind::Open("open".to_string())
}

impl ProblemSpec {
    /// Check that the question carries the data its kind needs
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::InvalidInput("Question text is empty".to_string()));
        }

        match self.kind {
            QuestionKind::MultipleChoice | QuestionKind::MultiSelect | QuestionKind::Ordering => {
                if self.options().len() < 2 {
                    return Err(Error::InvalidInput(format!(
                        "{} question needs at least two options",
                        self.kind.as_str()
                    )));
                }
            }
            QuestionKind::Matching => {
                if self.column_a().is_empty() || self.column_b().is_empty() {
                    return Err(Error::InvalidInput(
                        "matching question needs both columns".to_string(),
                    ));
                }
            }
            QuestionKind::TrueFalse | QuestionKind::Open(_) => {}
        }

        Ok(())
    }
}

impl QuestionShape for ProblemSpec {
    fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    fn column_a(&self) -> &[String] {
        self.column_a.as_deref().unwrap_or(&[])
    }

    fn column_b(&self) -> &[String] {
        self.column_b.as_deref().unwrap_or(&[])
    }
}

fn index_in(list: &[String], index: i64) -> Option<&String> {
    usize::try_from(index).ok().and_then(|i| list.get(i))
}

fn option_letter(index: i64) -> String {
    u32::try_from(index)
        .ok()
        .and_then(|i| char::from_u32('A' as u32 + i))
        .filter(|c| c.is_ascii_uppercase())
        .map(|c| c.to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}

/// Matches sorted by numeric column-A index; non-numeric keys are skipped
fn sorted_matches(map: &BTreeMap<String, i64>) -> Vec<(i64, i64)> {
    let mut pairs: Vec<(i64, i64)> = map
        .iter()
        .filter_map(|(key, value)| key.trim().parse::<i64>().ok().map(|k| (k, *value)))
        .collect();
    pairs.sort_by_key(|(k, _)| *k);
    pairs
}

/// Whether an answer is complete enough to submit for this question
pub fn is_answer_valid<Q: QuestionShape + ?Sized>(question: &Q, answer: &Answer) -> bool {
    match (question.kind(), answer) {
        (QuestionKind::MultipleChoice, Answer::Index(i)) => {
            index_in(question.options(), *i).is_some()
        }
        (QuestionKind::MultipleChoice, _) => false,

        (QuestionKind::MultiSelect, Answer::Indices(list)) => !list.is_empty(),
        (QuestionKind::MultiSelect, _) => false,

        (QuestionKind::TrueFalse, Answer::Bool(_)) => true,
        (QuestionKind::TrueFalse, _) => false,

        (QuestionKind::Matching, Answer::Matches(map)) => {
            let column_a = question.column_a();
            !column_a.is_empty() && map.len() == column_a.len()
        }
        (QuestionKind::Matching, _) => false,

        (QuestionKind::Ordering, Answer::Indices(list)) => !list.is_empty(),
        (QuestionKind::Ordering, _) => false,

        (QuestionKind::Open(_), Answer::Text(text)) => !text.trim().is_empty(),
        (QuestionKind::Open(_), _) => false,
    }
}

/// Human-readable answer text sent to the grader
pub fn format_answer_for_submission<Q: QuestionShape + ?Sized>(
    question: &Q,
    answer: &Answer,
) -> String {
    match (question.kind(), answer) {
        (QuestionKind::MultipleChoice, Answer::Index(i)) => {
            match index_in(question.options(), *i) {
                Some(option) => format!("Selected: {} (option {})", option, option_letter(*i)),
                None => answer.to_plain_string(),
            }
        }

        (QuestionKind::MultiSelect, Answer::Indices(list)) if !question.options().is_empty() => {
            let selected: Vec<&str> = list
                .iter()
                .filter_map(|i| index_in(question.options(), *i))
                .map(String::as_str)
                .collect();
            format!("Selected: {}", selected.join(", "))
        }

        (QuestionKind::TrueFalse, Answer::Bool(value)) => {
            let label = if *value { "True" } else { "False" };
            label.to_string()
        }

        (QuestionKind::Matching, Answer::Matches(map))
            if !question.column_a().is_empty() && !question.column_b().is_empty() =>
        {
            let matches: Vec<String> = sorted_matches(map)
                .into_iter()
                .filter_map(|(a, b)| {
                    let left = index_in(question.column_a(), a)?;
                    let right = index_in(question.column_b(), b)?;
                    Some(format!("{} → {}", left, right))
                })
                .collect();
            format!("Matches: {}", matches.join("; "))
        }

        (QuestionKind::Ordering, Answer::Indices(list)) if !question.options().is_empty() => {
            let ordered: Vec<&str> = list
                .iter()
                .filter_map(|i| index_in(question.options(), *i))
                .map(String::as_str)
                .collect();
            format!("Order: {}", ordered.join(" → "))
        }

        _ => answer.to_plain_string(),
    }
}
