//! Database models
//!
//! Field names serialize in camelCase; the browser UI reads them directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::questions::{QuestionKind, QuestionShape};
use crate::Error;

/// A processed video with its transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    pub title: String,
    pub url: String,
    pub video_id: String,
    pub transcript: String,
    /// Whole seconds
    pub duration: i64,
    pub thumbnail: Option<String>,
    /// Serialized `Vec<Breakpoint>` JSON
    pub breakpoints: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Source plus its sessions, newest first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceWithSessions {
    #[serde(flatten)]
    pub source: Source,
    pub sessions: Vec<Session>,
}

/// Lifecycle of a study session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Challenging,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Challenging => "challenging",
            SessionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "challenging" => Ok(SessionStatus::Challenging),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(Error::InvalidInput(format!("Unknown session status: {}", other))),
        }
    }
}

/// One (viewer, source, time-range) study interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub viewer_id: String,
    pub source_id: String,
    /// Seconds into the video
    pub start_time: f64,
    /// Seconds into the video
    pub end_time: f64,
    pub status: SessionStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Answer key and matching columns, stored together as one JSON blob
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSolution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_a: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_b: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<serde_json::Value>,
}

/// One generated question belonging to a session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: String,
    pub session_id: String,
    /// Zero-based order within the session
    pub position: i64,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub text: String,
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_a: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_b: Option<Vec<String>>,
    /// Never sent to the browser
    #[serde(skip)]
    pub correct_answer: Option<serde_json::Value>,
    pub user_answer: Option<String>,
    pub is_correct: Option<bool>,
    pub feedback: Option<String>,
    pub next_step: Option<String>,
    pub evaluated_at: Option<String>,
    pub created_at: String,
}

impl Problem {
    pub fn is_evaluated(&self) -> bool {
        self.evaluated_at.is_some()
    }

    pub fn solution(&self) -> ProblemSolution {
        ProblemSolution {
            column_a: self.column_a.clone(),
            column_b: self.column_b.clone(),
            correct_answer: self.correct_answer.clone(),
        }
    }
}

impl QuestionShape for Problem {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_parse() {
        assert_eq!("completed".parse::<SessionStatus>().unwrap(), SessionStatus::Completed);
        assert_eq!("challenging".parse::<SessionStatus>().unwrap(), SessionStatus::Challenging);
        assert!("paused".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn test_source_serializes_camel_case() {
        let source = Source {
            id: "s1".into(),
            title: "Title".into(),
            url: "https://www.youtube.com/watch?v=abc".into(),
            video_id: "abc".into(),
            transcript: String::new(),
            duration: 90,
            thumbnail: None,
            breakpoints: None,
            created_at: "2025-01-01T00:00:00.000000Z".into(),
            updated_at: "2025-01-01T00:00:00.000000Z".into(),
        };
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["videoId"], "abc");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_problem_hides_correct_answer() {
        let problem = Problem {
            id: "p".into(),
            session_id: "s".into(),
            position: 0,
            kind: QuestionKind::TrueFalse,
            text: "Is water wet?".into(),
            difficulty: Some("Easy".into()),
            options: None,
            column_a: None,
            column_b: None,
            correct_answer: Some(serde_json::json!(true)),
            user_answer: None,
            is_correct: None,
            feedback: None,
            next_step: None,
            evaluated_at: None,
            created_at: "2025-01-01T00:00:00.000000Z".into(),
        };
        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["type"], "true_false");
        assert!(json.get("correctAnswer").is_none());
        assert!(json.get("options").is_none());
    }
}
