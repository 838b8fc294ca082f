//! Challenge step machine
//!
//! loading → problem → evaluating → feedback → problem … → complete
//!
//! The browser drives the same machine; the server rebuilds it from stored
//! problems to report a session's progress.

use serde::Serialize;

use crate::{Error, Result};

/// Current step of a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStep {
    Loading,
    Problem,
    Evaluating,
    Feedback,
    Complete,
}

/// Position within a challenge of `total` problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChallengeFlow {
    pub step: ChallengeStep,
    /// Zero-based index of the problem being worked on
    pub current: usize,
    pub total: usize,
}

impl Default for ChallengeFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeFlow {
    pub fn new() -> Self {
        Self {
            step: ChallengeStep::Loading,
            current: 0,
            total: 0,
        }
    }

    /// Rebuild a flow from how many of `total` problems are already evaluated
    pub fn from_progress(total: usize, evaluated: usize) -> Self {
        if total == 0 {
            return Self::new();
        }
        if evaluated >= total {
            return Self {
                step: ChallengeStep::Complete,
                current: total - 1,
                total,
            };
        }
        Self {
            step: ChallengeStep::Problem,
            current: evaluated,
            total,
        }
    }

    fn illegal(&self, action: &str) -> Error {
        Error::InvalidInput(format!("Cannot {} while in step {:?}", action, self.step))
    }

    /// Problems arrived from the generator
    pub fn problems_loaded(&mut self, total: usize) -> Result<ChallengeStep> {
        if self.step != ChallengeStep::Loading {
            return Err(self.illegal("load problems"));
        }
        self.total = total;
        self.current = 0;
        self.step = if total == 0 {
            ChallengeStep::Complete
        } else {
            ChallengeStep::Problem
        };
        Ok(self.step)
    }

    /// Answer submitted for grading
    pub fn submit(&mut self) -> Result<ChallengeStep> {
        if self.step != ChallengeStep::Problem {
            return Err(self.illegal("submit"));
        }
        self.step = ChallengeStep::Evaluating;
        Ok(self.step)
    }

    /// Grading failed; let the user retry the same problem
    pub fn evaluation_failed(&mut self) -> Result<ChallengeStep> {
        if self.step != ChallengeStep::Evaluating {
            return Err(self.illegal("retry"));
        }
        self.step = ChallengeStep::Problem;
        Ok(self.step)
    }

    /// Grading returned feedback
    pub fn evaluated(&mut self) -> Result<ChallengeStep> {
        if self.step != ChallengeStep::Evaluating {
            return Err(self.illegal("show feedback"));
        }
        self.step = ChallengeStep::Feedback;
        Ok(self.step)
    }

    /// Move past the feedback to the next problem or finish
    pub fn advance(&mut self) -> Result<ChallengeStep> {
        if self.step != ChallengeStep::Feedback {
            return Err(self.illegal("advance"));
        }
        if self.current + 1 < self.total {
            self.current += 1;
            self.step = ChallengeStep::Problem;
        } else {
            self.step = ChallengeStep::Complete;
        }
        Ok(self.step)
    }

    pub fn is_complete(&self) -> bool {
        self.step == ChallengeStep::Complete
    }

    /// Percentage of problems finished, 0 when there are none
    pub fn progress_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let done = self.current + usize::from(self.is_complete());
        done as f64 / self.total as f64 * 100.0
    }
}
