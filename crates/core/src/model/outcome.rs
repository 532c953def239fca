use serde::{Deserialize, Serialize};

/// Result of a single answer submission.
///
/// The host grades the user's response against the question content and
/// reports only whether it was right; the scheduler never sees the response
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerOutcome {
    /// The submission matched a correct answer.
    Correct,
    /// The submission was wrong (or was skipped / timed out by the host).
    Incorrect,
}

impl AnswerOutcome {
    /// Converts the host's boolean grade into an outcome.
    #[must_use]
    pub fn from_correct(correct: bool) -> Self {
        if correct { Self::Correct } else { Self::Incorrect }
    }

    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

impl From<bool> for AnswerOutcome {
    fn from(correct: bool) -> Self {
        Self::from_correct(correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_conversion_works() {
        assert_eq!(AnswerOutcome::from_correct(true), AnswerOutcome::Correct);
        assert_eq!(AnswerOutcome::from_correct(false), AnswerOutcome::Incorrect);
        assert!(AnswerOutcome::from(true).is_correct());
        assert!(!AnswerOutcome::Incorrect.is_correct());
    }
}
