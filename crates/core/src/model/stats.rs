use serde::Serialize;
use thiserror::Error;

use crate::model::QuestionPerformance;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StatsError {
    #[error("total attempts ({total}) does not match outcome counts ({sum})")]
    CountMismatch { total: u64, sum: u64 },
}

/// Aggregate answer totals for a practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    total_attempts: u64,
    total_correct: u64,
    total_incorrect: u64,
}

impl SessionStats {
    /// Builds stats from raw totals, checking that they add up.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::CountMismatch` if
    /// `total_attempts != total_correct + total_incorrect`.
    pub fn from_parts(
        total_attempts: u64,
        total_correct: u64,
        total_incorrect: u64,
    ) -> Result<Self, StatsError> {
        let sum = total_correct + total_incorrect;
        if sum != total_attempts {
            return Err(StatsError::CountMismatch {
                total: total_attempts,
                sum,
            });
        }

        Ok(Self {
            total_attempts,
            total_correct,
            total_incorrect,
        })
    }

    /// Sums the counters of every per-question record.
    #[must_use]
    pub fn from_performance(records: &[QuestionPerformance]) -> Self {
        let mut total_attempts = 0_u64;
        let mut total_correct = 0_u64;
        let mut total_incorrect = 0_u64;

        for perf in records {
            total_attempts += u64::from(perf.attempts());
            total_correct += u64::from(perf.correct_count());
            total_incorrect += u64::from(perf.incorrect_count());
        }

        Self {
            total_attempts,
            total_correct,
            total_incorrect,
        }
    }

    #[must_use]
    pub fn total_attempts(&self) -> u64 {
        self.total_attempts
    }

    #[must_use]
    pub fn total_correct(&self) -> u64 {
        self.total_correct
    }

    #[must_use]
    pub fn total_incorrect(&self) -> u64 {
        self.total_incorrect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerOutcome, QuestionId};

    #[test]
    fn from_parts_rejects_mismatched_totals() {
        let err = SessionStats::from_parts(5, 2, 2).unwrap_err();
        assert!(matches!(err, StatsError::CountMismatch { total: 5, sum: 4 }));
    }

    #[test]
    fn from_parts_accepts_balanced_totals() {
        let stats = SessionStats::from_parts(4, 3, 1).unwrap();
        assert_eq!(stats.total_attempts(), 4);
        assert_eq!(stats.total_correct(), 3);
        assert_eq!(stats.total_incorrect(), 1);
    }

    #[test]
    fn from_performance_sums_all_records() {
        let mut a = QuestionPerformance::new(QuestionId::new(0));
        a.record_outcome(AnswerOutcome::Correct);
        a.record_outcome(AnswerOutcome::Incorrect);
        let mut b = QuestionPerformance::new(QuestionId::new(1));
        b.record_outcome(AnswerOutcome::Correct);

        let stats = SessionStats::from_performance(&[a, b]);
        assert_eq!(stats.total_attempts(), 3);
        assert_eq!(stats.total_correct(), 2);
        assert_eq!(stats.total_incorrect(), 1);
        assert_eq!(
            stats.total_attempts(),
            stats.total_correct() + stats.total_incorrect()
        );
    }
}
