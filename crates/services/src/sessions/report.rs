use chrono::{DateTime, Utc};
use serde::Serialize;

use quiz_core::model::{QuestionId, QuestionPerformance, SessionStats};

/// One entry in the session's missed-questions list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissedQuestion {
    pub id: QuestionId,
    pub attempts: u32,
    pub incorrect_count: u32,
}

/// Aggregate view of a session, for the host's results screen.
///
/// Can be built mid-session for an interim standing; `completed_at` is
/// `None` until the session finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub total_questions: usize,
    pub stats: SessionStats,
    /// Correct submissions as a percentage of all submissions, 0 when
    /// nothing has been answered yet.
    pub score_percent: f64,
    /// Every question that was missed at least once, worst first.
    pub missed: Vec<MissedQuestion>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionReport {
    #[must_use]
    pub fn from_performance(
        records: &[QuestionPerformance],
        started_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        let stats = SessionStats::from_performance(records);
        let score_percent = if stats.total_attempts() > 0 {
            100.0 * stats.total_correct() as f64 / stats.total_attempts() as f64
        } else {
            0.0
        };

        let mut missed: Vec<MissedQuestion> = records
            .iter()
            .filter(|perf| perf.ever_missed())
            .map(|perf| MissedQuestion {
                id: perf.id(),
                attempts: perf.attempts(),
                incorrect_count: perf.incorrect_count(),
            })
            .collect();
        missed.sort_by(|a, b| {
            b.incorrect_count
                .cmp(&a.incorrect_count)
                .then(a.id.cmp(&b.id))
        });

        Self {
            total_questions: records.len(),
            stats,
            score_percent,
            missed,
            started_at,
            completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::AnswerOutcome;
    use quiz_core::scheduler::AdaptiveScheduler;
    use quiz_core::time::fixed_now;

    #[test]
    fn report_on_untouched_session_is_zeroed() {
        let scheduler = AdaptiveScheduler::with_seed(3, 1);
        let report = SessionReport::from_performance(scheduler.performance(), fixed_now(), None);

        assert_eq!(report.total_questions, 3);
        assert_eq!(report.stats.total_attempts(), 0);
        assert_eq!(report.score_percent, 0.0);
        assert!(report.missed.is_empty());
        assert_eq!(report.completed_at, None);
    }

    #[test]
    fn missed_questions_are_listed_worst_first() {
        let mut scheduler = AdaptiveScheduler::with_seed(4, 1);
        let miss = |s: &mut AdaptiveScheduler, id: usize| {
            s.record_answer(QuestionId::new(id), AnswerOutcome::Incorrect)
                .unwrap();
        };
        miss(&mut scheduler, 2);
        miss(&mut scheduler, 2);
        miss(&mut scheduler, 0);
        scheduler
            .record_answer(QuestionId::new(1), AnswerOutcome::Correct)
            .unwrap();

        let report = SessionReport::from_performance(scheduler.performance(), fixed_now(), None);

        let ids: Vec<usize> = report.missed.iter().map(|m| m.id.value()).collect();
        assert_eq!(ids, vec![2, 0]);
        assert_eq!(report.missed[0].incorrect_count, 2);
        assert_eq!(report.stats.total_attempts(), 4);
        assert!((report.score_percent - 25.0).abs() < f64::EPSILON);
    }
}
