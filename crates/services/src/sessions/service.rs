use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use quiz_core::model::{AnswerOutcome, QuestionId, QuestionPerformance, SessionStats};
use quiz_core::scheduler::{AdaptiveScheduler, SchedulerSettings};
use quiz_core::time::Clock;

use super::progress::SessionProgress;
use super::report::SessionReport;
use crate::error::SessionError;

//
// ─── SESSION ANSWER ────────────────────────────────────────────────────────────
//

/// Outcome of answering the question currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionAnswer {
    /// The question that was answered.
    pub question: QuestionId,
    pub outcome: AnswerOutcome,
    /// The question to present next, `None` when the session just finished.
    pub next: Option<QuestionId>,
    pub is_complete: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory practice session over `total_questions` questions.
///
/// Wraps the adaptive scheduler into the loop a host drives: one question on
/// screen at a time, `answer_current` per user submission, progress and
/// report views on demand. The whole session lives and dies in memory; an
/// abandoned session is simply dropped.
pub struct PracticeSession {
    scheduler: AdaptiveScheduler,
    current: Option<QuestionId>,
    clock: Clock,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl PracticeSession {
    /// Creates a session and puts the first question on screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `total_questions` is zero.
    pub fn new(total_questions: usize) -> Result<Self, SessionError> {
        Self::from_scheduler(AdaptiveScheduler::new(total_questions))
    }

    /// Creates a session with a fixed seed so the question order and repeat
    /// draws are deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `total_questions` is zero.
    pub fn with_seed(total_questions: usize, seed: u64) -> Result<Self, SessionError> {
        Self::from_scheduler(AdaptiveScheduler::with_seed(total_questions, seed))
    }

    fn from_scheduler(mut scheduler: AdaptiveScheduler) -> Result<Self, SessionError> {
        if scheduler.total_questions() == 0 {
            return Err(SessionError::Empty);
        }

        let clock = Clock::default();
        let started_at = clock.now();
        let current = scheduler.next_question(None);
        Ok(Self {
            scheduler,
            current,
            clock,
            started_at,
            completed_at: None,
        })
    }

    /// Replace the scheduler settings. Call before the first answer.
    #[must_use]
    pub fn with_settings(mut self, settings: SchedulerSettings) -> Self {
        self.scheduler = self.scheduler.with_settings(settings);
        self
    }

    /// Override the clock (usually for deterministic testing); re-stamps the
    /// session start. Call before the first answer.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self.started_at = clock.now();
        self
    }

    // Accessors
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.scheduler.total_questions()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// The question on screen, `None` once the session is complete.
    #[must_use]
    pub fn current_question(&self) -> Option<QuestionId> {
        self.current
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.scheduler.is_complete()
    }

    /// Read-only per-question records, indexed by question id.
    #[must_use]
    pub fn performance(&self) -> &[QuestionPerformance] {
        self.scheduler.performance()
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.scheduler.stats()
    }

    /// Records the grade for the question on screen and advances to the
    /// next one, avoiding an immediate repeat of what was just answered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the session is already finished.
    pub fn answer_current(&mut self, outcome: AnswerOutcome) -> Result<SessionAnswer, SessionError> {
        let Some(question) = self.current else {
            return Err(SessionError::Completed);
        };

        self.scheduler.record_answer(question, outcome)?;
        self.current = self.scheduler.next_question(Some(question));
        if self.current.is_none() && self.completed_at.is_none() {
            self.completed_at = Some(self.clock.now());
        }

        Ok(SessionAnswer {
            question,
            outcome,
            next: self.current,
            is_complete: self.current.is_none(),
        })
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let records = self.scheduler.performance();
        SessionProgress {
            total_questions: records.len(),
            attempted: records.iter().filter(|p| p.attempts() > 0).count(),
            outstanding: records.iter().filter(|p| p.is_outstanding()).count(),
            submissions: self.scheduler.submission_count(),
            is_complete: self.scheduler.is_complete(),
        }
    }

    /// Builds the results view for the host's summary screen.
    #[must_use]
    pub fn report(&self) -> SessionReport {
        SessionReport::from_performance(
            self.scheduler.performance(),
            self.started_at,
            self.completed_at,
        )
    }
}

impl fmt::Debug for PracticeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticeSession")
            .field("total_questions", &self.scheduler.total_questions())
            .field("current", &self.current)
            .field("submissions", &self.scheduler.submission_count())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
