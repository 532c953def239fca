use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::model::{AnswerOutcome, QuestionId, QuestionPerformance, SessionStats};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchedulerError {
    #[error("unknown question id {0} (session has no such question)")]
    UnknownQuestion(QuestionId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("cool-down must be at least 1 submission")]
    InvalidCooldown,

    #[error("recency window must be greater than the cool-down")]
    InvalidRecencyWindow,

    #[error("repeat quota bounds must satisfy 1 <= min <= max")]
    InvalidRepeatBounds,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// How many extra correct answers a question owes after recovering from a
/// miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatPolicy {
    /// Draw the quota uniformly from `min..=max` at the moment of recovery.
    Randomized { min: u32, max: u32 },
    /// Always require exactly two post-recovery correct answers. This is the
    /// stricter mastery rule kept as an explicit alternative; it is never
    /// blended with the randomized policy.
    FixedTwo,
}

/// Tuning knobs for the adaptive scheduler.
///
/// Controls the repeat quota policy and the spacing constraints measured in
/// submissions (the scheduler's logical clock).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    repeat_policy: RepeatPolicy,
    cooldown: u64,
    recency_window: u64,
}

impl SchedulerSettings {
    /// Creates custom scheduler settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the cool-down is zero, the recency window does not
    /// exceed the cool-down, or a randomized quota has invalid bounds.
    pub fn new(
        repeat_policy: RepeatPolicy,
        cooldown: u64,
        recency_window: u64,
    ) -> Result<Self, SettingsError> {
        if cooldown == 0 {
            return Err(SettingsError::InvalidCooldown);
        }
        if recency_window <= cooldown {
            return Err(SettingsError::InvalidRecencyWindow);
        }
        if let RepeatPolicy::Randomized { min, max } = repeat_policy {
            if min == 0 || min > max {
                return Err(SettingsError::InvalidRepeatBounds);
            }
        }

        Ok(Self {
            repeat_policy,
            cooldown,
            recency_window,
        })
    }

    // Accessors
    #[must_use]
    pub fn repeat_policy(&self) -> RepeatPolicy {
        self.repeat_policy
    }

    /// Minimum submissions between two presentations of the same question.
    #[must_use]
    pub fn cooldown(&self) -> u64 {
        self.cooldown
    }

    /// During the first pass, only questions shown within this many
    /// submissions are eligible for a repeat, so misses resurface quickly
    /// instead of being deferred to the end of the pass.
    #[must_use]
    pub fn recency_window(&self) -> u64 {
        self.recency_window
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            repeat_policy: RepeatPolicy::Randomized { min: 1, max: 2 },
            cooldown: 2,
            recency_window: 4,
        }
    }
}

//
// ─── SCHEDULER ─────────────────────────────────────────────────────────────────
//

/// Adaptive question scheduler for one practice session.
///
/// Owns the per-question answer history, serves brand-new questions in a
/// randomized order, brings missed questions back under spacing constraints,
/// and reports when the session is done. Purely reactive: no I/O, no clocks
/// beyond the submission counter, no background work. The host must
/// serialize calls on one instance.
///
/// The random source is owned and seedable so tests can pin the shuffle and
/// the repeat-quota draws.
///
/// # Examples
///
/// ```
/// # use quiz_core::model::AnswerOutcome;
/// # use quiz_core::scheduler::AdaptiveScheduler;
/// let mut scheduler = AdaptiveScheduler::with_seed(3, 7);
/// let mut shown = None;
/// while let Some(question) = scheduler.next_question(shown) {
///     scheduler.record_answer(question, AnswerOutcome::Correct).unwrap();
///     shown = Some(question);
/// }
/// assert!(scheduler.is_complete());
/// ```
pub struct AdaptiveScheduler {
    settings: SchedulerSettings,
    performance: Vec<QuestionPerformance>,
    initial_order: Vec<QuestionId>,
    first_pass_index: usize,
    submission_count: u64,
    rotation_index: u64,
    rng: StdRng,
}

impl AdaptiveScheduler {
    /// Creates a scheduler for `total_questions` questions with an
    /// entropy-seeded random source.
    ///
    /// `total_questions == 0` is accepted and yields an immediately-complete
    /// session.
    #[must_use]
    pub fn new(total_questions: usize) -> Self {
        Self::build(total_questions, StdRng::from_rng(&mut rand::rng()))
    }

    /// Creates a scheduler with a fixed seed, making the initial ordering and
    /// every repeat-quota draw deterministic.
    #[must_use]
    pub fn with_seed(total_questions: usize, seed: u64) -> Self {
        Self::build(total_questions, StdRng::seed_from_u64(seed))
    }

    /// Replace the default settings. Call before the first answer is
    /// recorded; the initial ordering is unaffected.
    #[must_use]
    pub fn with_settings(mut self, settings: SchedulerSettings) -> Self {
        self.settings = settings;
        self
    }

    fn build(total_questions: usize, mut rng: StdRng) -> Self {
        let performance: Vec<QuestionPerformance> = (0..total_questions)
            .map(|id| QuestionPerformance::new(QuestionId::new(id)))
            .collect();

        let mut initial_order: Vec<QuestionId> =
            (0..total_questions).map(QuestionId::new).collect();
        initial_order.as_mut_slice().shuffle(&mut rng);

        Self {
            settings: SchedulerSettings::default(),
            performance,
            initial_order,
            first_pass_index: 0,
            submission_count: 0,
            rotation_index: 0,
            rng,
        }
    }

    // Accessors
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.performance.len()
    }

    #[must_use]
    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Total answers recorded so far; the scheduler's logical clock.
    #[must_use]
    pub fn submission_count(&self) -> u64 {
        self.submission_count
    }

    /// Read-only view of every per-question record, indexed by question id.
    /// Clone a record (or the slice) for an owned snapshot.
    #[must_use]
    pub fn performance(&self) -> &[QuestionPerformance] {
        &self.performance
    }

    #[must_use]
    pub fn performance_for(&self, id: QuestionId) -> Option<&QuestionPerformance> {
        self.performance.get(id.value())
    }

    /// Aggregate totals over all questions.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats::from_performance(&self.performance)
    }

    /// True once every question has been attempted and none still needs work.
    ///
    /// A never-missed question is done after one correct attempt; an
    /// ever-missed question is done once it has recovered and its scheduled
    /// repeats are consumed, each repeat itself answered correctly.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.performance
            .iter()
            .all(|perf| perf.attempts() > 0 && !perf.is_outstanding())
    }

    /// Records the outcome of one answer submission.
    ///
    /// Advances the submission counter, updates the question's counters, and
    /// manages the repeat quota: a correct answer directly following a miss
    /// (with no repeats pending) arms the quota from the repeat policy; any
    /// other correct answer consumes one pending repeat.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::UnknownQuestion` if `id` is outside this
    /// session's question list.
    pub fn record_answer(
        &mut self,
        id: QuestionId,
        outcome: AnswerOutcome,
    ) -> Result<(), SchedulerError> {
        if id.value() >= self.performance.len() {
            return Err(SchedulerError::UnknownQuestion(id));
        }

        self.submission_count += 1;

        let recovering = {
            let perf = &self.performance[id.value()];
            perf.last_result() == Some(AnswerOutcome::Incorrect) && perf.pending_repeats() == 0
        };
        let quota = if outcome.is_correct() && recovering {
            Some(self.draw_repeat_quota())
        } else {
            None
        };

        let perf = &mut self.performance[id.value()];
        perf.record_outcome(outcome);
        if outcome.is_correct() {
            match quota {
                Some(quota) => perf.schedule_repeats(quota),
                None => perf.consume_repeat(),
            }
        }

        Ok(())
    }

    /// Decides the next question to present, or `None` when the session is
    /// complete.
    ///
    /// `exclude` is the question currently on screen (typically the one just
    /// answered); it is avoided whenever another choice exists. While
    /// unattempted questions remain, recently-missed questions are woven back
    /// in between brand-new ones; afterwards, outstanding questions are
    /// served by priority with a round-robin over ties. Spacing is enforced
    /// via the cool-down; when the only outstanding question is still cooling
    /// down, the longest-idle question is served as a spacing filler.
    pub fn next_question(&mut self, exclude: Option<QuestionId>) -> Option<QuestionId> {
        if self.is_complete() {
            return None;
        }

        let first_pass = self.performance.iter().any(|perf| perf.attempts() == 0);
        let chosen = if first_pass {
            self.pick_first_pass(exclude)
        } else {
            self.pick_review(exclude)
        }?;

        self.performance[chosen.value()].mark_shown(self.submission_count);
        Some(chosen)
    }

    fn draw_repeat_quota(&mut self) -> u32 {
        match self.settings.repeat_policy() {
            RepeatPolicy::Randomized { min, max } => self.rng.random_range(min..=max),
            RepeatPolicy::FixedTwo => 2,
        }
    }

    /// Submissions since the question was last shown. A never-shown question
    /// counts as one more than the whole session, mirroring the "never" case
    /// of the spacing rules.
    fn idle_submissions(&self, perf: &QuestionPerformance) -> u64 {
        match perf.last_shown_at() {
            Some(at) => self.submission_count - at,
            None => self.submission_count + 1,
        }
    }

    /// Attempted questions that still need work and may be shown again now.
    /// Sorted worst-first: most misses, then largest pending quota, then
    /// longest idle.
    fn repeat_candidates(&self, exclude: Option<QuestionId>, first_pass: bool) -> Vec<QuestionId> {
        let mut candidates: Vec<QuestionId> = self
            .performance
            .iter()
            .filter(|&perf| {
                if Some(perf.id()) == exclude || perf.attempts() == 0 {
                    return false;
                }
                let idle = self.idle_submissions(perf);
                if idle < self.settings.cooldown() {
                    return false;
                }
                if first_pass && idle >= self.settings.recency_window() {
                    return false;
                }
                perf.is_outstanding()
            })
            .map(QuestionPerformance::id)
            .collect();

        candidates.sort_by(|a, b| {
            let pa = &self.performance[a.value()];
            let pb = &self.performance[b.value()];
            pb.incorrect_count()
                .cmp(&pa.incorrect_count())
                .then(pb.pending_repeats().cmp(&pa.pending_repeats()))
                .then(self.idle_submissions(pb).cmp(&self.idle_submissions(pa)))
        });
        candidates
    }

    fn pick_first_pass(&mut self, exclude: Option<QuestionId>) -> Option<QuestionId> {
        let candidates = self.repeat_candidates(exclude, true);
        if let Some(&head) = candidates.first() {
            return Some(head);
        }

        // Serve the next brand-new question in the shuffled order. The
        // cursor only ever moves forward.
        if let Some(pos) = self.scan_unattempted(self.first_pass_index, exclude) {
            self.first_pass_index = pos + 1;
            return Some(self.initial_order[pos]);
        }
        if let Some(pos) = self.scan_unattempted(0, exclude) {
            return Some(self.initial_order[pos]);
        }
        // Only the excluded question is left unattempted; exclusion is
        // best-effort, liveness wins.
        self.scan_unattempted(0, None)
            .map(|pos| self.initial_order[pos])
    }

    fn scan_unattempted(&self, start: usize, exclude: Option<QuestionId>) -> Option<usize> {
        self.initial_order
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, id)| {
                Some(**id) != exclude && self.performance[id.value()].attempts() == 0
            })
            .map(|(pos, _)| pos)
    }

    fn pick_review(&mut self, exclude: Option<QuestionId>) -> Option<QuestionId> {
        let candidates = self.repeat_candidates(exclude, false);
        if candidates.is_empty() {
            // End-game: the remaining outstanding question is still cooling
            // down. Serve the longest-idle question so spacing holds for
            // everyone while the cool-down runs out.
            return self.pick_spacing_filler(exclude);
        }

        // Round-robin across the top priority tier so tied questions share
        // the repeat slots fairly.
        let top_incorrect = self.performance[candidates[0].value()].incorrect_count();
        let group: Vec<QuestionId> = candidates
            .iter()
            .take_while(|id| self.performance[id.value()].incorrect_count() == top_incorrect)
            .copied()
            .collect();

        let index = usize::try_from(self.rotation_index % group.len() as u64)
            .unwrap_or(0);
        self.rotation_index += 1;
        Some(group[index])
    }

    fn pick_spacing_filler(&self, exclude: Option<QuestionId>) -> Option<QuestionId> {
        let mut best: Option<QuestionId> = None;
        let mut best_idle = 0_u64;
        for perf in &self.performance {
            if Some(perf.id()) == exclude {
                continue;
            }
            let idle = self.idle_submissions(perf);
            if best.is_none() || idle > best_idle {
                best = Some(perf.id());
                best_idle = idle;
            }
        }
        // A single-question session cannot honor the cool-down at all; the
        // excluded question is all there is.
        best.or(exclude)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
