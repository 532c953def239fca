//! End-to-end session flows driven through the public services API, with
//! seeded schedulers so every run is reproducible.

use quiz_core::model::{AnswerOutcome, QuestionId};
use quiz_core::scheduler::{RepeatPolicy, SchedulerSettings};
use quiz_core::time::fixed_now;
use services::{Clock, PracticeSession, SessionError};

/// Drives a session to completion, grading each presented question with
/// `grade`, and returns the full presentation sequence. Checks the counter
/// invariant after every submission and bails out if the session refuses to
/// finish.
fn drive(
    session: &mut PracticeSession,
    mut grade: impl FnMut(QuestionId, u32) -> AnswerOutcome,
) -> Vec<QuestionId> {
    let mut shown = Vec::new();
    while let Some(question) = session.current_question() {
        assert!(
            shown.len() < 500,
            "session did not complete within 500 submissions"
        );
        shown.push(question);

        let incorrect_so_far = session.performance()[question.value()].incorrect_count();
        session.answer_current(grade(question, incorrect_so_far)).unwrap();

        let stats = session.stats();
        assert_eq!(
            stats.total_attempts(),
            stats.total_correct() + stats.total_incorrect()
        );
    }
    shown
}

fn min_gap_per_question(shown: &[QuestionId]) -> usize {
    let mut last: Vec<Option<usize>> = vec![None; 64];
    let mut min_gap = usize::MAX;
    for (tick, id) in shown.iter().enumerate() {
        if let Some(prev) = last[id.value()] {
            min_gap = min_gap.min(tick - prev);
        }
        last[id.value()] = Some(tick);
    }
    min_gap
}

#[test]
fn perfect_session_asks_each_question_once() {
    let mut session = PracticeSession::with_seed(5, 77)
        .unwrap()
        .with_clock(Clock::fixed(fixed_now()));

    let shown = drive(&mut session, |_, _| AnswerOutcome::Correct);

    assert_eq!(shown.len(), 5);
    let mut ids: Vec<usize> = shown.iter().map(QuestionId::value).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);

    assert!(session.is_complete());
    assert_eq!(session.completed_at(), Some(fixed_now()));
    let report = session.report();
    assert!(report.missed.is_empty());
    assert_eq!(report.score_percent, 100.0);
}

#[test]
fn missed_questions_come_back_and_spacing_holds() {
    let mut session = PracticeSession::with_seed(6, 101).unwrap();

    // Miss questions 1 and 4 on their first attempt.
    let shown = drive(&mut session, |id, incorrect_so_far| {
        if (id.value() == 1 || id.value() == 4) && incorrect_so_far == 0 {
            AnswerOutcome::Incorrect
        } else {
            AnswerOutcome::Correct
        }
    });

    assert!(session.is_complete());
    assert!(min_gap_per_question(&shown) >= 2);

    for missed in [1, 4] {
        let perf = &session.performance()[missed];
        assert!(perf.ever_missed());
        assert_eq!(perf.incorrect_count(), 1);
        assert_eq!(perf.pending_repeats(), 0);
        // miss + recovery + a quota of one or two repeats
        assert!((3..=4).contains(&perf.attempts()));
    }

    let report = session.report();
    assert_eq!(report.missed.len(), 2);
    assert_eq!(report.stats.total_incorrect(), 2);
}

#[test]
fn same_seed_replays_the_same_session() {
    let run = |seed: u64| {
        let mut session = PracticeSession::with_seed(7, seed).unwrap();
        drive(&mut session, |id, incorrect_so_far| {
            if id.value() % 3 == 0 && incorrect_so_far == 0 {
                AnswerOutcome::Incorrect
            } else {
                AnswerOutcome::Correct
            }
        })
    };

    assert_eq!(run(5), run(5));

    let mut orders = std::collections::HashSet::new();
    for seed in 0..12 {
        orders.insert(run(seed));
    }
    assert!(orders.len() > 1, "seeds should vary the presentation order");
}

#[test]
fn fixed_two_policy_demands_two_repeats_after_any_miss() {
    let settings = SchedulerSettings::new(RepeatPolicy::FixedTwo, 2, 4).unwrap();
    let mut session = PracticeSession::with_seed(4, 19)
        .unwrap()
        .with_settings(settings);

    drive(&mut session, |id, incorrect_so_far| {
        if id.value() == 2 && incorrect_so_far == 0 {
            AnswerOutcome::Incorrect
        } else {
            AnswerOutcome::Correct
        }
    });

    let perf = &session.performance()[2];
    assert_eq!(perf.attempts(), 4);
    assert_eq!(perf.correct_count(), 3);
    assert_eq!(perf.incorrect_count(), 1);
}

#[test]
fn progress_moves_monotonically_to_completion() {
    let mut session = PracticeSession::with_seed(4, 33).unwrap();

    let mut last_attempted = 0;
    let mut last_submissions = 0;
    while let Some(question) = session.current_question() {
        let outcome = if question.value() == 0
            && session.performance()[0].incorrect_count() == 0
        {
            AnswerOutcome::Incorrect
        } else {
            AnswerOutcome::Correct
        };
        session.answer_current(outcome).unwrap();

        let progress = session.progress();
        assert!(progress.attempted >= last_attempted);
        assert!(progress.submissions > last_submissions);
        assert!(progress.attempted <= progress.total_questions);
        last_attempted = progress.attempted;
        last_submissions = progress.submissions;
    }

    let progress = session.progress();
    assert!(progress.is_complete);
    assert_eq!(progress.attempted, 4);
    assert_eq!(progress.outstanding, 0);
}

#[test]
fn finished_session_rejects_further_answers() {
    let mut session = PracticeSession::with_seed(2, 8).unwrap();
    drive(&mut session, |_, _| AnswerOutcome::Correct);

    let err = session.answer_current(AnswerOutcome::Correct).unwrap_err();
    assert!(matches!(err, SessionError::Completed));
}
