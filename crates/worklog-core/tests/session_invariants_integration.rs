//! Property tests: arbitrary operation sequences keep every session
//! well-formed.

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use worklog_core::{
    LearningObjective, ManualClock, SequentialIds, Session, SessionMode, Snapshot, TimerManager,
};

#[derive(Debug, Clone)]
enum Op {
    Start,
    StartLearning,
    Pause,
    End,
    Finalize(u8),
    CancelEnd,
    Continue,
    Reset,
    Note,
    DeleteFirstStep,
    SwitchMode,
    Wait(i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Start),
        2 => Just(Op::StartLearning),
        4 => Just(Op::Pause),
        2 => Just(Op::End),
        1 => (0u8..=100).prop_map(Op::Finalize),
        1 => Just(Op::CancelEnd),
        1 => Just(Op::Continue),
        1 => Just(Op::Reset),
        1 => Just(Op::Note),
        1 => Just(Op::DeleteFirstStep),
        1 => Just(Op::SwitchMode),
        6 => (1i64..120).prop_map(Op::Wait),
    ]
}

fn assert_well_formed(session: &Session) {
    let open: Vec<usize> = session
        .steps
        .iter()
        .enumerate()
        .filter(|(_, s)| s.end.is_none())
        .map(|(i, _)| i)
        .collect();
    assert!(open.len() <= 1, "more than one open step: {session:?}");
    if let Some(&i) = open.first() {
        assert_eq!(i, session.steps.len() - 1, "open step is not last: {session:?}");
        assert!(!session.is_completed, "completed session has an open step");
    }
    for step in &session.steps {
        if let Some(end) = step.end {
            assert!(step.start <= end, "step ends before it starts: {step:?}");
        }
    }
    for pair in session.steps.windows(2) {
        assert!(pair[0].start <= pair[1].start, "steps out of order");
    }
    if let Some(end) = session.end {
        assert!(session.start <= end);
    }
    if session.is_completed {
        assert!(session.steps.iter().all(|s| s.pending_end.is_none()));
    }
}

proptest! {
    #[test]
    fn operations_preserve_step_invariants(ops in prop::collection::vec(op(), 1..60)) {
        let start: DateTime<Utc> = "2026-03-02T06:00:00Z".parse().unwrap();
        let clock = ManualClock::new(start);
        let mut manager =
            TimerManager::with_sources(SessionMode::Work, clock.clone(), SequentialIds::new("p"));
        let mut snapshot = Snapshot::default();

        for op in ops {
            let t = match op {
                Op::Start => manager.start(&snapshot),
                Op::StartLearning => manager.start_learning(
                    &snapshot,
                    "goal",
                    &["a".to_string(), "b".to_string()],
                    &[],
                ),
                Op::Pause => manager.pause(&snapshot, None),
                Op::End => manager.end(&snapshot),
                Op::Finalize(progress) => match snapshot.current.clone() {
                    Some(current) => {
                        let objectives = vec![
                            LearningObjective { text: "a".into(), completed: progress },
                            LearningObjective { text: "b".into(), completed: 100 - progress },
                        ];
                        manager.finalize_learning(&snapshot, &current.id, objectives, progress)
                    }
                    None => continue,
                },
                Op::CancelEnd => manager.cancel_end(&snapshot),
                Op::Continue => manager.continue_day(&snapshot),
                Op::Reset => manager.reset(&snapshot),
                Op::Note => manager.save_note(&snapshot, "note"),
                Op::DeleteFirstStep => match snapshot
                    .current
                    .as_ref()
                    .and_then(|c| c.steps.first())
                    .map(|s| s.id.clone())
                {
                    Some(id) => manager.delete_step(&snapshot, &id),
                    None => continue,
                },
                Op::SwitchMode => {
                    let next = match manager.mode() {
                        SessionMode::Work => SessionMode::Learning,
                        SessionMode::Learning => SessionMode::Work,
                    };
                    manager.set_mode(next);
                    snapshot = manager.restore(snapshot.sessions.clone());
                    continue;
                }
                Op::Wait(minutes) => {
                    clock.advance(Duration::minutes(minutes));
                    continue;
                }
            };

            if t.is_noop() {
                prop_assert_eq!(&t.snapshot, &snapshot);
            }
            snapshot = t.snapshot;

            for session in &snapshot.sessions {
                assert_well_formed(session);
            }
            if let Some(current) = &snapshot.current {
                assert_well_formed(current);
            }
            let today = manager.today();
            let work_today = snapshot
                .sessions
                .iter()
                .filter(|s| s.mode == SessionMode::Work && s.date == today)
                .count();
            prop_assert!(work_today <= 1);

            for session in snapshot.sessions.iter().filter(|s| s.is_completed) {
                if let Some(details) = &session.learning {
                    prop_assert!(details.completion_percentage <= 100);
                }
            }
        }
    }
}
