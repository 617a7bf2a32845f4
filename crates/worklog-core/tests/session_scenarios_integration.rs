//! Integration tests for full work-day and learning-session lifecycles.
//!
//! Drives the timer manager with a manual clock and persists each
//! snapshot through a store, the way the CLI does.

use chrono::{DateTime, Duration, Utc};
use worklog_core::{
    day_key, Database, Event, LearningObjective, ManualClock, MemoryStore, SequentialIds,
    SessionMode, SessionStore, Snapshot, StepType, TimerManager,
};

const MINUTE_MS: u64 = 60 * 1000;

fn t0() -> DateTime<Utc> {
    "2026-03-02T08:00:00Z".parse().unwrap()
}

fn manager(mode: SessionMode) -> (TimerManager, ManualClock) {
    let clock = ManualClock::new(t0());
    let manager = TimerManager::with_sources(mode, clock.clone(), SequentialIds::new("it"));
    (manager, clock)
}

#[test]
fn test_full_work_day() {
    let (manager, clock) = manager(SessionMode::Work);

    let started = manager.start(&Snapshot::default()).snapshot;
    clock.set(t0() + Duration::hours(1));
    let paused = manager.pause(&started, None).snapshot;
    clock.set(t0() + Duration::minutes(75));
    let resumed = manager.start(&paused).snapshot;
    clock.set(t0() + Duration::hours(9));
    let ended = manager.end(&resumed);

    let session = ended.snapshot.current.clone().unwrap();
    let spans: Vec<_> = session
        .steps
        .iter()
        .map(|s| (s.step_type, s.start, s.end))
        .collect();
    assert_eq!(
        spans,
        vec![
            (StepType::Work, t0(), Some(t0() + Duration::hours(1))),
            (
                StepType::Pause,
                t0() + Duration::hours(1),
                Some(t0() + Duration::minutes(75))
            ),
            (
                StepType::Work,
                t0() + Duration::minutes(75),
                Some(t0() + Duration::hours(9))
            ),
        ]
    );
    assert_eq!(session.total_work_time, (8 * 60 + 45) * MINUTE_MS);
    assert!(session.is_completed);
    assert_eq!(session.end, Some(t0() + Duration::hours(9)));
    assert!(matches!(
        ended.event,
        Some(Event::SessionEnded { total_work_ms, .. }) if total_work_ms == (8 * 60 + 45) * MINUTE_MS
    ));
}

#[test]
fn test_work_total_excludes_pauses() {
    let (manager, clock) = manager(SessionMode::Work);
    let s = manager.start(&Snapshot::default()).snapshot;
    clock.advance(Duration::minutes(10));
    let s = manager.pause(&s, None).snapshot;
    clock.advance(Duration::minutes(5));
    let s = manager.start(&s).snapshot;
    clock.advance(Duration::minutes(10));
    let s = manager.end(&s).snapshot;

    assert_eq!(s.current.unwrap().total_work_time, 20 * MINUTE_MS);
}

#[test]
fn test_ending_while_paused_counts_only_work() {
    let (manager, clock) = manager(SessionMode::Work);
    let s = manager.start(&Snapshot::default()).snapshot;
    clock.advance(Duration::minutes(40));
    let s = manager.pause(&s, None).snapshot;
    clock.advance(Duration::minutes(30));
    let s = manager.end(&s).snapshot;

    let session = s.current.unwrap();
    assert_eq!(session.total_work_time, 40 * MINUTE_MS);
    assert!(session.steps.iter().all(|step| step.end.is_some()));
}

#[test]
fn test_single_work_session_per_day() {
    let (manager, clock) = manager(SessionMode::Work);
    let s = manager.start(&Snapshot::default()).snapshot;
    clock.advance(Duration::minutes(1));
    let again = manager.start(&s);
    assert!(again.is_noop());

    // Even when the caller lost its current pointer.
    let lost = Snapshot::new(s.sessions.clone(), None);
    let s = manager.start(&manager.pause(&s, None).snapshot).snapshot;
    let from_lost = manager.start(&lost).snapshot;

    for snapshot in [s, from_lost] {
        let today = manager.today();
        let work_today = snapshot
            .sessions
            .iter()
            .filter(|x| x.mode == SessionMode::Work && x.date == today)
            .count();
        assert_eq!(work_today, 1);
    }
}

#[test]
fn test_continue_after_end() {
    let (manager, clock) = manager(SessionMode::Work);
    let s = manager.start(&Snapshot::default()).snapshot;
    clock.advance(Duration::hours(8));
    let ended = manager.end(&s).snapshot;
    let before = ended.current.clone().unwrap();

    clock.advance(Duration::hours(1));
    let continued = manager.continue_day(&ended);
    let after = continued.snapshot.current.unwrap();

    assert!(!after.is_completed);
    assert_eq!(after.end, None);
    assert_eq!(after.steps.len(), before.steps.len() + 1);
    assert_eq!(after.steps.last().unwrap().step_type, StepType::Work);
    assert!(after.is_running());

    // Continuing an open day does nothing.
    assert!(manager.continue_day(&Snapshot::new(vec![after.clone()], Some(after))).is_noop());
}

#[test]
fn test_learning_completion_averaging() {
    let (manager, clock) = manager(SessionMode::Learning);
    let goal_needed = manager.start(&Snapshot::default());
    assert!(matches!(goal_needed.event, Some(Event::GoalRequired { .. })));

    let objectives = vec!["ownership".to_string(), "traits".to_string(), "macros".to_string()];
    let s = manager
        .start_learning(&goal_needed.snapshot, "Rust basics", &objectives, &[])
        .snapshot;
    clock.advance(Duration::minutes(50));
    let ending = manager.end(&s);
    let Some(Event::CompletionRequested { session_id, .. }) = ending.event else {
        panic!("expected CompletionRequested");
    };

    let updated = vec![
        LearningObjective { text: "ownership".into(), completed: 100 },
        LearningObjective { text: "traits".into(), completed: 50 },
        LearningObjective { text: "macros".into(), completed: 0 },
    ];
    let done = manager.finalize_learning(&ending.snapshot, &session_id, updated.clone(), 0);

    assert!(done.snapshot.current.is_none());
    let session = &done.snapshot.sessions[0];
    let details = session.learning.as_ref().unwrap();
    assert_eq!(details.completion_percentage, 50);
    assert_eq!(details.learning_objectives, updated);
    assert_eq!(session.total_work_time, 50 * MINUTE_MS);
    assert!(session.steps.iter().all(|step| step.pending_end.is_none()));
}

#[test]
fn test_cancel_end_restores_steps() {
    let (manager, clock) = manager(SessionMode::Learning);
    let s = manager
        .start_learning(&Snapshot::default(), "SQL joins", &[], &["sql".to_string()])
        .snapshot;
    clock.advance(Duration::minutes(15));
    let s = manager.pause(&s, Some("break".into())).snapshot;
    clock.advance(Duration::minutes(5));
    let s = manager.start(&s).snapshot;
    clock.advance(Duration::minutes(20));

    let before = s.current.clone().unwrap();
    let ending = manager.end(&s).snapshot;
    clock.advance(Duration::minutes(3));
    let reverted = manager.cancel_end(&ending).snapshot;

    let current = reverted.current.clone().unwrap();
    assert_eq!(current.steps, before.steps);
    assert!(current.is_running());
    assert_eq!(reverted.sessions, vec![current]);
}

#[test]
fn test_learning_resume_after_restart() {
    let (manager, clock) = manager(SessionMode::Learning);
    let store = MemoryStore::new();
    let key = day_key(manager.today());

    let s = manager
        .start_learning(&Snapshot::default(), "graph algorithms", &[], &[])
        .snapshot;
    clock.advance(Duration::minutes(30));
    let s = manager.pause(&s, None).snapshot;
    store.save(&key, &s.sessions).unwrap();

    // New process: rebuild from storage.
    clock.advance(Duration::minutes(10));
    let restored = manager.restore(store.load(&key).unwrap().unwrap());
    let t = manager.start(&restored);
    assert!(matches!(t.event, Some(Event::SessionResumed { .. })));
    assert_eq!(t.snapshot.current.unwrap().steps.len(), 3);
}

#[test]
fn test_two_phase_end_survives_database_roundtrip() {
    let (manager, clock) = manager(SessionMode::Learning);
    let db = Database::open_memory().unwrap();
    let key = day_key(manager.today());

    let s = manager
        .start_learning(&Snapshot::default(), "lifetimes", &["elision".to_string()], &[])
        .snapshot;
    clock.advance(Duration::minutes(45));
    let ending = manager.end(&s).snapshot;
    db.save(&key, &ending.sessions).unwrap();

    let restored = manager.restore(db.load(&key).unwrap().unwrap());
    let current = restored.current.clone().unwrap();
    assert!(current.is_ending());

    let objectives = vec![LearningObjective { text: "elision".into(), completed: 90 }];
    let done = manager.finalize_learning(&restored, &current.id, objectives, 0);
    db.save(&key, &done.snapshot.sessions).unwrap();

    let stored = db.load(&key).unwrap().unwrap();
    assert!(stored[0].is_completed);
    assert_eq!(stored[0].learning.as_ref().unwrap().completion_percentage, 90);
    assert_eq!(stored[0].total_work_time, 45 * MINUTE_MS);
}
