//! Pure helpers over a session's step sequence.
//!
//! None of these perform I/O; all timestamps and ids come from the
//! [`SessionContext`].

use chrono::{DateTime, Utc};

use super::clock::SessionContext;
use super::model::{LearningDetails, Session, SessionMode, SessionStep, StepType};

/// Build a fresh session for today with no steps.
pub fn create_session(
    ctx: &SessionContext<'_>,
    mode: SessionMode,
    learning: Option<LearningDetails>,
) -> Session {
    Session {
        id: ctx.next_id(),
        date: ctx.today(),
        start: ctx.now(),
        end: None,
        mode,
        steps: Vec::new(),
        is_completed: false,
        total_work_time: 0,
        learning: match mode {
            SessionMode::Learning => Some(learning.unwrap_or_default()),
            SessionMode::Work => None,
        },
    }
}

/// `steps` plus one new open step. Does not close the current tail.
pub fn append_step(
    ctx: &SessionContext<'_>,
    steps: &[SessionStep],
    step_type: StepType,
    note: Option<String>,
) -> Vec<SessionStep> {
    let mut next = steps.to_vec();
    next.push(SessionStep {
        id: ctx.next_id(),
        step_type,
        start: ctx.now(),
        end: None,
        note,
        pending_end: None,
    });
    next
}

/// Close the tail step at `now` if it is still open.
pub fn close_last_step(steps: &[SessionStep], now: DateTime<Utc>) -> Vec<SessionStep> {
    let mut next = steps.to_vec();
    if let Some(last) = next.last_mut() {
        if last.end.is_none() {
            // A clock that stepped backwards must not produce end < start.
            last.end = Some(now.max(last.start));
        }
    }
    next
}

/// Milliseconds spent in work steps, counting an open step up to `now`.
pub fn work_time_ms(steps: &[SessionStep], now: DateTime<Utc>) -> u64 {
    steps
        .iter()
        .filter(|s| s.step_type == StepType::Work)
        .map(|s| s.duration_ms(now))
        .sum()
}

/// Milliseconds spent in pause steps, counting an open step up to `now`.
pub fn pause_time_ms(steps: &[SessionStep], now: DateTime<Utc>) -> u64 {
    steps
        .iter()
        .filter(|s| s.step_type == StepType::Pause && !s.is_pending_end())
        .map(|s| s.duration_ms(now))
        .sum()
}

/// Remove a closed step. Pauses left adjacent by the removal are merged
/// into one spanning both.
///
/// Returns `None` when the id is unknown or names the open tail step.
pub fn delete_step(steps: &[SessionStep], step_id: &str) -> Option<Vec<SessionStep>> {
    let index = steps.iter().position(|s| s.id == step_id)?;
    if steps[index].is_open() {
        return None;
    }

    let mut next = steps.to_vec();
    next.remove(index);

    if index > 0 && index < next.len() {
        let (before, after) = (&next[index - 1], &next[index]);
        if before.step_type == StepType::Pause
            && after.step_type == StepType::Pause
            && !after.is_pending_end()
        {
            let after = next.remove(index);
            let merged = &mut next[index - 1];
            merged.end = after.end;
            merged.note = match (merged.note.take(), after.note) {
                (Some(a), Some(b)) => Some(format!("{a}\n{b}")),
                (a, b) => a.or(b),
            };
        }
    }

    Some(next)
}

/// Replace the session with the same id, or append it.
pub fn upsert_session(sessions: &[Session], session: &Session) -> Vec<Session> {
    let mut next = sessions.to_vec();
    match next.iter_mut().find(|s| s.id == session.id) {
        Some(existing) => *existing = session.clone(),
        None => next.push(session.clone()),
    }
    next
}
