//! Transitions for learning sessions.
//!
//! Several learning sessions may exist per day. Ending one is two-phase:
//! [`LearningHandler::request_end`] parks the session behind a marked pause
//! step while completion details are collected, then either
//! [`LearningHandler::finalize_end`] commits it or
//! [`LearningHandler::cancel_end`] restores the previous steps.
//!
//! ```text
//! absent -> start_new -> active <-> paused
//!                        active -> request_end -> ending -> finalize_end -> completed
//!                                                 ending -> cancel_end  -> active
//! ```

use crate::events::Event;
use crate::session::steps::{append_step, close_last_step, create_session, work_time_ms};
use crate::session::{
    completion_percentage, LearningDetails, LearningObjective, PendingEnd, Session,
    SessionContext, SessionMode, StepType,
};

use super::snapshot::{find_active_session, Snapshot, Transition};

pub struct LearningHandler<'a> {
    ctx: SessionContext<'a>,
}

impl<'a> LearningHandler<'a> {
    pub fn new(ctx: SessionContext<'a>) -> Self {
        Self { ctx }
    }

    fn active_session(&self, snapshot: &Snapshot) -> Option<Session> {
        snapshot
            .resolved_current()
            .filter(|s| s.mode == SessionMode::Learning && !s.is_completed)
            .or_else(|| {
                find_active_session(&snapshot.sessions, SessionMode::Learning, self.ctx.today())
                    .cloned()
            })
    }

    /// Resume the active learning session, or ask for a goal when there is
    /// none. The snapshot is unchanged in the latter case.
    pub fn start(&self, snapshot: &Snapshot) -> Transition {
        let now = self.ctx.now();
        let Some(mut session) = self.active_session(snapshot) else {
            log::debug!("no active learning session; goal required");
            return Transition::applied(snapshot.clone(), Event::GoalRequired { at: now });
        };

        if session.is_ending() {
            log::warn!("learning session {} is ending; finalize or cancel first", session.id);
            return Transition::unchanged(snapshot);
        }
        if session.is_running() {
            log::warn!("learning session {} is already running", session.id);
            return Transition::unchanged(snapshot);
        }

        session.steps = close_last_step(&session.steps, now);
        session.steps = append_step(&self.ctx, &session.steps, StepType::Work, None);

        log::debug!("resumed learning session {}", session.id);
        let event = Event::SessionResumed {
            session_id: session.id.clone(),
            at: now,
        };
        Transition::applied(snapshot.with_current(session), event)
    }

    /// Create a learning session for `goal` and start it immediately.
    ///
    /// An empty goal is a no-op. Another unfinished learning session is
    /// paused (its open step closed) but left unfinished.
    pub fn start_new(
        &self,
        snapshot: &Snapshot,
        goal: &str,
        objective_texts: &[String],
        topics: &[String],
    ) -> Transition {
        let goal = goal.trim();
        if goal.is_empty() {
            log::warn!("start_new called with an empty learning goal");
            return Transition::unchanged(snapshot);
        }

        let now = self.ctx.now();
        let mut sessions = snapshot.sessions.clone();
        for previous in sessions
            .iter_mut()
            .filter(|s| s.mode == SessionMode::Learning && !s.is_completed && s.open_step().is_some())
        {
            log::info!("pausing learning session {} for a new one", previous.id);
            previous.steps = close_last_step(&previous.steps, now);
        }

        let details = LearningDetails {
            learning_goal: goal.to_string(),
            learning_objectives: objective_texts
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(LearningObjective::new)
                .collect(),
            topics: normalize_topics(topics),
            completion_percentage: 0,
        };
        let mut session = create_session(&self.ctx, SessionMode::Learning, Some(details));
        session.steps = append_step(&self.ctx, &session.steps, StepType::Work, None);

        log::info!("started learning session {} ({goal})", session.id);
        let event = Event::SessionStarted {
            session_id: session.id.clone(),
            mode: SessionMode::Learning,
            at: now,
        };
        let snapshot = Snapshot::new(sessions, snapshot.current.clone());
        Transition::applied(snapshot.with_current(session), event)
    }

    /// Park the current session behind a marked pause step and ask for its
    /// completion details.
    pub fn request_end(&self, snapshot: &Snapshot) -> Transition {
        let Some(mut session) = snapshot.resolved_current() else {
            log::warn!("request_end called without a current learning session");
            return Transition::unchanged(snapshot);
        };
        if session.mode != SessionMode::Learning || session.is_completed || session.is_ending() {
            log::warn!("session {} is not an active learning session", session.id);
            return Transition::unchanged(snapshot);
        }

        let now = self.ctx.now();
        let reopens = session.open_step().map(|s| s.id.clone());
        session.steps = close_last_step(&session.steps, now);
        session.steps = append_step(&self.ctx, &session.steps, StepType::Pause, None);
        if let Some(marker) = session.steps.last_mut() {
            marker.pending_end = Some(PendingEnd { reopens });
        }

        log::debug!("learning session {} awaiting completion details", session.id);
        let event = Event::CompletionRequested {
            session_id: session.id.clone(),
            at: now,
        };
        Transition::applied(snapshot.with_current(session), event)
    }

    /// Commit the end of `session_id` with the collected completion details.
    ///
    /// `general_progress` is used as the completion percentage only when
    /// there are no objectives. If the finalized session was current,
    /// `current` becomes `None`.
    pub fn finalize_end(
        &self,
        snapshot: &Snapshot,
        session_id: &str,
        updated_objectives: Vec<LearningObjective>,
        general_progress: u8,
    ) -> Transition {
        let found = snapshot
            .sessions
            .iter()
            .find(|s| s.id == session_id)
            .or_else(|| snapshot.current.as_ref().filter(|s| s.id == session_id))
            .cloned();
        let Some(mut session) = found else {
            log::warn!("finalize_end called for unknown session {session_id}");
            return Transition::unchanged(snapshot);
        };
        if session.is_completed || session.mode != SessionMode::Learning {
            log::warn!("session {session_id} is not an unfinished learning session");
            return Transition::unchanged(snapshot);
        }

        let now = self.ctx.now();
        if session
            .steps
            .iter()
            .any(|s| s.is_open() && !s.is_pending_end())
        {
            log::warn!("learning session {session_id} had an open step at finalize; using now");
        }
        session.steps = close_last_step(&session.steps, now);
        session.steps.retain(|s| !s.is_pending_end());
        session.total_work_time = work_time_ms(&session.steps, now);
        session.end = Some(now.max(session.start));
        session.is_completed = true;

        let objectives: Vec<LearningObjective> = updated_objectives
            .into_iter()
            .map(|o| LearningObjective {
                completed: o.completed.min(100),
                ..o
            })
            .collect();
        let completion = completion_percentage(&objectives, general_progress);
        let details = session.learning.get_or_insert_with(LearningDetails::default);
        details.learning_objectives = objectives;
        details.completion_percentage = completion;

        log::info!(
            "finalized learning session {} at {}% with {} ms of work",
            session.id,
            completion,
            session.total_work_time
        );
        let event = Event::SessionEnded {
            session_id: session.id.clone(),
            mode: SessionMode::Learning,
            total_work_ms: session.total_work_time,
            completion_percentage: Some(completion),
            at: now,
        };
        let current = snapshot
            .current
            .clone()
            .filter(|c| c.id != session.id);
        let mut next = snapshot.with_current(session);
        next.current = current;
        Transition::applied(next, event)
    }

    /// Undo [`request_end`](Self::request_end): drop the marker step and
    /// reopen the step it closed.
    pub fn cancel_end(&self, snapshot: &Snapshot) -> Transition {
        let Some(mut session) = snapshot.resolved_current() else {
            log::warn!("cancel_end called without a current learning session");
            return Transition::unchanged(snapshot);
        };
        if session.mode != SessionMode::Learning || session.is_completed || !session.is_ending() {
            log::warn!("learning session {} is not ending", session.id);
            return Transition::unchanged(snapshot);
        }

        let marker = session.steps.pop().and_then(|s| s.pending_end);
        let reopens = marker.and_then(|m| m.reopens);
        if let (Some(id), Some(last)) = (reopens, session.steps.last_mut()) {
            if last.id == id {
                last.end = None;
            }
        }

        log::debug!("cancelled end of learning session {}", session.id);
        let event = Event::EndCancelled {
            session_id: session.id.clone(),
            at: self.ctx.now(),
        };
        Transition::applied(snapshot.with_current(session), event)
    }
}

/// Trimmed, non-empty, first occurrence wins.
fn normalize_topics(topics: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(topics.len());
    for topic in topics.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !out.iter().any(|t| t.eq_ignore_ascii_case(topic)) {
            out.push(topic.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Clock, ManualClock, SequentialIds};
    use chrono::{DateTime, Duration, Utc};

    fn fixture() -> (ManualClock, SequentialIds) {
        let start = "2026-03-02T14:00:00Z".parse::<DateTime<Utc>>().unwrap();
        (ManualClock::new(start), SequentialIds::new("l"))
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn start_without_active_session_requests_goal() {
        let (clock, ids) = fixture();
        let handler = LearningHandler::new(SessionContext::new(&clock, &ids));
        let t = handler.start(&Snapshot::default());
        assert!(matches!(t.event, Some(Event::GoalRequired { .. })));
        assert_eq!(t.snapshot, Snapshot::default());
    }

    #[test]
    fn start_new_builds_objectives_and_topics() {
        let (clock, ids) = fixture();
        let handler = LearningHandler::new(SessionContext::new(&clock, &ids));
        let t = handler.start_new(
            &Snapshot::default(),
            "  Async Rust ",
            &strings(&["pin", " ", "waker"]),
            &strings(&["rust", "Rust", "tokio", ""]),
        );

        let session = t.snapshot.current.unwrap();
        let details = session.learning.unwrap();
        assert_eq!(details.learning_goal, "Async Rust");
        assert_eq!(
            details.learning_objectives,
            vec![LearningObjective::new("pin"), LearningObjective::new("waker")]
        );
        assert_eq!(details.topics, strings(&["rust", "tokio"]));
        assert_eq!(session.steps.len(), 1);
        assert_eq!(session.steps[0].step_type, StepType::Work);
        assert!(session.steps[0].is_open());
    }

    #[test]
    fn empty_goal_is_noop() {
        let (clock, ids) = fixture();
        let handler = LearningHandler::new(SessionContext::new(&clock, &ids));
        assert!(handler.start_new(&Snapshot::default(), "   ", &[], &[]).is_noop());
    }

    #[test]
    fn start_new_pauses_previous_unfinished_session() {
        let (clock, ids) = fixture();
        let handler = LearningHandler::new(SessionContext::new(&clock, &ids));
        let first = handler.start_new(&Snapshot::default(), "first", &[], &[]).snapshot;
        clock.advance(Duration::minutes(20));
        let second = handler.start_new(&first, "second", &[], &[]).snapshot;

        assert_eq!(second.sessions.len(), 2);
        assert!(second.sessions[0].open_step().is_none());
        assert!(!second.sessions[0].is_completed);
        assert_eq!(second.current.unwrap().id, second.sessions[1].id);
    }

    #[test]
    fn request_end_appends_marked_pause() {
        let (clock, ids) = fixture();
        let handler = LearningHandler::new(SessionContext::new(&clock, &ids));
        let started = handler.start_new(&Snapshot::default(), "goal", &[], &[]).snapshot;
        clock.advance(Duration::minutes(30));
        let t = handler.request_end(&started);

        assert!(matches!(t.event, Some(Event::CompletionRequested { .. })));
        let session = t.snapshot.current.unwrap();
        assert!(session.is_ending());
        assert_eq!(session.steps.len(), 2);
        assert_eq!(session.steps[0].end, Some(clock.now()));
        assert_eq!(session.steps[1].step_type, StepType::Pause);
        assert!(session.steps[1].note.is_none());

        // A second request while ending does nothing.
        let again = handler.request_end(&Snapshot::new(t.snapshot.sessions.clone(), Some(session)));
        assert!(again.is_noop());
    }

    #[test]
    fn finalize_uses_general_progress_without_objectives() {
        let (clock, ids) = fixture();
        let handler = LearningHandler::new(SessionContext::new(&clock, &ids));
        let started = handler.start_new(&Snapshot::default(), "goal", &[], &[]).snapshot;
        clock.advance(Duration::minutes(25));
        let ending = handler.request_end(&started).snapshot;
        let id = ending.current.as_ref().unwrap().id.clone();
        clock.advance(Duration::minutes(2));
        let t = handler.finalize_end(&ending, &id, Vec::new(), 80);

        assert!(t.snapshot.current.is_none());
        let session = &t.snapshot.sessions[0];
        assert!(session.is_completed);
        assert_eq!(session.steps.len(), 1);
        assert_eq!(session.total_work_time, 25 * 60 * 1000);
        assert_eq!(session.end, Some(clock.now()));
        assert_eq!(session.learning.as_ref().unwrap().completion_percentage, 80);
    }

    #[test]
    fn finalize_unknown_or_completed_session_is_noop() {
        let (clock, ids) = fixture();
        let handler = LearningHandler::new(SessionContext::new(&clock, &ids));
        let started = handler.start_new(&Snapshot::default(), "goal", &[], &[]).snapshot;
        assert!(handler.finalize_end(&started, "nope", Vec::new(), 0).is_noop());

        let id = started.current.as_ref().unwrap().id.clone();
        let done = handler.finalize_end(&started, &id, Vec::new(), 10).snapshot;
        assert!(handler.finalize_end(&done, &id, Vec::new(), 10).is_noop());
    }

    #[test]
    fn cancel_end_reopens_closed_work_step() {
        let (clock, ids) = fixture();
        let handler = LearningHandler::new(SessionContext::new(&clock, &ids));
        let started = handler.start_new(&Snapshot::default(), "goal", &[], &[]).snapshot;
        clock.advance(Duration::minutes(10));
        let ending = handler.request_end(&started).snapshot;
        let t = handler.cancel_end(&ending);

        assert!(matches!(t.event, Some(Event::EndCancelled { .. })));
        assert_eq!(t.snapshot.current.as_ref().unwrap().steps, started.current.unwrap().steps);
        assert!(t.snapshot.current.unwrap().is_running());
    }

    #[test]
    fn cancel_end_from_paused_keeps_closed_pause_reopened() {
        let (clock, ids) = fixture();
        let ctx = SessionContext::new(&clock, &ids);
        let handler = LearningHandler::new(ctx);
        let started = handler.start_new(&Snapshot::default(), "goal", &[], &[]).snapshot;

        // Pause by hand: close work, open a pause.
        let mut session = started.current.clone().unwrap();
        clock.advance(Duration::minutes(10));
        session.steps = close_last_step(&session.steps, clock.now());
        session.steps = append_step(&ctx, &session.steps, StepType::Pause, None);
        let paused = started.with_current(session);

        clock.advance(Duration::minutes(5));
        let ending = handler.request_end(&paused).snapshot;
        let reverted = handler.cancel_end(&ending).snapshot;
        assert_eq!(reverted.current.unwrap().steps, paused.current.unwrap().steps);
    }

    #[test]
    fn cancel_without_pending_end_is_noop() {
        let (clock, ids) = fixture();
        let handler = LearningHandler::new(SessionContext::new(&clock, &ids));
        let started = handler.start_new(&Snapshot::default(), "goal", &[], &[]).snapshot;
        assert!(handler.cancel_end(&started).is_noop());
        assert!(handler.cancel_end(&Snapshot::default()).is_noop());
    }
}
