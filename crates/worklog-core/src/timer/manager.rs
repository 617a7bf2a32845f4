//! Timer manager: the single entry point callers drive.
//!
//! The manager owns no session state. Each operation takes the caller's
//! [`Snapshot`] and returns a [`Transition`] holding the next snapshot and
//! the [`Event`] describing what happened. Mode-specific operations are
//! dispatched to [`WorkHandler`] or [`LearningHandler`]; pausing, notes,
//! resets, and step deletion behave the same in both modes and live here.
//!
//! ## Usage
//!
//! ```ignore
//! let manager = TimerManager::new(SessionMode::Work);
//! let snapshot = manager.restore(store.load(&day_key)?.unwrap_or_default());
//! let t = manager.start(&snapshot);
//! store.save(&day_key, &t.snapshot.sessions)?;
//! ```

use chrono::{DateTime, NaiveDate, Utc};

use crate::events::Event;
use crate::session::steps::{append_step, close_last_step, delete_step};
use crate::session::{
    Clock, IdGenerator, LearningObjective, Session, SessionContext, SessionMode, StepType,
    SystemClock, UuidIds,
};

use super::learning::LearningHandler;
use super::snapshot::{find_active_session, Snapshot, Transition};
use super::work::WorkHandler;

pub struct TimerManager {
    mode: SessionMode,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
}

impl TimerManager {
    /// Manager on the wall clock with random ids.
    pub fn new(mode: SessionMode) -> Self {
        Self::with_sources(mode, SystemClock, UuidIds)
    }

    pub fn with_sources(
        mode: SessionMode,
        clock: impl Clock + 'static,
        ids: impl IdGenerator + 'static,
    ) -> Self {
        Self {
            mode,
            clock: Box::new(clock),
            ids: Box::new(ids),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Switch the mode subsequent operations dispatch on.
    pub fn set_mode(&mut self, mode: SessionMode) {
        if mode != self.mode {
            log::debug!("timer mode {} -> {}", self.mode.as_str(), mode.as_str());
            self.mode = mode;
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn find_active_session<'s>(
        &self,
        sessions: &'s [Session],
        mode: SessionMode,
    ) -> Option<&'s Session> {
        find_active_session(sessions, mode, self.today())
    }

    /// Rebuild the current pointer after loading a day's sessions.
    ///
    /// Work mode picks today's work session even when finalized, so the day
    /// can be continued; learning mode picks the active learning session.
    pub fn restore(&self, sessions: Vec<Session>) -> Snapshot {
        let snapshot = Snapshot::new(sessions, None);
        let current = match self.mode {
            SessionMode::Work => self.work().todays_session(&snapshot),
            SessionMode::Learning => self
                .find_active_session(&snapshot.sessions, SessionMode::Learning)
                .cloned(),
        };
        Snapshot { current, ..snapshot }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. In learning mode without an active session this
    /// yields [`Event::GoalRequired`]; follow up with
    /// [`start_learning`](Self::start_learning).
    pub fn start(&self, snapshot: &Snapshot) -> Transition {
        match self.mode {
            SessionMode::Work => self.work().start(snapshot),
            SessionMode::Learning => self.learning().start(snapshot),
        }
    }

    pub fn start_learning(
        &self,
        snapshot: &Snapshot,
        goal: &str,
        objectives: &[String],
        topics: &[String],
    ) -> Transition {
        self.learning().start_new(snapshot, goal, objectives, topics)
    }

    /// Close the running work step and open a pause.
    pub fn pause(&self, snapshot: &Snapshot, note: Option<String>) -> Transition {
        let Some(mut session) = snapshot.resolved_current() else {
            log::warn!("pause called without a current session");
            return Transition::unchanged(snapshot);
        };
        if session.is_completed || !session.is_running() {
            log::warn!("session {} is not running; nothing to pause", session.id);
            return Transition::unchanged(snapshot);
        }

        let ctx = self.context();
        let now = ctx.now();
        session.steps = close_last_step(&session.steps, now);
        session.steps = append_step(&ctx, &session.steps, StepType::Pause, clean_note(note));

        log::debug!("paused session {}", session.id);
        let event = Event::SessionPaused {
            session_id: session.id.clone(),
            at: now,
        };
        Transition::applied(snapshot.with_current(session), event)
    }

    /// Work: finalize the day. Learning: request completion details
    /// ([`Event::CompletionRequested`]).
    pub fn end(&self, snapshot: &Snapshot) -> Transition {
        match self.mode {
            SessionMode::Work => self.work().end(snapshot),
            SessionMode::Learning => self.learning().request_end(snapshot),
        }
    }

    pub fn finalize_learning(
        &self,
        snapshot: &Snapshot,
        session_id: &str,
        objectives: Vec<LearningObjective>,
        general_progress: u8,
    ) -> Transition {
        self.learning()
            .finalize_end(snapshot, session_id, objectives, general_progress)
    }

    pub fn cancel_end(&self, snapshot: &Snapshot) -> Transition {
        self.learning().cancel_end(snapshot)
    }

    pub fn continue_day(&self, snapshot: &Snapshot) -> Transition {
        self.work().continue_day(snapshot)
    }

    /// Drop the current session without any time accounting.
    pub fn reset(&self, snapshot: &Snapshot) -> Transition {
        let Some(current) = snapshot.current.as_ref() else {
            log::warn!("reset called without a current session");
            return Transition::unchanged(snapshot);
        };

        log::info!("discarding session {}", current.id);
        let sessions = snapshot
            .sessions
            .iter()
            .filter(|s| s.id != current.id)
            .cloned()
            .collect();
        let event = Event::SessionReset {
            session_id: current.id.clone(),
            at: self.now(),
        };
        Transition::applied(Snapshot::new(sessions, None), event)
    }

    /// Set (or clear, when blank) the note on the current session's latest
    /// step.
    pub fn save_note(&self, snapshot: &Snapshot, note: &str) -> Transition {
        let Some(mut session) = snapshot.resolved_current() else {
            log::warn!("save_note called without a current session");
            return Transition::unchanged(snapshot);
        };
        if session.is_ending() {
            log::warn!("session {} is ending; notes are closed", session.id);
            return Transition::unchanged(snapshot);
        }
        let Some(step) = session.steps.last_mut() else {
            log::warn!("session {} has no step to annotate", session.id);
            return Transition::unchanged(snapshot);
        };

        step.note = clean_note(Some(note.to_string()));
        let event = Event::NoteSaved {
            session_id: session.id.clone(),
            step_id: step.id.clone(),
            at: self.now(),
        };
        Transition::applied(snapshot.with_current(session), event)
    }

    /// Remove a closed step from the current session, merging pauses that
    /// become adjacent.
    pub fn delete_step(&self, snapshot: &Snapshot, step_id: &str) -> Transition {
        let Some(mut session) = snapshot.resolved_current() else {
            log::warn!("delete_step called without a current session");
            return Transition::unchanged(snapshot);
        };
        if session.is_ending() {
            log::warn!("session {} is ending; steps are frozen", session.id);
            return Transition::unchanged(snapshot);
        }
        let Some(step_type) = session
            .steps
            .iter()
            .find(|s| s.id == step_id)
            .map(|s| s.step_type)
        else {
            log::warn!("session {} has no step {step_id}", session.id);
            return Transition::unchanged(snapshot);
        };
        let Some(steps) = delete_step(&session.steps, step_id) else {
            log::warn!("step {step_id} is still open and cannot be deleted");
            return Transition::unchanged(snapshot);
        };

        session.steps = steps;
        if session.is_completed {
            session.total_work_time =
                crate::session::steps::work_time_ms(&session.steps, self.now());
        }
        let event = Event::StepDeleted {
            session_id: session.id.clone(),
            step_id: step_id.to_string(),
            step_type,
            at: self.now(),
        };
        Transition::applied(snapshot.with_current(session), event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn context(&self) -> SessionContext<'_> {
        SessionContext::new(self.clock.as_ref(), self.ids.as_ref())
    }

    fn work(&self) -> WorkHandler<'_> {
        WorkHandler::new(self.context())
    }

    fn learning(&self) -> LearningHandler<'_> {
        LearningHandler::new(self.context())
    }
}

fn clean_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
