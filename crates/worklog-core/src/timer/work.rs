//! Transitions for the single daily work session.
//!
//! ```text
//! absent -> start -> running <-> paused -> end -> completed -> continue -> running
//! ```

use crate::events::Event;
use crate::session::steps::{append_step, close_last_step, create_session, work_time_ms};
use crate::session::{Session, SessionContext, SessionMode, StepType};

use super::snapshot::{Snapshot, Transition};

pub struct WorkHandler<'a> {
    ctx: SessionContext<'a>,
}

impl<'a> WorkHandler<'a> {
    pub fn new(ctx: SessionContext<'a>) -> Self {
        Self { ctx }
    }

    /// Today's work session, finalized or not.
    pub fn todays_session(&self, snapshot: &Snapshot) -> Option<Session> {
        let today = self.ctx.today();
        let is_today = |s: &&Session| s.mode == SessionMode::Work && s.date == today;
        snapshot
            .sessions
            .iter()
            .find(is_today)
            .or_else(|| snapshot.current.as_ref().filter(is_today))
            .cloned()
    }

    /// Start or resume today's work session.
    ///
    /// Creates the day's session on first use; a paused session has its
    /// pause closed before the new work step. A finalized day is reopened
    /// as by [`continue_day`](Self::continue_day).
    pub fn start(&self, snapshot: &Snapshot) -> Transition {
        let (session, created) = match self.todays_session(snapshot) {
            Some(session) if session.is_completed => return self.reopen(snapshot, session),
            Some(session) => (session, false),
            None => (create_session(&self.ctx, SessionMode::Work, None), true),
        };

        if session.is_running() {
            log::warn!("work session {} is already running", session.id);
            return Transition::unchanged(snapshot);
        }

        let now = self.ctx.now();
        let mut session = session;
        session.steps = close_last_step(&session.steps, now);
        session.steps = append_step(&self.ctx, &session.steps, StepType::Work, None);

        let event = if created {
            log::info!("started work session {} for {}", session.id, session.date);
            Event::SessionStarted {
                session_id: session.id.clone(),
                mode: SessionMode::Work,
                at: now,
            }
        } else {
            log::debug!("resumed work session {}", session.id);
            Event::SessionResumed {
                session_id: session.id.clone(),
                at: now,
            }
        };
        Transition::applied(snapshot.with_current(session), event)
    }

    /// Finalize the current session and compute its work time.
    ///
    /// The finalized session stays in `current` so the day can be continued.
    pub fn end(&self, snapshot: &Snapshot) -> Transition {
        let Some(mut session) = snapshot.resolved_current() else {
            log::warn!("end called without a current work session");
            return Transition::unchanged(snapshot);
        };
        if session.mode != SessionMode::Work || session.is_completed {
            log::warn!("session {} is not an open work session", session.id);
            return Transition::unchanged(snapshot);
        }

        let now = self.ctx.now();
        session.steps = close_last_step(&session.steps, now);
        session.total_work_time = work_time_ms(&session.steps, now);
        session.end = Some(now.max(session.start));
        session.is_completed = true;

        log::info!(
            "ended work session {} with {} ms of work",
            session.id,
            session.total_work_time
        );
        let event = Event::SessionEnded {
            session_id: session.id.clone(),
            mode: SessionMode::Work,
            total_work_ms: session.total_work_time,
            completion_percentage: None,
            at: now,
        };
        Transition::applied(snapshot.with_current(session), event)
    }

    /// Reopen a finalized current session with a fresh work step.
    pub fn continue_day(&self, snapshot: &Snapshot) -> Transition {
        match snapshot.resolved_current() {
            Some(session) if session.mode == SessionMode::Work && session.is_completed => {
                self.reopen(snapshot, session)
            }
            Some(session) => {
                log::warn!("session {} is not a finalized work session", session.id);
                Transition::unchanged(snapshot)
            }
            None => {
                log::warn!("continue called without a current work session");
                Transition::unchanged(snapshot)
            }
        }
    }

    fn reopen(&self, snapshot: &Snapshot, mut session: Session) -> Transition {
        let now = self.ctx.now();
        session.is_completed = false;
        session.end = None;
        session.steps = append_step(&self.ctx, &session.steps, StepType::Work, None);

        log::info!("continued work session {}", session.id);
        let event = Event::SessionContinued {
            session_id: session.id.clone(),
            at: now,
        };
        Transition::applied(snapshot.with_current(session), event)
    }
}
