use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{SessionMode, StepType};

/// Every applied transition produces an Event.
/// A transition without an event left the snapshot untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: String,
        mode: SessionMode,
        at: DateTime<Utc>,
    },
    SessionResumed {
        session_id: String,
        at: DateTime<Utc>,
    },
    SessionPaused {
        session_id: String,
        at: DateTime<Utc>,
    },
    /// A finalized work day was reopened.
    SessionContinued {
        session_id: String,
        at: DateTime<Utc>,
    },
    SessionEnded {
        session_id: String,
        mode: SessionMode,
        total_work_ms: u64,
        completion_percentage: Option<u8>,
        at: DateTime<Utc>,
    },
    /// The current session was discarded without time accounting.
    SessionReset {
        session_id: String,
        at: DateTime<Utc>,
    },
    /// No learning session is active; collect a goal and call `start_learning`.
    GoalRequired {
        at: DateTime<Utc>,
    },
    /// The learning session is ending; collect completion details and call
    /// `finalize_learning` or `cancel_end`.
    CompletionRequested {
        session_id: String,
        at: DateTime<Utc>,
    },
    EndCancelled {
        session_id: String,
        at: DateTime<Utc>,
    },
    NoteSaved {
        session_id: String,
        step_id: String,
        at: DateTime<Utc>,
    },
    StepDeleted {
        session_id: String,
        step_id: String,
        step_type: StepType,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The session the event concerns, if any.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Event::SessionStarted { session_id, .. }
            | Event::SessionResumed { session_id, .. }
            | Event::SessionPaused { session_id, .. }
            | Event::SessionContinued { session_id, .. }
            | Event::SessionEnded { session_id, .. }
            | Event::SessionReset { session_id, .. }
            | Event::CompletionRequested { session_id, .. }
            | Event::EndCancelled { session_id, .. }
            | Event::NoteSaved { session_id, .. }
            | Event::StepDeleted { session_id, .. } => Some(session_id),
            Event::GoalRequired { .. } => None,
        }
    }
}
