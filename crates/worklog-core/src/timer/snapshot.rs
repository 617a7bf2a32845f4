use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::session::steps::upsert_session;
use crate::session::{Session, SessionMode};

/// The caller-owned state every timer operation reads and replaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sessions: Vec<Session>,
    /// Copy of the session the caller considers current.
    pub current: Option<Session>,
}

impl Snapshot {
    pub fn new(sessions: Vec<Session>, current: Option<Session>) -> Self {
        Self { sessions, current }
    }

    /// Store `session` in the list and make it current.
    pub(crate) fn with_current(&self, session: Session) -> Self {
        Self {
            sessions: upsert_session(&self.sessions, &session),
            current: Some(session),
        }
    }

    /// The current session, refreshed from the list when present there.
    pub(crate) fn resolved_current(&self) -> Option<Session> {
        let current = self.current.as_ref()?;
        Some(
            self.sessions
                .iter()
                .find(|s| s.id == current.id)
                .unwrap_or(current)
                .clone(),
        )
    }
}

/// Result of a timer operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub snapshot: Snapshot,
    /// `None` when the call was out of contract and `snapshot` is the input.
    pub event: Option<Event>,
}

impl Transition {
    pub(crate) fn applied(snapshot: Snapshot, event: Event) -> Self {
        Self {
            snapshot,
            event: Some(event),
        }
    }

    pub(crate) fn unchanged(snapshot: &Snapshot) -> Self {
        Self {
            snapshot: snapshot.clone(),
            event: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.event.is_none()
    }
}

/// Today's open work session, or the most recently added open learning
/// session of today.
pub fn find_active_session(
    sessions: &[Session],
    mode: SessionMode,
    today: NaiveDate,
) -> Option<&Session> {
    let mut open = sessions
        .iter()
        .filter(|s| s.mode == mode && s.date == today && !s.is_completed);
    match mode {
        SessionMode::Work => open.next(),
        SessionMode::Learning => open.last(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn session(id: &str, mode: SessionMode, date: &str, completed: bool) -> Session {
        Session {
            id: id.into(),
            date: date.parse().unwrap(),
            start: "2026-03-02T09:00:00Z".parse::<DateTime<Utc>>().unwrap(),
            end: None,
            mode,
            steps: Vec::new(),
            is_completed: completed,
            total_work_time: 0,
            learning: None,
        }
    }

    #[test]
    fn finds_open_work_session_for_today_only() {
        let today: NaiveDate = "2026-03-02".parse().unwrap();
        let sessions = vec![
            session("yesterday", SessionMode::Work, "2026-03-01", false),
            session("today", SessionMode::Work, "2026-03-02", false),
        ];
        let found = find_active_session(&sessions, SessionMode::Work, today);
        assert_eq!(found.map(|s| s.id.as_str()), Some("today"));

        let sessions = vec![session("done", SessionMode::Work, "2026-03-02", true)];
        assert!(find_active_session(&sessions, SessionMode::Work, today).is_none());
    }

    #[test]
    fn learning_picks_most_recent_unfinished() {
        let today: NaiveDate = "2026-03-02".parse().unwrap();
        let sessions = vec![
            session("l1", SessionMode::Learning, "2026-03-02", false),
            session("l2", SessionMode::Learning, "2026-03-02", false),
            session("l3", SessionMode::Learning, "2026-03-02", true),
            session("w", SessionMode::Work, "2026-03-02", false),
        ];
        let found = find_active_session(&sessions, SessionMode::Learning, today);
        assert_eq!(found.map(|s| s.id.as_str()), Some("l2"));
    }

    #[test]
    fn resolved_current_prefers_list_copy() {
        let stale = session("s", SessionMode::Work, "2026-03-02", false);
        let fresh = session("s", SessionMode::Work, "2026-03-02", true);
        let snapshot = Snapshot::new(vec![fresh], Some(stale));
        assert!(snapshot.resolved_current().unwrap().is_completed);
    }
}
