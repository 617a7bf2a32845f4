pub mod config;
pub mod history;
pub mod learn;
pub mod stats;
pub mod step;
pub mod timer;

use worklog_core::{
    day_key, Database, Event, SessionMode, SessionStore, Snapshot, TimerManager, Transition,
};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Today's sessions in the database, driven through a [`TimerManager`].
pub struct Day {
    db: Database,
    manager: TimerManager,
    key: String,
}

/// Pointer value after `timer reset`.
const CLEARED: &str = "-";

/// kv entry holding the current session id for a day and mode.
fn current_key(day: &str, mode: SessionMode) -> String {
    format!("current.{day}.{}", mode.as_str())
}

impl Day {
    pub fn open(mode: SessionMode) -> CliResult<Self> {
        let db = Database::open()?;
        let manager = TimerManager::new(mode);
        let key = day_key(manager.today());
        Ok(Self { db, manager, key })
    }

    pub fn manager(&self) -> &TimerManager {
        &self.manager
    }

    /// Saved sessions for today with the current one selected.
    ///
    /// Follows the pointer left by the previous invocation, falling back
    /// to the active session when there is none.
    pub fn snapshot(&self) -> CliResult<Snapshot> {
        let sessions = self.db.load(&self.key)?.unwrap_or_default();
        let pointer = self.db.kv_get(&current_key(&self.key, self.manager.mode()))?;
        let snapshot = match pointer.as_deref() {
            Some(CLEARED) => Snapshot::new(sessions, None),
            Some(id) if !id.is_empty() => match sessions.iter().find(|s| s.id == id).cloned() {
                Some(current) => Snapshot::new(sessions, Some(current)),
                None => self.manager.restore(sessions),
            },
            _ => self.manager.restore(sessions),
        };
        Ok(snapshot)
    }

    /// Persist an applied transition and print its event.
    ///
    /// A no-op transition is reported as an error so scripts can tell
    /// "nothing happened" apart from success.
    pub fn commit(&self, action: &str, transition: Transition) -> CliResult {
        let Some(event) = transition.event else {
            return Err(format!("{action}: nothing to do in the current session state").into());
        };
        self.db.save(&self.key, &transition.snapshot.sessions)?;
        let current = match (&event, &transition.snapshot.current) {
            (Event::SessionReset { .. }, _) => CLEARED,
            (_, Some(session)) => session.id.as_str(),
            (_, None) => "",
        };
        self.db
            .kv_set(&current_key(&self.key, self.manager.mode()), current)?;
        log::debug!(
            "saved {} session(s) under {}",
            transition.snapshot.sessions.len(),
            self.key
        );
        println!("{}", serde_json::to_string_pretty(&event)?);
        Ok(())
    }
}
