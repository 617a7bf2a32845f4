use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::Result;
use crate::session::Session;

/// Persistence for a day's session list.
///
/// The timer core never calls this itself; callers save the snapshot they
/// get back from each operation.
pub trait SessionStore {
    fn save(&self, day_key: &str, sessions: &[Session]) -> Result<()>;

    /// `None` when nothing was ever saved under `day_key`.
    fn load(&self, day_key: &str) -> Result<Option<Vec<Session>>>;

    /// Saved day keys, oldest first.
    fn days(&self) -> Result<Vec<String>>;
}

/// Key a day's sessions are stored under.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Store kept in memory, for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    days: RefCell<BTreeMap<String, Vec<Session>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn save(&self, day_key: &str, sessions: &[Session]) -> Result<()> {
        self.days
            .borrow_mut()
            .insert(day_key.to_string(), sessions.to_vec());
        Ok(())
    }

    fn load(&self, day_key: &str) -> Result<Option<Vec<Session>>> {
        Ok(self.days.borrow().get(day_key).cloned())
    }

    fn days(&self) -> Result<Vec<String>> {
        Ok(self.days.borrow().keys().cloned().collect())
    }
}
