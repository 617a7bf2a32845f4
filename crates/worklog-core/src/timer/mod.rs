mod learning;
mod manager;
mod snapshot;
mod work;

pub use learning::LearningHandler;
pub use manager::TimerManager;
pub use snapshot::{find_active_session, Snapshot, Transition};
pub use work::WorkHandler;
