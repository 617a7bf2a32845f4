//! # Worklog Core Library
//!
//! This library provides the core logic for Worklog, a work-day and
//! learning-session tracker. All operations are available through the
//! standalone CLI binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Session model**: a session is an append-only sequence of work and
//!   pause steps for one calendar day
//! - **Timer**: a snapshot-in, snapshot-out state machine. The caller owns
//!   the session list and persists whatever each operation returns
//! - **Storage**: SQLite-backed per-day session lists and TOML configuration
//! - **History**: daily summaries and live figures over recorded sessions
//!
//! ## Key Components
//!
//! - [`TimerManager`]: mode-dispatching entry point
//! - [`Session`]: recorded activity with its steps
//! - [`Database`]: [`SessionStore`] on SQLite
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod history;
pub mod session;
pub mod storage;
pub mod timer;
pub mod validate;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use history::{
    elapsed_pause_ms, session_work_ms, summarize_day, DaySummary, Phase, Status,
};
pub use session::{
    Clock, IdGenerator, LearningDetails, LearningObjective, ManualClock, SequentialIds, Session,
    SessionMode, SessionStep, StepType, SystemClock, UuidIds,
};
pub use storage::{day_key, Config, Database, MemoryStore, SessionStore};
pub use timer::{Snapshot, TimerManager, Transition};
