//! Read-only views over recorded sessions.
//!
//! Provides:
//! - Per-day summaries (work/pause time, session counts, learning progress)
//! - Live figures for a running session, measured up to a caller-supplied `now`
//! - A status view of the current session

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::session::steps::{pause_time_ms, work_time_ms};
use crate::session::{Session, SessionMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub work_ms: u64,
    pub pause_ms: u64,
    pub work_sessions: u64,
    pub learning_sessions: u64,
    pub completed_sessions: u64,
    /// Mean completion of the day's finalized learning sessions.
    pub learning_completion_avg: Option<u8>,
    pub topics: Vec<String>,
}

/// Where the current session sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Ending,
    Completed,
}

impl Phase {
    pub fn of(session: Option<&Session>) -> Self {
        match session {
            None => Phase::Idle,
            Some(s) if s.is_completed => Phase::Completed,
            Some(s) if s.is_ending() => Phase::Ending,
            Some(s) if s.is_running() => Phase::Running,
            Some(s) if s.is_paused() => Phase::Paused,
            Some(_) => Phase::Idle,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub mode: SessionMode,
    pub phase: Phase,
    pub work_ms: u64,
    pub pause_ms: u64,
    pub session: Option<Session>,
}

impl Status {
    pub fn new(mode: SessionMode, session: Option<Session>, now: DateTime<Utc>) -> Self {
        let phase = Phase::of(session.as_ref());
        let (work_ms, pause_ms) = session
            .as_ref()
            .map(|s| (session_work_ms(s, now), elapsed_pause_ms(s, now)))
            .unwrap_or((0, 0));
        Self {
            mode,
            phase,
            work_ms,
            pause_ms,
            session,
        }
    }
}

/// How long the current pause has been running; zero when not paused.
pub fn elapsed_pause_ms(session: &Session, now: DateTime<Utc>) -> u64 {
    if session.is_completed || session.is_ending() || !session.is_paused() {
        return 0;
    }
    session
        .open_step()
        .map(|step| step.duration_ms(now))
        .unwrap_or(0)
}

/// Work time so far: the recorded total for finalized sessions, otherwise
/// measured live.
pub fn session_work_ms(session: &Session, now: DateTime<Utc>) -> u64 {
    if session.is_completed {
        session.total_work_time
    } else {
        work_time_ms(&session.steps, now)
    }
}

pub fn summarize_day(date: NaiveDate, sessions: &[Session], now: DateTime<Utc>) -> DaySummary {
    let mut summary = DaySummary {
        date,
        work_ms: 0,
        pause_ms: 0,
        work_sessions: 0,
        learning_sessions: 0,
        completed_sessions: 0,
        learning_completion_avg: None,
        topics: Vec::new(),
    };
    let mut completion_sum = 0u32;
    let mut completion_count = 0u32;

    for session in sessions.iter().filter(|s| s.date == date) {
        summary.work_ms += session_work_ms(session, now);
        summary.pause_ms += pause_time_ms(&session.steps, now);
        if session.is_completed {
            summary.completed_sessions += 1;
        }
        match session.mode {
            SessionMode::Work => summary.work_sessions += 1,
            SessionMode::Learning => summary.learning_sessions += 1,
        }
        if let Some(details) = &session.learning {
            if session.is_completed {
                completion_sum += u32::from(details.completion_percentage);
                completion_count += 1;
            }
            for topic in &details.topics {
                if !summary.topics.iter().any(|t| t.eq_ignore_ascii_case(topic)) {
                    summary.topics.push(topic.clone());
                }
            }
        }
    }

    if completion_count > 0 {
        summary.learning_completion_avg =
            Some((f64::from(completion_sum) / f64::from(completion_count)).round() as u8);
    }
    summary
}
