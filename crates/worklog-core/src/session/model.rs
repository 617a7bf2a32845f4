use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Work,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Work,
    Learning,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Work => "work",
            SessionMode::Learning => "learning",
        }
    }
}

impl std::str::FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(SessionMode::Work),
            "learning" | "learn" => Ok(SessionMode::Learning),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Marks the synthetic pause appended while a learning session waits for
/// its completion details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEnd {
    /// Step closed when the marker was appended; reopened on cancel.
    #[serde(default)]
    pub reopens: Option<String>,
}

/// One contiguous interval of work or pause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStep {
    pub id: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub start: DateTime<Utc>,
    /// `None` while the step is running.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_end: Option<PendingEnd>,
}

impl SessionStep {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    pub fn is_pending_end(&self) -> bool {
        self.pending_end.is_some()
    }

    /// Duration in milliseconds, measuring an open step up to `now`.
    pub fn duration_ms(&self, now: DateTime<Utc>) -> u64 {
        let end = self.end.unwrap_or(now);
        (end - self.start).num_milliseconds().max(0) as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningObjective {
    pub text: String,
    /// Percentage, 0..=100.
    pub completed: u8,
}

impl LearningObjective {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: 0,
        }
    }
}

/// Learning-only session metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LearningDetails {
    pub learning_goal: String,
    #[serde(default)]
    pub learning_objectives: Vec<LearningObjective>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub completion_percentage: u8,
}

/// One tracked activity unit for a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    pub mode: SessionMode,
    #[serde(default)]
    pub steps: Vec<SessionStep>,
    #[serde(default)]
    pub is_completed: bool,
    /// Milliseconds, computed when the session is finalized.
    #[serde(default)]
    pub total_work_time: u64,
    #[serde(flatten)]
    pub learning: Option<LearningDetails>,
}

impl Session {
    pub fn last_step(&self) -> Option<&SessionStep> {
        self.steps.last()
    }

    /// The running step, if any. Only the tail can be open.
    pub fn open_step(&self) -> Option<&SessionStep> {
        self.steps.last().filter(|s| s.is_open())
    }

    pub fn is_running(&self) -> bool {
        matches!(self.open_step(), Some(s) if s.step_type == StepType::Work)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.open_step(), Some(s) if s.step_type == StepType::Pause)
    }

    /// True while a learning session waits for its completion details.
    pub fn is_ending(&self) -> bool {
        self.steps.last().is_some_and(SessionStep::is_pending_end)
    }
}

/// Rounded mean of objective completion, or `general_progress` when there
/// are no objectives.
pub fn completion_percentage(objectives: &[LearningObjective], general_progress: u8) -> u8 {
    if objectives.is_empty() {
        return general_progress.min(100);
    }
    let sum: u32 = objectives.iter().map(|o| u32::from(o.completed.min(100))).sum();
    (f64::from(sum) / objectives.len() as f64).round() as u8
}
