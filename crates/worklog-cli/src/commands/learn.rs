use clap::Subcommand;
use worklog_core::validate::{objectives_with_completion, validate_completion, validate_goal};
use worklog_core::SessionMode;

use super::{CliResult, Day};

#[derive(Subcommand)]
pub enum LearnAction {
    /// Begin a new learning session
    Start {
        /// What this session is meant to achieve
        #[arg(long)]
        goal: String,
        /// Objective to track (repeatable)
        #[arg(long = "objective")]
        objectives: Vec<String>,
        /// Topic tag (repeatable)
        #[arg(long = "topic")]
        topics: Vec<String>,
    },
    /// Record completion details and finalize the ending session
    Finish {
        /// Completion per objective, in objective order (repeatable)
        #[arg(long = "completion", allow_negative_numbers = true)]
        completion: Vec<i64>,
        /// Overall progress, used when the session has no objectives
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        progress: i64,
    },
    /// Abandon the pending end and keep going
    Cancel,
}

pub fn run(action: LearnAction) -> CliResult {
    let day = Day::open(SessionMode::Learning)?;
    let snapshot = day.snapshot()?;
    let manager = day.manager();

    match action {
        LearnAction::Start {
            goal,
            objectives,
            topics,
        } => {
            let goal = validate_goal(&goal)?;
            day.commit(
                "learn start",
                manager.start_learning(&snapshot, goal, &objectives, &topics),
            )?;
        }
        LearnAction::Finish {
            completion,
            progress,
        } => {
            let Some(current) = snapshot.current.as_ref() else {
                return Err("learn finish: no learning session in progress".into());
            };
            let stored = current
                .learning
                .as_ref()
                .map(|l| l.learning_objectives.as_slice())
                .unwrap_or_default();
            let objectives = objectives_with_completion(stored, &completion)?;
            let progress = validate_completion("progress", progress)?;
            let t = manager.finalize_learning(&snapshot, &current.id, objectives, progress);
            day.commit("learn finish", t)?;
        }
        LearnAction::Cancel => day.commit("learn cancel", manager.cancel_end(&snapshot))?,
    }
    Ok(())
}
