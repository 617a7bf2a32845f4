use clap::Subcommand;
use worklog_core::SessionMode;

use super::{CliResult, Day};

#[derive(Subcommand)]
pub enum StepAction {
    /// Remove a closed step from the current session
    Delete {
        /// Step id as shown by `worklog timer status`
        id: String,
    },
}

pub fn run(action: StepAction, mode: SessionMode) -> CliResult {
    let day = Day::open(mode)?;
    let snapshot = day.snapshot()?;

    match action {
        StepAction::Delete { id } => {
            day.commit("step delete", day.manager().delete_step(&snapshot, &id))?
        }
    }
    Ok(())
}
