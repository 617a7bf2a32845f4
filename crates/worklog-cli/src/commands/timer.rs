use clap::Subcommand;
use worklog_core::{Event, SessionMode, Status};

use super::{CliResult, Day};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the session for the current mode
    Start,
    /// Pause the running session
    Pause {
        /// Note attached to the pause
        #[arg(long)]
        note: Option<String>,
    },
    /// End the session (learning sessions then wait for `learn finish`)
    End,
    /// Reopen today's finished work session
    Continue,
    /// Discard the current session without recording its time
    Reset,
    /// Print the current session and live figures as JSON
    Status,
    /// Set the note on the latest step (an empty note clears it)
    Note { text: String },
}

pub fn run(action: TimerAction, mode: SessionMode) -> CliResult {
    let day = Day::open(mode)?;
    let snapshot = day.snapshot()?;
    let manager = day.manager();

    match action {
        TimerAction::Start => {
            let t = manager.start(&snapshot);
            if matches!(t.event, Some(Event::GoalRequired { .. })) {
                eprintln!("no learning session in progress; use `worklog learn start --goal <GOAL>`");
            }
            day.commit("start", t)?;
        }
        TimerAction::Pause { note } => day.commit("pause", manager.pause(&snapshot, note))?,
        TimerAction::End => day.commit("end", manager.end(&snapshot))?,
        TimerAction::Continue => day.commit("continue", manager.continue_day(&snapshot))?,
        TimerAction::Reset => day.commit("reset", manager.reset(&snapshot))?,
        TimerAction::Status => {
            let session = snapshot.current.clone();
            let status = Status::new(mode, session, manager.now());
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        TimerAction::Note { text } => day.commit("note", manager.save_note(&snapshot, &text))?,
    }
    Ok(())
}
