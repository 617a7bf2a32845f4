use clap::Subcommand;
use worklog_core::{day_key, summarize_day, Clock, Database, SessionStore, SystemClock};

use super::CliResult;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today,
}

pub fn run(action: StatsAction) -> CliResult {
    let db = Database::open()?;

    match action {
        StatsAction::Today => {
            let clock = SystemClock;
            let (now, today) = (clock.now(), clock.today());
            let sessions = db.load(&day_key(today))?.unwrap_or_default();
            let summary = summarize_day(today, &sessions, now);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
