use chrono::{Days, NaiveDate};
use serde::Serialize;
use worklog_core::{
    day_key, summarize_day, Clock, Database, DaySummary, Session, SessionStore, SystemClock,
};

use super::CliResult;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryDay {
    #[serde(flatten)]
    summary: DaySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    sessions: Option<Vec<Session>>,
}

pub fn run(days: u32, with_sessions: bool) -> CliResult {
    let db = Database::open()?;
    let clock = SystemClock;
    let (now, today) = (clock.now(), clock.today());
    let oldest = today
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN);
    let oldest_key = day_key(oldest);

    let mut out = Vec::new();
    for key in db.days()?.into_iter().rev() {
        if key < oldest_key {
            break;
        }
        let Ok(date) = NaiveDate::parse_from_str(&key, "%Y-%m-%d") else {
            log::warn!("skipping unrecognized day key {key}");
            continue;
        };
        let sessions = db.load(&key)?.unwrap_or_default();
        out.push(HistoryDay {
            summary: summarize_day(date, &sessions, now),
            sessions: with_sessions.then_some(sessions),
        });
    }

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
