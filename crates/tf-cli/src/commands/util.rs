//! Shared utilities for CLI commands.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tf_core::format::format_clock;
use tf_core::{HistoryId, TaskId, TimelineTask};

/// Parses a task ID given on the command line.
pub fn task_id(raw: &str) -> Result<TaskId> {
    TaskId::new(raw).with_context(|| format!("invalid task id: {raw:?}"))
}

/// Parses a history record ID given on the command line.
pub fn history_id(raw: &str) -> Result<HistoryId> {
    HistoryId::new(raw).with_context(|| format!("invalid history id: {raw:?}"))
}

/// Whole minutes left, rounded up so a running session never shows `0m`.
pub fn ceil_minutes(duration: Duration) -> u32 {
    let seconds = duration.num_seconds().max(0);
    u32::try_from((seconds + 59) / 60).unwrap_or(u32::MAX)
}

/// `HH:mm–HH:mm` of a timeline entry in `tz`.
pub fn span<Tz: TimeZone>(entry: &TimelineTask, tz: &Tz) -> String {
    format!(
        "{}–{}",
        clock_in(entry.start_time, tz),
        clock_in(entry.end_time, tz)
    )
}

pub fn clock_in<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> String {
    format_clock(&instant.with_timezone(tz))
}
