//! Archived focus sessions.
//!
//! History records keep their date and times as the strings they were written
//! with. Everything that reads them is lenient: a malformed record contributes
//! nothing instead of failing the caller.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::task::Task;
use crate::types::{HistoryId, ValidationError};

/// Date key format written for new records.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time-of-day format for start/end fields.
pub const TIME_FORMAT: &str = "%H:%M";

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Accepted date key layouts, tried in order.
///
/// The second covers locale keys such as `2024/1/5`.
const DATE_LAYOUTS: [&str; 2] = [DATE_FORMAT, "%Y/%m/%d"];

/// A completed session with its reflective note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: HistoryId,
    /// Calendar date key (see [`parse_history_date`]).
    pub date: String,
    /// `HH:mm`
    pub start_time: String,
    /// `HH:mm`; earlier than `start_time` when the session crossed midnight.
    pub end_time: String,
    pub name: String,
    #[serde(default)]
    pub note: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
}

impl HistoryItem {
    /// Archives a task that finished at `now`.
    ///
    /// The record's date and end time come from `now`; the start time is the
    /// task's anchor, both expressed in `now`'s timezone.
    pub fn archive<Tz: TimeZone>(task: Task, note: impl Into<String>, now: &DateTime<Tz>) -> Self {
        let local_end = now.naive_local();
        let local_start = task.created_at.with_timezone(&now.timezone()).naive_local();

        Self {
            id: task.id.into(),
            date: local_end.format(DATE_FORMAT).to_string(),
            start_time: local_start.format(TIME_FORMAT).to_string(),
            end_time: local_end.format(TIME_FORMAT).to_string(),
            name: task.name,
            note: note.into(),
            color: task.color,
            accent: task.accent,
        }
    }

    /// Length of the session in minutes; zero if either time is malformed.
    pub fn duration_minutes(&self) -> u32 {
        duration_minutes(&self.start_time, &self.end_time)
    }

    /// The parsed calendar date, if the key is readable.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_history_date(&self.date)
    }

    /// Applies a user correction of the times and note.
    ///
    /// Times are validated before anything is changed.
    pub fn edit(
        &mut self,
        start_time: Option<&str>,
        end_time: Option<&str>,
        note: Option<&str>,
    ) -> Result<(), ValidationError> {
        let start = start_time.map(validated_time).transpose()?;
        let end = end_time.map(validated_time).transpose()?;

        if let Some(start) = start {
            self.start_time = start;
        }
        if let Some(end) = end {
            self.end_time = end;
        }
        if let Some(note) = note {
            self.note = note.to_string();
        }
        Ok(())
    }
}

fn validated_time(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field: "time" });
    }
    let minutes = parse_time_of_day(trimmed).ok_or_else(|| ValidationError::InvalidTime {
        value: value.to_string(),
    })?;
    Ok(format!("{:02}:{:02}", minutes / 60, minutes % 60))
}

/// Parses `HH:mm` into minutes since midnight.
///
/// Hour `24` is read as midnight (`24:05` is `00:05`), the form some 24-hour
/// locale formatters write just after midnight. Signs and other non-digits
/// are rejected.
pub fn parse_time_of_day(value: &str) -> Option<u32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours = parse_digits(hours.trim())?;
    let minutes = parse_digits(minutes.trim())?;
    if hours > 24 || minutes >= 60 {
        return None;
    }
    Some((hours % 24) * 60 + minutes)
}

fn parse_digits(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Minutes between two `HH:mm` times.
///
/// An end earlier than the start wraps past midnight. Malformed or empty
/// input yields 0.
pub fn duration_minutes(start: &str, end: &str) -> u32 {
    let (Some(start), Some(end)) = (parse_time_of_day(start), parse_time_of_day(end)) else {
        return 0;
    };
    if end < start {
        end + MINUTES_PER_DAY - start
    } else {
        end - start
    }
}

/// Parses a history date key (`2024-01-05` or `2024/1/5`).
pub fn parse_history_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(value, layout).ok())
}
