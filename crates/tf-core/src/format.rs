//! Display helpers shared by the list views.

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::aggregate::TODAY_LABEL;
use crate::history::{HistoryItem, TIME_FORMAT, parse_history_date};

/// Formats minutes as `45m`, `2h` or `1.5h`.
pub fn format_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{minutes}m");
    }
    if minutes % 60 == 0 {
        return format!("{}h", minutes / 60);
    }
    format!("{:.1}h", f64::from(minutes) / 60.0)
}

/// `HH:mm` of an instant in its own timezone.
pub fn format_clock<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    instant.naive_local().format(TIME_FORMAT).to_string()
}

/// [`TODAY_LABEL`] when `date` is `today`, the key unchanged otherwise.
pub fn relative_day(date: &str, today: NaiveDate) -> String {
    if parse_history_date(date) == Some(today) {
        TODAY_LABEL.to_string()
    } else {
        date.to_string()
    }
}

/// Groups records by their date key, in order of first appearance.
pub fn group_by_date(history: &[HistoryItem]) -> Vec<(&str, Vec<&HistoryItem>)> {
    let mut groups: Vec<(&str, Vec<&HistoryItem>)> = Vec::new();
    for item in history {
        match groups.iter_mut().find(|(date, _)| *date == item.date) {
            Some((_, items)) => items.push(item),
            None => groups.push((item.date.as_str(), vec![item])),
        }
    }
    groups
}
