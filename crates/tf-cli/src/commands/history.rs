//! History commands: the grouped archive list and record edits.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tf_core::HistoryItem;
use tf_core::format::{format_duration, group_by_date, relative_day};
use tf_db::Database;

use super::util;

pub fn list<W: Write>(writer: &mut W, db: &Database, today: NaiveDate, json: bool) -> Result<()> {
    let history = db.list_history()?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&history)?)?;
        return Ok(());
    }
    format_history(writer, &history, today)
}

/// Records grouped by day, newest first, with notes under each session.
pub fn format_history<W: Write>(
    writer: &mut W,
    history: &[HistoryItem],
    today: NaiveDate,
) -> Result<()> {
    if history.is_empty() {
        writeln!(writer, "No sessions archived yet.")?;
        return Ok(());
    }

    for (index, (date, items)) in group_by_date(history).into_iter().enumerate() {
        if index > 0 {
            writeln!(writer)?;
        }
        let total: u32 = items.iter().map(|h| h.duration_minutes()).sum();
        writeln!(
            writer,
            "{} · {}",
            relative_day(date, today),
            format_duration(total)
        )?;
        for item in items {
            writeln!(
                writer,
                "  {}–{}  {:>4}  {}  [{}]",
                item.start_time,
                item.end_time,
                format_duration(item.duration_minutes()),
                item.name,
                item.id
            )?;
            if !item.note.is_empty() {
                writeln!(writer, "      {}", item.note)?;
            }
        }
    }
    Ok(())
}

/// Corrects the times or note of one record.
pub fn edit<W: Write>(
    writer: &mut W,
    db: &mut Database,
    id: &str,
    start: Option<&str>,
    end: Option<&str>,
    note: Option<&str>,
) -> Result<()> {
    let id = util::history_id(id)?;
    let mut item = db
        .get_history(&id)?
        .with_context(|| format!("history record not found: {id}"))?;

    item.edit(start, end, note)?;
    db.update_history(&item)?;
    tracing::debug!(record = %item.id, "history record edited");

    writeln!(
        writer,
        "Updated {} on {}: {}–{} ({})",
        item.name,
        item.date,
        item.start_time,
        item.end_time,
        format_duration(item.duration_minutes())
    )?;
    Ok(())
}
