//! Done command: archive a finished session with a note.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use tf_core::TaskQueue;
use tf_core::format::format_duration;
use tf_db::Database;

use super::util::{self, span};

/// Archives `id`, or the active session when no ID is given.
///
/// The record's date and times are written in `now`'s timezone. The queue
/// and the new record are stored in one transaction.
pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    now: &DateTime<Tz>,
    id: Option<&str>,
    note: &str,
) -> Result<()> {
    let mut queue = TaskQueue::new(db.load_queue()?);
    let id = match id {
        Some(raw) => util::task_id(raw)?,
        None => queue
            .head()
            .map(|t| t.id.clone())
            .context("the queue is empty; nothing to archive")?,
    };

    let record = queue.complete_in(&id, note.trim(), now)?;
    db.archive(queue.tasks(), &record)?;
    tracing::debug!(record = %record.id, date = %record.date, "session archived");

    writeln!(
        writer,
        "Archived {} {}–{} ({})",
        record.name,
        record.start_time,
        record.end_time,
        format_duration(record.duration_minutes())
    )?;
    if let Some(next) = queue.timeline().first() {
        writeln!(
            writer,
            "Up next: {} {}",
            next.task.name,
            span(next, &now.timezone())
        )?;
    }
    Ok(())
}
