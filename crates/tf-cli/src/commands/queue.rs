//! Queue commands: adding, showing and rearranging sessions.
//!
//! Every mutation loads the stored queue, applies one [`TaskQueue`] operation
//! at `now` and saves the result, so the head re-anchoring rule is always
//! enforced by the core.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, TimeZone, Utc};
use tf_core::format::format_duration;
use tf_core::preset::find_preset;
use tf_core::queue::duration_step;
use tf_core::{Minutes, Task, TaskQueue, TimelineTask};
use tf_db::Database;

use super::util::{self, ceil_minutes, clock_in, span};

/// What `tf add` should queue.
#[derive(Debug, Clone, Copy)]
pub enum NewSession<'a> {
    /// A preset, by ID or name.
    Preset(&'a str),
    AdHoc { name: &'a str, minutes: u32 },
}

/// Direction of a one-step duration change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Extend,
    Shrink,
}

/// Appends a session to the queue.
pub fn add<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    now: &DateTime<Tz>,
    session: NewSession<'_>,
) -> Result<()> {
    let utc_now = now.with_timezone(&Utc);
    let task = match session {
        NewSession::Preset(key) => {
            let presets = db.list_presets()?;
            let preset = find_preset(&presets, key).with_context(|| {
                format!("no preset matches {key:?}; run 'tf presets' to list them")
            })?;
            preset.activate(utc_now)
        }
        NewSession::AdHoc { name, minutes } => {
            let name = name.trim();
            if name.is_empty() {
                bail!("session name must not be empty");
            }
            Task::new(name, Minutes::new(minutes)?, utc_now)
        }
    };

    let mut queue = TaskQueue::new(db.load_queue()?);
    let id = task.id.clone();
    queue.push(task, utc_now);
    db.save_queue(queue.tasks())?;
    tracing::debug!(task = %id, len = queue.len(), "session queued");

    if let Some(entry) = queue.timeline().iter().find(|t| t.task.id == id) {
        writeln!(
            writer,
            "Queued {} [{}] {}",
            entry.task.name,
            entry.task.id,
            span(entry, &now.timezone())
        )?;
    }
    Ok(())
}

/// Prints the queue as a timeline.
pub fn show<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    now: &DateTime<Tz>,
    json: bool,
) -> Result<()> {
    let timeline = TaskQueue::new(db.load_queue()?).timeline();
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&timeline)?)?;
        return Ok(());
    }
    format_timeline(writer, &timeline, now)
}

/// Human-readable timeline with a countdown on the active session.
pub fn format_timeline<W: Write, Tz: TimeZone>(
    writer: &mut W,
    timeline: &[TimelineTask],
    now: &DateTime<Tz>,
) -> Result<()> {
    let Some(last) = timeline.last() else {
        writeln!(writer, "The queue is empty.")?;
        writeln!(writer)?;
        writeln!(
            writer,
            "Hint: Run 'tf presets' and 'tf add <preset>' to plan a session."
        )?;
        return Ok(());
    };

    let tz = now.timezone();
    let utc_now = now.with_timezone(&Utc);
    writeln!(
        writer,
        "QUEUE ({} sessions, until {})",
        timeline.len(),
        clock_in(last.end_time, &tz)
    )?;
    writeln!(writer)?;

    for (index, entry) in timeline.iter().enumerate() {
        let marker = if index == 0 { '▶' } else { ' ' };
        let mut line = format!(
            "{marker} {}  {:>4}  {}  [{}]",
            span(entry, &tz),
            format_duration(entry.task.duration.get()),
            entry.task.name,
            entry.task.id
        );
        if index == 0 {
            let left = ceil_minutes(entry.remaining(utc_now));
            if left == 0 {
                line.push_str("  time's up");
            } else {
                line.push_str(&format!("  {} left", format_duration(left)));
            }
        }
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

/// Moves a session to `index`; the head is re-anchored if it changes.
pub fn move_task<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    now: &DateTime<Tz>,
    id: &str,
    index: usize,
) -> Result<()> {
    let id = util::task_id(id)?;
    let mut queue = TaskQueue::new(db.load_queue()?);
    queue.move_task(&id, index, now.with_timezone(&Utc))?;
    db.save_queue(queue.tasks())?;

    let position = queue
        .tasks()
        .iter()
        .position(|t| t.id == id)
        .unwrap_or_default();
    writeln!(writer, "Moved [{id}] to position {position}")?;
    Ok(())
}

/// Deletes a session without archiving it.
pub fn remove<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    now: &DateTime<Tz>,
    id: &str,
) -> Result<()> {
    let id = util::task_id(id)?;
    let mut queue = TaskQueue::new(db.load_queue()?);
    let removed = queue.remove(&id, now.with_timezone(&Utc))?;
    db.save_queue(queue.tasks())?;
    writeln!(writer, "Removed {} [{}]", removed.name, removed.id)?;
    Ok(())
}

/// Sets a session's length.
pub fn resize<W: Write>(writer: &mut W, db: &mut Database, id: &str, minutes: u32) -> Result<()> {
    let id = util::task_id(id)?;
    let mut queue = TaskQueue::new(db.load_queue()?);
    let duration = queue.set_duration(&id, i64::from(minutes))?;
    db.save_queue(queue.tasks())?;
    writeln!(writer, "[{id}] is now {}", format_duration(duration.get()))?;
    Ok(())
}

/// Lengthens or shortens a session by one [`duration_step`].
pub fn step<W: Write>(writer: &mut W, db: &mut Database, id: &str, direction: Step) -> Result<()> {
    let id = util::task_id(id)?;
    let mut queue = TaskQueue::new(db.load_queue()?);
    let current = queue
        .get(&id)
        .map(|t| t.duration)
        .with_context(|| format!("task not found: {id}"))?;

    let step = i64::from(duration_step(current));
    let delta = match direction {
        Step::Extend => step,
        Step::Shrink => -step,
    };
    let duration = queue.adjust_duration(&id, delta)?;
    db.save_queue(queue.tasks())?;
    writeln!(writer, "[{id}] is now {}", format_duration(duration.get()))?;
    Ok(())
}
