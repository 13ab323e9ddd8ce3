//! Status command: the active session and today's progress.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use tf_core::format::format_duration;
use tf_core::essential_progress;
use tf_core::timeline::{compute_timeline, queue_end};
use tf_db::Database;

use super::util::{ceil_minutes, clock_in, span};

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    now: &DateTime<Tz>,
) -> Result<()> {
    let tz = now.timezone();
    let utc_now = now.with_timezone(&Utc);
    let today = now.naive_local().date();

    let tasks = db.load_queue()?;
    let timeline = compute_timeline(&tasks);
    let presets = db.list_presets()?;
    let history = db.list_history()?;

    writeln!(writer, "TimeFlow status")?;

    match timeline.first() {
        Some(active) => {
            let left = ceil_minutes(active.remaining(utc_now));
            #[expect(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "progress is clamped to [0, 1]"
            )]
            let percent = (active.progress(utc_now) * 100.0).round() as u32;
            writeln!(
                writer,
                "Active: {} {} ({} left, {percent}%)",
                active.task.name,
                span(active, &tz),
                format_duration(left)
            )?;
        }
        None => writeln!(writer, "Active: none")?,
    }
    if let Some(end) = queue_end(&tasks) {
        writeln!(
            writer,
            "Queue: {} sessions, until {}",
            tasks.len(),
            clock_in(end, &tz)
        )?;
    }

    let done_today: Vec<_> = history
        .iter()
        .filter(|h| h.parsed_date() == Some(today))
        .collect();
    let minutes: u32 = done_today.iter().map(|h| h.duration_minutes()).sum();
    writeln!(
        writer,
        "Done today: {} sessions, {}",
        done_today.len(),
        format_duration(minutes)
    )?;

    let progress = essential_progress(&presets, &history, today);
    let met = if progress.is_met() { ", all done" } else { "" };
    writeln!(
        writer,
        "Essentials: {}/{} ({:.0}%){met}",
        progress.current,
        progress.total,
        progress.percent()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use insta::assert_snapshot;
    use tf_core::{HistoryId, HistoryItem, Minutes, Task, TaskId};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn record(id: &str, date: &str, name: &str) -> HistoryItem {
        HistoryItem {
            id: HistoryId::new(id).unwrap(),
            date: date.to_string(),
            start_time: "07:00".to_string(),
            end_time: "07:20".to_string(),
            name: name.to_string(),
            note: String::new(),
            color: "text-teal-900".to_string(),
            accent: None,
        }
    }

    #[test]
    fn status_command_outputs_active_session_and_essentials() {
        let mut db = Database::open_in_memory().unwrap();
        let tasks: Vec<Task> = [("a", "Write", 30), ("b", "Read", 60)]
            .into_iter()
            .map(|(id, name, minutes)| Task {
                id: TaskId::new(id).unwrap(),
                ..Task::new(name, Minutes::new(minutes).unwrap(), at(0))
            })
            .collect();
        db.save_queue(&tasks).unwrap();
        db.insert_history(&record("h1", "2024-01-15", "静心冥想"))
            .unwrap();
        db.insert_history(&record("h2", "2024-01-14", "自我提升"))
            .unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, &at(12)).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        TimeFlow status
        Active: Write 09:00–09:30 (18m left, 40%)
        Queue: 2 sessions, until 10:30
        Done today: 1 sessions, 20m
        Essentials: 1/3 (33%)
        ");
    }

    #[test]
    fn idle_status_with_all_essentials_done() {
        let mut db = Database::open_in_memory().unwrap();
        for (id, name) in [("h1", "畅快游戏"), ("h2", "静心冥想"), ("h3", "自我提升")] {
            db.insert_history(&record(id, "2024-01-15", name)).unwrap();
        }

        let mut output = Vec::new();
        run(&mut output, &db, &at(0)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Active: none\n"));
        assert!(!output.contains("Queue:"));
        assert!(output.ends_with("Essentials: 3/3 (100%), all done\n"));
    }

    #[test]
    fn status_survives_a_queue_past_the_calendar() {
        let mut db = Database::open_in_memory().unwrap();
        let tasks: Vec<Task> = (0..40)
            .map(|i| Task {
                id: TaskId::new(format!("t{i}")).unwrap(),
                ..Task::new("Marathon", Minutes::clamped(i64::MAX), at(0))
            })
            .collect();
        db.save_queue(&tasks).unwrap();

        let tokyo = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
        let mut output = Vec::new();
        run(&mut output, &db, &at(30).with_timezone(&tokyo)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Active: Marathon 18:00–"));
        assert!(output.contains("Queue: 40 sessions, until "));
    }
}
