//! Chart command: the stacked trend of archived time.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tf_core::format::format_duration;
use tf_core::{Aggregation, ChartData, ChartLayout, Granularity, aggregate, layout_chart};
use tf_db::Database;

#[derive(Debug, Serialize)]
struct ChartOutput<'a> {
    aggregation: &'a Aggregation,
    chart: &'a ChartData,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    today: NaiveDate,
    granularity: Granularity,
    layout: &ChartLayout,
    svg: Option<&Path>,
    json: bool,
) -> Result<()> {
    let history = db.list_history()?;
    let aggregation = aggregate(&history, granularity, today);
    let chart = layout_chart(&aggregation, layout);

    if let Some(path) = svg {
        std::fs::write(path, chart.to_svg())
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), series = chart.series.len(), "chart written");
    }

    if json {
        let output = ChartOutput {
            aggregation: &aggregation,
            chart: &chart,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    format_aggregation(writer, &aggregation)?;
    if let Some(path) = svg {
        writeln!(writer)?;
        writeln!(writer, "Wrote {}", path.display())?;
    }
    Ok(())
}

/// One line per period with its total and the minutes of each category.
pub fn format_aggregation<W: Write>(writer: &mut W, aggregation: &Aggregation) -> Result<()> {
    writeln!(
        writer,
        "TREND by {} (peak {})",
        aggregation.granularity,
        format_duration(aggregation.max_total())
    )?;
    writeln!(writer)?;

    for bucket in &aggregation.buckets {
        let parts: Vec<String> = aggregation
            .categories
            .iter()
            .zip(&bucket.minutes)
            .filter(|(_, minutes)| **minutes > 0)
            .map(|(category, minutes)| format!("{} {}", category.name, format_duration(*minutes)))
            .collect();

        let mut line = format!("{:<6}  {:>5}", bucket.period.label, format_duration(bucket.total));
        if !parts.is_empty() {
            line.push_str("  ");
            line.push_str(&parts.join(" · "));
        }
        writeln!(writer, "{line}")?;
    }

    if aggregation.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "No archived sessions in this window.")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_core::{HistoryId, HistoryItem};

    fn record(id: &str, date: &str, start: &str, end: &str, name: &str) -> HistoryItem {
        HistoryItem {
            id: HistoryId::new(id).unwrap(),
            date: date.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            name: name.to_string(),
            note: String::new(),
            color: "text-zinc-600".to_string(),
            accent: Some("#2563eb".to_string()),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn seeded() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        for item in [
            record("h1", "2024-01-13", "09:00", "09:30", "Write"),
            record("h2", "2024-01-15", "09:00", "10:00", "Write"),
            record("h3", "2024-01-15", "23:45", "00:15", "Read"),
            record("h4", "2023-12-01", "09:00", "10:00", "Old"),
        ] {
            db.insert_history(&item).unwrap();
        }
        db
    }

    #[test]
    fn daily_table_lists_every_period() {
        let db = seeded();
        let mut buf = Vec::new();
        run(
            &mut buf,
            &db,
            today(),
            Granularity::Day,
            &ChartLayout::default(),
            None,
            false,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "TREND by day (peak 1.5h)\n\
             \n\
             1/9        0m\n\
             1/10       0m\n\
             1/11       0m\n\
             1/12       0m\n\
             1/13      30m  Write 30m\n\
             1/14       0m\n\
             今天       1.5h  Write 1h · Read 30m\n"
        );
    }

    #[test]
    fn empty_window_says_so() {
        let db = Database::open_in_memory().unwrap();
        let mut buf = Vec::new();
        run(
            &mut buf,
            &db,
            today(),
            Granularity::Year,
            &ChartLayout::default(),
            None,
            false,
        )
        .unwrap();

        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("TREND by year (peak 0m)\n"));
        assert!(output.ends_with("No archived sessions in this window.\n"));
    }

    #[test]
    fn svg_file_is_written() {
        let db = seeded();
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("trend.svg");
        let mut buf = Vec::new();
        run(
            &mut buf,
            &db,
            today(),
            Granularity::Month,
            &ChartLayout::default(),
            Some(&path),
            false,
        )
        .unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg "));
        assert_eq!(svg.matches("<path ").count(), 3);
        assert!(svg.contains("<title>Old</title>"));
        assert!(String::from_utf8(buf).unwrap().ends_with("trend.svg\n"));
    }

    #[test]
    fn json_carries_stacks_and_paths() {
        let db = seeded();
        let mut buf = Vec::new();
        run(
            &mut buf,
            &db,
            today(),
            Granularity::Week,
            &ChartLayout::default(),
            None,
            true,
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let buckets = value["aggregation"]["buckets"].as_array().unwrap();
        assert_eq!(buckets.len(), 12);
        // 2024-01-15 is a Monday, so the 13th belongs to the previous week.
        assert_eq!(buckets[11]["total"], 90);
        assert_eq!(buckets[10]["total"], 30);
        assert_eq!(value["chart"]["scaleMinutes"], 90);
        assert_eq!(value["chart"]["series"].as_array().unwrap().len(), 3);
    }
}
