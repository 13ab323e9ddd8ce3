//! End-to-end tests for the complete session flow.
//!
//! Tests the full pipeline: add → queue → done → history → chart, each step a
//! separate `tf` process sharing one database under a temporary HOME.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn tf_binary() -> String {
    env!("CARGO_BIN_EXE_tf").to_string()
}

fn tf(home: &Path, args: &[&str]) -> Output {
    Command::new(tf_binary())
        .env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("XDG_DATA_HOME")
        .env_remove("TF_DATABASE_PATH")
        .args(args)
        .output()
        .expect("failed to run tf")
}

fn tf_ok(home: &Path, args: &[&str]) -> String {
    let output = tf(home, args);
    assert!(
        output.status.success(),
        "tf {} should succeed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn tf_json(home: &Path, args: &[&str]) -> serde_json::Value {
    serde_json::from_str(&tf_ok(home, args)).expect("valid JSON output")
}

/// Test the database is created in the data directory on first use.
#[test]
fn test_database_created_under_home() {
    let temp = TempDir::new().unwrap();
    let presets = tf_ok(temp.path(), &["presets"]);

    assert!(presets.contains("沉浸工作"));
    assert!(temp.path().join(".local/share/tf/tf.db").exists());
}

/// Test a session goes from the queue into history and the chart.
#[test]
fn test_queue_to_history_flow() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    tf_ok(home, &["add", "p4"]);
    tf_ok(home, &["add", "--name", "Stretch", "--minutes", "10"]);

    let queue = tf_json(home, &["queue", "--json"]);
    let entries = queue.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "静心冥想");
    assert_eq!(entries[1]["name"], "Stretch");
    // The second session starts exactly where the first ends.
    assert_eq!(entries[0]["endTime"], entries[1]["startTime"]);

    let done = tf_ok(home, &["done", "--note", "calm"]);
    assert!(done.starts_with("Archived 静心冥想"));
    assert!(done.contains("Up next: Stretch"));

    let history = tf_json(home, &["history", "--json"]);
    let records = history.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "静心冥想");
    assert_eq!(records[0]["note"], "calm");

    let svg_path = home.join("trend.svg");
    let chart = tf_ok(
        home,
        &["chart", "--by", "week", "--svg", svg_path.to_str().unwrap()],
    );
    assert!(chart.starts_with("TREND by week"));
    let svg = std::fs::read_to_string(&svg_path).unwrap();
    assert!(svg.contains("<title>静心冥想</title>"));

    let status = tf_ok(home, &["status"]);
    assert!(status.contains("Active: Stretch"));
    assert!(status.contains("Essentials: 1/3"));
}

/// Test queue edits persist between invocations.
#[test]
fn test_queue_edits_persist() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    tf_ok(home, &["add", "--name", "First", "--minutes", "30"]);
    tf_ok(home, &["add", "--name", "Second", "--minutes", "60"]);

    let queue = tf_json(home, &["queue", "--json"]);
    let first = queue[0]["id"].as_str().unwrap().to_string();
    let second = queue[1]["id"].as_str().unwrap().to_string();

    tf_ok(home, &["move", &second, "0"]);
    tf_ok(home, &["shrink", &second]);
    tf_ok(home, &["resize", &first, "45"]);

    let queue = tf_json(home, &["queue", "--json"]);
    assert_eq!(queue[0]["id"], second.as_str());
    assert_eq!(queue[0]["duration"], 30);
    assert_eq!(queue[1]["duration"], 45);

    tf_ok(home, &["remove", &second]);
    let queue = tf_json(home, &["queue", "--json"]);
    assert_eq!(queue.as_array().unwrap().len(), 1);
    assert!(tf_json(home, &["history", "--json"]).as_array().unwrap().is_empty());
}

/// Test errors exit non-zero with a message.
#[test]
fn test_errors_are_reported() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    let output = tf(home, &["done"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("the queue is empty"));

    let output = tf(home, &["remove", "nope"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("task not found: nope"));

    let output = tf(home, &["chart", "--by", "decade"]);
    assert!(!output.status.success());
}

/// Test an explicit database path from the environment is honored.
#[test]
fn test_database_path_from_env() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("custom/flow.db");

    let output = Command::new(tf_binary())
        .env("HOME", temp.path())
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("XDG_DATA_HOME")
        .env("TF_DATABASE_PATH", &db_path)
        .args(["add", "p1"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(db_path.exists());
    assert!(!temp.path().join(".local/share/tf/tf.db").exists());
}
