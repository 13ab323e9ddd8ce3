//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tf_core::Granularity;

/// Focus session queue and history.
///
/// Queue sessions from presets, work through them in order, archive each with
/// a note, and review the trend of where the time went.
#[derive(Debug, Parser)]
#[command(name = "tf", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List session presets.
    Presets {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Queue a session from a preset, or an ad hoc one with --name and --minutes.
    Add {
        /// Preset ID (e.g. p1) or name.
        #[arg(required_unless_present = "name")]
        preset: Option<String>,

        /// Name of an ad hoc session.
        #[arg(long, conflicts_with = "preset", requires = "minutes")]
        name: Option<String>,

        /// Length of an ad hoc session.
        #[arg(long)]
        minutes: Option<u32>,
    },

    /// Show the queue as a timeline.
    Queue {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Move a session to a new position (0 is the head).
    Move { id: String, index: usize },

    /// Delete a session without archiving it.
    Remove { id: String },

    /// Set a session's length in minutes.
    Resize { id: String, minutes: u32 },

    /// Lengthen a session by one step (5m, or 30m from an hour up).
    Extend { id: String },

    /// Shorten a session by one step.
    Shrink { id: String },

    /// Archive a finished session (the active one by default).
    Done {
        id: Option<String>,

        /// What you took away from the session.
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// List archived sessions.
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the stacked trend of archived time.
    Chart {
        /// Bucket size: day, week, month or year.
        #[arg(long = "by", default_value = "day")]
        granularity: Granularity,

        /// Also write the chart as an SVG file.
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the active session and today's essentials.
    Status,
}

/// History subcommands.
#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// Correct the times or note of a record.
    Edit {
        id: String,

        /// New start time (HH:mm).
        #[arg(long)]
        start: Option<String>,

        /// New end time (HH:mm).
        #[arg(long)]
        end: Option<String>,

        /// New note.
        #[arg(long)]
        note: Option<String>,
    },
}
