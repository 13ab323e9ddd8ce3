//! Core domain logic for TimeFlow.
//!
//! This crate contains the fundamental types and logic for:
//! - Timeline: turning the session queue into wall-clock intervals
//! - Queue rules: re-anchoring the head and clamping durations
//! - Aggregation: bucketing history into chart periods and stacking categories
//! - Chart geometry: smoothed, clamped stacked-area outlines

pub mod aggregate;
pub mod chart;
pub mod clock;
pub mod format;
pub mod history;
pub mod preset;
pub mod queue;
mod task;
pub mod timeline;
mod types;

pub use aggregate::{Aggregation, Bucket, Category, Granularity, StackedExtent, aggregate};
pub use chart::{ChartData, ChartLayout, ChartSeries, PathCommand, Point, layout_chart};
pub use clock::{Clock, FixedClock, SystemClock};
pub use history::{HistoryItem, duration_minutes};
pub use preset::{EssentialProgress, Preset, default_presets, essential_progress};
pub use queue::{QueueError, TaskQueue};
pub use task::Task;
pub use timeline::{TimelineTask, compute_timeline};
pub use types::{HistoryId, Minutes, PresetId, TaskId, ValidationError};
