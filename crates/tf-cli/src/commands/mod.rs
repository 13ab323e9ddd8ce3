//! CLI subcommand implementations.
//!
//! Commands write to any `io::Write` and take "now" as a zoned instant, so
//! tests pin both the output sink and the clock.

pub mod chart;
pub mod done;
pub mod history;
pub mod presets;
pub mod queue;
pub mod status;
mod util;
