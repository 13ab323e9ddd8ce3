//! TimeFlow CLI library.
//!
//! This crate provides the `tf` command-line interface over the queue,
//! history and chart engines.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, HistoryAction};
pub use config::Config;
