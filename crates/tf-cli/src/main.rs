use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tf_cli::commands::queue::{NewSession, Step};
use tf_cli::commands::{chart, done, history, presets, queue, status};
use tf_cli::{Cli, Commands, Config, HistoryAction};
use tf_core::{Clock, SystemClock};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(tf_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = tf_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let now = SystemClock.now().with_timezone(&Local);
    let mut out = io::stdout().lock();

    match command {
        Commands::Presets { json } => presets::run(&mut out, &db, *json)?,
        Commands::Add {
            preset,
            name,
            minutes,
        } => {
            let session = match (preset, name, minutes) {
                (Some(key), _, _) => NewSession::Preset(key),
                (None, Some(name), Some(minutes)) => NewSession::AdHoc {
                    name,
                    minutes: *minutes,
                },
                _ => anyhow::bail!("give a preset, or both --name and --minutes"),
            };
            queue::add(&mut out, &mut db, &now, session)?;
        }
        Commands::Queue { json } => queue::show(&mut out, &db, &now, *json)?,
        Commands::Move { id, index } => queue::move_task(&mut out, &mut db, &now, id, *index)?,
        Commands::Remove { id } => queue::remove(&mut out, &mut db, &now, id)?,
        Commands::Resize { id, minutes } => queue::resize(&mut out, &mut db, id, *minutes)?,
        Commands::Extend { id } => queue::step(&mut out, &mut db, id, Step::Extend)?,
        Commands::Shrink { id } => queue::step(&mut out, &mut db, id, Step::Shrink)?,
        Commands::Done { id, note } => done::run(&mut out, &mut db, &now, id.as_deref(), note)?,
        Commands::History { action, json } => match action {
            None => history::list(&mut out, &db, now.date_naive(), *json)?,
            Some(HistoryAction::Edit {
                id,
                start,
                end,
                note,
            }) => history::edit(
                &mut out,
                &mut db,
                id,
                start.as_deref(),
                end.as_deref(),
                note.as_deref(),
            )?,
        },
        Commands::Chart {
            granularity,
            svg,
            json,
        } => chart::run(
            &mut out,
            &db,
            now.date_naive(),
            *granularity,
            &config.chart_layout(),
            svg.as_deref(),
            *json,
        )?,
        Commands::Status => status::run(&mut out, &db, &now)?,
    }

    Ok(())
}
