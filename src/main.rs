mod cli;
mod clock;
mod commands;
mod config;
mod factory;
mod format;
mod logging;
mod model;
mod planner;
mod store;
mod timeline;
mod ui;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let config = config::load_config(args.config.as_deref())?;
    let log_path = config
        .log_file
        .clone()
        .or_else(|| config::default_log_path().ok());
    if let Some(path) = log_path {
        logging::init(&path)?;
    }
    tracing::debug!(?config, "config loaded");

    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Show { at, tasks } => commands::show(&config, at, tasks),
        cli::Command::Tui => commands::tui(&config),
    }
}
