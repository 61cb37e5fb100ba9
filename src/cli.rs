use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dayplan", version, about = "Terminal day planner timeline")]
pub struct Cli {
    /// Read settings from this file instead of the default config.yml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the current, upcoming and previous tasks once
    Show {
        /// Pretend it is this time of day (HH:MM)
        #[arg(long)]
        at: Option<String>,
        /// Extra task as NAME,COLOR,START,END (repeatable)
        #[arg(long = "task", short = 't')]
        tasks: Vec<String>,
    },
    /// Launch the interactive TUI
    Tui,
}
