use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a file-backed subscriber. Off unless `RUST_LOG` is set, and
/// never written to the terminal, which belongs to the UI.
pub fn init(log_path: &Path) -> Result<()> {
    let filter = std::env::var("RUST_LOG").ok().and_then(|raw| {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        EnvFilter::try_new(raw).ok()
    });
    let Some(filter) = filter else {
        return Ok(());
    };

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening log file {:?}", log_path))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(filter)
        .try_init()
        .context("installing tracing subscriber")?;
    Ok(())
}
