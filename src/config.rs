use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between automatic refreshes.
    pub tick_seconds: u64,
    pub strip_days_before: u32,
    pub strip_days_after: u32,
    /// Seed the sample Breakfast / Frontend Work tasks on launch.
    pub demo_tasks: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tick_seconds: 60,
            strip_days_before: 2,
            strip_days_after: 4,
            demo_tasks: true,
            log_file: None,
        }
    }
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_seconds.max(1))
    }
}

/// Loads `explicit` if given, otherwise the platform config file.
/// A missing file means defaults; a broken one is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Ok(p) => p,
            Err(_) => return Ok(Config::default()),
        },
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    if data.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(&data).context("parsing config file")?;
    Ok(config)
}

pub fn default_config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "dayplan").context("locating config directory")?;
    Ok(dirs.config_dir().join(CONFIG_FILE))
}

pub fn default_log_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "dayplan").context("locating data directory")?;
    Ok(dirs.data_dir().join("dayplan.log"))
}
