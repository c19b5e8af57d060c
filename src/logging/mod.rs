//! Diagnostic logging to disk.
//!
//! The UI owns the terminal, so `tracing` output goes to a daily log file
//! named `crabwallet_<date>.log` in the configured log directory (default:
//! `~/.local/share/crabwallet/logs/`). With logging disabled no subscriber is
//! installed and every event is discarded.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;

/// Expand a leading `~` to the home directory.
pub fn expand_home(dir: &str) -> PathBuf {
    match dir.strip_prefix('~') {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
            None => PathBuf::from(dir),
        },
        None => PathBuf::from(dir),
    }
}

pub fn parse_level(level: &str) -> Result<Level> {
    level
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid log level {:?}", level))
}

/// Path of today's log file inside `dir`.
pub fn log_file_path(dir: &Path) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d");
    dir.join(format!("crabwallet_{}.log", date))
}

/// Install the global subscriber. Returns the log file in use, if any.
pub fn init(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    if !config.enabled {
        return Ok(None);
    }

    let level = parse_level(&config.level)?;
    let log_dir = expand_home(&config.log_dir);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let path = log_file_path(&log_dir);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;

    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/var/log/x"), PathBuf::from("/var/log/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/logs"), home.join("logs"));
        }
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_level("WARN").unwrap(), Level::WARN);
        assert!(parse_level("chatty").is_err());
    }

    #[test]
    fn test_disabled_installs_nothing() {
        let config = LoggingConfig::default();
        assert!(init(&config).unwrap().is_none());
    }

    #[test]
    fn test_log_file_name() {
        let path = log_file_path(Path::new("/tmp/logs"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("crabwallet_") && name.ends_with(".log"));
    }
}
