//! Tracing setup.
//!
//! The terminal is owned by the UI, so events go to a log file. `ANDANTE_LOG`
//! takes an `EnvFilter` directive and overrides `log.level`.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Install the global subscriber. Returns the log file in use, or `None`
/// when no file could be opened (events are then discarded).
pub fn init(settings: &Settings) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_env("ANDANTE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(settings.log.level.as_str()));

    let path = settings.log_file()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .ok()?;

    Some(path)
}
