//! Tracing subscriber setup.
//!
//! Logs go to stderr so that stdout stays free for command output
//! (`paperanim scan --json` pipes cleanly). `RUST_LOG` overrides the
//! configured level.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
    };

    let log_file = config.file.as_deref().and_then(open_log_file);
    let installed = match (log_file, config.json) {
        (Some(file), true) => fmt()
            .with_env_filter(filter())
            .json()
            .with_writer(Mutex::new(file))
            .try_init(),
        (Some(file), false) => fmt()
            .with_env_filter(filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
        (None, true) => fmt()
            .with_env_filter(filter())
            .json()
            .with_writer(std::io::stderr)
            .try_init(),
        (None, false) => fmt()
            .with_env_filter(filter())
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Stderr logging at `info`, for tests and scripts.
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let _ = std::fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Failed to open log file {}: {e}; logging to stderr", path.display());
            None
        }
    }
}
