use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::Level;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::domain::TVError;

pub const LOG_FILE: &str = concat!(env!("CARGO_PKG_NAME"), ".log");

/// Logs to a file, as the terminal belongs to the UI. `RUST_LOG` overrides `level`.
pub fn init(log_path: Option<PathBuf>, level: Level) -> Result<(), TVError> {
    let log_path = match log_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            path
        }
        None => std::env::current_dir()?.join(LOG_FILE),
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let file_subscriber = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(Arc::new(file))
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| TVError::IoError(std::io::Error::other(e)))?;

    Ok(())
}
