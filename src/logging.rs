//! File logging.
//!
//! The terminal belongs to the interface, so log records can only go to a file, and only when one
//! was asked for.

use std::{fs::File, path::Path, sync::Mutex};

use color_eyre::eyre::{eyre, Result};
use tracing::{info, Level};

/// Installs the global subscriber writing plain-text records to `path`.
///
/// Does nothing if `path` is `None`.
///
/// # Errors
///
/// This function may return errors if:
/// - The log file can't be created
/// - A global subscriber is already installed
pub fn init(path: Option<&Path>, level: Level) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .try_init()
        .map_err(|err| eyre!(err))?;

    info!(path = %path.display(), %level, "logging started");

    Ok(())
}
