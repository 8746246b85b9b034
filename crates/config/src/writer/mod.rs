//! Writing resolved sections to disk.
//!
//! Responsibilities:
//! - Render a resolved table with a `Renderer` and write it to a destination.
//! - Apply the existing-file policy: create, refuse, or overwrite with an
//!   optional timestamped backup.
//!
//! Does NOT handle:
//! - Resolving sections (see `resolver`).
//! - Checking that a batch of templates exists (see `generate`).
//!
//! Invariants / Assumptions:
//! - A refused overwrite touches nothing and is reported, not raised.
//! - Content is written to a sibling temp file and renamed into place.
//! - The backup is a copy made before the destination is replaced.

mod render;
mod target;

use std::path::{Path, PathBuf};

use toml::Table;

use crate::constants::BACKUP_MARKER;
use crate::error::ConfigError;

pub use render::{FormatRenderer, OutputFormat, Renderer, TemplateRenderer};
pub use target::{OutputTarget, env_postfix};

/// Policy for destinations that already exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Overwrite an existing destination.
    pub force: bool,
    /// Copy an existing destination to a backup before overwriting it.
    pub backup: bool,
}

/// What a write did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Overwritten { backup: Option<PathBuf> },
    /// The destination exists and overwriting was not forced.
    AlreadyExists,
}

/// Writes rendered tables under one `WriteOptions` policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigWriter {
    options: WriteOptions,
}

impl ConfigWriter {
    pub fn new(options: WriteOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> WriteOptions {
        self.options
    }

    /// Render `values` and write them to `destination`.
    ///
    /// # Errors
    ///
    /// Render errors from `renderer`, and `ConfigError::Io` when the backup or
    /// the write fails.
    pub fn write(
        &self,
        renderer: &dyn Renderer,
        values: &Table,
        destination: &Path,
    ) -> Result<WriteOutcome, ConfigError> {
        let exists = destination.exists();
        if exists && !self.options.force {
            tracing::warn!(
                path = %destination.display(),
                "File already exists, use force to overwrite or backup to keep a copy"
            );
            return Ok(WriteOutcome::AlreadyExists);
        }

        let content = renderer.render(values)?;

        let backup = if exists && self.options.backup {
            let backup = create_backup(destination)?;
            tracing::warn!(
                path = %destination.display(),
                backup = %backup.display(),
                "Backed up existing file"
            );
            Some(backup)
        } else {
            None
        };

        atomic_write(destination, &content)?;
        tracing::info!(path = %destination.display(), "Wrote file");

        Ok(if exists {
            WriteOutcome::Overwritten { backup }
        } else {
            WriteOutcome::Created
        })
    }
}

/// Backup name for `path` at `timestamp`: `<name>.bak_<timestamp>` beside it.
pub fn backup_path(path: &Path, timestamp: u64) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}{BACKUP_MARKER}{timestamp}"))
}

fn create_backup(path: &Path) -> Result<PathBuf, ConfigError> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let backup = backup_path(path, timestamp);
    std::fs::copy(path, &backup).map_err(|e| ConfigError::io(&backup, e))?;
    Ok(backup)
}

pub(crate) fn atomic_write(path: &Path, content: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!("{name}.tmp"));
    std::fs::write(&temp_path, content).map_err(|e| ConfigError::io(&temp_path, e))?;

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(ConfigError::io(path, e));
    }
    Ok(())
}
