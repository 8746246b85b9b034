//! Environment variable and dotenv reading.
//!
//! Responsibilities:
//! - Parse `KEY=VALUE` files into an ordered map without touching the process env.
//! - Snapshot the process environment merged with the optional work-dir `.env`.
//!
//! Invariants:
//! - Entries with empty values are dropped.
//! - Parse errors carry the byte index only, never the offending line.
//! - The `DOTENV_DISABLED` variable gates the optional `.env`, never the overlay.

use std::collections::BTreeMap;
use std::path::Path;

use crate::constants::{DOTENV_DISABLED_VAR, DOTENV_FILE_NAME};
use crate::document::Overlay;
use crate::error::ConfigError;

/// Check if dotenv loading is disabled via environment variable.
pub(crate) fn dotenv_disabled() -> bool {
    matches!(
        std::env::var(DOTENV_DISABLED_VAR).ok().as_deref(),
        Some("true") | Some("1")
    )
}

/// Parse a dotenv-style file into an ordered map.
///
/// # Errors
///
/// - `ConfigError::DotenvIo` when the file cannot be opened or read
/// - `ConfigError::DotenvParse` when a line has invalid syntax
pub fn read_dotenv_file(path: &Path) -> Result<Overlay, ConfigError> {
    let iter = dotenvy::from_path_iter(path).map_err(|e| dotenv_error(path, e))?;

    let mut entries = Overlay::new();
    for item in iter {
        let (key, value) = item.map_err(|e| dotenv_error(path, e))?;
        if !value.is_empty() {
            entries.insert(key, value);
        }
    }

    tracing::debug!(
        path = %path.display(),
        entries = entries.len(),
        "Loaded dotenv file"
    );
    Ok(entries)
}

/// Process environment overridden by `<work_dir>/.env` when present.
///
/// A missing `.env` is ignored; a malformed one is an error.
pub fn environ_snapshot(work_dir: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    // Non-unicode entries cannot be referenced by name, skip them
    let mut environ: BTreeMap<String, String> = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect();

    let dotenv = work_dir.join(DOTENV_FILE_NAME);
    if !dotenv_disabled() && dotenv.is_file() {
        environ.extend(read_dotenv_file(&dotenv)?);
    }

    Ok(environ)
}

fn dotenv_error(path: &Path, error: dotenvy::Error) -> ConfigError {
    match error {
        dotenvy::Error::LineParse(_, idx) => ConfigError::DotenvParse {
            path: path.to_path_buf(),
            error_index: idx,
        },
        dotenvy::Error::Io(io_err) => ConfigError::DotenvIo {
            path: path.to_path_buf(),
            kind: io_err.kind(),
        },
        _ => ConfigError::DotenvUnknown {
            path: path.to_path_buf(),
        },
    }
}
