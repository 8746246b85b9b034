//! Path helpers for configuration file locations.
//!
//! Responsibilities:
//! - Determine the work directory, primary document and overlay paths.
//! - Reject relative work directories.
//!
//! Does NOT handle:
//! - File I/O beyond existence checks.

use std::path::{Path, PathBuf};

use crate::constants::{OVERLAY_FILE_NAME, PRIMARY_FILE_NAME};
use crate::error::ConfigError;

/// Locations of the files one invocation reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    work_dir: PathBuf,
    config_file: PathBuf,
    overlay_file: PathBuf,
}

impl ConfigPaths {
    /// Resolve the file locations for a work directory.
    ///
    /// `work_dir` defaults to the process cwd and must be absolute. A relative
    /// `config_file` is taken relative to the work directory; the overlay is
    /// always `<work_dir>/.fabik.env`.
    pub fn discover(
        work_dir: Option<PathBuf>,
        config_file: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let work_dir = work_dir_or_cwd(work_dir)?;
        let config_file = config_file.unwrap_or_else(|| PathBuf::from(PRIMARY_FILE_NAME));
        let config_file = if config_file.is_absolute() {
            config_file
        } else {
            work_dir.join(config_file)
        };
        let overlay_file = work_dir.join(OVERLAY_FILE_NAME);

        Ok(Self {
            work_dir,
            config_file,
            overlay_file,
        })
    }

    /// Build from explicit paths, all of which must be absolute.
    pub fn new(
        work_dir: PathBuf,
        config_file: PathBuf,
        overlay_file: PathBuf,
    ) -> Result<Self, ConfigError> {
        for path in [&work_dir, &config_file, &overlay_file] {
            require_absolute(path)?;
        }
        Ok(Self {
            work_dir,
            config_file,
            overlay_file,
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn overlay_file(&self) -> &Path {
        &self.overlay_file
    }

    /// Join `parts` onto the work directory.
    pub fn dir<I, P>(&self, parts: I) -> PathBuf
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        parts
            .into_iter()
            .fold(self.work_dir.clone(), |acc, part| acc.join(part))
    }

    /// Primary and overlay files that do not exist, in that order.
    pub fn missing_files(&self) -> Vec<PathBuf> {
        [&self.config_file, &self.overlay_file]
            .into_iter()
            .filter(|p| !p.exists())
            .cloned()
            .collect()
    }

    /// True when both the primary and the overlay file exist.
    pub fn files_exist(&self) -> bool {
        self.missing_files().is_empty()
    }
}

/// Use `work_dir` if given, else the process cwd; either must be absolute.
pub fn work_dir_or_cwd(work_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let work_dir = match work_dir {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(ConfigError::CurrentDir)?,
    };
    require_absolute(&work_dir)?;
    Ok(work_dir)
}

pub(crate) fn require_absolute(path: &Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(ConfigError::RelativePath {
            path: path.to_path_buf(),
        })
    }
}
