//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Locate the primary document and the overlay file.
//! - Parse both and fold the plain overlay entries into the primary document.
//! - Construct the validated `ConfigDocument`.
//!
//! Does NOT handle:
//! - Dotenv parsing details (delegated to env.rs).
//! - Path resolution rules (delegated to paths.rs).
//!
//! Invariants / Assumptions:
//! - Both files are mandatory; a missing one fails before anything is parsed.
//! - Overlay entries prefixed with `PROJECTNAME_` never reach the primary document.
//! - Plain overlay entries override primary keys of the same name.

use std::path::PathBuf;

use toml::{Table, Value};

use super::env::read_dotenv_file;
use super::paths::ConfigPaths;
use crate::document::{ConfigDocument, Overlay, project_name};
use crate::error::ConfigError;
use crate::merge::merge_tables;

/// Loads a `ConfigDocument` from disk.
#[derive(Debug, Default, Clone)]
pub struct ConfigLoader {
    work_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    overlay_path: Option<PathBuf>,
    env_name: Option<String>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the work directory (defaults to the process cwd).
    pub fn with_work_dir(mut self, work_dir: PathBuf) -> Self {
        self.work_dir = Some(work_dir);
        self
    }

    /// Override the primary document path.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Override the overlay file path (primarily for testing).
    pub fn with_overlay_path(mut self, path: PathBuf) -> Self {
        self.overlay_path = Some(path);
        self
    }

    /// Select the environment whose `ENV` block applies.
    pub fn with_env_name(mut self, env_name: impl Into<String>) -> Self {
        self.env_name = Some(env_name.into());
        self
    }

    /// Resolve the file locations this loader will read.
    pub fn paths(&self) -> Result<ConfigPaths, ConfigError> {
        let discovered = ConfigPaths::discover(self.work_dir.clone(), self.config_path.clone())?;
        match &self.overlay_path {
            Some(overlay) => ConfigPaths::new(
                discovered.work_dir().to_path_buf(),
                discovered.config_file().to_path_buf(),
                overlay.clone(),
            ),
            None => Ok(discovered),
        }
    }

    /// Load both files and build the document.
    pub fn load(self) -> Result<ConfigDocument, ConfigError> {
        let paths = self.paths()?;
        Self::load_from(&paths, self.env_name)
    }

    /// Load the files named by `paths`.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingConfigFiles` naming every missing file
    /// - `ConfigError::Decode` when the primary document is not valid TOML
    /// - `ConfigError::DotenvParse` / `ConfigError::DotenvIo` for the overlay
    /// - `ConfigError::EnvNotFound` / `ConfigError::EnvMalformed` for the selector
    pub fn load_from(
        paths: &ConfigPaths,
        env_name: Option<String>,
    ) -> Result<ConfigDocument, ConfigError> {
        let missing = paths.missing_files();
        if !missing.is_empty() {
            return Err(ConfigError::MissingConfigFiles { missing });
        }

        let config_file = paths.config_file();
        let text = std::fs::read_to_string(config_file)
            .map_err(|e| ConfigError::io(config_file, e))?;
        let primary: Table = toml::from_str(&text).map_err(|e| ConfigError::Decode {
            path: config_file.to_path_buf(),
            source: Box::new(e),
        })?;

        let overlay = read_dotenv_file(paths.overlay_file())?;
        let primary = fold_plain_overlay(&primary, &overlay);

        tracing::debug!(
            config = %config_file.display(),
            overlay = %paths.overlay_file().display(),
            env = ?env_name,
            "Loaded configuration"
        );

        ConfigDocument::new(primary, overlay, env_name)
    }
}

/// Merge overlay entries that are not project-namespaced into `primary`.
fn fold_plain_overlay(primary: &Table, overlay: &Overlay) -> Table {
    let prefix = format!("{}_", project_name(primary, overlay).to_uppercase());
    let plain: Table = overlay
        .iter()
        .filter(|(key, _)| !key.starts_with(&prefix))
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();
    merge_tables(primary, &plain)
}
