//! Error types for the configuration engine.
//!
//! Responsibilities:
//! - Define one error variant per failure of loading, resolving and writing.
//! - Classify every variant into the coarse kinds callers branch on.
//!
//! Does NOT handle:
//! - Turning errors into user-facing output or exit codes (the CLI layer does).
//!
//! Invariants:
//! - All error variants include context for debugging (paths, keys, sections).
//! - Dotenv and reparse errors NEVER include raw line contents to prevent secret leakage.
//! - Substitution errors display only the names of the context entries; the
//!   values stay available on the variant for programmatic diagnosis.

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required path is relative or does not exist.
    Path,
    /// A document failed to decode, a section is missing or a value is malformed.
    Config,
    /// The environment selector is undefined or the `ENV` block is malformed.
    Env,
    /// A template file is missing or failed to render.
    Template,
    /// Reading or writing a file failed.
    Io,
}

/// Errors that can occur while loading, resolving or writing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{} is not an absolute path", path.display())]
    RelativePath { path: PathBuf },

    #[error("{} does not exist", path.display())]
    PathNotFound { path: PathBuf },

    #[error("Unable to determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("Required config files not found: {}", display_paths(missing))]
    MissingConfigFiles { missing: Vec<PathBuf> },

    #[error("Decode {} error: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    /// The overlay file has invalid syntax.
    ///
    /// SAFETY: only the byte index is kept, never the offending line.
    #[error("Failed to parse {} at position {error_index}", path.display())]
    DotenvParse { path: PathBuf, error_index: usize },

    #[error("Failed to read {}: {kind}", path.display())]
    DotenvIo {
        path: PathBuf,
        kind: std::io::ErrorKind,
    },

    /// Unknown dotenv error (future variants from the dotenvy crate).
    #[error("Failed to load {}", path.display())]
    DotenvUnknown { path: PathBuf },

    #[error("Section \"{0}\" not found in the primary document")]
    SectionNotFound(String),

    #[error("Key \"{0}\" not found in config")]
    MissingKey(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Cannot set \"{key}\": \"{segment}\" is not a table")]
    NotATable { key: String, segment: String },

    #[error("Failed to serialize section \"{section}\": {source}")]
    Serialize {
        section: String,
        #[source]
        source: toml::ser::Error,
    },

    /// Substituted text of a section no longer parses.
    ///
    /// SAFETY: only the position is kept; the failing line may hold a secret.
    #[error(
        "Section \"{section}\" is no longer valid TOML after substitution (line {line}, column {column})"
    )]
    Reparse {
        section: String,
        line: usize,
        column: usize,
    },

    #[error("Failed to encode output as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Environment \"{0}\" is not defined under ENV")]
    EnvNotFound(String),

    #[error("ENV must be a table when environment \"{0}\" is selected")]
    EnvMalformed(String),

    #[error("Template file {} not found", path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("Template \"{name}\" failed to render: {source}")]
    Template {
        name: String,
        #[source]
        source: liquid::Error,
    },

    #[error(
        "Placeholder \"{key}\" is not defined (environ keys: {environ_keys:?}, context keys: {:?})",
        context.keys().collect::<Vec<_>>()
    )]
    Substitution {
        key: String,
        environ_keys: BTreeMap<String, String>,
        context: BTreeMap<String, String>,
        #[source]
        source: liquid::Error,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::RelativePath { .. }
            | ConfigError::PathNotFound { .. }
            | ConfigError::CurrentDir(_) => ErrorKind::Path,
            ConfigError::MissingConfigFiles { .. }
            | ConfigError::Decode { .. }
            | ConfigError::DotenvParse { .. }
            | ConfigError::DotenvUnknown { .. }
            | ConfigError::SectionNotFound(_)
            | ConfigError::MissingKey(_)
            | ConfigError::InvalidValue { .. }
            | ConfigError::NotATable { .. }
            | ConfigError::Serialize { .. }
            | ConfigError::Reparse { .. }
            | ConfigError::Json(_) => ErrorKind::Config,
            ConfigError::EnvNotFound(_) | ConfigError::EnvMalformed(_) => ErrorKind::Env,
            ConfigError::TemplateNotFound { .. }
            | ConfigError::Template { .. }
            | ConfigError::Substitution { .. } => ErrorKind::Template,
            ConfigError::DotenvIo { .. } | ConfigError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
