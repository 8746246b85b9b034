//! Rendering a resolved table to text.
//!
//! Two renderers share one interface: `FormatRenderer` serializes by output
//! format, `TemplateRenderer` renders a template file from the template dir.

use std::path::{Path, PathBuf};

use serde::Serialize;
use toml::Table;

use crate::constants::{DOTENV_FILE_NAME, TEMPLATE_EXTENSION};
use crate::convert::{table_to_json, table_to_liquid, value_to_plain};
use crate::error::ConfigError;

/// Turns a resolved table into file content.
pub trait Renderer {
    fn render(&self, values: &Table) -> Result<String, ConfigError>;
}

/// Serialization chosen from a section or file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Names ending in `.toml`.
    Toml,
    /// `.env` and dotfiles ending in `.env`: `KEY = VALUE` lines.
    KeyValue,
    /// Anything else: JSON indented by four spaces.
    Json,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Self {
        if name.ends_with(".toml") {
            OutputFormat::Toml
        } else if name == DOTENV_FILE_NAME
            || (name.starts_with('.') && name.ends_with(DOTENV_FILE_NAME))
        {
            OutputFormat::KeyValue
        } else {
            OutputFormat::Json
        }
    }
}

/// Serializes the table in one `OutputFormat`.
#[derive(Debug, Clone)]
pub struct FormatRenderer {
    name: String,
    format: OutputFormat,
}

impl FormatRenderer {
    /// Renderer for section `name`, format chosen from the name.
    pub fn for_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let format = OutputFormat::from_name(&name);
        Self { name, format }
    }

    /// Render `format` regardless of the section name.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

impl Renderer for FormatRenderer {
    fn render(&self, values: &Table) -> Result<String, ConfigError> {
        match self.format {
            OutputFormat::Toml => toml::to_string(values).map_err(|e| ConfigError::Serialize {
                section: self.name.clone(),
                source: e,
            }),
            OutputFormat::KeyValue => Ok(values
                .iter()
                .map(|(key, value)| format!("{key} = {}\n", value_to_plain(value)))
                .collect()),
            OutputFormat::Json => {
                let mut buf = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
                table_to_json(values).serialize(&mut serializer)?;
                Ok(String::from_utf8_lossy(&buf).into_owned())
            }
        }
    }
}

/// Renders a `<name>.liquid` template against the table.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    name: String,
    path: PathBuf,
    source: String,
}

impl TemplateRenderer {
    /// Path of the template for `name` inside `tpl_dir`.
    ///
    /// The template extension is appended unless `name` already carries it.
    pub fn template_path(tpl_dir: &Path, name: &str) -> PathBuf {
        let suffix = format!(".{TEMPLATE_EXTENSION}");
        if name.ends_with(&suffix) {
            tpl_dir.join(name)
        } else {
            tpl_dir.join(format!("{name}{suffix}"))
        }
    }

    /// Read the template for `name` from `tpl_dir`.
    ///
    /// # Errors
    ///
    /// - `ConfigError::TemplateNotFound` when the file does not exist
    /// - `ConfigError::Io` when it cannot be read
    pub fn load(tpl_dir: &Path, name: &str) -> Result<Self, ConfigError> {
        let path = Self::template_path(tpl_dir, name);
        if !path.is_file() {
            return Err(ConfigError::TemplateNotFound { path });
        }
        let source = std::fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
        Ok(Self {
            name: name.to_string(),
            path,
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, values: &Table) -> Result<String, ConfigError> {
        let template_error = |source| ConfigError::Template {
            name: self.name.clone(),
            source,
        };
        let globals = table_to_liquid(values).map_err(template_error)?;
        liquid::ParserBuilder::with_stdlib()
            .build()
            .and_then(|parser| parser.parse(&self.source))
            .and_then(|template| template.render(&globals))
            .map_err(template_error)
    }
}
