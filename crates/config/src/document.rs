//! Typed access to the loaded primary and overlay documents.
//!
//! Responsibilities:
//! - Nested lookup and assignment by key path.
//! - Environment-selector validation against the `ENV` block.
//! - Derivation of the namespaced environment variable names.
//!
//! Does NOT handle:
//! - Reading files (see `loader`).
//! - Placeholder substitution (see `resolver`).
//!
//! Invariants:
//! - A document with a selector always has a matching `ENV.<selector>` table.
//! - The project name is fixed at construction time.

use std::collections::BTreeMap;

use toml::{Table, Value};

use crate::constants::{DEFAULT_PROJECT_NAME, KEY_ENV, KEY_NAME};
use crate::error::ConfigError;

/// Flat `KEY=VALUE` entries read from the overlay file.
pub type Overlay = BTreeMap<String, String>;

/// The primary document plus the overlay it was loaded with.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    primary: Table,
    overlay: Overlay,
    project_name: String,
    env_name: Option<String>,
}

impl ConfigDocument {
    /// Build a document and validate the environment selector.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EnvNotFound` or `ConfigError::EnvMalformed` when
    /// `env_name` is set but the primary document has no usable `ENV.<env_name>`.
    pub fn new(
        primary: Table,
        overlay: Overlay,
        env_name: Option<String>,
    ) -> Result<Self, ConfigError> {
        let project_name = project_name(&primary, &overlay);
        let document = Self {
            primary,
            overlay,
            project_name,
            env_name,
        };
        document.validate_env_selector()?;
        Ok(document)
    }

    pub fn primary(&self) -> &Table {
        &self.primary
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Project name: overlay `NAME`, then primary `NAME`, then the built-in default.
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn env_name(&self) -> Option<&str> {
        self.env_name.as_deref()
    }

    /// Nested lookup; `None` when any segment is missing or not a table.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        lookup(&self.primary, path)
    }

    /// Nested lookup falling back to `default`.
    pub fn get_or<'a>(&'a self, path: &[&str], default: &'a Value) -> &'a Value {
        self.get(path).unwrap_or(default)
    }

    /// Nested string lookup.
    pub fn get_str(&self, path: &[&str]) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Nested assignment, creating intermediate tables as needed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotATable` when an intermediate segment exists but
    /// holds a non-table value.
    pub fn set(&mut self, path: &[&str], value: Value) -> Result<(), ConfigError> {
        let Some((last, parents)) = path.split_last() else {
            return Ok(());
        };

        let mut current = &mut self.primary;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            current = match entry {
                Value::Table(table) => table,
                _ => {
                    return Err(ConfigError::NotATable {
                        key: path.join("."),
                        segment: segment.to_string(),
                    });
                }
            };
        }
        current.insert(last.to_string(), value);
        Ok(())
    }

    /// Name of the process environment variable that feeds `key`.
    ///
    /// `PROJECT_ENV_KEY` when a selector is active, `PROJECT_KEY` otherwise.
    pub fn derive_env_var_name(&self, key: &str) -> String {
        match &self.env_name {
            Some(env) => format!(
                "{}_{}_{}",
                self.project_name.to_uppercase(),
                env.to_uppercase(),
                key
            ),
            None => format!("{}_{}", self.project_name.to_uppercase(), key),
        }
    }

    /// Check that the selector, if any, names a table under `ENV`.
    pub fn validate_env_selector(&self) -> Result<(), ConfigError> {
        let Some(env) = &self.env_name else {
            return Ok(());
        };
        let envs = match self.primary.get(KEY_ENV) {
            Some(Value::Table(envs)) if !envs.is_empty() => envs,
            _ => return Err(ConfigError::EnvMalformed(env.clone())),
        };
        match envs.get(env) {
            Some(Value::Table(_)) => Ok(()),
            Some(_) => Err(ConfigError::EnvMalformed(env.clone())),
            None => Err(ConfigError::EnvNotFound(env.clone())),
        }
    }

    /// Look up `ENV.<selector>.<section>[.<key>]`.
    ///
    /// Always `None` without a selector.
    pub fn get_env_override(&self, section: &str, key: Option<&str>) -> Option<&Value> {
        let env = self.env_name.as_deref()?;
        let mut path = vec![KEY_ENV, env, section];
        if let Some(key) = key {
            path.push(key);
        }
        self.get(&path)
    }

    /// Overlay value for `key`, ignoring empty strings.
    pub fn overlay_value(&self, key: &str) -> Option<&str> {
        self.overlay
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

fn lookup<'a>(table: &'a Table, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = table.get(*first)?;
    for segment in rest {
        current = current.as_table()?.get(*segment)?;
    }
    Some(current)
}

/// Project name precedence: overlay `NAME` > primary `NAME` > default.
pub(crate) fn project_name(primary: &Table, overlay: &Overlay) -> String {
    overlay
        .get(KEY_NAME)
        .filter(|name| !name.is_empty())
        .cloned()
        .or_else(|| {
            primary
                .get(KEY_NAME)
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string())
}
