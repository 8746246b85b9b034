//! Section resolution and placeholder substitution.
//!
//! Responsibilities:
//! - Merge a top-level section with its `ENV.<selector>` override.
//! - Build the substitution context from the meta variables and the
//!   `REPLACE_ENVIRON` allow-list.
//! - Substitute placeholders across the whole section and re-inject the meta
//!   variables into the result.
//!
//! Does NOT handle:
//! - Loading documents (see `loader`).
//! - Writing resolved sections (see `writer`).
//!
//! Invariants / Assumptions:
//! - The document is borrowed immutably; every `resolve` builds a fresh table.
//! - An unset placeholder is an error, never an empty string.
//! - The environ snapshot is taken once at construction and never re-read.

mod substitute;

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use toml::{Table, Value};

use crate::constants::{
    DEFAULT_DEPLOY_ROOT, DEFAULT_TPL_DIR_NAME, KEY_DEPLOY_DIR, KEY_ENV_NAME, KEY_NAME,
    KEY_REPLACE_ENVIRON, KEY_TPL_DIR, KEY_WORK_DIR,
};
use crate::document::ConfigDocument;
use crate::error::ConfigError;
use crate::loader::environ_snapshot;
use crate::merge::merge_optional;

pub use substitute::{SubstitutionContext, SubstitutionStrategy};

use substitute::Substituter;

/// Resolves sections of one document.
#[derive(Debug, Clone)]
pub struct VariableResolver<'a> {
    document: &'a ConfigDocument,
    meta: Table,
    replace_environ: Vec<String>,
    environ: BTreeMap<String, String>,
    strategy: SubstitutionStrategy,
}

impl<'a> VariableResolver<'a> {
    /// Create a resolver for `document`, snapshotting the process environment
    /// and `<work_dir>/.env`.
    ///
    /// `work_dir` is the fallback for `WORK_DIR` when neither document sets it.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidValue` when a meta variable is not a string,
    ///   `DEPLOY_DIR` is relative or `REPLACE_ENVIRON` is not a list of strings
    /// - dotenv errors from a malformed `<work_dir>/.env`
    pub fn new(document: &'a ConfigDocument, work_dir: &Path) -> Result<Self, ConfigError> {
        let environ = environ_snapshot(work_dir)?;
        Self::with_environ(document, work_dir, environ)
    }

    /// Create a resolver with an explicit environ instead of the process one.
    pub fn with_environ(
        document: &'a ConfigDocument,
        work_dir: &Path,
        environ: BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let meta = meta_vars(document, work_dir)?;
        let mut resolver = Self {
            document,
            meta,
            replace_environ: Vec::new(),
            environ,
            strategy: SubstitutionStrategy::default(),
        };
        resolver.replace_environ = resolver.read_replace_environ()?;

        tracing::debug!(
            name = document.project_name(),
            env = ?document.env_name(),
            replace_environ = ?resolver.replace_environ,
            "Created resolver"
        );
        Ok(resolver)
    }

    /// Use `strategy` for every subsequent `resolve`.
    pub fn with_strategy(mut self, strategy: SubstitutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn document(&self) -> &'a ConfigDocument {
        self.document
    }

    pub fn strategy(&self) -> SubstitutionStrategy {
        self.strategy
    }

    /// `NAME`, `WORK_DIR`, `DEPLOY_DIR`, `TPL_DIR` and, with a selector, `ENV_NAME`.
    pub fn meta_vars(&self) -> &Table {
        &self.meta
    }

    pub fn replace_environ(&self) -> &[String] {
        &self.replace_environ
    }

    pub fn work_dir(&self) -> PathBuf {
        self.meta_path(KEY_WORK_DIR)
    }

    pub fn deploy_dir(&self) -> PathBuf {
        self.meta_path(KEY_DEPLOY_DIR)
    }

    pub fn tpl_dir(&self) -> PathBuf {
        self.meta_path(KEY_TPL_DIR)
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.meta
            .get(key)
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .unwrap_or_default()
    }

    /// Value of section `name`, combined with its `ENV.<selector>` override.
    ///
    /// With `merge`, two tables are merged structurally (override wins) and
    /// any other combination lets the override replace the base. Without
    /// `merge`, the override replaces the base wholesale when present.
    ///
    /// # Errors
    ///
    /// `ConfigError::SectionNotFound` when `require_present` is set and the
    /// primary document has no `name` key.
    pub fn get_section_value(
        &self,
        name: &str,
        merge: bool,
        require_present: bool,
    ) -> Result<Option<Value>, ConfigError> {
        let base = self.document.get(&[name]);
        if require_present && base.is_none() {
            return Err(ConfigError::SectionNotFound(name.to_string()));
        }
        let env_override = self.document.get_env_override(name, None);

        let value = if merge {
            merge_optional(base, env_override)
        } else {
            env_override.or(base).cloned()
        };

        tracing::debug!(section = name, merge, found = value.is_some(), "Section value");
        Ok(value)
    }

    /// Meta variables plus allow-listed variables that have a value.
    ///
    /// Each allow-listed name is looked up under its derived variable name,
    /// first in the overlay document, then in the environ snapshot.
    pub fn substitution_context(&self) -> SubstitutionContext {
        let mut context = SubstitutionContext {
            values: self.meta.clone(),
            environ_keys: BTreeMap::new(),
        };

        for name in &self.replace_environ {
            let environ_key = self.document.derive_env_var_name(name);
            let value = self
                .document
                .overlay_value(&environ_key)
                .or_else(|| self.environ.get(&environ_key).map(String::as_str));
            if let Some(value) = value {
                context
                    .values
                    .insert(name.clone(), Value::String(value.to_string()));
            }
            context.environ_keys.insert(name.clone(), environ_key);
        }

        context
    }

    /// Substitute placeholders in `text`.
    ///
    /// # Errors
    ///
    /// `ConfigError::Substitution` naming the first undefined placeholder.
    pub fn substitute(&self, text: &str) -> Result<String, ConfigError> {
        let context = self.substitution_context();
        Substituter::new(&context)?.render(text)
    }

    /// Resolve section `name` into a fully substituted table.
    ///
    /// A section that is not a table resolves to `{ <name> = <value> }`. The
    /// meta variables are written into the top level of the result.
    ///
    /// # Errors
    ///
    /// - `ConfigError::SectionNotFound` when the primary document lacks `name`
    /// - `ConfigError::Substitution` for an undefined placeholder
    /// - `ConfigError::Reparse` when text substitution breaks the TOML grammar
    pub fn resolve(&self, name: &str) -> Result<Table, ConfigError> {
        let section = match self.get_section_value(name, true, true)? {
            Some(Value::Table(table)) => table,
            Some(other) => Table::from_iter([(name.to_string(), other)]),
            None => return Err(ConfigError::SectionNotFound(name.to_string())),
        };

        let context = self.substitution_context();
        let mut resolved = Substituter::new(&context)?.section(name, &section, self.strategy)?;
        for (key, value) in &self.meta {
            resolved.insert(key.clone(), value.clone());
        }

        tracing::debug!(section = name, strategy = ?self.strategy, "Resolved section");
        Ok(resolved)
    }

    fn read_replace_environ(&self) -> Result<Vec<String>, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: KEY_REPLACE_ENVIRON.to_string(),
            message: "must be a list of strings".to_string(),
        };
        match self.get_section_value(KEY_REPLACE_ENVIRON, false, false)? {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                .collect(),
            Some(_) => Err(invalid()),
        }
    }
}

/// Compute the meta variables: overlay value > primary value > default.
fn meta_vars(document: &ConfigDocument, work_dir: &Path) -> Result<Table, ConfigError> {
    let name = document.project_name().to_string();

    // Relative WORK_DIR is taken from the loader's work dir, relative TPL_DIR from WORK_DIR
    let work_dir = match configured(document, KEY_WORK_DIR)? {
        Some(dir) => anchored(work_dir, &dir),
        None => work_dir.display().to_string(),
    };
    let tpl_dir = anchored(
        Path::new(&work_dir),
        &configured(document, KEY_TPL_DIR)?.unwrap_or_else(|| DEFAULT_TPL_DIR_NAME.to_string()),
    );
    let deploy_dir = configured(document, KEY_DEPLOY_DIR)?
        .unwrap_or_else(|| format!("{DEFAULT_DEPLOY_ROOT}/{name}"));
    if !Path::new(&deploy_dir).is_absolute() {
        return Err(ConfigError::InvalidValue {
            key: KEY_DEPLOY_DIR.to_string(),
            message: format!("must be an absolute path, got {deploy_dir}"),
        });
    }

    let mut meta = Table::new();
    meta.insert(KEY_NAME.to_string(), Value::String(name));
    meta.insert(KEY_WORK_DIR.to_string(), Value::String(work_dir));
    meta.insert(KEY_DEPLOY_DIR.to_string(), Value::String(deploy_dir));
    meta.insert(KEY_TPL_DIR.to_string(), Value::String(tpl_dir));
    if let Some(env) = document.env_name() {
        meta.insert(KEY_ENV_NAME.to_string(), Value::String(env.to_string()));
    }
    Ok(meta)
}

/// `value` joined onto `base` unless already absolute, without `.` components.
fn anchored(base: &Path, value: &str) -> String {
    base.join(value)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect::<PathBuf>()
        .display()
        .to_string()
}

fn configured(document: &ConfigDocument, key: &str) -> Result<Option<String>, ConfigError> {
    if let Some(value) = document.overlay_value(key) {
        return Ok(Some(value.to_string()));
    }
    match document.get(&[key]) {
        None => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be a string".to_string(),
        }),
    }
}
