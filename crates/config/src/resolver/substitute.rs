//! Placeholder substitution over resolved sections.
//!
//! Two strategies reach every string at every depth:
//! - `TextRoundTrip` serializes the section to TOML, renders the text once and
//!   parses it back. A substituted value that breaks the TOML grammar surfaces
//!   as `ConfigError::Reparse`, which reports the position but not the text.
//! - `TreeWalk` renders each string leaf in place and cannot break the grammar.
//!
//! Placeholders use `{{ NAME }}` syntax. Referencing a variable missing from
//! the context is an error, never an empty string.

use std::collections::BTreeMap;

use toml::{Table, Value};

use crate::convert::{table_to_liquid, value_to_plain};
use crate::error::ConfigError;

/// How a section's strings are substituted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubstitutionStrategy {
    /// Serialize, substitute the whole text, reparse.
    #[default]
    TextRoundTrip,
    /// Substitute each string value in place.
    TreeWalk,
}

/// Variables available to placeholders, plus the env-var names they came from.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionContext {
    pub(crate) values: Table,
    pub(crate) environ_keys: BTreeMap<String, String>,
}

impl SubstitutionContext {
    pub fn values(&self) -> &Table {
        &self.values
    }

    /// Allow-listed name -> environment variable name consulted for it.
    pub fn environ_keys(&self) -> &BTreeMap<String, String> {
        &self.environ_keys
    }
}

/// Renders text against a fixed context.
pub(crate) struct Substituter<'a> {
    parser: liquid::Parser,
    globals: liquid::Object,
    context: &'a SubstitutionContext,
}

impl<'a> Substituter<'a> {
    pub(crate) fn new(context: &'a SubstitutionContext) -> Result<Self, ConfigError> {
        let parser = liquid::ParserBuilder::with_stdlib()
            .build()
            .map_err(|e| template_error("substitution", e))?;
        let globals =
            table_to_liquid(&context.values).map_err(|e| template_error("substitution", e))?;
        Ok(Self {
            parser,
            globals,
            context,
        })
    }

    /// Render `text` against the context.
    pub(crate) fn render(&self, text: &str) -> Result<String, ConfigError> {
        self.parser
            .parse(text)
            .and_then(|template| template.render(&self.globals))
            .map_err(|e| self.diagnose(text, e))
    }

    /// Substitute every string of `section` with the chosen strategy.
    pub(crate) fn section(
        &self,
        name: &str,
        section: &Table,
        strategy: SubstitutionStrategy,
    ) -> Result<Table, ConfigError> {
        match strategy {
            SubstitutionStrategy::TextRoundTrip => {
                let text = toml::to_string(section).map_err(|e| ConfigError::Serialize {
                    section: name.to_string(),
                    source: e,
                })?;
                let rendered = self.render(&text)?;
                toml::from_str(&rendered).map_err(|e| {
                    let offset = e.span().map_or(0, |span| span.start);
                    let (line, column) = line_column(&rendered, offset);
                    ConfigError::Reparse {
                        section: name.to_string(),
                        line,
                        column,
                    }
                })
            }
            SubstitutionStrategy::TreeWalk => section
                .iter()
                .map(|(key, value)| Ok((key.clone(), self.walk(value)?)))
                .collect(),
        }
    }

    fn walk(&self, value: &Value) -> Result<Value, ConfigError> {
        Ok(match value {
            Value::String(s) => Value::String(self.render(s)?),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.walk(item))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Table(table) => Value::Table(
                table
                    .iter()
                    .map(|(key, item)| Ok((key.clone(), self.walk(item)?)))
                    .collect::<Result<_, ConfigError>>()?,
            ),
            other => other.clone(),
        })
    }

    /// Name the first placeholder the context cannot satisfy.
    fn diagnose(&self, text: &str, source: liquid::Error) -> ConfigError {
        match placeholder_names(text)
            .into_iter()
            .find(|name| !self.context.values.contains_key(*name))
        {
            Some(key) => ConfigError::Substitution {
                key: key.to_string(),
                environ_keys: self.context.environ_keys.clone(),
                context: self
                    .context
                    .values
                    .iter()
                    .map(|(k, v)| (k.clone(), value_to_plain(v)))
                    .collect(),
                source,
            },
            None => template_error("substitution", source),
        }
    }
}

fn template_error(name: &str, source: liquid::Error) -> ConfigError {
    ConfigError::Template {
        name: name.to_string(),
        source,
    }
}

/// 1-based line and column of byte `offset` in `text`.
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before, |idx| &before[idx + 1..])
        .chars()
        .count()
        + 1;
    (line, column)
}

/// Root variable names referenced by `{{ ... }}` placeholders, in order.
pub(crate) fn placeholder_names(text: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let inner = after[..end].trim_start_matches('-').trim_start();
        let ident_len = inner
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(inner.len());
        if ident_len > 0 {
            names.push(&inner[..ident_len]);
        }
        rest = &after[end + 2..];
    }
    names
}
