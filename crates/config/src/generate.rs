//! Batch generation of files from resolved sections.
//!
//! Responsibilities:
//! - Carry one invocation's settings (work dir, env, force, output target).
//! - Resolve each requested section and write it by format or by template.
//!
//! Invariants / Assumptions:
//! - Every template is loaded and every section resolved before the first
//!   write, so a missing template or section leaves the file system untouched.
//! - The env postfix, when requested, is `.<env>` appended to the file name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::constants::TEMPLATE_EXTENSION;
use crate::document::ConfigDocument;
use crate::error::ConfigError;
use crate::loader::{ConfigLoader, ConfigPaths};
use crate::resolver::{SubstitutionStrategy, VariableResolver};
use crate::validate::Validators;
use crate::writer::{
    ConfigWriter, FormatRenderer, OutputFormat, OutputTarget, Renderer, TemplateRenderer,
    WriteOptions, WriteOutcome, env_postfix,
};

/// Settings for one run, passed explicitly instead of living in global state.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub work_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub env_name: Option<String>,
    pub force: bool,
    pub backup: bool,
    pub output_dir: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub strategy: SubstitutionStrategy,
    /// Replaces the process environment and `.env` when set.
    pub environ: Option<BTreeMap<String, String>>,
}

impl Invocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_work_dir(mut self, work_dir: PathBuf) -> Self {
        self.work_dir = Some(work_dir);
        self
    }

    pub fn with_config_file(mut self, config_file: PathBuf) -> Self {
        self.config_file = Some(config_file);
        self
    }

    pub fn with_env_name(mut self, env_name: impl Into<String>) -> Self {
        self.env_name = Some(env_name.into());
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = Some(output_dir);
        self
    }

    pub fn with_output_file(mut self, output_file: PathBuf) -> Self {
        self.output_file = Some(output_file);
        self
    }

    pub fn with_strategy(mut self, strategy: SubstitutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_environ(mut self, environ: BTreeMap<String, String>) -> Self {
        self.environ = Some(environ);
        self
    }

    fn target(&self) -> OutputTarget {
        let mut target = OutputTarget::new();
        if let Some(dir) = &self.output_dir {
            target = target.with_output_dir(dir.clone());
        }
        if let Some(file) = &self.output_file {
            target = target.with_output_file(file.clone());
        }
        target
    }
}

/// One file produced by a generation batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub section: String,
    pub destination: PathBuf,
    pub outcome: WriteOutcome,
}

/// A loaded project ready to generate files.
#[derive(Debug)]
pub struct Generator {
    invocation: Invocation,
    paths: ConfigPaths,
    document: ConfigDocument,
}

impl Generator {
    /// Load the project named by `invocation` and run `validators` on it.
    pub fn load(invocation: Invocation, validators: &Validators) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new();
        if let Some(work_dir) = &invocation.work_dir {
            loader = loader.with_work_dir(work_dir.clone());
        }
        if let Some(config_file) = &invocation.config_file {
            loader = loader.with_config_path(config_file.clone());
        }
        let paths = loader.paths()?;
        let document = ConfigLoader::load_from(&paths, invocation.env_name.clone())?;
        validators.run(&document)?;

        tracing::debug!(
            work_dir = %paths.work_dir().display(),
            env = ?invocation.env_name,
            force = invocation.force,
            backup = invocation.backup,
            "Loaded project"
        );
        Ok(Self {
            invocation,
            paths,
            document,
        })
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    /// A resolver over the loaded document.
    pub fn resolver(&self) -> Result<VariableResolver<'_>, ConfigError> {
        let work_dir = self.paths.work_dir();
        let resolver = match &self.invocation.environ {
            Some(environ) => {
                VariableResolver::with_environ(&self.document, work_dir, environ.clone())?
            }
            None => VariableResolver::new(&self.document, work_dir)?,
        };
        Ok(resolver.with_strategy(self.invocation.strategy))
    }

    /// Write each section in the format its name selects.
    ///
    /// With an explicit output file, that file's name selects the format.
    pub fn make(
        &self,
        names: &[&str],
        with_env_postfix: bool,
    ) -> Result<Vec<GeneratedFile>, ConfigError> {
        self.check_output_file(names)?;
        let output_name = self
            .invocation
            .output_file
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str());
        let jobs = names
            .iter()
            .map(|name| {
                let renderer = match output_name {
                    Some(output) => {
                        FormatRenderer::for_name(*name).with_format(OutputFormat::from_name(output))
                    }
                    None => FormatRenderer::for_name(*name),
                };
                (*name, renderer)
            })
            .collect::<Vec<_>>();
        self.run(&jobs, with_env_postfix)
    }

    /// Write each section through the template of the same name.
    ///
    /// Names may carry or omit the template extension. Every template is
    /// loaded before anything is written.
    pub fn from_templates(
        &self,
        names: &[&str],
        with_env_postfix: bool,
    ) -> Result<Vec<GeneratedFile>, ConfigError> {
        self.check_output_file(names)?;
        let tpl_dir = self.resolver()?.tpl_dir();
        let jobs = names
            .iter()
            .map(|name| {
                let section = strip_template_extension(name);
                TemplateRenderer::load(&tpl_dir, section).map(|renderer| (section, renderer))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.run(&jobs, with_env_postfix)
    }

    /// Resolve every section, then write them in order.
    fn run<R: Renderer>(
        &self,
        jobs: &[(&str, R)],
        with_env_postfix: bool,
    ) -> Result<Vec<GeneratedFile>, ConfigError> {
        let resolver = self.resolver()?;
        let resolved = jobs
            .iter()
            .map(|(section, _)| resolver.resolve(section))
            .collect::<Result<Vec<_>, _>>()?;

        let postfix = if with_env_postfix {
            env_postfix(self.document.env_name())
        } else {
            String::new()
        };
        let target = self.invocation.target();
        let writer = ConfigWriter::new(WriteOptions {
            force: self.invocation.force,
            backup: self.invocation.backup,
        });

        jobs.iter()
            .zip(&resolved)
            .map(|((section, renderer), values)| {
                let destination = target.destination(self.paths.work_dir(), section, &postfix);
                let outcome = writer.write(renderer, values, &destination)?;
                Ok(GeneratedFile {
                    section: section.to_string(),
                    destination,
                    outcome,
                })
            })
            .collect()
    }

    fn check_output_file(&self, names: &[&str]) -> Result<(), ConfigError> {
        if self.invocation.output_file.is_some() && names.len() > 1 {
            return Err(ConfigError::InvalidValue {
                key: "output_file".to_string(),
                message: "only one section can be written to an explicit output file".to_string(),
            });
        }
        Ok(())
    }
}

fn strip_template_extension(name: &str) -> &str {
    name.strip_suffix(&format!(".{TEMPLATE_EXTENSION}"))
        .filter(|section| !section.is_empty())
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_template_extension() {
        assert_eq!(strip_template_extension("nginx.conf.liquid"), "nginx.conf");
        assert_eq!(strip_template_extension("nginx.conf"), "nginx.conf");
        assert_eq!(strip_template_extension("liquid"), "liquid");
    }
}
