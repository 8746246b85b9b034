//! Project configuration resolver and file generator for fabik.
//!
//! This crate loads `fabik.toml` together with its `.fabik.env` overlay,
//! resolves named sections against per-environment overrides, substitutes
//! placeholders and writes the results as plain files or rendered templates.

pub mod constants;
pub mod convert;
pub mod document;
pub mod error;
pub mod generate;
mod loader;
pub mod merge;
pub mod remote;
pub mod resolver;
pub mod scaffold;
pub mod validate;
pub mod writer;

pub use document::{ConfigDocument, Overlay};
pub use error::{ConfigError, ErrorKind};
pub use generate::{GeneratedFile, Generator, Invocation};
pub use loader::{ConfigLoader, ConfigPaths, environ_snapshot, read_dotenv_file, work_dir_or_cwd};
pub use merge::{merge_optional, merge_tables, merge_values};
pub use remote::{FabricConfig, RemoteTarget};
pub use resolver::{SubstitutionContext, SubstitutionStrategy, VariableResolver};
pub use scaffold::{InitReport, init_project};
pub use validate::{Validator, Validators, validate_name_work_dir, validate_tpl_dir};
pub use writer::{
    ConfigWriter, FormatRenderer, OutputFormat, OutputTarget, Renderer, TemplateRenderer,
    WriteOptions, WriteOutcome,
};
