//! Configuration loader for the primary document and its overlay.
//!
//! Responsibilities:
//! - Locate `fabik.toml` and `.fabik.env` relative to the work directory.
//! - Parse both and build a `ConfigDocument`.
//! - Snapshot environment variables for placeholder substitution.
//!
//! Does NOT handle:
//! - Resolving sections or substituting placeholders (see `resolver`).
//! - Writing generated files (see `writer`).
//!
//! Invariants / Assumptions:
//! - Overlay entries take precedence over primary keys of the same name.
//! - The overlay is parsed into memory; it is never exported to the process env.

mod builder;
mod env;
mod paths;

#[cfg(test)]
mod tests;

pub use builder::ConfigLoader;
pub use env::{environ_snapshot, read_dotenv_file};
pub use paths::{ConfigPaths, work_dir_or_cwd};

pub(crate) use paths::require_absolute;
