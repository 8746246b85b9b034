//! Tests for the configuration loader.
//!
//! Responsibilities:
//! - Test file discovery and the both-files-required rule.
//! - Test overlay parsing, folding and project name precedence.
//! - Test environment selector validation during load.
//!
//! Invariants:
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::path::Path;

pub mod basic_tests;

/// Write `fabik.toml` and `.fabik.env` into `dir`.
pub fn write_project(dir: &Path, primary: &str, overlay: &str) {
    std::fs::write(dir.join("fabik.toml"), primary).unwrap();
    std::fs::write(dir.join(".fabik.env"), overlay).unwrap();
}
