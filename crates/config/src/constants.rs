//! Centralized constants for the fabik configuration engine.
//!
//! File names, reserved document keys and defaults used across modules live
//! here so the loader, resolver and writer agree on them.

// =============================================================================
// File names
// =============================================================================

/// Default name of the primary configuration document.
pub const PRIMARY_FILE_NAME: &str = "fabik.toml";

/// Name of the overlay document, always relative to the work directory.
pub const OVERLAY_FILE_NAME: &str = ".fabik.env";

/// Optional plain dotenv file consulted when sourcing allow-listed variables.
pub const DOTENV_FILE_NAME: &str = ".env";

/// Extension every template file carries inside the template directory.
pub const TEMPLATE_EXTENSION: &str = "liquid";

/// Marker placed between a file name and the unix timestamp of its backup.
pub const BACKUP_MARKER: &str = ".bak_";

// =============================================================================
// Defaults
// =============================================================================

/// Project name used when neither document defines `NAME`.
pub const DEFAULT_PROJECT_NAME: &str = "fabik";

/// Root under which the default deploy directory is derived.
pub const DEFAULT_DEPLOY_ROOT: &str = "/srv/app";

/// Template directory name used when `TPL_DIR` is not configured.
pub const DEFAULT_TPL_DIR_NAME: &str = "tpl";

/// Environment variable that disables reading the optional `.env` file.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";

// =============================================================================
// Reserved keys
// =============================================================================

pub const KEY_NAME: &str = "NAME";
pub const KEY_WORK_DIR: &str = "WORK_DIR";
pub const KEY_DEPLOY_DIR: &str = "DEPLOY_DIR";
pub const KEY_TPL_DIR: &str = "TPL_DIR";
pub const KEY_ENV_NAME: &str = "ENV_NAME";

/// Table of per-environment override blocks.
pub const KEY_ENV: &str = "ENV";

/// Ordered allow-list of variables sourced from the process environment.
pub const KEY_REPLACE_ENVIRON: &str = "REPLACE_ENVIRON";

/// Section holding the SSH connection parameters.
pub const KEY_FABRIC: &str = "FABRIC";

/// Section naming the remote Python executable.
pub const KEY_PYE: &str = "PYE";
