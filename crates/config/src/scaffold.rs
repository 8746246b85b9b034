//! Starter `fabik.toml` and `.fabik.env` for a new project.
//!
//! The project name defaults to the work directory's name. Existing files are
//! skipped unless overwriting is forced.

use std::path::{Path, PathBuf};

use crate::constants::{OVERLAY_FILE_NAME, PRIMARY_FILE_NAME};
use crate::error::ConfigError;
use crate::loader::work_dir_or_cwd;
use crate::writer::atomic_write;

const PRIMARY_HEADER: &str = r#"###########################################
# fabik main config file
#
# @create:  {{ create_time }}
# @version: {{ fabik_version }}
#
# Placeholders such as {% raw %}{{ NAME }}{% endraw %} inside a section are replaced when the
# section is generated. NAME, WORK_DIR, DEPLOY_DIR and TPL_DIR are always
# available, ENV_NAME when an environment is selected.
###########################################

# Project name, also the prefix of environment variable names.
NAME = '{{ NAME }}'

# Absolute path of the project source folder.
WORK_DIR = '{{ WORK_DIR }}'

# Folder holding the *.liquid templates.
TPL_DIR = '{{ WORK_DIR }}/tpl'
"#;

const PRIMARY_FULL_BODY: &str = r#"
# Absolute path of the deploy folder on the server.
DEPLOY_DIR = '/srv/app/{{ NAME }}'

# Python executable on the server.
PYE = 'python3'

# Placeholders filled from environment variables. With `--env prod`,
# {% raw %}{{ ADMIN_NAME }}{% endraw %} is read from {{ NAME | upcase }}_PROD_ADMIN_NAME.
REPLACE_ENVIRON = [
    'ADMIN_NAME',
    'ADMIN_PASSWORD',
]

# SSH connection used for deployment.
[FABRIC]
host = 'localhost'
user = 'app'

#==============================================
# Per-environment overrides, merged onto the sections above.
# Same-name keys are replaced, other keys are kept.
#==============================================
[ENV.local.FABRIC]
host = '127.0.0.1'

[ENV.prod.FABRIC]
host = 'example.com'
"#;

const OVERLAY_TEMPLATE: &str = r#"# fabik overlay, read together with fabik.toml.
#
# Plain keys override top-level keys of fabik.toml:
# WORK_DIR={{ WORK_DIR }}
#
# Keys prefixed with {{ NAME | upcase }}_ stay out of fabik.toml and feed
# REPLACE_ENVIRON placeholders:
# {{ NAME | upcase }}_PROD_ADMIN_PASSWORD=change-me
"#;

/// Files touched by `init_project`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub created: Vec<PathBuf>,
    pub overwritten: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl InitReport {
    /// True when nothing was written because every file already existed.
    pub fn nothing_written(&self) -> bool {
        self.created.is_empty() && self.overwritten.is_empty()
    }
}

/// Write a starter `fabik.toml` and `.fabik.env` into `work_dir`.
///
/// `full` selects the commented full starter instead of the minimal one.
///
/// # Errors
///
/// - `ConfigError::RelativePath` when `work_dir` is relative
/// - `ConfigError::Template` if a starter fails to render
/// - `ConfigError::Io` when a file cannot be written
pub fn init_project(
    work_dir: Option<PathBuf>,
    full: bool,
    force: bool,
) -> Result<InitReport, ConfigError> {
    let work_dir = work_dir_or_cwd(work_dir)?;
    let globals = starter_globals(&work_dir)?;

    let primary = if full {
        format!("{PRIMARY_HEADER}{PRIMARY_FULL_BODY}")
    } else {
        PRIMARY_HEADER.to_string()
    };
    let files = [
        (work_dir.join(PRIMARY_FILE_NAME), render_starter(&primary, &globals)?),
        (
            work_dir.join(OVERLAY_FILE_NAME),
            render_starter(OVERLAY_TEMPLATE, &globals)?,
        ),
    ];

    let mut report = InitReport::default();
    for (path, content) in files {
        let exists = path.exists();
        if exists && !force {
            tracing::warn!(path = %path.display(), "File already exists, skipping");
            report.skipped.push(path);
            continue;
        }
        if exists {
            tracing::warn!(path = %path.display(), "Overwriting");
        }
        atomic_write(&path, &content)?;
        tracing::info!(path = %path.display(), "Created file");
        if exists {
            report.overwritten.push(path);
        } else {
            report.created.push(path);
        }
    }

    if report.nothing_written() {
        tracing::warn!("All configuration files already exist, use force to overwrite them");
    }
    Ok(report)
}

fn starter_globals(work_dir: &Path) -> Result<liquid::Object, ConfigError> {
    let name = work_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    liquid::to_object(&serde_json::json!({
        "create_time": chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        "fabik_version": env!("CARGO_PKG_VERSION"),
        "WORK_DIR": work_dir.display().to_string(),
        "NAME": name,
    }))
    .map_err(starter_error)
}

fn render_starter(source: &str, globals: &liquid::Object) -> Result<String, ConfigError> {
    liquid::ParserBuilder::with_stdlib()
        .build()
        .and_then(|parser| parser.parse(source))
        .and_then(|template| template.render(globals))
        .map_err(starter_error)
}

fn starter_error(source: liquid::Error) -> ConfigError {
    ConfigError::Template {
        name: "starter".to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ConfigLoader;

    fn project_dir(parent: &Path) -> PathBuf {
        let dir = parent.join("shop");
        std::fs::create_dir(&dir).unwrap();
        dir
    }

    #[test]
    fn test_simple_starter_loads() {
        let temp_dir = tempfile::tempdir().unwrap();
        let work_dir = project_dir(temp_dir.path());

        let report = init_project(Some(work_dir.clone()), false, false).unwrap();
        assert_eq!(report.created.len(), 2);

        let doc = ConfigLoader::new()
            .with_work_dir(work_dir.clone())
            .load()
            .unwrap();
        assert_eq!(doc.project_name(), "shop");
        assert_eq!(doc.get_str(&["WORK_DIR"]), Some(work_dir.to_str().unwrap()));
        assert!(doc.get(&["FABRIC"]).is_none());
    }

    #[test]
    fn test_full_starter_has_environments() {
        let temp_dir = tempfile::tempdir().unwrap();
        let work_dir = project_dir(temp_dir.path());
        init_project(Some(work_dir.clone()), true, false).unwrap();

        let doc = ConfigLoader::new()
            .with_work_dir(work_dir.clone())
            .with_env_name("prod")
            .load()
            .unwrap();
        assert_eq!(doc.get_str(&["DEPLOY_DIR"]), Some("/srv/app/shop"));
        assert_eq!(
            doc.get_env_override("FABRIC", Some("host"))
                .and_then(toml::Value::as_str),
            Some("example.com")
        );

        let overlay = std::fs::read_to_string(work_dir.join(".fabik.env")).unwrap();
        assert!(overlay.contains("SHOP_PROD_ADMIN_PASSWORD"));
    }

    #[test]
    fn test_existing_files_skipped_unless_forced() {
        let temp_dir = tempfile::tempdir().unwrap();
        let work_dir = project_dir(temp_dir.path());
        std::fs::write(work_dir.join("fabik.toml"), "NAME = \"mine\"").unwrap();

        let report = init_project(Some(work_dir.clone()), false, false).unwrap();
        assert_eq!(report.skipped, vec![work_dir.join("fabik.toml")]);
        assert_eq!(report.created, vec![work_dir.join(".fabik.env")]);
        assert_eq!(
            std::fs::read_to_string(work_dir.join("fabik.toml")).unwrap(),
            "NAME = \"mine\""
        );

        let report = init_project(Some(work_dir.clone()), false, false).unwrap();
        assert!(report.nothing_written());

        let report = init_project(Some(work_dir.clone()), false, true).unwrap();
        assert_eq!(report.overwritten.len(), 2);
        assert!(
            std::fs::read_to_string(work_dir.join("fabik.toml"))
                .unwrap()
                .contains("NAME = 'shop'")
        );
    }

    #[test]
    fn test_relative_work_dir_rejected() {
        let err = init_project(Some(PathBuf::from("relative")), false, false).unwrap_err();
        assert!(matches!(err, ConfigError::RelativePath { .. }));
    }
}
