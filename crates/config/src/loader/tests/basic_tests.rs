//! Basic loader tests.
//!
//! Responsibilities:
//! - Test that both files are required and named when missing.
//! - Test decode errors for the primary document.
//! - Test overlay folding and selector validation.

use tempfile::TempDir;

use super::write_project;
use crate::error::{ConfigError, ErrorKind};
use crate::loader::builder::ConfigLoader;

#[test]
fn test_load_requires_both_files() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("fabik.toml"), "NAME = \"app\"").unwrap();

    let err = ConfigLoader::new()
        .with_work_dir(temp_dir.path().to_path_buf())
        .load()
        .unwrap_err();

    match err {
        ConfigError::MissingConfigFiles { missing } => {
            assert_eq!(missing, vec![temp_dir.path().join(".fabik.env")]);
        }
        other => panic!("expected MissingConfigFiles, got {other}"),
    }
}

#[test]
fn test_load_reports_both_missing_files() {
    let temp_dir = TempDir::new().unwrap();

    let err = ConfigLoader::new()
        .with_work_dir(temp_dir.path().to_path_buf())
        .load()
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("fabik.toml"));
    assert!(message.contains(".fabik.env"));
}

#[test]
fn test_load_decode_error_names_file() {
    let temp_dir = TempDir::new().unwrap();
    write_project(temp_dir.path(), "NAME = ", "");

    let err = ConfigLoader::new()
        .with_work_dir(temp_dir.path().to_path_buf())
        .load()
        .unwrap_err();

    assert!(matches!(err, ConfigError::Decode { .. }));
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(err.to_string().contains("fabik.toml"));
}

#[test]
fn test_load_folds_plain_overlay_keys() {
    let temp_dir = TempDir::new().unwrap();
    write_project(
        temp_dir.path(),
        "NAME = \"app\"\nWORK_DIR = \"/from/toml\"\n",
        "WORK_DIR=/from/env\nAPP_SECRET=xyz\n",
    );

    let doc = ConfigLoader::new()
        .with_work_dir(temp_dir.path().to_path_buf())
        .load()
        .unwrap();

    assert_eq!(doc.get_str(&["WORK_DIR"]), Some("/from/env"));
    assert!(doc.get(&["APP_SECRET"]).is_none());
    assert_eq!(doc.overlay_value("APP_SECRET"), Some("xyz"));
}

#[test]
fn test_load_project_name_precedence() {
    let temp_dir = TempDir::new().unwrap();
    write_project(temp_dir.path(), "NAME = \"app\"\n", "NAME=overlay\n");

    let doc = ConfigLoader::new()
        .with_work_dir(temp_dir.path().to_path_buf())
        .load()
        .unwrap();
    assert_eq!(doc.project_name(), "overlay");

    write_project(temp_dir.path(), "PYE = \"python3\"\n", "");
    let doc = ConfigLoader::new()
        .with_work_dir(temp_dir.path().to_path_buf())
        .load()
        .unwrap();
    assert_eq!(doc.project_name(), "fabik");
}

#[test]
fn test_load_with_unknown_env_fails() {
    let temp_dir = TempDir::new().unwrap();
    write_project(
        temp_dir.path(),
        "NAME = \"app\"\n[ENV.prod.FABRIC]\nhost = \"b\"\n",
        "",
    );

    let err = ConfigLoader::new()
        .with_work_dir(temp_dir.path().to_path_buf())
        .with_env_name("staging")
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::EnvNotFound(_)));

    let doc = ConfigLoader::new()
        .with_work_dir(temp_dir.path().to_path_buf())
        .with_env_name("prod")
        .load()
        .unwrap();
    assert_eq!(doc.env_name(), Some("prod"));
}

#[test]
fn test_load_with_explicit_config_path() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir(temp_dir.path().join("conf")).unwrap();
    std::fs::write(temp_dir.path().join("conf/custom.toml"), "NAME = \"custom\"").unwrap();
    std::fs::write(temp_dir.path().join(".fabik.env"), "").unwrap();

    let doc = ConfigLoader::new()
        .with_work_dir(temp_dir.path().to_path_buf())
        .with_config_path("conf/custom.toml".into())
        .load()
        .unwrap();
    assert_eq!(doc.project_name(), "custom");
}
