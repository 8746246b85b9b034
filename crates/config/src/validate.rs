//! Checks run against a loaded document before it is used.
//!
//! Validators run in registration order and the first failure wins.

use std::path::Path;

use crate::constants::{KEY_NAME, KEY_TPL_DIR, KEY_WORK_DIR};
use crate::document::ConfigDocument;
use crate::error::ConfigError;
use crate::loader::require_absolute;

/// A check over a loaded document.
pub type Validator = fn(&ConfigDocument) -> Result<(), ConfigError>;

/// Ordered set of validators; registering the same function twice is a no-op.
#[derive(Debug, Clone, Default)]
pub struct Validators {
    validators: Vec<Validator>,
}

impl Validators {
    pub fn new() -> Self {
        Self::default()
    }

    /// The checks every project needs: `NAME` and an existing `WORK_DIR`.
    pub fn standard() -> Self {
        Self::new().with(validate_name_work_dir)
    }

    pub fn with(mut self, validator: Validator) -> Self {
        self.register(validator);
        self
    }

    pub fn register(&mut self, validator: Validator) {
        if !self
            .validators
            .iter()
            .any(|v| std::ptr::fn_addr_eq(*v, validator))
        {
            self.validators.push(validator);
        }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Run every validator, stopping at the first error.
    pub fn run(&self, document: &ConfigDocument) -> Result<(), ConfigError> {
        self.validators
            .iter()
            .try_for_each(|validator| validator(document))
    }
}

/// `NAME` and `WORK_DIR` are set, and `WORK_DIR` is an existing absolute path.
pub fn validate_name_work_dir(document: &ConfigDocument) -> Result<(), ConfigError> {
    required(document, KEY_NAME)?;
    let work_dir = required(document, KEY_WORK_DIR)?;
    check_path_exists(Path::new(work_dir))
}

/// `TPL_DIR` is set and is an existing absolute path.
pub fn validate_tpl_dir(document: &ConfigDocument) -> Result<(), ConfigError> {
    let tpl_dir = required(document, KEY_TPL_DIR)?;
    check_path_exists(Path::new(tpl_dir))
}

fn required<'a>(document: &'a ConfigDocument, key: &str) -> Result<&'a str, ConfigError> {
    document
        .get_str(&[key])
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

fn check_path_exists(path: &Path) -> Result<(), ConfigError> {
    require_absolute(path)?;
    if !path.exists() {
        return Err(ConfigError::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Overlay;
    use crate::error::ErrorKind;

    fn document(primary: &str) -> ConfigDocument {
        ConfigDocument::new(toml::from_str(primary).unwrap(), Overlay::new(), None).unwrap()
    }

    #[test]
    fn test_name_work_dir_requires_both_keys() {
        let err = validate_name_work_dir(&document("WORK_DIR = \"/srv\"")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(ref key) if key == "NAME"));

        let err = validate_name_work_dir(&document("NAME = \"app\"")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(ref key) if key == "WORK_DIR"));
    }

    #[test]
    fn test_work_dir_must_be_existing_absolute_path() {
        let err = validate_name_work_dir(&document("NAME = \"app\"\nWORK_DIR = \"rel\""))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Path);

        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing");
        let primary = format!("NAME = \"app\"\nWORK_DIR = {:?}", missing.display().to_string());
        let err = validate_name_work_dir(&document(&primary)).unwrap_err();
        assert!(matches!(err, ConfigError::PathNotFound { .. }));

        let primary = format!(
            "NAME = \"app\"\nWORK_DIR = {:?}",
            temp_dir.path().display().to_string()
        );
        validate_name_work_dir(&document(&primary)).unwrap();
    }

    #[test]
    fn test_tpl_dir_must_exist() {
        let temp_dir = tempfile::tempdir().unwrap();
        let primary = format!("TPL_DIR = {:?}", temp_dir.path().display().to_string());
        validate_tpl_dir(&document(&primary)).unwrap();

        let err = validate_tpl_dir(&document("NAME = \"app\"")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(ref key) if key == "TPL_DIR"));
    }

    #[test]
    fn test_validators_run_in_order_and_skip_duplicates() {
        let validators = Validators::standard()
            .with(validate_tpl_dir)
            .with(validate_name_work_dir);
        assert_eq!(validators.len(), 2);

        // Both checks fail; the first registered one is reported.
        let err = validators.run(&document("PYE = \"python3\"")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(ref key) if key == "NAME"));

        assert!(Validators::new().run(&document("")).is_ok());
    }
}
