//! Destination paths for generated files.

use std::path::{Path, PathBuf};

/// Where a resolved section is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTarget {
    output_file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

impl OutputTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write to exactly this file; takes precedence over any directory.
    pub fn with_output_file(mut self, file: PathBuf) -> Self {
        self.output_file = Some(file);
        self
    }

    /// Write into this directory instead of the work directory.
    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }

    /// Destination for `section`.
    ///
    /// The explicit output file if set, else
    /// `<output_dir or work_dir>/<section><postfix>`.
    pub fn destination(&self, work_dir: &Path, section: &str, postfix: &str) -> PathBuf {
        if let Some(file) = &self.output_file {
            return file.clone();
        }
        self.output_dir
            .as_deref()
            .unwrap_or(work_dir)
            .join(format!("{section}{postfix}"))
    }
}

/// File name suffix for an environment, `.<env>`, or empty.
pub fn env_postfix(env_name: Option<&str>) -> String {
    env_name.map(|env| format!(".{env}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_defaults_to_work_dir() {
        let target = OutputTarget::new();
        assert_eq!(
            target.destination(Path::new("/work"), "app.toml", ""),
            PathBuf::from("/work/app.toml")
        );
        assert_eq!(
            target.destination(Path::new("/work"), ".env", &env_postfix(Some("prod"))),
            PathBuf::from("/work/.env.prod")
        );
    }

    #[test]
    fn test_output_file_wins_over_dir() {
        let target = OutputTarget::new()
            .with_output_dir(PathBuf::from("/out"))
            .with_output_file(PathBuf::from("/etc/app/config.json"));
        assert_eq!(
            target.destination(Path::new("/work"), "CONFIG", ".prod"),
            PathBuf::from("/etc/app/config.json")
        );

        let target = OutputTarget::new().with_output_dir(PathBuf::from("/out"));
        assert_eq!(
            target.destination(Path::new("/work"), "CONFIG", ""),
            PathBuf::from("/out/CONFIG")
        );
    }
}
