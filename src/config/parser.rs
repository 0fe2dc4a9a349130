//! Settings parser for loading `tfdrift.yaml`.
//!
//! This module handles loading settings from YAML files and `.env` files,
//! with proper error handling.

use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::settings::DiffSettings;

/// Settings parser for loading drift-check settings.
#[derive(Debug, Default)]
pub struct SettingsParser {
    /// Base path for locating the `.env` file.
    base_path: Option<PathBuf>,
}

impl SettingsParser {
    /// Creates a new settings parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for locating the `.env` file.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<DiffSettings> {
        let path = path.as_ref();
        info!("Loading settings from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to read file: {e}"),
            location: Some(path.display().to_string()),
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses settings from a YAML string.
    ///
    /// An empty document yields default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<DiffSettings> {
        debug!("Parsing YAML settings");

        if content.trim().is_empty() {
            return Ok(DiffSettings::default());
        }

        let settings: DiffSettings = serde_yaml::from_str(content).map_err(|e| {
            ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location: source.map(|p| p.display().to_string()),
            }
        })?;

        Ok(settings)
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| ConfigError::ParseError {
                message: format!("Failed to load .env file: {e}"),
                location: Some(env_path.display().to_string()),
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Default settings file names to search for.
pub const DEFAULT_SETTINGS_FILES: &[&str] = &["tfdrift.yaml", "tfdrift.yml"];

/// Finds the settings file in the given directory or its parents.
///
/// A relative `start_dir` is resolved against the current directory first,
/// so `"."` still walks up through the real parents.
///
/// Returns `None` if no settings file exists; settings are optional.
#[must_use]
pub fn find_settings_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let start_dir = start_dir.as_ref();
    let mut current =
        std::path::absolute(start_dir).unwrap_or_else(|_| start_dir.to_path_buf());

    loop {
        for filename in DEFAULT_SETTINGS_FILES {
            let candidate = current.join(filename);
            if candidate.exists() {
                info!("Found settings file: {}", candidate.display());
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TfDriftError;
    use crate::testing::enter_dir;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_settings() {
        let yaml = r"
binary: /usr/local/bin/terraform
";
        let parser = SettingsParser::new();
        let settings = parser.parse_yaml(yaml, None).unwrap();
        assert_eq!(settings.binary, Some(PathBuf::from("/usr/local/bin/terraform")));
        assert!(settings.lock.is_none());
        assert!(settings.credentials.github_token_file.is_none());
    }

    #[test]
    fn test_parse_full_settings() {
        let yaml = r"
binary: terraform
config_files: ./infra
working_dir: /var/lib/tfdrift
log_level: debug
lock: true
timeout_secs: 900
credentials:
  aws_access_key_id_file: /secrets/aws/id
  aws_secret_access_key_file: /secrets/aws/secret
  github_token_file: /secrets/github/token
";
        let parser = SettingsParser::new();
        let settings = parser.parse_yaml(yaml, None).unwrap();
        assert_eq!(settings.config_files, Some(PathBuf::from("./infra")));
        assert_eq!(settings.lock, Some(true));
        assert_eq!(settings.timeout_secs, Some(900));
        assert_eq!(
            settings.credentials.aws_secret_access_key_file,
            Some(PathBuf::from("/secrets/aws/secret"))
        );
    }

    #[test]
    fn test_parse_empty_document() {
        let parser = SettingsParser::new();
        let settings = parser.parse_yaml("  \n", None).unwrap();
        assert_eq!(settings, DiffSettings::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let parser = SettingsParser::new();
        let result = parser.parse_yaml("binray: terraform\n", None);
        assert!(matches!(
            result,
            Err(TfDriftError::Config(ConfigError::ParseError { .. }))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let result = SettingsParser::new().load_file(dir.path().join("tfdrift.yaml"));
        assert!(matches!(
            result,
            Err(TfDriftError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_find_settings_in_parent() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("tfdrift.yml"), "lock: false\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_settings_file(&nested).expect("settings file should be found");
        assert_eq!(found, dir.path().join("tfdrift.yml"));

        let settings = SettingsParser::new().load_file(&found).unwrap();
        assert_eq!(settings.lock, Some(false));
    }

    #[test]
    fn test_find_settings_from_current_dir() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("tfdrift.yaml"), "lock: true\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let _cwd = enter_dir(&nested);
        let found = find_settings_file(".").expect("settings file should be found");

        assert_eq!(
            std::fs::canonicalize(&found).unwrap(),
            std::fs::canonicalize(dir.path().join("tfdrift.yaml")).unwrap()
        );
    }
}
