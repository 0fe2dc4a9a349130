//! Settings validation.
//!
//! This module checks [`DiffSettings`], fills in defaults, loads the mounted
//! credentials and produces the immutable [`DiffConfig`] used by drift runs.

use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::credentials::{AwsCredentialFiles, load_aws_credentials, load_token};
use super::settings::{DEFAULT_BINARY, DiffConfig, DiffSettings};
use crate::telemetry::DiffMetrics;

/// Values accepted by Terraform for `TF_LOG`.
pub const KNOWN_LOG_LEVELS: &[&str] = &["TRACE", "DEBUG", "INFO", "WARN", "ERROR", "JSON"];

/// Validator for drift-check settings.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all problems found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Checks settings without touching credential files.
    #[must_use]
    pub fn check(&self, settings: &DiffSettings) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::check_binary(settings, &mut result);
        Self::check_log_level(settings, &mut result);
        Self::check_timeout(settings, &mut result);
        Self::check_credentials(settings, &mut result);
        Self::check_working_dir(settings, &mut result);

        result
    }

    /// Validates settings and builds the configuration used by drift runs.
    ///
    /// Defaults are resolved against the current directory, and credential
    /// files are read exactly once here.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or a credential file cannot be loaded.
    pub fn validate(
        &self,
        settings: DiffSettings,
        metrics: Arc<dyn DiffMetrics>,
    ) -> Result<DiffConfig> {
        let result = self.check(&settings);

        if let Some(first_error) = result.errors.first() {
            return Err(ConfigError::validation(
                first_error.message.clone(),
                first_error.field.clone(),
            )
            .into());
        }

        for warning in &result.warnings {
            warn!("{warning}");
        }

        let current_dir = std::env::current_dir()?;
        let working_dir =
            std::path::absolute(settings.working_dir.unwrap_or_else(|| current_dir.clone()))?;
        let config_files = settings.config_files.unwrap_or(current_dir);

        let aws_credentials = match (
            settings.credentials.aws_access_key_id_file,
            settings.credentials.aws_secret_access_key_file,
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Some(load_aws_credentials(
                &AwsCredentialFiles {
                    access_key_id,
                    secret_access_key,
                },
            )?),
            _ => None,
        };

        let github_token = settings
            .credentials
            .github_token_file
            .map(|path| load_token(&path))
            .transpose()?;

        let config = DiffConfig {
            binary: settings.binary.unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY)),
            config_files,
            working_dir,
            log_level: settings.log_level.map(|level| level.to_uppercase()),
            lock: settings.lock.unwrap_or(false),
            timeout: settings.timeout_secs.map(Duration::from_secs),
            aws_credentials,
            github_token,
            metrics,
        };

        debug!(
            "Configuration validated: binary={}, working_dir={}, config_files={}",
            config.binary.display(),
            config.working_dir.display(),
            config.config_files.display()
        );

        Ok(config)
    }

    fn check_binary(settings: &DiffSettings, result: &mut ValidationResult) {
        if settings
            .binary
            .as_deref()
            .is_some_and(|binary| binary.as_os_str().is_empty())
        {
            result.errors.push(ValidationError {
                field: String::from("binary"),
                message: String::from("Terraform binary path cannot be empty"),
            });
        }
    }

    fn check_log_level(settings: &DiffSettings, result: &mut ValidationResult) {
        if let Some(level) = &settings.log_level {
            let upper = level.to_uppercase();
            if !KNOWN_LOG_LEVELS.contains(&upper.as_str()) {
                result.errors.push(ValidationError {
                    field: String::from("log_level"),
                    message: format!(
                        "Unknown log level '{level}'. Expected one of: {}",
                        KNOWN_LOG_LEVELS.join(", ")
                    ),
                });
            }
        }
    }

    fn check_timeout(settings: &DiffSettings, result: &mut ValidationResult) {
        if settings.timeout_secs == Some(0) {
            result.errors.push(ValidationError {
                field: String::from("timeout_secs"),
                message: String::from("Timeout must be greater than zero"),
            });
        }
    }

    fn check_credentials(settings: &DiffSettings, result: &mut ValidationResult) {
        let creds = &settings.credentials;
        match (&creds.aws_access_key_id_file, &creds.aws_secret_access_key_file) {
            (Some(_), None) => result.errors.push(ValidationError {
                field: String::from("credentials.aws_secret_access_key_file"),
                message: String::from(
                    "AWS secret access key file is required when an access key id file is set",
                ),
            }),
            (None, Some(_)) => result.errors.push(ValidationError {
                field: String::from("credentials.aws_access_key_id_file"),
                message: String::from(
                    "AWS access key id file is required when a secret access key file is set",
                ),
            }),
            (None, None) if creds.github_token_file.is_none() => result
                .warnings
                .push(String::from("No credentials configured; Terraform will use its own")),
            _ => {}
        }
    }

    fn check_working_dir(settings: &DiffSettings, result: &mut ValidationResult) {
        if let Some(dir) = &settings.working_dir {
            if !Path::new(dir).is_dir() {
                result.warnings.push(format!(
                    "Working directory {} does not exist",
                    dir.display()
                ));
            }
        }
    }
}

impl ValidationResult {
    /// Returns true if no errors were found.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::CredentialSettings;
    use crate::error::TfDriftError;
    use crate::telemetry::InMemoryMetrics;
    use crate::testing::lock_current_dir;
    use tempfile::TempDir;

    fn metrics() -> Arc<dyn DiffMetrics> {
        Arc::new(InMemoryMetrics::new())
    }

    #[test]
    fn test_defaults_fall_back_to_current_dir() {
        let _cwd = lock_current_dir();
        let config = ConfigValidator::new()
            .validate(DiffSettings::default(), metrics())
            .expect("default settings should validate");

        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config.binary, PathBuf::from("terraform"));
        assert_eq!(config.working_dir, std::path::absolute(&cwd).unwrap());
        assert_eq!(config.config_files, cwd);
        assert!(!config.lock);
        assert!(config.timeout.is_none());
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_relative_working_dir_made_absolute() {
        let settings = DiffSettings {
            working_dir: Some(PathBuf::from("infra")),
            ..DiffSettings::default()
        };
        let config = ConfigValidator::new().validate(settings, metrics()).unwrap();
        assert!(config.working_dir.is_absolute());
        assert!(config.working_dir.ends_with("infra"));
    }

    #[test]
    fn test_log_level_normalized() {
        let settings = DiffSettings {
            log_level: Some(String::from("debug")),
            timeout_secs: Some(300),
            ..DiffSettings::default()
        };
        let config = ConfigValidator::new().validate(settings, metrics()).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("DEBUG"));
        assert_eq!(config.timeout, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let settings = DiffSettings {
            log_level: Some(String::from("loud")),
            ..DiffSettings::default()
        };
        let result = ConfigValidator::new().check(&settings);
        assert!(!result.is_valid());
        assert_eq!(result.errors[0].field, "log_level");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let settings = DiffSettings {
            timeout_secs: Some(0),
            ..DiffSettings::default()
        };
        let err = ConfigValidator::new().validate(settings, metrics()).unwrap_err();
        assert!(matches!(
            err,
            TfDriftError::Config(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_aws_files_must_be_paired() {
        let settings = DiffSettings {
            credentials: CredentialSettings {
                aws_access_key_id_file: Some(PathBuf::from("/secrets/id")),
                ..CredentialSettings::default()
            },
            ..DiffSettings::default()
        };
        let result = ConfigValidator::new().check(&settings);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "credentials.aws_secret_access_key_file");
    }

    #[test]
    fn test_credentials_loaded_once_during_validation() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let id = dir.path().join("id");
        let secret = dir.path().join("secret");
        let token = dir.path().join("token");
        std::fs::write(&id, "AKIA\n").unwrap();
        std::fs::write(&secret, "shh\n").unwrap();
        std::fs::write(&token, "ghp_123\n").unwrap();

        let settings = DiffSettings {
            credentials: CredentialSettings {
                aws_access_key_id_file: Some(id.clone()),
                aws_secret_access_key_file: Some(secret),
                github_token_file: Some(token),
            },
            ..DiffSettings::default()
        };
        let config = ConfigValidator::new().validate(settings, metrics()).unwrap();

        // Later edits must not be observed.
        std::fs::write(&id, "CHANGED\n").unwrap();

        let aws = config.aws_credentials.as_ref().expect("AWS credentials should load");
        assert_eq!(aws.access_key_id, "AKIA");
        assert_eq!(aws.secret_access_key.reveal(), "shh");
        assert_eq!(config.github_token.as_ref().unwrap().0.reveal(), "ghp_123");
        assert!(config.has_credentials());
    }

    #[test]
    fn test_missing_credential_file_fails() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let settings = DiffSettings {
            credentials: CredentialSettings {
                github_token_file: Some(dir.path().join("absent")),
                ..CredentialSettings::default()
            },
            ..DiffSettings::default()
        };
        let err = ConfigValidator::new().validate(settings, metrics()).unwrap_err();
        assert!(matches!(err, TfDriftError::Credential(_)));
    }

    #[test]
    fn test_no_credentials_is_a_warning() {
        let result = ConfigValidator::new().check(&DiffSettings::default());
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }
}
