//! Settings and validated configuration types.
//!
//! [`DiffSettings`] maps to `tfdrift.yaml` and to the CLI overrides; every field
//! is optional. [`ConfigValidator`](super::ConfigValidator) turns it into a
//! [`DiffConfig`], the immutable value every drift run borrows.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::credentials::{AwsCredentials, GitHubToken};
use crate::telemetry::DiffMetrics;

/// Default Terraform binary, resolved through `PATH`.
pub const DEFAULT_BINARY: &str = "terraform";

/// Unvalidated settings, as read from the settings file or the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DiffSettings {
    /// Path to the Terraform binary.
    #[serde(default)]
    pub binary: Option<PathBuf>,
    /// Directory holding the `.tf` files.
    #[serde(default)]
    pub config_files: Option<PathBuf>,
    /// Working directory for Terraform; also used as `HOME`.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Value for `TF_LOG`.
    #[serde(default)]
    pub log_level: Option<String>,
    /// Whether Terraform should take the state lock.
    #[serde(default)]
    pub lock: Option<bool>,
    /// Per-command deadline in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Mounted credential files.
    #[serde(default)]
    pub credentials: CredentialSettings,
}

/// Paths of mounted credential files.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CredentialSettings {
    /// File containing the AWS access key id.
    #[serde(default)]
    pub aws_access_key_id_file: Option<PathBuf>,
    /// File containing the AWS secret access key.
    #[serde(default)]
    pub aws_secret_access_key_file: Option<PathBuf>,
    /// File containing a GitHub token.
    #[serde(default)]
    pub github_token_file: Option<PathBuf>,
}

/// Validated, immutable configuration for drift runs.
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// Path to the Terraform binary.
    pub binary: PathBuf,
    /// Directory holding the `.tf` files, passed verbatim to Terraform.
    pub config_files: PathBuf,
    /// Absolute working directory for Terraform.
    pub working_dir: PathBuf,
    /// Value for `TF_LOG`, upper-cased.
    pub log_level: Option<String>,
    /// Whether Terraform should take the state lock.
    pub lock: bool,
    /// Deadline applied to each sub-command.
    pub timeout: Option<Duration>,
    /// AWS credentials exported to Terraform.
    pub aws_credentials: Option<AwsCredentials>,
    /// GitHub token exported to Terraform.
    pub github_token: Option<GitHubToken>,
    /// Sink for durations and the plan exit code.
    pub metrics: Arc<dyn DiffMetrics>,
}

impl DiffSettings {
    /// Overlays `other` on top of `self`; fields set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            binary: other.binary.or(self.binary),
            config_files: other.config_files.or(self.config_files),
            working_dir: other.working_dir.or(self.working_dir),
            log_level: other.log_level.or(self.log_level),
            lock: other.lock.or(self.lock),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            credentials: CredentialSettings {
                aws_access_key_id_file: other
                    .credentials
                    .aws_access_key_id_file
                    .or(self.credentials.aws_access_key_id_file),
                aws_secret_access_key_file: other
                    .credentials
                    .aws_secret_access_key_file
                    .or(self.credentials.aws_secret_access_key_file),
                github_token_file: other
                    .credentials
                    .github_token_file
                    .or(self.credentials.github_token_file),
            },
        }
    }
}

impl DiffConfig {
    /// Returns true if any credential will be exported to Terraform.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.aws_credentials.is_some() || self.github_token.is_some()
    }
}
