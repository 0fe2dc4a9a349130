//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{CredentialSettings, DiffSettings};

/// tfdrift - Detect drift between Terraform configuration and live infrastructure.
#[derive(Parser, Debug)]
#[command(name = "tfdrift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the settings file (defaults to the nearest tfdrift.yaml).
    #[arg(short, long, global = true, env = "TFDRIFT_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Overrides for values in the settings file.
    #[command(flatten)]
    pub overrides: SettingsArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Settings that can be given on the command line or through the environment.
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Path to the Terraform binary.
    #[arg(long, global = true, env = "TFDRIFT_BINARY")]
    pub binary: Option<PathBuf>,

    /// Directory containing the Terraform configuration.
    #[arg(long, global = true, env = "TFDRIFT_CONFIG_FILES")]
    pub config_files: Option<PathBuf>,

    /// Working directory for Terraform (also used as HOME).
    #[arg(long, global = true, env = "TFDRIFT_WORKING_DIR")]
    pub working_dir: Option<PathBuf>,

    /// Terraform log level (TF_LOG).
    #[arg(long, global = true, env = "TFDRIFT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Whether Terraform should lock the state (true/false).
    #[arg(long, global = true, env = "TFDRIFT_LOCK")]
    pub lock: Option<bool>,

    /// Per-command timeout in seconds.
    #[arg(long, global = true, env = "TFDRIFT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// File containing the AWS access key id.
    #[arg(long, global = true, env = "TFDRIFT_AWS_ACCESS_KEY_ID_FILE")]
    pub aws_access_key_id_file: Option<PathBuf>,

    /// File containing the AWS secret access key.
    #[arg(long, global = true, env = "TFDRIFT_AWS_SECRET_ACCESS_KEY_FILE")]
    pub aws_secret_access_key_file: Option<PathBuf>,

    /// File containing a GitHub token.
    #[arg(long, global = true, env = "TFDRIFT_GITHUB_TOKEN_FILE")]
    pub github_token_file: Option<PathBuf>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one drift check (exit code 0: no drift, 2: drift, 1: failure).
    Diff,

    /// Run drift checks repeatedly until interrupted.
    Watch {
        /// Seconds between checks.
        #[arg(long, default_value = "300", value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: u64,
    },

    /// Validate settings and load credentials without running Terraform.
    Validate,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl SettingsArgs {
    /// Converts the flags into settings to overlay on the settings file.
    #[must_use]
    pub fn into_settings(self) -> DiffSettings {
        DiffSettings {
            binary: self.binary,
            config_files: self.config_files,
            working_dir: self.working_dir,
            log_level: self.log_level,
            lock: self.lock,
            timeout_secs: self.timeout_secs,
            credentials: CredentialSettings {
                aws_access_key_id_file: self.aws_access_key_id_file,
                aws_secret_access_key_file: self.aws_secret_access_key_file,
                github_token_file: self.github_token_file,
            },
        }
    }
}
