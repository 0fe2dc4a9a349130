//! Configuration module for tfdrift.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `tfdrift.yaml`
//! - Loading mounted credential files
//! - Validating settings into an immutable [`DiffConfig`]

mod credentials;
mod parser;
mod settings;
mod validator;

pub use credentials::{
    AWS_ACCESS_KEY_ID_VAR, AWS_SECRET_ACCESS_KEY_VAR, AwsCredentialFiles, AwsCredentials,
    GITHUB_TOKEN_VAR, GitHubToken, load_aws_credentials, load_token,
};
pub use parser::{DEFAULT_SETTINGS_FILES, SettingsParser, find_settings_file};
pub use settings::{CredentialSettings, DEFAULT_BINARY, DiffConfig, DiffSettings};
pub use validator::{ConfigValidator, KNOWN_LOG_LEVELS, ValidationError, ValidationResult};
