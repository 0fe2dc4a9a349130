//! Loading of mounted credential files.
//!
//! Each file holds a single value. Reading stops at the first newline so the
//! files can be edited by hand. Credentials are read once, during validation.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CredentialError, Result};
use crate::secret::Secret;

/// Environment variable receiving the AWS access key id.
pub const AWS_ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";

/// Environment variable receiving the AWS secret access key.
pub const AWS_SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";

/// Environment variable receiving the GitHub token.
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Locations of the two AWS credential files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsCredentialFiles {
    /// File containing the access key id.
    pub access_key_id: PathBuf,
    /// File containing the secret access key.
    pub secret_access_key: PathBuf,
}

/// AWS credentials exported to Terraform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    /// Access key id; not secret on its own.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: Secret<String>,
}

/// A bearer token exported to Terraform as `GITHUB_TOKEN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubToken(pub Secret<String>);

/// Loads AWS credentials from their two files.
///
/// # Errors
///
/// Returns an error if either file cannot be read or is not UTF-8.
pub fn load_aws_credentials(files: &AwsCredentialFiles) -> Result<AwsCredentials> {
    let access_key_id = read_first_line(&files.access_key_id)?;
    let secret_access_key = Secret::new(read_first_line(&files.secret_access_key)?);

    debug!("Loaded AWS credentials for key id {access_key_id}");

    Ok(AwsCredentials {
        access_key_id,
        secret_access_key,
    })
}

/// Loads a token from a single file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not UTF-8.
pub fn load_token(path: impl AsRef<Path>) -> Result<GitHubToken> {
    let token = read_first_line(path.as_ref())?;
    debug!("Loaded token from {}", path.as_ref().display());
    Ok(GitHubToken(Secret::new(token)))
}

/// Reads a file and keeps everything before the first `\n`.
fn read_first_line(path: &Path) -> Result<String> {
    let mut bytes = std::fs::read(path).map_err(|source| CredentialError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(end) = bytes.iter().position(|b| *b == b'\n') {
        bytes.truncate(end);
    }

    String::from_utf8(bytes).map_err(|_| {
        CredentialError::NotUtf8 {
            path: path.to_path_buf(),
        }
        .into()
    })
}
