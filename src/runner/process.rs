//! Child-process execution for Terraform sub-commands.
//!
//! The runner builds the child environment, runs the binary to completion,
//! captures its output, and records the duration. It never decides whether an
//! exit code means success; that is the planner's job.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

use super::commands::SubCommand;
use crate::config::{
    AWS_ACCESS_KEY_ID_VAR, AWS_SECRET_ACCESS_KEY_VAR, DiffConfig, GITHUB_TOKEN_VAR,
};
use crate::error::{ProcessError, Result};

/// Variables that put Terraform in non-interactive, uncolored mode.
pub const AUTOMATION_ENV: [(&str, &str); 3] = [
    ("TF_IN_AUTOMATION", "1"),
    ("TF_INPUT", "0"),
    ("TF_CLI_ARGS", "-no-color"),
];

/// Exit code reported when the child ended without one and no signal is known.
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// Captured outcome of one sub-command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    /// Human label of the sub-command.
    pub title: String,
    /// Command line as invoked.
    pub command: String,
    /// Exit code; negative when the child was killed by a signal.
    pub exit_code: i32,
    /// Captured standard output.
    #[serde(serialize_with = "serialize_lossy")]
    pub stdout: Vec<u8>,
    /// Captured standard error.
    #[serde(serialize_with = "serialize_lossy")]
    pub stderr: Vec<u8>,
    /// When the child was started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration.
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
}

impl ProcessResult {
    /// Returns true if the sub-command exited with 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the exit code as used in metric labels.
    #[must_use]
    pub fn exit_code_label(&self) -> String {
        self.exit_code.to_string()
    }

    /// Returns standard output as text.
    #[must_use]
    pub fn stdout_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Returns standard error as text.
    #[must_use]
    pub fn stderr_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

impl fmt::Display for ProcessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "command: {}", self.command)?;
        writeln!(f, "exit code: {}", self.exit_code)?;
        writeln!(f, "stdout:\n{}", self.stdout_text().trim_end())?;
        write!(f, "stderr:\n{}", self.stderr_text().trim_end())
    }
}

fn serialize_lossy<S: Serializer>(
    bytes: &[u8],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

fn serialize_secs<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Runs Terraform sub-commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs one sub-command to completion.
    ///
    /// Only failures to launch or wait on the process are errors; any exit
    /// code is returned in the [`ProcessResult`].
    async fn run(&self, command: &SubCommand) -> Result<ProcessResult>;
}

/// Runs the configured Terraform binary as a child process.
#[derive(Debug, Clone, Copy)]
pub struct TerraformRunner<'a> {
    /// Validated configuration.
    config: &'a DiffConfig,
}

impl<'a> TerraformRunner<'a> {
    /// Creates a runner for the given configuration.
    #[must_use]
    pub const fn new(config: &'a DiffConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CommandRunner for TerraformRunner<'_> {
    async fn run(&self, command: &SubCommand) -> Result<ProcessResult> {
        let config = self.config;
        let description = command.describe(&config.binary);
        debug!("Running `{description}` in {}", config.working_dir.display());

        let mut cmd = Command::new(&config.binary);
        cmd.arg(command.name())
            .args(&command.args)
            .current_dir(&config.working_dir)
            .envs(child_environment(config))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started_at = Utc::now();
        let start = Instant::now();

        let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            binary: config.binary.clone(),
            source,
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let waited = match config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| ProcessError::TimedOut {
                    command: description.clone(),
                    timeout,
                })?,
            None => child.wait_with_output().await,
        };
        let output = waited.map_err(|source| ProcessError::Wait {
            command: description.clone(),
            source,
        })?;

        let duration = start.elapsed();
        let result = ProcessResult {
            title: command.kind.title().to_string(),
            command: description,
            exit_code: exit_code(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
            started_at,
            duration,
        };

        config.metrics.observe_duration(
            command.name(),
            &result.exit_code_label(),
            duration.as_secs_f64(),
        );

        debug!(
            "`{}` exited with {} after {:.1}s ({} bytes stdout, {} bytes stderr)",
            result.command,
            result.exit_code,
            duration.as_secs_f64(),
            result.stdout.len(),
            result.stderr.len()
        );

        Ok(result)
    }
}

/// Variables set on every Terraform child, on top of the inherited environment.
///
/// The returned values include revealed credentials and must never be logged.
pub(crate) fn child_environment(config: &DiffConfig) -> Vec<(&'static str, String)> {
    let mut env: Vec<(&'static str, String)> = AUTOMATION_ENV
        .iter()
        .map(|(key, value)| (*key, (*value).to_string()))
        .collect();

    // Terraform expands `~` in some paths against HOME.
    env.push(("HOME", config.working_dir.to_string_lossy().into_owned()));

    if let Some(level) = &config.log_level {
        env.push(("TF_LOG", level.clone()));
    }

    if let Some(aws) = &config.aws_credentials {
        env.push((AWS_ACCESS_KEY_ID_VAR, aws.access_key_id.clone()));
        env.push((AWS_SECRET_ACCESS_KEY_VAR, aws.secret_access_key.reveal().clone()));
    }

    if let Some(token) = &config.github_token {
        env.push((GITHUB_TOKEN_VAR, token.0.reveal().clone()));
    }

    env
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| -signal))
        .unwrap_or(UNKNOWN_EXIT_CODE)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(UNKNOWN_EXIT_CODE)
}
