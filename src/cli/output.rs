//! Output formatting for CLI commands.
//!
//! This module turns drift-run outcomes and validated configuration into
//! text or JSON for the user.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

use crate::config::DiffConfig;
use crate::error::{Result, TfDriftError};
use crate::planner::Diff;
use crate::runner::ProcessResult;
use crate::telemetry::Observation;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Overall status of a drift run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftStatus {
    /// Infrastructure matches the configuration.
    NoChanges,
    /// Infrastructure differs from the configuration.
    Changes,
    /// The run failed.
    Failed,
}

/// Everything reported about one drift run.
#[derive(Debug, Clone, Serialize)]
pub struct DriftReport {
    /// Overall status.
    pub status: DriftStatus,
    /// When the report was produced.
    pub reported_at: DateTime<Utc>,
    /// Plan output, when drift was detected.
    pub diff: Option<String>,
    /// SHA-256 of the plan output, when drift was detected.
    pub fingerprint: Option<String>,
    /// The failed sub-command, when a step failed.
    pub failure: Option<ProcessResult>,
    /// Error message for failures that are not step failures.
    pub error: Option<String>,
    /// Duration of each sub-command that ran.
    pub timings: Vec<Observation>,
}

impl DriftReport {
    /// Builds a report from the result of [`DriftPlanner::run`](crate::planner::DriftPlanner::run).
    #[must_use]
    pub fn from_run(outcome: &Result<Option<Diff>>, timings: Vec<Observation>) -> Self {
        let mut report = Self {
            status: DriftStatus::NoChanges,
            reported_at: Utc::now(),
            diff: None,
            fingerprint: None,
            failure: None,
            error: None,
            timings,
        };

        match outcome {
            Ok(None) => {}
            Ok(Some(diff)) => {
                report.status = DriftStatus::Changes;
                report.diff = Some(diff.to_text().into_owned());
                report.fingerprint = Some(diff.fingerprint());
            }
            Err(TfDriftError::Step(failure)) => {
                report.status = DriftStatus::Failed;
                report.failure = Some(failure.result().clone());
            }
            Err(e) => {
                report.status = DriftStatus::Failed;
                report.error = Some(e.to_string());
            }
        }

        report
    }

    /// Returns the process exit code mirroring Terraform's detailed exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self.status {
            DriftStatus::NoChanges => 0,
            DriftStatus::Changes => 2,
            DriftStatus::Failed => 1,
        }
    }
}

/// How a report compares with the drift seen by earlier checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftChange {
    /// No drift now or before.
    Clean,
    /// Drift appeared after a clean or first check.
    Appeared,
    /// Same drift as the previous check.
    Unchanged,
    /// Drift is present but its fingerprint differs from the previous one.
    Changed,
    /// Drift seen earlier is gone.
    Resolved,
    /// The check failed; the previous fingerprint is kept.
    Unknown,
}

/// Remembers the fingerprint of the last detected drift across `watch` runs.
#[derive(Debug, Default)]
pub struct FingerprintTracker {
    last: Option<String>,
}

impl FingerprintTracker {
    /// Creates a tracker with no drift recorded.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Fingerprint of the last drift seen, if it has not been resolved.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Records a report and classifies it against the previous one.
    pub fn observe(&mut self, report: &DriftReport) -> DriftChange {
        match report.status {
            DriftStatus::Changes => {
                let change = match (&self.last, &report.fingerprint) {
                    (None, _) => DriftChange::Appeared,
                    (Some(last), Some(current)) if last == current => DriftChange::Unchanged,
                    (Some(_), _) => DriftChange::Changed,
                };
                self.last.clone_from(&report.fingerprint);
                change
            }
            DriftStatus::NoChanges => {
                if self.last.take().is_some() {
                    DriftChange::Resolved
                } else {
                    DriftChange::Clean
                }
            }
            DriftStatus::Failed => DriftChange::Unknown,
        }
    }
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a drift report for display.
    #[must_use]
    pub fn format_report(&self, report: &DriftReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => Self::format_report_text(report),
        }
    }

    /// Formats a report as text.
    fn format_report_text(report: &DriftReport) -> String {
        let mut output = String::new();

        match report.status {
            DriftStatus::NoChanges => {
                let _ = writeln!(
                    output,
                    "{} No drift detected - infrastructure matches configuration.",
                    "✓".green()
                );
            }
            DriftStatus::Changes => {
                let fingerprint = report.fingerprint.as_deref().unwrap_or_default();
                let _ = writeln!(
                    output,
                    "{} Drift detected (fingerprint {})\n",
                    "⚠".yellow(),
                    &fingerprint[..8.min(fingerprint.len())]
                );
                if let Some(diff) = &report.diff {
                    let _ = writeln!(output, "{}", diff.trim_end());
                }
            }
            DriftStatus::Failed => {
                if let Some(failure) = &report.failure {
                    let _ = writeln!(
                        output,
                        "{} {} failed with exit code {}\n",
                        "✗".red(),
                        failure.title,
                        failure.exit_code
                    );
                    let _ = writeln!(output, "{failure}");
                } else {
                    let _ = writeln!(
                        output,
                        "{} {}",
                        "✗".red(),
                        report.error.as_deref().unwrap_or("Drift check failed")
                    );
                }
            }
        }

        if !report.timings.is_empty() {
            output.push_str("\nTimings:\n");
            for timing in &report.timings {
                let _ = writeln!(
                    output,
                    "   {:<8} exit {:<4} {:>7.1}s",
                    timing.command, timing.exit_code, timing.seconds
                );
            }
        }

        output
    }

    /// Formats a validated configuration. Secrets are shown redacted.
    #[must_use]
    pub fn format_config(&self, config: &DiffConfig) -> String {
        match self.format {
            OutputFormat::Json => {
                let aws = config.aws_credentials.as_ref();
                let json = serde_json::json!({
                    "binary": config.binary,
                    "config_files": config.config_files,
                    "working_dir": config.working_dir,
                    "log_level": config.log_level,
                    "lock": config.lock,
                    "timeout_secs": config.timeout.map(|t| t.as_secs()),
                    "aws_access_key_id": aws.map(|c| c.access_key_id.clone()),
                    "aws_secret_access_key": aws.map(|c| c.secret_access_key.to_string()),
                    "github_token": config.github_token.as_ref().map(|t| t.0.to_string()),
                });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => {
                let mut output = format!("{} Configuration is valid!\n\n", "✓".green());
                let _ = writeln!(output, "   Binary: {}", config.binary.display());
                let _ = writeln!(output, "   Config files: {}", config.config_files.display());
                let _ = writeln!(output, "   Working dir: {}", config.working_dir.display());
                let _ = writeln!(output, "   Lock: {}", config.lock);
                let _ = writeln!(
                    output,
                    "   TF_LOG: {}",
                    config.log_level.as_deref().unwrap_or("(unset)")
                );
                let _ = writeln!(
                    output,
                    "   Timeout: {}",
                    config
                        .timeout
                        .map_or_else(|| String::from("none"), |t| format!("{}s", t.as_secs()))
                );
                if let Some(aws) = &config.aws_credentials {
                    let _ = writeln!(
                        output,
                        "   AWS credentials: {} / {}",
                        aws.access_key_id, aws.secret_access_key
                    );
                }
                if let Some(token) = &config.github_token {
                    let _ = writeln!(output, "   GitHub token: {}", token.0);
                }
                output
            }
        }
    }
}
