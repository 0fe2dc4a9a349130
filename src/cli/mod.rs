//! CLI module for the tfdrift tool.
//!
//! This module provides the command-line interface for running drift checks.

mod commands;
mod output;
mod watch;

pub use commands::{Cli, Commands, OutputFormat, SettingsArgs};
pub use output::{DriftChange, DriftReport, DriftStatus, FingerprintTracker, OutputFormatter};
pub use watch::DriftWatcher;
