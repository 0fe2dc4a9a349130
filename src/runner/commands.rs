//! Argument builders for the Terraform sub-commands of a drift run.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::config::DiffConfig;

/// The sub-commands a drift run invokes, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubCommandKind {
    /// `terraform init`.
    Init,
    /// `terraform refresh`.
    Refresh,
    /// `terraform plan`.
    Plan,
}

/// A sub-command with its arguments, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCommand {
    /// Which sub-command this is.
    pub kind: SubCommandKind,
    /// Arguments following the sub-command name.
    pub args: Vec<String>,
}

impl SubCommandKind {
    /// Returns the name passed to Terraform.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Refresh => "refresh",
            Self::Plan => "plan",
        }
    }

    /// Returns a human label for reports.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Init => "Terraform init",
            Self::Refresh => "Terraform refresh",
            Self::Plan => "Terraform plan",
        }
    }
}

impl fmt::Display for SubCommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl SubCommand {
    /// Builds `init -lock=<bool> <config_files>`.
    #[must_use]
    pub fn init(config: &DiffConfig) -> Self {
        Self {
            kind: SubCommandKind::Init,
            args: vec![lock_flag(config.lock), path_arg(&config.config_files)],
        }
    }

    /// Builds `refresh -lock=<bool> <config_files>`.
    ///
    /// Refresh output can contain secret values embedded in the
    /// infrastructure definitions.
    #[must_use]
    pub fn refresh(config: &DiffConfig) -> Self {
        Self {
            kind: SubCommandKind::Refresh,
            args: vec![lock_flag(config.lock), path_arg(&config.config_files)],
        }
    }

    /// Builds `plan -lock=<bool> -detailed-exitcode -refresh=false <config_files>`.
    ///
    /// `-detailed-exitcode` makes Terraform exit with 2 when changes are
    /// pending; `-refresh=false` relies on the preceding refresh.
    #[must_use]
    pub fn plan(config: &DiffConfig) -> Self {
        Self {
            kind: SubCommandKind::Plan,
            args: vec![
                lock_flag(config.lock),
                String::from("-detailed-exitcode"),
                String::from("-refresh=false"),
                path_arg(&config.config_files),
            ],
        }
    }

    /// Returns the sub-command name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Returns the full command line for display, e.g. `terraform plan -lock=false .`.
    #[must_use]
    pub fn describe(&self, binary: &Path) -> String {
        let mut line = format!("{} {}", binary.display(), self.name());
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

fn lock_flag(lock: bool) -> String {
    format!("-lock={lock}")
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
