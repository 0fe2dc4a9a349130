//! Runner module for invoking Terraform.
//!
//! This module builds the argument lists for each sub-command and runs them
//! as child processes with the drift-check environment.

mod commands;
// The generated `MockCommandRunner` carries no docs.
#[cfg_attr(test, allow(missing_docs))]
mod process;

pub use commands::{SubCommand, SubCommandKind};
pub use process::{
    AUTOMATION_ENV, CommandRunner, ProcessResult, TerraformRunner, UNKNOWN_EXIT_CODE,
};

#[cfg(test)]
pub use process::MockCommandRunner;
