// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # tfdrift
//!
//! Detects drift between a declared Terraform configuration and the live
//! infrastructure, and reports it together with timing metrics.
//!
//! ## Overview
//!
//! A drift check runs three Terraform sub-commands in order:
//!
//! 1. **init**: prepares the working directory
//! 2. **refresh**: reads the live state once
//! 3. **plan**: compares state and configuration with `-detailed-exitcode`
//!
//! `init` and `refresh` must succeed. The plan exit code then decides the
//! outcome: `0` means no drift, `2` means drift (the plan output is returned
//! as a [`planner::Diff`]), anything else is a failure.
//!
//! Credentials are read from mounted files once, kept in [`secret::Secret`]
//! wrappers, and handed to Terraform only through environment variables.
//!
//! ## Modules
//!
//! - [`config`]: Settings parsing, credential loading and validation
//! - [`secret`]: Redacting wrapper for sensitive values
//! - [`runner`]: Sub-command builders and the process runner
//! - [`planner`]: The init/refresh/plan pipeline
//! - [`telemetry`]: Duration histogram and exit-code gauge sinks
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tfdrift::config::{ConfigValidator, DiffSettings};
//! use tfdrift::planner::DriftPlanner;
//! use tfdrift::telemetry::FacadeMetrics;
//!
//! # async fn check() -> tfdrift::Result<()> {
//! let settings = DiffSettings {
//!     config_files: Some("./infra".into()),
//!     ..DiffSettings::default()
//! };
//! let config = ConfigValidator::new().validate(settings, Arc::new(FacadeMetrics::new()))?;
//!
//! if let Some(diff) = DriftPlanner::new(&config).run().await? {
//!     eprintln!("drift detected:\n{diff}");
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod planner;
pub mod runner;
pub mod secret;
pub mod telemetry;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, DriftReport, OutputFormatter};
pub use config::{ConfigValidator, DiffConfig, DiffSettings, SettingsParser};
pub use error::{Result, StepFailure, TfDriftError};
pub use planner::{Diff, DriftPlanner, PlanOutcome};
pub use runner::{CommandRunner, ProcessResult, SubCommand, TerraformRunner};
pub use secret::Secret;
pub use telemetry::{DiffMetrics, FacadeMetrics, InMemoryMetrics};
