//! Planning module for drift detection.
//!
//! This module sequences the Terraform sub-commands of a drift check and
//! interprets the plan's detailed exit code.

mod outcome;
mod pipeline;

pub use outcome::{Diff, PLAN_CHANGES_PRESENT, PLAN_NO_CHANGES, PlanOutcome};
pub use pipeline::DriftPlanner;
