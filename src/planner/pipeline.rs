//! Drift planner: runs `init`, `refresh` and `plan` in order.
//!
//! `init` and `refresh` are pass/fail gates: any non-zero exit ends the run.
//! `plan` runs with `-detailed-exitcode` and `-refresh=false`, so the single
//! refresh above is the only state read, and its exit code decides between
//! no drift, drift, and failure.

use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use super::outcome::{Diff, PlanOutcome};
use crate::config::DiffConfig;
use crate::error::{Result, StepFailure};
use crate::runner::{CommandRunner, SubCommand, TerraformRunner};

/// Computes whether live infrastructure differs from the configuration.
#[derive(Debug)]
pub struct DriftPlanner<'a, R: CommandRunner> {
    /// Validated configuration.
    config: &'a DiffConfig,
    /// Runner executing the sub-commands.
    runner: R,
}

impl<'a> DriftPlanner<'a, TerraformRunner<'a>> {
    /// Creates a planner that runs the configured Terraform binary.
    #[must_use]
    pub const fn new(config: &'a DiffConfig) -> Self {
        Self {
            config,
            runner: TerraformRunner::new(config),
        }
    }
}

impl<'a, R: CommandRunner> DriftPlanner<'a, R> {
    /// Creates a planner with a custom runner.
    #[must_use]
    pub const fn with_runner(config: &'a DiffConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Runs one full drift check.
    ///
    /// Returns `Ok(None)` when nothing drifted and `Ok(Some(diff))` when the
    /// plan reported changes.
    ///
    /// # Errors
    ///
    /// Returns [`TfDriftError::Step`](crate::error::TfDriftError::Step) when a
    /// sub-command fails, or a process error when Terraform cannot be run.
    pub async fn run(&self) -> Result<Option<Diff>> {
        let run_id = Uuid::new_v4();
        self.run_steps()
            .instrument(info_span!("drift_run", %run_id))
            .await
    }

    async fn run_steps(&self) -> Result<Option<Diff>> {
        info!(
            "Checking drift for {} in {}",
            self.config.config_files.display(),
            self.config.working_dir.display()
        );

        self.gate(SubCommand::init(self.config)).await?;
        self.gate(SubCommand::refresh(self.config)).await?;

        match self.plan().await? {
            PlanOutcome::NoChanges => {
                info!("No drift detected");
                Ok(None)
            }
            PlanOutcome::Changed(diff) => {
                info!("Drift detected ({} bytes of plan output)", diff.as_bytes().len());
                Ok(Some(diff))
            }
            PlanOutcome::Failed(result) => {
                error!("Terraform plan failed:\n{result}");
                Err(StepFailure::new(result).into())
            }
        }
    }

    /// Runs a pass/fail step.
    async fn gate(&self, command: SubCommand) -> Result<()> {
        let result = self.runner.run(&command).await?;

        if result.success() {
            debug!("{} succeeded", result.title);
            Ok(())
        } else {
            // Lock contention is indistinguishable from other failures here.
            error!("{} failed:\n{result}", result.title);
            Err(StepFailure::new(result).into())
        }
    }

    /// Runs `plan` and records its exit code on the gauge.
    async fn plan(&self) -> Result<PlanOutcome> {
        let result = self.runner.run(&SubCommand::plan(self.config)).await?;
        self.config.metrics.set_last_exit_code(result.exit_code);
        Ok(PlanOutcome::from(result))
    }
}
