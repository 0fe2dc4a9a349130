//! Repeated drift checks for the `watch` command.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::output::{DriftChange, DriftReport, FingerprintTracker};
use crate::config::DiffConfig;
use crate::error::Result;
use crate::planner::DriftPlanner;
use crate::telemetry::InMemoryMetrics;

/// Runs a drift check every period until a shutdown future resolves.
#[derive(Debug)]
pub struct DriftWatcher<'a> {
    config: &'a DiffConfig,
    metrics: Arc<InMemoryMetrics>,
    period: Duration,
}

impl<'a> DriftWatcher<'a> {
    /// Creates a watcher. `metrics` must be the sink held by `config`.
    #[must_use]
    pub const fn new(
        config: &'a DiffConfig,
        metrics: Arc<InMemoryMetrics>,
        period: Duration,
    ) -> Self {
        Self {
            config,
            metrics,
            period,
        }
    }

    /// Checks for drift until `shutdown` resolves, handing each report to
    /// `on_report`.
    ///
    /// `shutdown` is polled first, during checks as well as between them; a check
    /// that is cut short is dropped, which kills its Terraform process.
    /// A run that outlasts the period delays the next tick instead of
    /// triggering catch-up runs.
    ///
    /// # Errors
    ///
    /// Returns the first error from `on_report`.
    pub async fn run<S, F>(&self, shutdown: S, mut on_report: F) -> Result<()>
    where
        S: Future,
        F: FnMut(&DriftReport, DriftChange) -> Result<()>,
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tracker = FingerprintTracker::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Interrupted, stopping watch");
                    return Ok(());
                }
                _ = interval.tick() => {}
            }

            self.metrics.clear_observations();
            let planner = DriftPlanner::new(self.config);
            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Interrupted during a drift check, stopping watch");
                    return Ok(());
                }
                outcome = planner.run() => outcome,
            };

            let report = DriftReport::from_run(&outcome, self.metrics.observations());
            let change = tracker.observe(&report);
            match change {
                DriftChange::Appeared => warn!("Drift detected"),
                DriftChange::Changed => warn!("Drift changed since the previous check"),
                DriftChange::Resolved => info!("Drift resolved"),
                DriftChange::Unknown => debug!("Keeping previous drift fingerprint after failure"),
                DriftChange::Clean | DriftChange::Unchanged => {}
            }

            on_report(&report, change)?;
        }
    }
}
