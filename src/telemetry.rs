//! Measurement sinks for drift runs.
//!
//! The planner never talks to a metrics backend directly. It records through
//! the [`DiffMetrics`] handle stored in the validated config, which is either
//! forwarded to the `metrics` crate facade ([`FacadeMetrics`]) or kept in
//! memory ([`InMemoryMetrics`]).

use serde::Serialize;
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

/// Histogram of sub-command durations, labelled by command and exit code.
pub const COMMAND_DURATION_METRIC: &str = "tfdrift_command_duration_seconds";

/// Gauge holding the exit code of the latest `plan`.
pub const PLAN_EXIT_CODE_METRIC: &str = "tfdrift_plan_exit_code";

/// Lower bound of the first duration bucket, in seconds.
pub const DURATION_BUCKET_START: f64 = 5.0;

/// Width of each duration bucket, in seconds.
pub const DURATION_BUCKET_WIDTH: f64 = 5.0;

/// Number of duration buckets.
pub const DURATION_BUCKET_COUNT: usize = 24;

/// Sink for the two measurements a drift run produces.
///
/// Implementations must tolerate concurrent calls from independent runs.
pub trait DiffMetrics: Send + Sync + Debug {
    /// Records how long one sub-command took.
    ///
    /// `exit_code` is the decimal exit code, `"0"` on success.
    fn observe_duration(&self, command: &str, exit_code: &str, seconds: f64);

    /// Records the exit code of the latest `plan`.
    fn set_last_exit_code(&self, code: i32);
}

/// Returns `count` bucket upper bounds starting at `start`, `width` apart.
#[must_use]
pub fn linear_buckets(start: f64, width: f64, count: usize) -> Vec<f64> {
    let mut bounds = Vec::with_capacity(count);
    let mut bound = start;
    for _ in 0..count {
        bounds.push(bound);
        bound += width;
    }
    bounds
}

/// Returns the bucket bounds used for command durations.
#[must_use]
pub fn duration_buckets() -> Vec<f64> {
    linear_buckets(DURATION_BUCKET_START, DURATION_BUCKET_WIDTH, DURATION_BUCKET_COUNT)
}

// ============================================================================
// Facade
// ============================================================================

/// Forwards measurements to whatever recorder is installed for the `metrics` crate.
///
/// Exporters should bucket [`COMMAND_DURATION_METRIC`] with [`duration_buckets`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeMetrics;

impl FacadeMetrics {
    /// Creates a facade sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Registers units and help text with the installed recorder.
    pub fn describe() {
        metrics::describe_histogram!(
            COMMAND_DURATION_METRIC,
            metrics::Unit::Seconds,
            "Duration of Terraform sub-commands"
        );
        metrics::describe_gauge!(
            PLAN_EXIT_CODE_METRIC,
            "Exit code of the latest terraform plan"
        );
    }
}

impl DiffMetrics for FacadeMetrics {
    fn observe_duration(&self, command: &str, exit_code: &str, seconds: f64) {
        metrics::histogram!(
            COMMAND_DURATION_METRIC,
            "command" => command.to_owned(),
            "exit_code" => exit_code.to_owned()
        )
        .record(seconds);
    }

    fn set_last_exit_code(&self, code: i32) {
        metrics::gauge!(PLAN_EXIT_CODE_METRIC).set(f64::from(code));
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// A single recorded duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// Sub-command name.
    pub command: String,
    /// Exit code label.
    pub exit_code: String,
    /// Duration in seconds.
    pub seconds: f64,
}

/// Keeps every measurement in memory.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    observations: Mutex<Vec<Observation>>,
    last_exit_code: Mutex<Option<i32>>,
}

impl InMemoryMetrics {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded duration, oldest first.
    #[must_use]
    pub fn observations(&self) -> Vec<Observation> {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the last exit code set on the gauge, if any.
    #[must_use]
    pub fn last_exit_code(&self) -> Option<i32> {
        *self
            .last_exit_code
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns cumulative observation counts for each bound of [`duration_buckets`].
    #[must_use]
    pub fn bucket_counts(&self) -> Vec<(f64, usize)> {
        let observations = self.observations();
        duration_buckets()
            .into_iter()
            .map(|bound| {
                let count = observations.iter().filter(|o| o.seconds <= bound).count();
                (bound, count)
            })
            .collect()
    }

    /// Drops all recorded durations, keeping the gauge value.
    pub fn clear_observations(&self) {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl DiffMetrics for InMemoryMetrics {
    fn observe_duration(&self, command: &str, exit_code: &str, seconds: f64) {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Observation {
                command: command.to_owned(),
                exit_code: exit_code.to_owned(),
                seconds,
            });
    }

    fn set_last_exit_code(&self, code: i32) {
        *self
            .last_exit_code
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::{
        Counter, Gauge, GaugeFn, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder,
        SharedString, Unit,
    };
    use std::sync::Arc;

    type Records = Arc<Mutex<Vec<(String, Vec<(String, String)>, f64)>>>;

    #[derive(Default)]
    struct CaptureRecorder {
        histograms: Records,
        gauge: Arc<Mutex<Option<f64>>>,
    }

    struct CaptureHistogram {
        key: Key,
        records: Records,
    }

    struct CaptureGauge(Arc<Mutex<Option<f64>>>);

    impl HistogramFn for CaptureHistogram {
        fn record(&self, value: f64) {
            let labels = self
                .key
                .labels()
                .map(|l| (l.key().to_owned(), l.value().to_owned()))
                .collect();
            self.records
                .lock()
                .unwrap()
                .push((self.key.name().to_owned(), labels, value));
        }
    }

    impl GaugeFn for CaptureGauge {
        fn increment(&self, _value: f64) {}

        fn decrement(&self, _value: f64) {}

        fn set(&self, value: f64) {
            *self.0.lock().unwrap() = Some(value);
        }
    }

    impl Recorder for CaptureRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, _: &Key, _: &Metadata<'_>) -> Counter {
            Counter::noop()
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::from_arc(Arc::new(CaptureGauge(Arc::clone(&self.gauge))))
        }

        fn register_histogram(&self, key: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::from_arc(Arc::new(CaptureHistogram {
                key: key.clone(),
                records: Arc::clone(&self.histograms),
            }))
        }
    }

    #[test]
    fn test_linear_buckets() {
        assert_eq!(linear_buckets(1.0, 2.0, 4), vec![1.0, 3.0, 5.0, 7.0]);
        assert!(linear_buckets(1.0, 2.0, 0).is_empty());

        let buckets = duration_buckets();
        assert_eq!(buckets.len(), DURATION_BUCKET_COUNT);
        assert!((buckets[0] - 5.0).abs() < f64::EPSILON);
        assert!((buckets[23] - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_in_memory_records() {
        let metrics = InMemoryMetrics::new();
        assert!(metrics.last_exit_code().is_none());

        metrics.observe_duration("init", "0", 3.0);
        metrics.observe_duration("plan", "2", 12.5);
        metrics.set_last_exit_code(2);

        let observations = metrics.observations();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].command, "init");
        assert_eq!(observations[1].exit_code, "2");
        assert_eq!(metrics.last_exit_code(), Some(2));

        metrics.clear_observations();
        assert!(metrics.observations().is_empty());
        assert_eq!(metrics.last_exit_code(), Some(2));
    }

    #[test]
    fn test_bucket_counts_are_cumulative() {
        let metrics = InMemoryMetrics::new();
        metrics.observe_duration("init", "0", 4.0);
        metrics.observe_duration("refresh", "0", 9.0);
        metrics.observe_duration("plan", "0", 500.0);

        let counts = metrics.bucket_counts();
        assert_eq!(counts[0], (5.0, 1));
        assert_eq!(counts[1], (10.0, 2));
        assert_eq!(counts.last().map(|c| c.1), Some(2));
    }

    #[test]
    fn test_facade_forwards_to_recorder() {
        let recorder = CaptureRecorder::default();
        metrics::with_local_recorder(&recorder, || {
            let sink = FacadeMetrics::new();
            sink.observe_duration("refresh", "1", 7.5);
            sink.set_last_exit_code(1);
        });

        let histograms = recorder.histograms.lock().unwrap();
        assert_eq!(histograms.len(), 1);
        let (name, labels, value) = &histograms[0];
        assert_eq!(name, COMMAND_DURATION_METRIC);
        assert!(labels.contains(&(String::from("command"), String::from("refresh"))));
        assert!(labels.contains(&(String::from("exit_code"), String::from("1"))));
        assert!((value - 7.5).abs() < f64::EPSILON);
        assert_eq!(*recorder.gauge.lock().unwrap(), Some(1.0));
    }
}
