//! Prometheus metrics for pipeline runs.
//!
//! Collectors are process-wide statics; the server registers them through
//! [`all_metrics`].

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};
use std::time::Duration;

use crate::pipeline::Stage;

/// Pipeline runs by result.
pub static PIPELINE_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("image_pipe_pipeline_runs_total", "Total pipeline runs"),
        &["result"], // "success", "source_failed", "transform_failed", "sink_failed"
    )
    .unwrap()
});

/// Pipeline run duration in seconds.
pub static PIPELINE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "image_pipe_pipeline_duration_seconds",
            "Wall time of a pipeline run",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0]),
        &["result"],
    )
    .unwrap()
});

/// Bytes moved through successful runs.
pub static PIPELINE_BYTES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "image_pipe_pipeline_bytes_total",
            "Bytes read from sources and committed to destinations",
        ),
        &["direction"], // "in", "out"
    )
    .unwrap()
});

/// Records a successful run.
pub fn record_success(elapsed: Duration, bytes_in: u64, bytes_out: u64) {
    PIPELINE_RUNS.with_label_values(&["success"]).inc();
    PIPELINE_DURATION
        .with_label_values(&["success"])
        .observe(elapsed.as_secs_f64());
    PIPELINE_BYTES.with_label_values(&["in"]).inc_by(bytes_in);
    PIPELINE_BYTES.with_label_values(&["out"]).inc_by(bytes_out);
}

/// Records a failed run, labelled with the stage that failed first.
pub fn record_failure(elapsed: Duration, stage: Stage) {
    let result = failure_label(stage);
    PIPELINE_RUNS.with_label_values(&[result]).inc();
    PIPELINE_DURATION
        .with_label_values(&[result])
        .observe(elapsed.as_secs_f64());
}

fn failure_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Source => "source_failed",
        Stage::Transform => "transform_failed",
        Stage::Sink => "sink_failed",
    }
}

/// All core metrics, for registration with a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PIPELINE_RUNS.clone()),
        Box::new(PIPELINE_DURATION.clone()),
        Box::new(PIPELINE_BYTES.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_failure_uses_stage_label() {
        let before = PIPELINE_RUNS.with_label_values(&["sink_failed"]).get();
        record_failure(Duration::from_millis(5), Stage::Sink);
        let after = PIPELINE_RUNS.with_label_values(&["sink_failed"]).get();
        assert!(after > before);
    }

    #[test]
    fn test_record_success_counts_bytes() {
        let before = PIPELINE_BYTES.with_label_values(&["out"]).get();
        record_success(Duration::from_millis(5), 10, 7);
        assert!(PIPELINE_BYTES.with_label_values(&["out"]).get() >= before + 7);
    }

    #[test]
    fn test_all_metrics_registers_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        assert_eq!(all_metrics().len(), 3);
    }
}
