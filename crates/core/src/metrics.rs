//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Job registry (submissions, outcomes, running jobs, stalls)
//! - Metadata prober (probe outcomes and latency)
//! - Process runner (spawn failures)

use once_cell::sync::Lazy;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
};

// =============================================================================
// Job Registry Metrics
// =============================================================================

/// Jobs accepted by the registry.
pub static JOBS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("clipfetch_jobs_submitted_total", "Total jobs accepted")
        .unwrap()
});

/// Jobs rejected at submission time by reason.
pub static JOBS_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "clipfetch_jobs_rejected_total",
            "Total job submissions rejected",
        ),
        &["reason"], // "not_ready", "validation"
    )
    .unwrap()
});

/// Jobs that reached a terminal status, by status.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "clipfetch_jobs_finished_total",
            "Total jobs that reached a terminal status",
        ),
        &["status"], // "completed", "failed", "cancelled"
    )
    .unwrap()
});

/// Jobs currently holding a concurrency slot.
pub static JOBS_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "clipfetch_jobs_running",
        "Jobs whose process has been dispatched and not yet reaped",
    )
    .unwrap()
});

/// Jobs waiting for a free slot.
pub static JOBS_QUEUED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("clipfetch_jobs_queued", "Jobs waiting in the FIFO queue").unwrap()
});

/// Wall-clock duration from dispatch to terminal status.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "clipfetch_job_duration_seconds",
            "Duration of a job from dispatch to terminal status",
        )
        .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["status"],
    )
    .unwrap()
});

/// Jobs killed because they stopped reporting progress.
pub static STALL_DETECTIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "clipfetch_stall_detections_total",
        "Total jobs killed by the stall watchdog",
    )
    .unwrap()
});

// =============================================================================
// Prober Metrics
// =============================================================================

/// Probes by result.
pub static PROBES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clipfetch_probes_total", "Total metadata probes"),
        &["result"], // "video", "playlist", "error"
    )
    .unwrap()
});

/// Probe duration in seconds.
pub static PROBE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "clipfetch_probe_duration_seconds",
            "Duration of metadata probes",
        )
        .buckets(vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
    )
    .unwrap()
});

// =============================================================================
// Runner Metrics
// =============================================================================

/// Process spawn failures.
pub static SPAWN_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "clipfetch_spawn_failures_total",
        "Total external processes that failed to start",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Registry
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOBS_REJECTED.clone()),
        Box::new(JOBS_FINISHED.clone()),
        Box::new(JOBS_RUNNING.clone()),
        Box::new(JOBS_QUEUED.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(STALL_DETECTIONS.clone()),
        // Prober
        Box::new(PROBES_TOTAL.clone()),
        Box::new(PROBE_DURATION.clone()),
        // Runner
        Box::new(SPAWN_FAILURES.clone()),
    ]
}
