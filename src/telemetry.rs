//! Telemetry Module
//!
//! Lightweight counters over the pipeline's operational behavior: how many
//! analyses ran, how often passes degraded, and how often endpoint probes
//! failed during failover. Shared as an `Arc`; no per-request state and no
//! addresses or hashes recorded.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for the pipeline
#[derive(Debug, Default)]
pub struct PipelineTelemetry {
    analyses_started: AtomicU64,
    analyses_completed: AtomicU64,
    analyses_failed: AtomicU64,
    degraded_passes: AtomicU64,
    endpoint_probe_failures: AtomicU64,
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub analyses_started: u64,
    pub analyses_completed: u64,
    pub analyses_failed: u64,
    pub degraded_passes: u64,
    pub endpoint_probe_failures: u64,
}

impl PipelineTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_analysis_started(&self) {
        self.analyses_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_analysis_completed(&self) {
        self.analyses_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_analysis_failed(&self) {
        self.analyses_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// A pass fell back to its default instead of failing the pipeline
    pub fn record_degraded_pass(&self) {
        self.degraded_passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_probe_failure(&self) {
        self.endpoint_probe_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            analyses_started: self.analyses_started.load(Ordering::Relaxed),
            analyses_completed: self.analyses_completed.load(Ordering::Relaxed),
            analyses_failed: self.analyses_failed.load(Ordering::Relaxed),
            degraded_passes: self.degraded_passes.load(Ordering::Relaxed),
            endpoint_probe_failures: self.endpoint_probe_failures.load(Ordering::Relaxed),
        }
    }
}
