//! Counters kept by [`ProverPool`](crate::ProverPool).

use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::time::Duration;

use serde::Serialize;

/// Lock-free proving counters shared between pool clones.
#[derive(Debug, Default)]
pub struct ProofMetrics {
    generated: AtomicU64,
    failed: AtomicU64,
    in_flight: AtomicU64,
    peak_in_flight: AtomicU64,
    proving_nanos: AtomicU64,
}

impl ProofMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, proving_time: Duration) {
        let nanos = u64::try_from(proving_time.as_nanos()).unwrap_or(u64::MAX);
        self.proving_nanos.fetch_add(nanos, Relaxed);
        self.generated.fetch_add(1, Relaxed);
    }

    /// Rejected witnesses count here as well as backend errors.
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Relaxed);
    }

    /// A request entered the pool, whether or not it holds a worker yet.
    pub fn request_started(&self) {
        let now = self.in_flight.fetch_add(1, Relaxed) + 1;
        self.peak_in_flight.fetch_max(now, Relaxed);
    }

    pub fn request_finished(&self) {
        self.in_flight.fetch_sub(1, Relaxed);
    }

    pub fn generated(&self) -> u64 {
        self.generated.load(Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Relaxed)
    }

    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Relaxed)
    }

    pub fn peak_in_flight(&self) -> u64 {
        self.peak_in_flight.load(Relaxed)
    }

    /// Mean time of successful proofs; zero before the first one.
    pub fn avg_proving_time(&self) -> Duration {
        match self.generated() {
            0 => Duration::ZERO,
            n => Duration::from_nanos(self.proving_nanos.load(Relaxed) / n),
        }
    }

    /// Share of finished requests that produced a proof, in percent.
    pub fn success_rate(&self) -> f64 {
        let (ok, failed) = (self.generated(), self.failed());
        if ok + failed == 0 {
            return 100.0;
        }
        ok as f64 * 100.0 / (ok + failed) as f64
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            generated: self.generated(),
            failed: self.failed(),
            in_flight: self.in_flight(),
            peak_in_flight: self.peak_in_flight(),
            avg_proving_time: self.avg_proving_time(),
            success_rate: self.success_rate(),
        }
    }
}

/// Point-in-time copy of [`ProofMetrics`]. Fields are read one by one, so a
/// snapshot taken under load may mix moments.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub generated: u64,
    pub failed: u64,
    pub in_flight: u64,
    pub peak_in_flight: u64,
    pub avg_proving_time: Duration,
    pub success_rate: f64,
}
