//! End-of-run report.

use std::{fs, path::Path, time::Duration};

use erc20_bench_adapter::TxStatus;
use erc20_bench_workload::KindCounters;
use eyre::WrapErr;
use serde::Serialize;

/// Aggregated outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RunReport {
    /// Batches executed.
    pub(crate) rounds: usize,
    /// Calls submitted.
    pub(crate) submitted: u64,
    /// Calls confirmed.
    pub(crate) succeeded: u64,
    /// Calls failed.
    pub(crate) failed: u64,
    /// Submitted calls per second of wall time.
    pub(crate) send_rate: f64,
    /// Mean call latency in milliseconds.
    pub(crate) mean_latency_ms: f64,
    /// Largest call latency in milliseconds.
    pub(crate) max_latency_ms: f64,
    /// Wall time of the run in seconds.
    pub(crate) duration_secs: f64,
    /// Operations synthesized per kind.
    pub(crate) counters: KindCounters,
    #[serde(skip)]
    total_latency: Duration,
    #[serde(skip)]
    max_latency: Duration,
}

impl RunReport {
    /// Adds the statuses of one batch.
    pub(crate) fn record(&mut self, statuses: &[TxStatus]) {
        self.rounds += 1;
        for status in statuses {
            self.submitted += 1;
            if status.is_success() {
                self.succeeded += 1;
            } else {
                self.failed += 1;
            }
            self.total_latency += status.latency;
            self.max_latency = self.max_latency.max(status.latency);
        }
    }

    /// Computes the rates once the run is over.
    pub(crate) fn finish(&mut self, elapsed: Duration, counters: KindCounters) {
        self.duration_secs = elapsed.as_secs_f64();
        self.send_rate =
            if elapsed.is_zero() { 0.0 } else { self.submitted as f64 / elapsed.as_secs_f64() };
        self.mean_latency_ms = if self.submitted == 0 {
            0.0
        } else {
            self.total_latency.as_secs_f64() * 1_000.0 / self.submitted as f64
        };
        self.max_latency_ms = self.max_latency.as_secs_f64() * 1_000.0;
        self.counters = counters;
    }

    /// Logs the report.
    pub(crate) fn log(&self) {
        tracing::info!(
            rounds = self.rounds,
            submitted = self.submitted,
            succeeded = self.succeeded,
            failed = self.failed,
            send_rate = self.send_rate,
            mean_latency_ms = self.mean_latency_ms,
            max_latency_ms = self.max_latency_ms,
            counters = %self.counters,
            "run complete"
        );
    }

    /// Writes the report as pretty-printed JSON.
    pub(crate) fn save(&self, path: &Path) -> eyre::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).wrap_err_with(|| format!("failed to write report {}", path.display()))
    }
}
