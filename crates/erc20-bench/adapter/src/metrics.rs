use core::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crate::MetricsPort;

/// No-op implementation of [`MetricsPort`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsPort for NoopMetrics {
    fn record_submitted(&self, _delta: i64) {}
}

/// In-process submission counter.
///
/// `pending` is the running sum of every delta and may go negative when setup calls are
/// retracted before anything was submitted.
#[derive(Debug, Default)]
pub struct SubmissionCounter {
    pending: AtomicI64,
    submitted: AtomicU64,
    retracted: AtomicU64,
}

impl SubmissionCounter {
    /// Creates a zeroed counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Net number of submissions.
    pub fn pending(&self) -> i64 {
        self.pending.load(Ordering::Relaxed)
    }

    /// Sum of positive deltas.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Sum of negative deltas, as a positive number.
    pub fn retracted(&self) -> u64 {
        self.retracted.load(Ordering::Relaxed)
    }
}

impl MetricsPort for SubmissionCounter {
    fn record_submitted(&self, delta: i64) {
        self.pending.fetch_add(delta, Ordering::Relaxed);
        if delta >= 0 {
            self.submitted.fetch_add(delta.unsigned_abs(), Ordering::Relaxed);
        } else {
            self.retracted.fetch_add(delta.unsigned_abs(), Ordering::Relaxed);
        }
    }
}

/// [`MetricsPort`] backed by the [`metrics`] crate.
///
/// Registers `erc20_bench_submitted_total` and `erc20_bench_pending_submissions` in the
/// global recorder.
pub struct RecorderMetrics {
    submitted_total: metrics::Counter,
    pending_submissions: metrics::Gauge,
}

impl Default for RecorderMetrics {
    fn default() -> Self {
        Self {
            submitted_total: metrics::counter!("erc20_bench_submitted_total"),
            pending_submissions: metrics::gauge!("erc20_bench_pending_submissions"),
        }
    }
}

impl Debug for RecorderMetrics {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecorderMetrics").finish_non_exhaustive()
    }
}

impl MetricsPort for RecorderMetrics {
    fn record_submitted(&self, delta: i64) {
        if delta > 0 {
            self.submitted_total.increment(delta.unsigned_abs());
        }
        self.pending_submissions.increment(delta as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retraction_without_prior_submission_goes_negative() {
        let counter = SubmissionCounter::new();
        counter.record_submitted(-3);

        assert_eq!(counter.pending(), -3);
        assert_eq!(counter.submitted(), 0);
        assert_eq!(counter.retracted(), 3);
    }

    #[test]
    fn deltas_are_summed() {
        let counter = SubmissionCounter::new();
        for _ in 0..4 {
            counter.record_submitted(1);
        }
        counter.record_submitted(-4);

        assert_eq!(counter.pending(), 0);
        assert_eq!(counter.submitted(), 4);
    }

    #[test]
    fn pair_forwards_to_both() {
        let (left, right) = (SubmissionCounter::new(), SubmissionCounter::new());
        (&left, &right).record_submitted(2);

        assert_eq!(left.pending(), 2);
        assert_eq!(right.pending(), 2);
    }

    #[test]
    fn recorder_accepts_negative_deltas() {
        RecorderMetrics::default().record_submitted(-1);
        NoopMetrics.record_submitted(-1);
    }
}
