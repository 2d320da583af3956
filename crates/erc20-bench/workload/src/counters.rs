//! Per-kind success counters for end-of-run diagnostics.

use core::fmt;

use serde::Serialize;

use crate::OperationKind;

/// Number of operations synthesized per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindCounters {
    /// Synthesized transfers.
    pub transfer: u64,
    /// Synthesized approvals.
    pub approve: u64,
    /// Synthesized delegated transfers.
    pub transfer_from: u64,
    /// Synthesized allowance increases.
    pub increase_allowance: u64,
}

impl KindCounters {
    /// Records one synthesized operation of `kind`.
    pub const fn record(&mut self, kind: OperationKind) {
        *self.slot(kind) += 1;
    }

    /// Returns the count for `kind`.
    pub const fn get(&self, kind: OperationKind) -> u64 {
        match kind {
            OperationKind::Transfer => self.transfer,
            OperationKind::Approve => self.approve,
            OperationKind::TransferFrom => self.transfer_from,
            OperationKind::IncreaseAllowance => self.increase_allowance,
        }
    }

    /// Returns the number of synthesized operations across all kinds.
    pub const fn total(&self) -> u64 {
        self.transfer + self.approve + self.transfer_from + self.increase_allowance
    }

    const fn slot(&mut self, kind: OperationKind) -> &mut u64 {
        match kind {
            OperationKind::Transfer => &mut self.transfer,
            OperationKind::Approve => &mut self.approve,
            OperationKind::TransferFrom => &mut self.transfer_from,
            OperationKind::IncreaseAllowance => &mut self.increase_allowance,
        }
    }
}

impl fmt::Display for KindCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer: {} - Approval: {} - TransferFrom: {} - IncreaseAllowance: {}",
            self.transfer, self.approve, self.transfer_from, self.increase_allowance
        )
    }
}
