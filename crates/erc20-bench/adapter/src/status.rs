use std::time::Duration;

use serde::Serialize;

/// Final outcome of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxOutcome {
    /// The ledger accepted the call.
    Success,
    /// The call failed at the session, timed out, or was reverted.
    Fail,
}

/// Status of one call, positionally aligned with the operation that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxStatus {
    /// Native transaction id, when the ledger assigned one.
    pub id: Option<String>,
    /// Call payload: the receipt of a transaction or the value read by a query.
    pub result: Option<serde_json::Value>,
    /// Whether the ledger confirmed the call.
    pub verified: bool,
    /// Outcome.
    pub status: TxOutcome,
    /// Error message of a failed call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Time from submission to outcome.
    pub latency: Duration,
}

impl TxStatus {
    /// A confirmed call.
    pub const fn confirmed(
        id: Option<String>,
        result: serde_json::Value,
        latency: Duration,
    ) -> Self {
        Self {
            id,
            result: Some(result),
            verified: true,
            status: TxOutcome::Success,
            error: None,
            latency,
        }
    }

    /// A failed call.
    pub const fn failed(error: String, latency: Duration) -> Self {
        Self {
            id: None,
            result: None,
            verified: false,
            status: TxOutcome::Fail,
            error: Some(error),
            latency,
        }
    }

    /// Returns `true` if the call succeeded.
    pub fn is_success(&self) -> bool {
        self.status == TxOutcome::Success
    }
}
