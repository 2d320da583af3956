//! Error types for ledger sessions.

use std::time::Duration;

use alloy_primitives::{Address, TxHash};
use alloy_provider::PendingTransactionError;
use alloy_transport::TransportError;
use thiserror::Error;

/// Result alias for session calls.
pub type SessionResult<T> = Result<T, SessionError>;

/// Failure of a single session call.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The RPC transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Waiting for the receipt failed.
    #[error(transparent)]
    Pending(#[from] PendingTransactionError),
    /// Call data could not be decoded.
    #[error("abi error: {0}")]
    Abi(#[from] alloy_sol_types::Error),
    /// A payload could not be serialized.
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    /// The contract name is not in the session's contract table.
    #[error("unknown contract `{0}`")]
    UnknownContract(String),
    /// The contract has no such method.
    #[error("unsupported method `{0}`")]
    UnsupportedMethod(String),
    /// The arguments do not match the method signature.
    #[error("invalid arguments for `{verb}`")]
    InvalidArguments {
        /// Method called.
        verb: &'static str,
    },
    /// The transaction was mined but reverted.
    #[error("transaction {tx_hash} reverted")]
    Reverted {
        /// Hash of the reverted transaction.
        tx_hash: TxHash,
    },
    /// The registry has no entry for the contract.
    #[error("contract `{0}` is not registered")]
    Unregistered(String),
    /// The sender could not be unlocked.
    #[error("account {0} could not be unlocked")]
    Locked(Address),
    /// The call did not complete in time.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),
    /// The session rejected the call.
    #[error("{0}")]
    Rejected(String),
}

/// Failure while seeding the shadow ledger from the live ledger.
#[derive(Debug, Error)]
pub enum SeedError {
    /// A setup query failed.
    #[error("{function} query failed: {error}")]
    Query {
        /// Contract function queried.
        function: &'static str,
        /// Error message of the failed call.
        error: String,
    },
    /// A setup query returned something that is not an amount.
    #[error("{function} returned a malformed amount: {value}")]
    Malformed {
        /// Contract function queried.
        function: &'static str,
        /// Value returned.
        value: serde_json::Value,
    },
}
