//! Seams between the execution adapter, the ledger and the measurement engine.

use std::{sync::Arc, time::Duration};

use alloy_primitives::Address;
use async_trait::async_trait;
use erc20_bench_workload::{ContractCall, Operation};

use crate::{SessionResult, TransactionAdapter, TxStatus};

/// A committed call as reported by the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Native transaction id.
    pub tx_id: String,
    /// Ledger specific payload, such as a receipt.
    pub payload: serde_json::Value,
}

/// A connection to a ledger, shared read-only by every call of a batch.
#[async_trait]
pub trait LedgerSession: Send + Sync {
    /// Sender used for calls without an explicit one.
    fn default_sender(&self) -> Address;

    /// Submits a state-changing call and waits for it to be committed.
    async fn invoke(
        &self,
        contract: &str,
        call: &ContractCall,
        from: Option<Address>,
    ) -> SessionResult<Invocation>;

    /// Performs a read-only call.
    async fn call(&self, contract: &str, call: &ContractCall) -> SessionResult<serde_json::Value>;
}

/// Lifecycle of a ledger binding: one implementation per ledger.
#[async_trait]
pub trait LedgerConnector: Send + Sync {
    /// Session type handed out by [`LedgerConnector::acquire_session`].
    type Session: LedgerSession;

    /// Checks that the ledger is reachable.
    async fn init(&self) -> SessionResult<()>;

    /// Opens a session for one worker.
    async fn acquire_session(&self) -> SessionResult<Self::Session>;

    /// Closes a session.
    async fn release_session(&self, _session: Self::Session) -> SessionResult<()> {
        Ok(())
    }

    /// Executes `batch` on `session`, one status per operation.
    async fn execute_batch(
        &self,
        session: &Self::Session,
        contract: &str,
        batch: &[Operation],
        timeout: Duration,
        metrics: &dyn MetricsPort,
    ) -> Vec<TxStatus> {
        TransactionAdapter::new(session, contract, timeout).execute(batch, metrics).await
    }

    /// Performs a read-only call on `session`.
    async fn query(
        &self,
        session: &Self::Session,
        contract: &str,
        call: &ContractCall,
        timeout: Duration,
        metrics: Option<&dyn MetricsPort>,
    ) -> TxStatus {
        TransactionAdapter::new(session, contract, timeout).query(call, metrics).await
    }
}

/// Receives submission accounting from the adapter.
#[cfg_attr(test, mockall::automock)]
pub trait MetricsPort: Send + Sync {
    /// Adds `delta` to the number of submitted calls. Negative values retract setup calls.
    fn record_submitted(&self, delta: i64);
}

impl<T: MetricsPort + ?Sized> MetricsPort for &T {
    fn record_submitted(&self, delta: i64) {
        (**self).record_submitted(delta);
    }
}

impl<T: MetricsPort + ?Sized> MetricsPort for Arc<T> {
    fn record_submitted(&self, delta: i64) {
        (**self).record_submitted(delta);
    }
}

impl<A: MetricsPort, B: MetricsPort> MetricsPort for (A, B) {
    fn record_submitted(&self, delta: i64) {
        self.0.record_submitted(delta);
        self.1.record_submitted(delta);
    }
}
