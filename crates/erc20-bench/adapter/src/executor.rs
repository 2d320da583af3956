//! Concurrent batch execution.

use std::{
    future::Future,
    time::{Duration, Instant},
};

use erc20_bench_workload::{ContractCall, Operation};
use futures::future::join_all;

use crate::{
    CallEvent, CallState, LedgerSession, MetricsPort, SessionError, SessionResult, TxStatus,
};

/// Executes operations against one contract of a [`LedgerSession`].
///
/// Every operation of a batch is submitted as an independent call. The calls are polled
/// together on the caller's task and the statuses come back in batch order, whatever the
/// order in which the calls complete. A failing call never affects its siblings.
#[derive(Debug)]
pub struct TransactionAdapter<'a, S: ?Sized> {
    session: &'a S,
    contract: &'a str,
    timeout: Duration,
}

impl<'a, S: LedgerSession + ?Sized> TransactionAdapter<'a, S> {
    /// Creates an adapter for `contract`, bounding every call by `timeout`.
    pub const fn new(session: &'a S, contract: &'a str, timeout: Duration) -> Self {
        Self { session, contract, timeout }
    }

    /// Executes `batch` concurrently. Returns one status per operation, in batch order.
    pub async fn execute(&self, batch: &[Operation], metrics: &dyn MetricsPort) -> Vec<TxStatus> {
        let calls = batch
            .iter()
            .enumerate()
            .map(|(index, operation)| self.submit(index, operation, metrics));
        let statuses = join_all(calls).await;

        let failed = statuses.iter().filter(|status| !status.is_success()).count();
        tracing::debug!(contract = self.contract, size = batch.len(), failed, "batch executed");
        statuses
    }

    /// Performs a read-only call. Submission is counted only when `metrics` is given.
    pub async fn query(&self, call: &ContractCall, metrics: Option<&dyn MetricsPort>) -> TxStatus {
        if let Some(metrics) = metrics {
            metrics.record_submitted(1);
        }

        let started = Instant::now();
        match self.bounded(self.session.call(self.contract, call)).await {
            Ok(value) => TxStatus::confirmed(None, value, started.elapsed()),
            Err(error) => {
                tracing::warn!(verb = call.verb, %error, "query failed");
                TxStatus::failed(error.to_string(), started.elapsed())
            }
        }
    }

    async fn submit(
        &self,
        index: usize,
        operation: &Operation,
        metrics: &dyn MetricsPort,
    ) -> TxStatus {
        let call = operation.to_call();
        let sender = operation.sender();

        let state = CallState::Pending.on(CallEvent::Submit);
        metrics.record_submitted(1);
        let started = Instant::now();
        let result = self.bounded(self.session.invoke(self.contract, &call, sender)).await;
        let latency = started.elapsed();

        let (event, status) = match result {
            Ok(invocation) => (
                CallEvent::Confirm,
                TxStatus::confirmed(Some(invocation.tx_id), invocation.payload, latency),
            ),
            Err(error) => {
                tracing::warn!(index, verb = call.verb, ?sender, %error, "transaction failed");
                (CallEvent::Fail, TxStatus::failed(error.to_string(), latency))
            }
        };
        tracing::trace!(
            index,
            state = ?state.and_then(|state| state.on(event)),
            ?latency,
            "call settled"
        );
        status
    }

    async fn bounded<T>(&self, call: impl Future<Output = SessionResult<T>>) -> SessionResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::Timeout(self.timeout)),
        }
    }
}

/// Reports `count` setup calls as not submitted.
pub fn retract_submissions(metrics: Option<&dyn MetricsPort>, count: u64) {
    if let Some(metrics) = metrics {
        let delta = i64::try_from(count).unwrap_or(i64::MAX);
        metrics.record_submitted(-delta);
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, U256};
    use mockall::predicate::eq;

    use super::*;
    use crate::{MockMetricsPort, SubmissionCounter, TxOutcome, test_utils::ScriptedSession};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn transfers(count: u64) -> Vec<Operation> {
        (0..count)
            .map(|amount| Operation::Transfer {
                sender: None,
                receiver: Address::repeat_byte(0x42),
                amount: U256::from(amount),
            })
            .collect()
    }

    fn amount_of(call: &ContractCall) -> u64 {
        call.arg(1).and_then(|arg| arg.as_uint()).unwrap().to::<u64>()
    }

    #[tokio::test]
    async fn failures_stay_in_their_slot() {
        let session = ScriptedSession::new(Address::ZERO)
            .fail_when(|call, _| matches!(amount_of(call), 1 | 3));
        let mut metrics = MockMetricsPort::new();
        metrics.expect_record_submitted().with(eq(1)).times(5).return_const(());

        let adapter = TransactionAdapter::new(&session, "mintable", TIMEOUT);
        let statuses = adapter.execute(&transfers(5), &metrics).await;

        let outcomes: Vec<_> = statuses.iter().map(|status| status.status).collect();
        assert_eq!(
            outcomes,
            [
                TxOutcome::Success,
                TxOutcome::Fail,
                TxOutcome::Success,
                TxOutcome::Fail,
                TxOutcome::Success,
            ]
        );
        assert!(statuses[1].error.as_deref().unwrap().contains("scripted failure"));
        assert!(statuses[0].verified && !statuses[1].verified);
        assert!(statuses[0].id.is_some() && statuses[1].id.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn statuses_follow_batch_order_not_completion_order() {
        let session = ScriptedSession::new(Address::ZERO)
            .delay_with(|call| Duration::from_millis(100 - 10 * amount_of(call)));
        let counter = SubmissionCounter::new();

        let adapter = TransactionAdapter::new(&session, "mintable", TIMEOUT);
        let statuses = adapter.execute(&transfers(8), &counter).await;

        assert_eq!(statuses.len(), 8);
        for (position, status) in statuses.iter().enumerate() {
            let payload = status.result.as_ref().unwrap();
            assert_eq!(payload["args"][1], serde_json::to_value(U256::from(position)).unwrap());
        }
        assert_eq!(counter.pending(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out() {
        let session = ScriptedSession::new(Address::ZERO).delay_with(|call| {
            if amount_of(call) == 0 { Duration::from_secs(60) } else { Duration::ZERO }
        });

        let statuses = TransactionAdapter::new(&session, "mintable", TIMEOUT)
            .execute(&transfers(2), &SubmissionCounter::new())
            .await;

        assert_eq!(statuses[0].status, TxOutcome::Fail);
        assert!(statuses[0].error.as_deref().unwrap().contains("timed out"));
        assert!(statuses[1].is_success());
    }

    #[tokio::test]
    async fn empty_batch_submits_nothing() {
        let session = ScriptedSession::new(Address::ZERO);
        let mut metrics = MockMetricsPort::new();
        metrics.expect_record_submitted().never();

        let statuses =
            TransactionAdapter::new(&session, "mintable", TIMEOUT).execute(&[], &metrics).await;
        assert!(statuses.is_empty());
    }

    #[tokio::test]
    async fn explicit_sender_is_forwarded() {
        let session = ScriptedSession::new(Address::ZERO);
        let owner = Address::repeat_byte(7);
        let batch = [Operation::Approve {
            sender: Some(owner),
            spender: Address::repeat_byte(8),
            amount: U256::from(50),
        }];

        TransactionAdapter::new(&session, "mintable", TIMEOUT)
            .execute(&batch, &SubmissionCounter::new())
            .await;

        let invoked = session.invoked();
        assert_eq!(invoked.len(), 1);
        assert_eq!(invoked[0].0.verb, "approve");
        assert_eq!(invoked[0].1, Some(owner));
    }

    #[tokio::test]
    async fn query_without_port_is_not_counted() {
        let owner = Address::repeat_byte(1);
        let call = ContractCall::new("balanceOf", vec![owner.into()]);
        let session = ScriptedSession::new(owner).with_read(call.clone(), U256::from(1_000));
        let adapter = TransactionAdapter::new(&session, "mintable", TIMEOUT);

        let status = adapter.query(&call, None).await;
        assert_eq!(status.result, Some(serde_json::json!("1000")));

        let counter = SubmissionCounter::new();
        let missing = ContractCall::new("totalSupply", vec![]);
        assert_eq!(adapter.query(&missing, Some(&counter)).await.status, TxOutcome::Fail);
        assert_eq!(counter.pending(), 1);
    }

    #[test]
    fn retraction_reports_negative_delta() {
        let mut metrics = MockMetricsPort::new();
        metrics.expect_record_submitted().with(eq(-4)).times(1).return_const(());

        retract_submissions(Some(&metrics), 4);
        retract_submissions(None, 4);
    }
}
