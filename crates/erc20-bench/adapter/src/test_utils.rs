//! Scripted in-memory [`LedgerSession`] for tests.

use core::fmt;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use erc20_bench_workload::ContractCall;
use parking_lot::Mutex;

use crate::{Invocation, LedgerSession, SessionError, SessionResult};

type FailWhen = Box<dyn Fn(&ContractCall, Option<Address>) -> bool + Send + Sync>;
type DelayWith = Box<dyn Fn(&ContractCall) -> Duration + Send + Sync>;

/// A [`LedgerSession`] that commits every call unless scripted otherwise.
///
/// Committed calls get sequential transaction ids and echo the call as payload. Reads
/// answer from a fixed table.
pub struct ScriptedSession {
    default_sender: Address,
    fail_when: Option<FailWhen>,
    delay_with: Option<DelayWith>,
    reads: HashMap<ContractCall, U256>,
    invoked: Mutex<Vec<(ContractCall, Option<Address>)>>,
    next_id: AtomicU64,
}

impl ScriptedSession {
    /// Creates a session sending from `default_sender` by default.
    pub fn new(default_sender: Address) -> Self {
        Self {
            default_sender,
            fail_when: None,
            delay_with: None,
            reads: HashMap::new(),
            invoked: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Fails every invocation matching `predicate`.
    pub fn fail_when(
        mut self,
        predicate: impl Fn(&ContractCall, Option<Address>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    /// Delays every call by the returned duration before answering.
    pub fn delay_with(
        mut self,
        delay: impl Fn(&ContractCall) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay_with = Some(Box::new(delay));
        self
    }

    /// Answers `call` with `value`.
    pub fn with_read(mut self, call: ContractCall, value: U256) -> Self {
        self.reads.insert(call, value);
        self
    }

    /// Returns every invocation received so far, in arrival order.
    pub fn invoked(&self) -> Vec<(ContractCall, Option<Address>)> {
        self.invoked.lock().clone()
    }

    async fn delay(&self, call: &ContractCall) {
        if let Some(delay) = &self.delay_with {
            tokio::time::sleep(delay(call)).await;
        }
    }
}

impl fmt::Debug for ScriptedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedSession")
            .field("default_sender", &self.default_sender)
            .field("reads", &self.reads)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LedgerSession for ScriptedSession {
    fn default_sender(&self) -> Address {
        self.default_sender
    }

    async fn invoke(
        &self,
        _contract: &str,
        call: &ContractCall,
        from: Option<Address>,
    ) -> SessionResult<Invocation> {
        self.invoked.lock().push((call.clone(), from));
        self.delay(call).await;

        if self.fail_when.as_ref().is_some_and(|fail| fail(call, from)) {
            return Err(SessionError::Rejected(format!("scripted failure of {}", call.verb)));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(Invocation {
            tx_id: format!("{id:#066x}"),
            payload: serde_json::json!({
                "verb": call.verb,
                "args": call.args,
                "from": from.unwrap_or(self.default_sender),
            }),
        })
    }

    async fn call(&self, _contract: &str, call: &ContractCall) -> SessionResult<serde_json::Value> {
        self.delay(call).await;
        self.reads
            .get(call)
            .map(|value| serde_json::Value::String(value.to_string()))
            .ok_or_else(|| SessionError::UnsupportedMethod(call.verb.to_string()))
    }
}
