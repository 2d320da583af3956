use std::{collections::HashMap, sync::Arc};

use alloy_network::ReceiptResponse;
use alloy_primitives::{Address, Bytes};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types_eth::TransactionRequest;
use async_trait::async_trait;
use erc20_bench_workload::ContractCall;

use super::contracts;
use crate::{Invocation, LedgerSession, SessionError, SessionResult};

/// A [`LedgerSession`] over Ethereum JSON-RPC.
///
/// Transactions are sent with `eth_sendTransaction`, so senders must be unlocked on the
/// node.
#[derive(Debug, Clone)]
pub struct EthereumSession {
    provider: RootProvider,
    default_sender: Address,
    confirmations: u64,
    contracts: Arc<HashMap<String, Address>>,
}

impl EthereumSession {
    pub(crate) const fn new(
        provider: RootProvider,
        default_sender: Address,
        confirmations: u64,
        contracts: Arc<HashMap<String, Address>>,
    ) -> Self {
        Self { provider, default_sender, confirmations, contracts }
    }

    /// Returns the address `contract` was resolved to.
    pub fn contract_address(&self, contract: &str) -> SessionResult<Address> {
        self.contracts
            .get(contract)
            .copied()
            .ok_or_else(|| SessionError::UnknownContract(contract.to_string()))
    }

    fn request(&self, to: Address, from: Option<Address>, input: Bytes) -> TransactionRequest {
        TransactionRequest::default()
            .from(from.unwrap_or(self.default_sender))
            .to(to)
            .input(input.into())
    }
}

#[async_trait]
impl LedgerSession for EthereumSession {
    fn default_sender(&self) -> Address {
        self.default_sender
    }

    async fn invoke(
        &self,
        contract: &str,
        call: &ContractCall,
        from: Option<Address>,
    ) -> SessionResult<Invocation> {
        let request =
            self.request(self.contract_address(contract)?, from, contracts::encode_call(call)?);
        let receipt = self
            .provider
            .send_transaction(request)
            .await?
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await?;

        let tx_hash = ReceiptResponse::transaction_hash(&receipt);
        if !ReceiptResponse::status(&receipt) {
            return Err(SessionError::Reverted { tx_hash });
        }
        tracing::trace!(%tx_hash, verb = call.verb, "transaction committed");
        Ok(Invocation { tx_id: tx_hash.to_string(), payload: serde_json::to_value(&receipt)? })
    }

    async fn call(&self, contract: &str, call: &ContractCall) -> SessionResult<serde_json::Value> {
        let request =
            self.request(self.contract_address(contract)?, None, contracts::encode_call(call)?);
        let output = self.provider.call(request).await?;
        let value = contracts::decode_uint(call.verb, &output)?;
        Ok(serde_json::Value::String(value.to_string()))
    }
}
