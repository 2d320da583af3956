use std::{collections::HashMap, sync::Arc};

use alloy_primitives::Address;
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types_eth::TransactionRequest;
use async_trait::async_trait;

use super::{ContractConfig, EthereumConfig, EthereumSession, contracts};
use crate::{LedgerConnector, SessionError, SessionResult};

/// [`LedgerConnector`] for Ethereum nodes reachable over HTTP JSON-RPC.
#[derive(Debug, Clone)]
pub struct EthereumConnector {
    provider: RootProvider,
    config: EthereumConfig,
}

impl EthereumConnector {
    /// Creates a connector for the node at `config.url`.
    pub fn new(config: EthereumConfig) -> Self {
        let provider = RootProvider::new_http(config.url.clone());
        Self { provider, config }
    }

    /// Returns the network configuration.
    pub const fn config(&self) -> &EthereumConfig {
        &self.config
    }

    async fn unlock(&self) -> SessionResult<()> {
        let Some(password) = &self.config.from_address_password else {
            return Ok(());
        };
        let address = self.config.from_address;
        let unlocked: bool = self
            .provider
            .raw_request("personal_unlockAccount".into(), (address, password.clone(), None::<u64>))
            .await?;
        if !unlocked {
            return Err(SessionError::Locked(address));
        }
        tracing::debug!(%address, "default sender unlocked");
        Ok(())
    }

    async fn resolve(&self, name: &str, contract: &ContractConfig) -> SessionResult<Address> {
        if let Some(address) = contract.address {
            return Ok(address);
        }
        let registry = self
            .config
            .registry
            .as_ref()
            .ok_or_else(|| SessionError::Unregistered(name.to_string()))?;

        let request = TransactionRequest::default()
            .to(registry.address)
            .input(contracts::encode_lookup(name).into());
        let address = contracts::decode_lookup(&self.provider.call(request).await?)?;
        if address.is_zero() {
            return Err(SessionError::Unregistered(name.to_string()));
        }
        Ok(address)
    }
}

#[async_trait]
impl LedgerConnector for EthereumConnector {
    type Session = EthereumSession;

    async fn init(&self) -> SessionResult<()> {
        let chain_id = self.provider.get_chain_id().await?;
        tracing::info!(chain_id, url = %self.config.url, "connected to ethereum node");
        Ok(())
    }

    async fn acquire_session(&self) -> SessionResult<EthereumSession> {
        self.unlock().await?;

        let mut contracts = HashMap::with_capacity(self.config.contracts.len());
        for (name, contract) in &self.config.contracts {
            let address = self.resolve(name, contract).await?;
            tracing::debug!(contract = %name, %address, "contract resolved");
            contracts.insert(name.clone(), address);
        }

        Ok(EthereumSession::new(
            self.provider.clone(),
            self.config.from_address,
            self.config.transaction_confirmation_blocks,
            Arc::new(contracts),
        ))
    }
}
