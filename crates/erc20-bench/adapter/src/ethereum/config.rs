use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use url::Url;

const fn default_confirmation_blocks() -> u64 {
    1
}

/// Connection and deployment settings of an Ethereum network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthereumConfig {
    /// JSON-RPC endpoint.
    pub url: Url,
    /// Default sender, unlocked on the node.
    pub from_address: Address,
    /// Password unlocking the default sender, if the node keeps it locked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_address_password: Option<String>,
    /// Blocks to wait on top of the one including a transaction.
    #[serde(default = "default_confirmation_blocks")]
    pub transaction_confirmation_blocks: u64,
    /// Registry resolving contracts without a fixed address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryConfig>,
    /// Deployed contracts by name.
    #[serde(default)]
    pub contracts: BTreeMap<String, ContractConfig>,
    /// Benchmark accounts.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

impl EthereumConfig {
    /// Addresses of the benchmark accounts, in configuration order.
    pub fn account_addresses(&self) -> Vec<Address> {
        self.accounts.iter().map(|account| account.address).collect()
    }

    /// Supply minted by the constructor of `contract`: its first constructor argument.
    pub fn initial_supply(&self, contract: &str) -> Option<U256> {
        match self.contracts.get(contract)?.constructor_args.first()? {
            serde_json::Value::String(decimal) => U256::from_str_radix(decimal, 10).ok(),
            serde_json::Value::Number(number) => number.as_u64().map(U256::from),
            _ => None,
        }
    }
}

/// Address registry contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry address.
    pub address: Address,
}

/// A deployed contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractConfig {
    /// Fixed address. Looked up in the registry when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Arguments the contract was deployed with.
    #[serde(default)]
    pub constructor_args: Vec<serde_json::Value>,
}

/// A benchmark account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Account address.
    pub address: Address,
}
