//! Ethereum JSON-RPC binding.

mod config;
pub use config::{AccountConfig, ContractConfig, EthereumConfig, RegistryConfig};

mod connector;
pub use connector::EthereumConnector;

mod contracts;
pub use contracts::{IMintable, IRegistry};

mod session;
pub use session::EthereumSession;
