use std::{fs, path::Path};

use erc20_bench_adapter::ethereum::EthereumConfig;
use eyre::WrapErr;
use serde::Deserialize;

/// Network configuration file.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NetworkConfig {
    /// Ethereum connection, contracts and accounts.
    pub(crate) ethereum: EthereumConfig,
}

impl NetworkConfig {
    /// Reads the configuration at `path`.
    pub(crate) fn load(path: &Path) -> eyre::Result<Self> {
        let raw = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read network config {}", path.display()))?;
        serde_json::from_str(&raw)
            .wrap_err_with(|| format!("invalid network config {}", path.display()))
    }
}
