use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, WorkloadProfile};

/// Batch size used when `txnPerBatch` is not configured.
pub const DEFAULT_TXN_PER_BATCH: usize = 1;

/// Raw generator arguments, as found in a benchmark configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadArgs {
    /// Amount moved by each transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_money: Option<u64>,
    /// Amount approved and spent by each delegated operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allower_money: Option<u64>,
    /// Operations per batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_per_batch: Option<usize>,
}

impl WorkloadArgs {
    /// Sets the transfer amount.
    pub const fn with_transfer_money(mut self, amount: u64) -> Self {
        self.transfer_money = Some(amount);
        self
    }

    /// Sets the allowance amount.
    pub const fn with_allower_money(mut self, amount: u64) -> Self {
        self.allower_money = Some(amount);
        self
    }

    /// Sets the batch size.
    pub const fn with_txn_per_batch(mut self, txn_per_batch: usize) -> Self {
        self.txn_per_batch = Some(txn_per_batch);
        self
    }
}

/// Validated generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Benchmark variant.
    pub profile: WorkloadProfile,
    /// Amount moved by each transfer, zero when the profile has no transfers.
    pub transfer_money: U256,
    /// Amount approved and spent by each delegated operation, zero when unused.
    pub allower_money: U256,
    /// Operations per batch.
    pub txn_per_batch: usize,
}

impl WorkloadConfig {
    /// Validates `args` against the requirements of `profile`.
    pub fn from_args(profile: WorkloadProfile, args: &WorkloadArgs) -> Result<Self, ConfigError> {
        let transfer_money = if profile.requires_transfer_money() {
            required(profile, "transferMoney", args.transfer_money)?
        } else {
            U256::ZERO
        };
        let allower_money = if profile.requires_allower_money() {
            required(profile, "allowerMoney", args.allower_money)?
        } else {
            U256::ZERO
        };
        let txn_per_batch = args.txn_per_batch.unwrap_or(DEFAULT_TXN_PER_BATCH);
        if txn_per_batch == 0 {
            return Err(ConfigError::NonPositive("txnPerBatch"));
        }

        Ok(Self { profile, transfer_money, allower_money, txn_per_batch })
    }
}

fn required(
    profile: WorkloadProfile,
    argument: &'static str,
    value: Option<u64>,
) -> Result<U256, ConfigError> {
    match value {
        None => Err(ConfigError::MissingArgument { profile, argument }),
        Some(0) => Err(ConfigError::NonPositive(argument)),
        Some(value) => Ok(U256::from(value)),
    }
}
