//! Command line arguments.

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use erc20_bench_workload::{ApprovalAccounting, WorkloadArgs, WorkloadProfile};

use crate::logging::LogArgs;

/// Where the initial shadow ledger comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum LedgerSeed {
    /// Split the constructor supply of the contract: to the default sender in
    /// default-sender workloads, evenly between the accounts otherwise.
    #[default]
    Supply,
    /// Query the default sender's balance and the allowances granted to it.
    Query,
}

/// Drives ERC20 load against an Ethereum node.
#[derive(Debug, Parser)]
#[command(name = "erc20-bench", version, about)]
pub(crate) struct Cli {
    /// Network configuration file (JSON).
    #[arg(long, env = "ERC20_BENCH_NETWORK")]
    pub(crate) network: PathBuf,

    /// Workload profile.
    #[arg(long, default_value_t = WorkloadProfile::TransferApproveTransferFrom)]
    pub(crate) workload: WorkloadProfile,

    /// Name of the token contract in the network configuration.
    #[arg(long, default_value = "mintable")]
    pub(crate) contract: String,

    /// Amount moved by each transfer.
    #[arg(long)]
    pub(crate) transfer_money: Option<u64>,

    /// Amount approved and spent by each delegated operation.
    #[arg(long)]
    pub(crate) allower_money: Option<u64>,

    /// Operations per batch.
    #[arg(long)]
    pub(crate) txn_per_batch: Option<usize>,

    /// Number of batches to run.
    #[arg(long, default_value_t = 10)]
    pub(crate) rounds: usize,

    /// Per-call timeout in seconds.
    #[arg(long = "tx-timeout", default_value_t = 100)]
    pub(crate) tx_timeout_secs: u64,

    /// Seed for reproducible workloads.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Source of the initial shadow ledger.
    #[arg(long, value_enum, default_value_t = LedgerSeed::Supply)]
    pub(crate) ledger_seed: LedgerSeed,

    /// Model approvals as pure allowance grants instead of escrowing the amount.
    #[arg(long)]
    pub(crate) allowance_only_approvals: bool,

    /// Write the run report to this file (JSON).
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) log: LogArgs,
}

impl Cli {
    /// Generator arguments.
    pub(crate) const fn workload_args(&self) -> WorkloadArgs {
        WorkloadArgs {
            transfer_money: self.transfer_money,
            allower_money: self.allower_money,
            txn_per_batch: self.txn_per_batch,
        }
    }

    /// Approval accounting of the shadow ledger.
    pub(crate) const fn approval_accounting(&self) -> ApprovalAccounting {
        if self.allowance_only_approvals {
            ApprovalAccounting::AllowanceOnly
        } else {
            ApprovalAccounting::Escrow
        }
    }

    /// Per-call timeout.
    pub(crate) const fn tx_timeout(&self) -> Duration {
        Duration::from_secs(self.tx_timeout_secs)
    }
}
