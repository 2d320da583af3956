//! Shadow-state workload generation for ERC20 load tests.
//!
//! A [`WorkloadGenerator`] owns a [`ShadowLedger`], a local and optimistic model of
//! token balances and allowances, and synthesizes batches of [`Operation`]s that are
//! valid against that model. Each synthesized operation is applied to the model
//! immediately, independent of whether the real ledger later confirms it.
//!
//! # Example
//!
//! ```rust
//! use alloy_primitives::{Address, U256};
//! use erc20_bench_workload::{
//!     ShadowLedger, WorkloadArgs, WorkloadConfig, WorkloadGenerator, WorkloadProfile,
//! };
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let accounts = [Address::repeat_byte(1), Address::repeat_byte(2)];
//! let ledger = ShadowLedger::with_uniform_supply(&accounts, U256::from(2_000));
//! let args = WorkloadArgs::default().with_transfer_money(100).with_allower_money(50);
//! let config = WorkloadConfig::from_args(WorkloadProfile::TransferApproveTransferFrom, &args)?;
//!
//! let mut generator =
//!     WorkloadGenerator::new(config, ledger, Address::ZERO, StdRng::seed_from_u64(7))?;
//! let batch = generator.generate_batch()?;
//! assert_eq!(batch.len(), 1);
//! # Ok::<(), erc20_bench_workload::WorkloadError>(())
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::{DEFAULT_TXN_PER_BATCH, WorkloadArgs, WorkloadConfig};

mod counters;
pub use counters::KindCounters;

mod error;
pub use error::{ConfigError, LedgerError, LedgerResult, WorkloadError, WorkloadResult};

mod generator;
pub use generator::WorkloadGenerator;

mod ledger;
pub use ledger::{Account, ApprovalAccounting, ShadowLedger};

mod operation;
pub use operation::{CallArg, ContractCall, Operation, OperationKind};

mod profile;
pub use profile::{SenderMode, WorkloadProfile};
