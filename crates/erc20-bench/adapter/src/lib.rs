//! Concurrent execution of ERC20 workload batches against a ledger.
//!
//! A [`TransactionAdapter`] fans a batch of
//! [`Operation`](erc20_bench_workload::Operation)s out as concurrent calls on a
//! [`LedgerSession`] and returns one [`TxStatus`] per operation, in batch order. Ledgers
//! plug in through [`LedgerConnector`]; [`ethereum::EthereumConnector`] is the JSON-RPC
//! binding. Submissions are reported to an injected [`MetricsPort`].

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod error;
pub use error::{SeedError, SessionError, SessionResult};

pub mod ethereum;

mod executor;
pub use executor::{TransactionAdapter, retract_submissions};

mod metrics;
pub use metrics::{NoopMetrics, RecorderMetrics, SubmissionCounter};

mod seed;
pub use seed::seed_from_ledger;

mod state;
pub use state::{CallEvent, CallState};

mod status;
pub use status::{TxOutcome, TxStatus};

mod traits;
#[cfg(test)]
pub use traits::MockMetricsPort;
pub use traits::{Invocation, LedgerConnector, LedgerSession, MetricsPort};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
