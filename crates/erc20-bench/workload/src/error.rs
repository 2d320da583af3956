//! Error types for the shadow ledger and the workload generator.

use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::{OperationKind, WorkloadProfile};

/// Result alias for [`ShadowLedger`](crate::ShadowLedger) mutations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Result alias for workload generation.
pub type WorkloadResult<T> = Result<T, WorkloadError>;

/// A shadow ledger mutation whose precondition does not hold.
///
/// A failed mutation leaves the ledger untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The account to debit is not tracked.
    #[error("account {0} is not tracked by the shadow ledger")]
    UnknownAccount(Address),
    /// The account holds less than the amount to debit.
    #[error("account {account} holds {balance}, needs {required}")]
    InsufficientBalance {
        /// Account to debit.
        account: Address,
        /// Tracked balance.
        balance: U256,
        /// Amount requested.
        required: U256,
    },
    /// None of the spender's granters has allowed the requested amount.
    #[error("no granter has allowed {spender} to move {amount}")]
    NoQualifyingGranter {
        /// Spender of the delegated transfer.
        spender: Address,
        /// Amount requested.
        amount: U256,
    },
    /// Crediting the account would overflow.
    #[error("crediting {0} overflows")]
    Overflow(Address),
}

/// Invalid generator configuration, detected before anything is generated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required argument is absent.
    #[error("{profile} - '{argument}' is missed in the arguments")]
    MissingArgument {
        /// Profile that requires the argument.
        profile: WorkloadProfile,
        /// Argument name, as spelled in the workload arguments.
        argument: &'static str,
    },
    /// An argument that must be positive is zero.
    #[error("'{0}' must be positive")]
    NonPositive(&'static str),
    /// The ledger cannot provide a sender and a distinct counterparty.
    #[error("the {0} workload needs a counterparty distinct from every sender")]
    NoAccounts(WorkloadProfile),
    /// A slot was asked to start at a kind the profile does not generate.
    #[error("the {profile} workload does not generate {kind} operations")]
    KindNotInProfile {
        /// Configured profile.
        profile: WorkloadProfile,
        /// Requested kind.
        kind: OperationKind,
    },
    /// The profile name is not recognized.
    #[error("unknown workload profile `{0}`")]
    UnknownProfile(String),
}

/// Fatal workload generation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkloadError {
    /// The generator configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// No configured kind could be synthesized for a slot.
    #[error(
        "can't generate slot {slot} with available balances and allowances (tried {tried:?})"
    )]
    Exhausted {
        /// Position of the slot in the batch.
        slot: usize,
        /// Kinds attempted, in order.
        tried: Vec<OperationKind>,
    },
}
