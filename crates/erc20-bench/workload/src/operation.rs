//! Typed token operations and their wire form.

use core::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// The kinds of token operation the generator synthesizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    /// `transfer(receiver, amount)`.
    Transfer,
    /// `approve(spender, amount)`.
    Approve,
    /// `transferFrom(owner, receiver, amount)`.
    TransferFrom,
    /// `increaseAllowance(spender, amount)`.
    IncreaseAllowance,
}

impl OperationKind {
    /// Contract method invoked for this kind.
    pub const fn method(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Approve => "approve",
            Self::TransferFrom => "transferFrom",
            Self::IncreaseAllowance => "increaseAllowance",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// A single token operation.
///
/// `sender` is `None` when the operation is to be sent from the session's default sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Operation {
    /// Moves `amount` from the sender to `receiver`.
    Transfer {
        /// Explicit sender.
        sender: Option<Address>,
        /// Credited account.
        receiver: Address,
        /// Amount moved.
        amount: U256,
    },
    /// Lets `spender` move `amount` on the sender's behalf.
    Approve {
        /// Explicit sender, the owner of the allowance.
        sender: Option<Address>,
        /// Account allowed to spend.
        spender: Address,
        /// Allowance granted.
        amount: U256,
    },
    /// Moves `amount` from `owner` to `receiver` using an allowance granted to the sender.
    TransferFrom {
        /// Explicit sender, the spender of the allowance.
        sender: Option<Address>,
        /// Granter whose allowance is consumed.
        owner: Address,
        /// Credited account.
        receiver: Address,
        /// Amount moved.
        amount: U256,
    },
    /// Raises the allowance of `spender` by `amount`.
    IncreaseAllowance {
        /// Explicit sender, the owner of the allowance.
        sender: Option<Address>,
        /// Account allowed to spend.
        spender: Address,
        /// Allowance added.
        amount: U256,
    },
}

impl Operation {
    /// Returns the kind of this operation.
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Transfer { .. } => OperationKind::Transfer,
            Self::Approve { .. } => OperationKind::Approve,
            Self::TransferFrom { .. } => OperationKind::TransferFrom,
            Self::IncreaseAllowance { .. } => OperationKind::IncreaseAllowance,
        }
    }

    /// Returns the explicit sender, if any.
    pub const fn sender(&self) -> Option<Address> {
        match self {
            Self::Transfer { sender, .. }
            | Self::Approve { sender, .. }
            | Self::TransferFrom { sender, .. }
            | Self::IncreaseAllowance { sender, .. } => *sender,
        }
    }

    /// Returns the amount carried by the operation.
    pub const fn amount(&self) -> U256 {
        match self {
            Self::Transfer { amount, .. }
            | Self::Approve { amount, .. }
            | Self::TransferFrom { amount, .. }
            | Self::IncreaseAllowance { amount, .. } => *amount,
        }
    }

    /// Flattens the operation into its contract call.
    pub fn to_call(&self) -> ContractCall {
        let args = match *self {
            Self::Transfer { receiver, amount, .. } => vec![receiver.into(), amount.into()],
            Self::Approve { spender, amount, .. }
            | Self::IncreaseAllowance { spender, amount, .. } => {
                vec![spender.into(), amount.into()]
            }
            Self::TransferFrom { owner, receiver, amount, .. } => {
                vec![owner.into(), receiver.into(), amount.into()]
            }
        };
        ContractCall::new(self.kind().method(), args)
    }
}

/// A typed contract call argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallArg {
    /// An `address` argument.
    Address(Address),
    /// A `uint256` argument.
    Uint(U256),
}

impl CallArg {
    /// Returns the address, if this is an address argument.
    pub const fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(address) => Some(*address),
            Self::Uint(_) => None,
        }
    }

    /// Returns the integer, if this is an integer argument.
    pub const fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(value) => Some(*value),
            Self::Address(_) => None,
        }
    }
}

impl From<Address> for CallArg {
    fn from(address: Address) -> Self {
        Self::Address(address)
    }
}

impl From<U256> for CallArg {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

/// A contract method name with its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContractCall {
    /// Contract method name.
    pub verb: &'static str,
    /// Ordered arguments.
    pub args: Vec<CallArg>,
}

impl ContractCall {
    /// Creates a call of `verb` with `args`.
    pub const fn new(verb: &'static str, args: Vec<CallArg>) -> Self {
        Self { verb, args }
    }

    /// Returns the argument at `position`.
    pub fn arg(&self, position: usize) -> Option<CallArg> {
        self.args.get(position).copied()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const OWNER: Address = Address::repeat_byte(1);
    const OTHER: Address = Address::repeat_byte(2);

    #[rstest]
    #[case::transfer(
        Operation::Transfer { sender: None, receiver: OTHER, amount: U256::from(5) },
        "transfer",
        vec![OTHER.into(), U256::from(5).into()],
    )]
    #[case::approve(
        Operation::Approve { sender: Some(OWNER), spender: OTHER, amount: U256::from(7) },
        "approve",
        vec![OTHER.into(), U256::from(7).into()],
    )]
    #[case::transfer_from(
        Operation::TransferFrom {
            sender: None,
            owner: OWNER,
            receiver: OTHER,
            amount: U256::from(9),
        },
        "transferFrom",
        vec![OWNER.into(), OTHER.into(), U256::from(9).into()],
    )]
    #[case::increase_allowance(
        Operation::IncreaseAllowance { sender: None, spender: OWNER, amount: U256::from(1) },
        "increaseAllowance",
        vec![OWNER.into(), U256::from(1).into()],
    )]
    fn operation_flattens_to_call(
        #[case] operation: Operation,
        #[case] verb: &str,
        #[case] args: Vec<CallArg>,
    ) {
        let call = operation.to_call();
        assert_eq!(call.verb, verb);
        assert_eq!(call.args, args);
        assert_eq!(operation.kind().to_string(), verb);
    }

    #[test]
    fn operation_serializes_with_verb_tag() {
        let operation =
            Operation::Approve { sender: Some(OWNER), spender: OTHER, amount: U256::from(50) };
        let json = serde_json::to_value(&operation).unwrap();

        assert_eq!(json["verb"], "approve");
        assert_eq!(json["spender"], serde_json::to_value(OTHER).unwrap());
        assert_eq!(serde_json::from_value::<Operation>(json).unwrap(), operation);
    }
}
