//! Token and registry ABI bindings.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, sol};
use erc20_bench_workload::ContractCall;

use crate::{SessionError, SessionResult};

sol! {
    /// Mintable ERC20 token.
    interface IMintable {
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
        function increaseAllowance(address spender, uint256 addedValue) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function totalSupply() external view returns (uint256);
    }

    /// Registry resolving contract names to deployed addresses.
    interface IRegistry {
        function lookup(string name) external view returns (address);
    }
}

/// Number of arguments taken by each supported method.
fn arity(verb: &str) -> Option<usize> {
    Some(match verb {
        "transfer" | "approve" | "increaseAllowance" | "allowance" => 2,
        "transferFrom" => 3,
        "balanceOf" => 1,
        "totalSupply" => 0,
        _ => return None,
    })
}

/// ABI-encodes `call` against [`IMintable`].
pub(crate) fn encode_call(call: &ContractCall) -> SessionResult<Bytes> {
    let verb = call.verb;
    let expected = arity(verb).ok_or_else(|| SessionError::UnsupportedMethod(verb.to_string()))?;
    if call.args.len() != expected {
        return Err(SessionError::InvalidArguments { verb });
    }
    let address = |position| {
        call.arg(position)
            .and_then(|arg| arg.as_address())
            .ok_or(SessionError::InvalidArguments { verb })
    };
    let uint = |position| {
        call.arg(position)
            .and_then(|arg| arg.as_uint())
            .ok_or(SessionError::InvalidArguments { verb })
    };

    let encoded = match verb {
        "transfer" => IMintable::transferCall { to: address(0)?, amount: uint(1)? }.abi_encode(),
        "approve" => {
            IMintable::approveCall { spender: address(0)?, amount: uint(1)? }.abi_encode()
        }
        "transferFrom" => IMintable::transferFromCall {
            from: address(0)?,
            to: address(1)?,
            amount: uint(2)?,
        }
        .abi_encode(),
        "increaseAllowance" => IMintable::increaseAllowanceCall {
            spender: address(0)?,
            addedValue: uint(1)?,
        }
        .abi_encode(),
        "balanceOf" => IMintable::balanceOfCall { account: address(0)? }.abi_encode(),
        "allowance" => {
            IMintable::allowanceCall { owner: address(0)?, spender: address(1)? }.abi_encode()
        }
        _ => IMintable::totalSupplyCall {}.abi_encode(),
    };
    Ok(encoded.into())
}

/// Decodes the `uint256` returned by a read-only `verb`.
pub(crate) fn decode_uint(verb: &str, output: &[u8]) -> SessionResult<U256> {
    Ok(match verb {
        "balanceOf" => IMintable::balanceOfCall::abi_decode_returns(output)?,
        "allowance" => IMintable::allowanceCall::abi_decode_returns(output)?,
        "totalSupply" => IMintable::totalSupplyCall::abi_decode_returns(output)?,
        other => return Err(SessionError::UnsupportedMethod(other.to_string())),
    })
}

/// Encodes a registry lookup of `name`.
pub(crate) fn encode_lookup(name: &str) -> Bytes {
    IRegistry::lookupCall { name: name.to_string() }.abi_encode().into()
}

/// Decodes the address returned by a registry lookup.
pub(crate) fn decode_lookup(output: &[u8]) -> SessionResult<Address> {
    Ok(IRegistry::lookupCall::abi_decode_returns(output)?)
}
