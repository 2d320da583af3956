//! Seeding the shadow ledger from the live ledger.

use alloy_primitives::{Address, U256};
use erc20_bench_workload::{ContractCall, ShadowLedger};

use crate::{
    LedgerSession, MetricsPort, SeedError, TransactionAdapter, TxStatus, retract_submissions,
};

/// Builds a shadow ledger from the balance of `default_sender` and the allowances every
/// account has granted it.
///
/// Accounts are tracked with a zero balance. The `accounts.len() + 1` setup queries are
/// retracted from `metrics` once they are done, whatever their outcome.
pub async fn seed_from_ledger<S: LedgerSession + ?Sized>(
    adapter: &TransactionAdapter<'_, S>,
    default_sender: Address,
    accounts: &[Address],
    metrics: Option<&dyn MetricsPort>,
) -> Result<ShadowLedger, SeedError> {
    let balance_call = ContractCall::new("balanceOf", vec![default_sender.into()]);
    let balance = adapter.query(&balance_call, metrics).await;

    let mut allowances = Vec::with_capacity(accounts.len());
    for account in accounts {
        let call = ContractCall::new("allowance", vec![(*account).into(), default_sender.into()]);
        allowances.push((*account, adapter.query(&call, metrics).await));
    }
    retract_submissions(metrics, accounts.len() as u64 + 1);

    let mut ledger = ShadowLedger::new();
    ledger.insert_account(default_sender, amount("balanceOf", balance)?);
    for (account, status) in allowances {
        ledger.track(account);
        ledger.set_allowance(account, default_sender, amount("allowance", status)?);
    }

    tracing::info!(
        %default_sender,
        balance = %ledger.balance_of(default_sender),
        accounts = accounts.len(),
        "shadow ledger seeded from ledger"
    );
    Ok(ledger)
}

fn amount(function: &'static str, status: TxStatus) -> Result<U256, SeedError> {
    if !status.is_success() {
        return Err(SeedError::Query { function, error: status.error.unwrap_or_default() });
    }
    let value = status.result.unwrap_or_default();
    let parsed = match &value {
        serde_json::Value::String(decimal) => U256::from_str_radix(decimal, 10).ok(),
        serde_json::Value::Number(number) => number.as_u64().map(U256::from),
        _ => None,
    };
    parsed.ok_or(SeedError::Malformed { function, value })
}
