//! Local model of token balances and allowances.

use std::collections::{BTreeMap, HashMap};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{LedgerError, LedgerResult};

/// How an approval moves value in the shadow model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalAccounting {
    /// The approved amount is escrowed: granting an allowance debits the owner's balance.
    #[default]
    Escrow,
    /// Approvals only grant allowance and leave balances untouched.
    AllowanceOnly,
}

/// A tracked account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    address: Address,
    balance: U256,
    /// Allowances granted to this account, keyed by granter, in grant order.
    allowances: Vec<(Address, U256)>,
}

impl Account {
    /// Creates an account with the given balance and no allowances.
    pub const fn new(address: Address, balance: U256) -> Self {
        Self { address, balance, allowances: Vec::new() }
    }

    /// Returns the account address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Returns the tracked balance.
    pub const fn balance(&self) -> U256 {
        self.balance
    }

    /// Returns the allowance `granter` has given this account.
    pub fn allowance_from(&self, granter: Address) -> U256 {
        self.allowances
            .iter()
            .find_map(|(g, amount)| (*g == granter).then_some(*amount))
            .unwrap_or_default()
    }

    /// Iterates over `(granter, allowance)` pairs in the order the granters first appeared.
    pub fn granters(&self) -> impl Iterator<Item = (Address, U256)> + '_ {
        self.allowances.iter().copied()
    }

    /// Returns the first granter whose allowance covers `amount`.
    pub fn first_granter_covering(&self, amount: U256) -> Option<Address> {
        self.allowances.iter().find(|(_, allowance)| *allowance >= amount).map(|(g, _)| *g)
    }

    fn allowance_mut(&mut self, granter: Address) -> &mut U256 {
        let idx = match self.allowances.iter().position(|(g, _)| *g == granter) {
            Some(idx) => idx,
            None => {
                self.allowances.push((granter, U256::ZERO));
                self.allowances.len() - 1
            }
        };
        &mut self.allowances[idx].1
    }
}

/// Optimistic local approximation of the token contract state.
///
/// Accounts keep the order in which they were first tracked, so that draws over
/// [`ShadowLedger::addresses`] are reproducible for a given RNG seed.
#[derive(Debug, Clone, Default)]
pub struct ShadowLedger {
    accounts: Vec<Account>,
    index: HashMap<Address, usize>,
    approval_accounting: ApprovalAccounting,
}

impl ShadowLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger from `(address, balance)` pairs.
    pub fn with_balances(balances: impl IntoIterator<Item = (Address, U256)>) -> Self {
        let mut ledger = Self::new();
        for (address, balance) in balances {
            ledger.insert_account(address, balance);
        }
        ledger
    }

    /// Splits `total_supply` evenly between `accounts`, the remainder is dropped.
    pub fn with_uniform_supply(accounts: &[Address], total_supply: U256) -> Self {
        if accounts.is_empty() {
            return Self::new();
        }
        let share = total_supply / U256::from(accounts.len());
        Self::with_balances(accounts.iter().map(|address| (*address, share)))
    }

    /// Sets the approval accounting mode.
    pub fn with_approval_accounting(mut self, accounting: ApprovalAccounting) -> Self {
        self.approval_accounting = accounting;
        self
    }

    /// Returns the approval accounting mode.
    pub const fn approval_accounting(&self) -> ApprovalAccounting {
        self.approval_accounting
    }

    /// Tracks `address` with `balance`, overwriting the balance of a tracked account.
    pub fn insert_account(&mut self, address: Address, balance: U256) {
        self.entry(address).balance = balance;
    }

    /// Tracks `address` with a zero balance unless it is already tracked.
    pub fn track(&mut self, address: Address) {
        self.entry(address);
    }

    /// Overwrites the allowance `owner` has given `spender`.
    pub fn set_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        self.track(owner);
        *self.entry(spender).allowance_mut(owner) = amount;
    }

    /// Returns the tracked account for `address`.
    pub fn account(&self, address: Address) -> Option<&Account> {
        self.index.get(&address).map(|idx| &self.accounts[*idx])
    }

    /// Returns all tracked accounts in tracking order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Iterates over tracked addresses in tracking order.
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.accounts.iter().map(Account::address)
    }

    /// Returns the number of tracked accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns `true` if no account is tracked.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Returns the balance of `address`, zero if untracked.
    pub fn balance_of(&self, address: Address) -> U256 {
        self.account(address).map(Account::balance).unwrap_or_default()
    }

    /// Returns the allowance `owner` has given `spender`.
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.account(spender).map(|account| account.allowance_from(owner)).unwrap_or_default()
    }

    /// Flat view of every allowance keyed by `(spender, granter)`.
    pub fn allowance_table(&self) -> BTreeMap<(Address, Address), U256> {
        self.accounts
            .iter()
            .flat_map(|account| {
                account
                    .granters()
                    .map(move |(granter, amount)| ((account.address, granter), amount))
            })
            .collect()
    }

    /// Sum of all tracked balances.
    pub fn total_balance(&self) -> U256 {
        self.accounts
            .iter()
            .fold(U256::ZERO, |total, account| total.saturating_add(account.balance))
    }

    /// Returns `true` if `address` is tracked and holds at least `amount`.
    pub fn can_debit(&self, address: Address, amount: U256) -> bool {
        self.account(address).is_some_and(|account| account.balance >= amount)
    }

    /// Returns the first granter of `spender` whose allowance covers `amount`.
    pub fn qualifying_granter(&self, spender: Address, amount: U256) -> Option<Address> {
        self.account(spender).and_then(|account| account.first_granter_covering(amount))
    }

    /// Moves `amount` from `from` to `to`.
    pub fn apply_transfer(&mut self, from: Address, to: Address, amount: U256) -> LedgerResult<()> {
        let remaining = self.checked_debit(from, amount)?;
        if from == to {
            return Ok(());
        }
        let credited = self.checked_credit(to, amount)?;
        self.entry(from).balance = remaining;
        self.entry(to).balance = credited;
        Ok(())
    }

    /// Grants `spender` an allowance of `amount` on `owner`'s behalf.
    ///
    /// With [`ApprovalAccounting::Escrow`] the owner's balance is debited by `amount`.
    pub fn apply_approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> LedgerResult<()> {
        let remaining = match self.approval_accounting {
            ApprovalAccounting::Escrow => Some(self.checked_debit(owner, amount)?),
            ApprovalAccounting::AllowanceOnly => None,
        };
        let allowance = self
            .allowance(owner, spender)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(spender))?;

        self.track(owner);
        *self.entry(spender).allowance_mut(owner) = allowance;
        if let Some(remaining) = remaining {
            self.entry(owner).balance = remaining;
        }
        Ok(())
    }

    /// Consumes `amount` of the first covering allowance granted to `spender` and credits
    /// `receiver`. Returns the granter whose allowance was consumed.
    ///
    /// The granter's balance is not debited.
    pub fn apply_transfer_from(
        &mut self,
        spender: Address,
        receiver: Address,
        amount: U256,
    ) -> LedgerResult<Address> {
        let granter = self
            .qualifying_granter(spender, amount)
            .ok_or(LedgerError::NoQualifyingGranter { spender, amount })?;
        let credited = self.checked_credit(receiver, amount)?;

        *self.entry(spender).allowance_mut(granter) -= amount;
        self.entry(receiver).balance = credited;
        Ok(granter)
    }

    /// Raises the allowance `owner` has given `spender` by `amount`.
    pub fn apply_increase_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> LedgerResult<()> {
        let allowance = self
            .allowance(owner, spender)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(spender))?;

        self.track(owner);
        *self.entry(spender).allowance_mut(owner) = allowance;
        Ok(())
    }

    fn checked_debit(&self, address: Address, amount: U256) -> LedgerResult<U256> {
        let balance = self.account(address).ok_or(LedgerError::UnknownAccount(address))?.balance;
        balance.checked_sub(amount).ok_or(LedgerError::InsufficientBalance {
            account: address,
            balance,
            required: amount,
        })
    }

    fn checked_credit(&self, address: Address, amount: U256) -> LedgerResult<U256> {
        self.balance_of(address).checked_add(amount).ok_or(LedgerError::Overflow(address))
    }

    fn entry(&mut self, address: Address) -> &mut Account {
        let idx = match self.index.get(&address) {
            Some(idx) => *idx,
            None => {
                self.accounts.push(Account::new(address, U256::ZERO));
                let idx = self.accounts.len() - 1;
                self.index.insert(address, idx);
                idx
            }
        };
        &mut self.accounts[idx]
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const ALICE: Address = Address::repeat_byte(0xa1);
    const BOB: Address = Address::repeat_byte(0xb0);
    const CAROL: Address = Address::repeat_byte(0xc4);

    fn ledger() -> ShadowLedger {
        ShadowLedger::with_balances([
            (ALICE, U256::from(1_000)),
            (BOB, U256::from(1_000)),
            (CAROL, U256::ZERO),
        ])
    }

    #[test]
    fn transfer_moves_value_and_conserves_total() {
        let mut ledger = ledger();
        ledger.apply_transfer(ALICE, BOB, U256::from(100)).unwrap();

        assert_eq!(ledger.balance_of(ALICE), U256::from(900));
        assert_eq!(ledger.balance_of(BOB), U256::from(1_100));
        assert_eq!(ledger.total_balance(), U256::from(2_000));
    }

    #[test]
    fn transfer_sequence_conserves_total() {
        let mut ledger = ledger();
        let moves =
            [(ALICE, BOB, 300), (BOB, CAROL, 1_200), (CAROL, ALICE, 50), (ALICE, ALICE, 10)];
        for (from, to, amount) in moves {
            ledger.apply_transfer(from, to, U256::from(amount)).unwrap();
        }
        assert_eq!(ledger.total_balance(), U256::from(2_000));
        assert_eq!(ledger.balance_of(CAROL), U256::from(1_150));
    }

    #[test]
    fn transfer_rejects_overdraft_without_mutating() {
        let mut ledger = ledger();
        let err = ledger.apply_transfer(CAROL, ALICE, U256::from(1)).unwrap_err();

        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                account: CAROL,
                balance: U256::ZERO,
                required: U256::from(1),
            }
        );
        assert_eq!(ledger.balance_of(ALICE), U256::from(1_000));
    }

    #[test]
    fn transfer_from_unknown_account_fails() {
        let mut ledger = ledger();
        let stranger = Address::repeat_byte(0xee);
        assert_eq!(
            ledger.apply_transfer(stranger, ALICE, U256::ZERO),
            Err(LedgerError::UnknownAccount(stranger))
        );
    }

    #[test]
    fn transfer_credits_untracked_receiver() {
        let mut ledger = ledger();
        let newcomer = Address::repeat_byte(0x77);
        ledger.apply_transfer(ALICE, newcomer, U256::from(5)).unwrap();
        assert_eq!(ledger.balance_of(newcomer), U256::from(5));
        assert_eq!(ledger.len(), 4);
    }

    #[test]
    fn approve_escrows_owner_balance() {
        let mut ledger = ledger();
        ledger.apply_approve(ALICE, BOB, U256::from(50)).unwrap();

        assert_eq!(ledger.balance_of(ALICE), U256::from(950));
        assert_eq!(ledger.allowance(ALICE, BOB), U256::from(50));
        assert_eq!(ledger.allowance(BOB, ALICE), U256::ZERO);
    }

    #[test]
    fn approve_accumulates_allowance() {
        let mut ledger = ledger();
        ledger.apply_approve(ALICE, BOB, U256::from(50)).unwrap();
        ledger.apply_approve(ALICE, BOB, U256::from(25)).unwrap();
        assert_eq!(ledger.allowance(ALICE, BOB), U256::from(75));
    }

    #[test]
    fn approve_without_balance_is_rejected_in_escrow_mode() {
        let mut ledger = ledger();
        assert!(ledger.apply_approve(CAROL, BOB, U256::from(1)).is_err());
        assert_eq!(ledger.allowance(CAROL, BOB), U256::ZERO);
    }

    #[test]
    fn allowance_only_approve_keeps_balance() {
        let mut ledger = ledger().with_approval_accounting(ApprovalAccounting::AllowanceOnly);
        ledger.apply_approve(CAROL, BOB, U256::from(40)).unwrap();

        assert_eq!(ledger.balance_of(CAROL), U256::ZERO);
        assert_eq!(ledger.allowance(CAROL, BOB), U256::from(40));
    }

    #[test]
    fn transfer_from_takes_first_qualifying_granter() {
        let mut ledger = ledger();
        ledger.set_allowance(CAROL, BOB, U256::from(10));
        ledger.set_allowance(ALICE, BOB, U256::from(60));
        ledger.set_allowance(CAROL, BOB, U256::from(80));

        // CAROL was recorded first, so her allowance wins even though ALICE's also covers.
        let granter = ledger.apply_transfer_from(BOB, ALICE, U256::from(50)).unwrap();
        assert_eq!(granter, CAROL);
        assert_eq!(ledger.allowance(CAROL, BOB), U256::from(30));
        assert_eq!(ledger.allowance(ALICE, BOB), U256::from(60));
    }

    #[test]
    fn transfer_from_credits_receiver_without_debiting_granter() {
        let mut ledger = ledger();
        ledger.set_allowance(ALICE, BOB, U256::from(50));
        ledger.apply_transfer_from(BOB, CAROL, U256::from(50)).unwrap();

        assert_eq!(ledger.balance_of(CAROL), U256::from(50));
        assert_eq!(ledger.balance_of(ALICE), U256::from(1_000));
        assert_eq!(ledger.allowance(ALICE, BOB), U256::ZERO);
    }

    #[rstest]
    #[case::no_allowances(&[], 50)]
    #[case::all_too_small(&[(ALICE, 49), (CAROL, 10)], 50)]
    fn transfer_from_without_qualifying_granter(
        #[case] allowances: &[(Address, u64)],
        #[case] amount: u64,
    ) {
        let mut ledger = ledger();
        for (granter, allowance) in allowances {
            ledger.set_allowance(*granter, BOB, U256::from(*allowance));
        }
        let before = ledger.allowance_table();

        assert_eq!(
            ledger.apply_transfer_from(BOB, ALICE, U256::from(amount)),
            Err(LedgerError::NoQualifyingGranter { spender: BOB, amount: U256::from(amount) })
        );
        assert_eq!(ledger.allowance_table(), before);
    }

    #[test]
    fn increase_allowance_has_no_balance_effect() {
        let mut ledger = ledger();
        ledger.apply_increase_allowance(CAROL, ALICE, U256::from(70)).unwrap();

        assert_eq!(ledger.allowance(CAROL, ALICE), U256::from(70));
        assert_eq!(ledger.total_balance(), U256::from(2_000));
    }

    #[test]
    fn allowance_table_is_keyed_by_spender_then_granter() {
        let mut ledger = ledger();
        ledger.set_allowance(ALICE, BOB, U256::from(1));
        ledger.set_allowance(CAROL, ALICE, U256::from(2));

        let table = ledger.allowance_table();
        assert_eq!(table.get(&(BOB, ALICE)), Some(&U256::from(1)));
        assert_eq!(table.get(&(ALICE, CAROL)), Some(&U256::from(2)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn uniform_supply_splits_evenly() {
        let ledger = ShadowLedger::with_uniform_supply(&[ALICE, BOB, CAROL], U256::from(1_000));
        assert!(ledger.accounts().iter().all(|account| account.balance() == U256::from(333)));
        assert!(ShadowLedger::with_uniform_supply(&[], U256::from(1)).is_empty());
    }
}
