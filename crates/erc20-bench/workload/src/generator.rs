//! Batch synthesis against the shadow ledger.

use alloy_primitives::Address;
use rand::{Rng, seq::IndexedRandom};

use crate::{
    ApprovalAccounting, ConfigError, KindCounters, Operation, OperationKind, SenderMode,
    ShadowLedger, WorkloadArgs, WorkloadConfig, WorkloadError, WorkloadProfile, WorkloadResult,
};

/// Synthesizes batches of operations that are valid against a [`ShadowLedger`].
///
/// Every synthesized operation is applied to the ledger before the next one is drawn,
/// so later operations in a batch see the effects of earlier ones.
#[derive(Debug)]
pub struct WorkloadGenerator<R> {
    config: WorkloadConfig,
    ledger: ShadowLedger,
    /// Accounts counterparties are drawn from, in ledger order.
    participants: Vec<Address>,
    default_sender: Address,
    rng: R,
    counters: KindCounters,
}

impl<R: Rng> WorkloadGenerator<R> {
    /// Creates a generator over `ledger`.
    ///
    /// In default-sender profiles `default_sender` sends every operation and is never
    /// drawn as a counterparty.
    pub fn new(
        config: WorkloadConfig,
        mut ledger: ShadowLedger,
        default_sender: Address,
        rng: R,
    ) -> Result<Self, ConfigError> {
        let mode = config.profile.sender_mode();
        let participants: Vec<_> = ledger
            .addresses()
            .filter(|address| mode == SenderMode::PerAccount || *address != default_sender)
            .collect();
        let needed = match mode {
            SenderMode::DefaultSender => 1,
            SenderMode::PerAccount => 2,
        };
        if participants.len() < needed {
            return Err(ConfigError::NoAccounts(config.profile));
        }
        if mode == SenderMode::DefaultSender {
            ledger.track(default_sender);
        }

        tracing::debug!(
            profile = %config.profile,
            participants = participants.len(),
            txn_per_batch = config.txn_per_batch,
            %default_sender,
            "workload generator ready"
        );

        Ok(Self {
            config,
            ledger,
            participants,
            default_sender,
            rng,
            counters: KindCounters::default(),
        })
    }

    /// Validates `args` for `profile` and creates a generator over `ledger`.
    pub fn from_args(
        profile: WorkloadProfile,
        args: &WorkloadArgs,
        ledger: ShadowLedger,
        default_sender: Address,
        rng: R,
    ) -> Result<Self, ConfigError> {
        Self::new(WorkloadConfig::from_args(profile, args)?, ledger, default_sender, rng)
    }

    /// Synthesizes exactly `txn_per_batch` operations.
    ///
    /// Fails with [`WorkloadError::Exhausted`] if some slot cannot be synthesized as any
    /// kind of the profile. Mutations applied for earlier slots are kept.
    pub fn generate_batch(&mut self) -> WorkloadResult<Vec<Operation>> {
        let kinds = self.config.profile.kinds();
        let mut batch = Vec::with_capacity(self.config.txn_per_batch);
        for slot in 0..self.config.txn_per_batch {
            let start = if kinds.len() == 1 { 0 } else { self.rng.random_range(0..kinds.len()) };
            batch.push(self.synthesize_at(slot, start)?);
        }
        Ok(batch)
    }

    /// Synthesizes one operation, trying `start` first and falling back in profile order.
    pub fn synthesize_slot(&mut self, start: OperationKind) -> WorkloadResult<Operation> {
        let profile = self.config.profile;
        let start = profile
            .kinds()
            .iter()
            .position(|kind| *kind == start)
            .ok_or(ConfigError::KindNotInProfile { profile, kind: start })?;
        self.synthesize_at(0, start)
    }

    /// Returns the per-kind success counters.
    ///
    /// Slots synthesized before an exhausted slot of the same batch stay counted, like
    /// their ledger mutations, although the batch is not returned.
    pub const fn counters(&self) -> &KindCounters {
        &self.counters
    }

    /// Returns the shadow ledger.
    pub const fn ledger(&self) -> &ShadowLedger {
        &self.ledger
    }

    /// Logs the per-kind counters.
    pub fn log_summary(&self) {
        tracing::info!(
            profile = %self.config.profile,
            total = self.counters.total(),
            counters = %self.counters,
            "workload summary"
        );
    }

    fn synthesize_at(&mut self, slot: usize, start: usize) -> WorkloadResult<Operation> {
        let kinds = self.config.profile.kinds();
        for attempt in 0..kinds.len() {
            let kind = kinds[(start + attempt) % kinds.len()];
            if let Some(operation) = self.synthesize(kind) {
                self.counters.record(kind);
                return Ok(operation);
            }
            tracing::trace!(slot, %kind, "kind not synthesizable, falling back");
        }

        let tried =
            (0..kinds.len()).map(|attempt| kinds[(start + attempt) % kinds.len()]).collect();
        Err(WorkloadError::Exhausted { slot, tried })
    }

    fn synthesize(&mut self, kind: OperationKind) -> Option<Operation> {
        match kind {
            OperationKind::Transfer => self.transfer(),
            OperationKind::Approve => self.approve(),
            OperationKind::TransferFrom => self.transfer_from(),
            OperationKind::IncreaseAllowance => self.increase_allowance(),
        }
    }

    fn transfer(&mut self) -> Option<Operation> {
        let amount = self.config.transfer_money;
        let sender = self.sender_where(|ledger, address| ledger.can_debit(address, amount))?;
        let receiver = self.counterparty(sender)?;
        self.ledger.apply_transfer(sender, receiver, amount).ok()?;
        Some(Operation::Transfer { sender: self.explicit(sender), receiver, amount })
    }

    fn approve(&mut self) -> Option<Operation> {
        let amount = self.config.allower_money;
        let owner = self.sender_where(|ledger, address| match ledger.approval_accounting() {
            ApprovalAccounting::Escrow => ledger.can_debit(address, amount),
            ApprovalAccounting::AllowanceOnly => true,
        })?;
        let spender = self.counterparty(owner)?;
        self.ledger.apply_approve(owner, spender, amount).ok()?;
        Some(Operation::Approve { sender: self.explicit(owner), spender, amount })
    }

    fn transfer_from(&mut self) -> Option<Operation> {
        let amount = self.config.allower_money;
        let spender = self
            .sender_where(|ledger, address| ledger.qualifying_granter(address, amount).is_some())?;
        let receiver = self.counterparty(spender)?;
        let owner = self.ledger.apply_transfer_from(spender, receiver, amount).ok()?;
        Some(Operation::TransferFrom { sender: self.explicit(spender), owner, receiver, amount })
    }

    fn increase_allowance(&mut self) -> Option<Operation> {
        let amount = self.config.allower_money;
        let owner = self.sender_where(|_, _| true)?;
        let spender = self.counterparty(owner)?;
        self.ledger.apply_increase_allowance(owner, spender, amount).ok()?;
        Some(Operation::IncreaseAllowance { sender: self.explicit(owner), spender, amount })
    }

    /// Picks the sender of the next operation among the accounts satisfying `eligible`.
    fn sender_where(
        &mut self,
        eligible: impl Fn(&ShadowLedger, Address) -> bool,
    ) -> Option<Address> {
        match self.config.profile.sender_mode() {
            SenderMode::DefaultSender => {
                eligible(&self.ledger, self.default_sender).then_some(self.default_sender)
            }
            SenderMode::PerAccount => {
                let candidates: Vec<_> = self
                    .participants
                    .iter()
                    .copied()
                    .filter(|address| eligible(&self.ledger, *address))
                    .collect();
                candidates.choose(&mut self.rng).copied()
            }
        }
    }

    /// Picks a participant other than `sender`.
    fn counterparty(&mut self, sender: Address) -> Option<Address> {
        let candidates: Vec<_> =
            self.participants.iter().copied().filter(|address| *address != sender).collect();
        candidates.choose(&mut self.rng).copied()
    }

    fn explicit(&self, sender: Address) -> Option<Address> {
        match self.config.profile.sender_mode() {
            SenderMode::DefaultSender => None,
            SenderMode::PerAccount => Some(sender),
        }
    }
}
