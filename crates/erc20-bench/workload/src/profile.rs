use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ConfigError, OperationKind};

/// Who sends the operations of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderMode {
    /// Every operation is sent by the session's default sender.
    DefaultSender,
    /// Senders are drawn from the tracked accounts and carried explicitly.
    PerAccount,
}

/// A named benchmark variant: which kinds are generated and who sends them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadProfile {
    /// Default sender transfers to random accounts.
    Transfer,
    /// Default sender raises allowances of random accounts.
    IncreaseAllowance,
    /// Default sender spends allowances granted to it.
    TransferFrom,
    /// Transfers mixed with delegated transfers, all from the default sender.
    TransferTransferFrom,
    /// Transfers, delegated transfers and approvals between random accounts.
    TransferApproveTransferFrom,
}

impl WorkloadProfile {
    /// Every profile.
    pub const ALL: [Self; 5] = [
        Self::Transfer,
        Self::IncreaseAllowance,
        Self::TransferFrom,
        Self::TransferTransferFrom,
        Self::TransferApproveTransferFrom,
    ];

    /// Profile name as used on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::IncreaseAllowance => "increase-allowance",
            Self::TransferFrom => "transfer-from",
            Self::TransferTransferFrom => "transfer-transfer-from",
            Self::TransferApproveTransferFrom => "transfer-approve-transfer-from",
        }
    }

    /// Kinds generated by this profile, in fallback order.
    ///
    /// A slot that cannot be synthesized as one kind is retried as the next one,
    /// wrapping around. TransferFrom precedes Approve so that a spender without
    /// allowance falls back to granting one.
    pub const fn kinds(self) -> &'static [OperationKind] {
        match self {
            Self::Transfer => &[OperationKind::Transfer],
            Self::IncreaseAllowance => &[OperationKind::IncreaseAllowance],
            Self::TransferFrom => &[OperationKind::TransferFrom],
            Self::TransferTransferFrom => &[OperationKind::Transfer, OperationKind::TransferFrom],
            Self::TransferApproveTransferFrom => {
                &[OperationKind::Transfer, OperationKind::TransferFrom, OperationKind::Approve]
            }
        }
    }

    /// Who sends the operations.
    pub const fn sender_mode(self) -> SenderMode {
        match self {
            Self::TransferApproveTransferFrom => SenderMode::PerAccount,
            _ => SenderMode::DefaultSender,
        }
    }

    /// Whether `transferMoney` must be configured.
    pub fn requires_transfer_money(self) -> bool {
        self.kinds().contains(&OperationKind::Transfer)
    }

    /// Whether `allowerMoney` must be configured.
    pub fn requires_allower_money(self) -> bool {
        self.kinds().iter().any(|kind| *kind != OperationKind::Transfer)
    }
}

impl fmt::Display for WorkloadProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownProfile(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::transfer(WorkloadProfile::Transfer, true, false)]
    #[case::increase_allowance(WorkloadProfile::IncreaseAllowance, false, true)]
    #[case::transfer_from(WorkloadProfile::TransferFrom, false, true)]
    #[case::mixed_default(WorkloadProfile::TransferTransferFrom, true, true)]
    #[case::mixed_per_account(WorkloadProfile::TransferApproveTransferFrom, true, true)]
    fn required_arguments(
        #[case] profile: WorkloadProfile,
        #[case] transfer_money: bool,
        #[case] allower_money: bool,
    ) {
        assert_eq!(profile.requires_transfer_money(), transfer_money);
        assert_eq!(profile.requires_allower_money(), allower_money);
    }

    #[test]
    fn names_round_trip() {
        for profile in WorkloadProfile::ALL {
            assert_eq!(profile.to_string().parse::<WorkloadProfile>().unwrap(), profile);
        }
        assert_eq!(
            "mint".parse::<WorkloadProfile>(),
            Err(ConfigError::UnknownProfile("mint".to_string()))
        );
    }

    #[test]
    fn mixed_profile_falls_back_from_transfer_from_to_approve() {
        let kinds = WorkloadProfile::TransferApproveTransferFrom.kinds();
        let from = kinds.iter().position(|kind| *kind == OperationKind::TransferFrom).unwrap();
        assert_eq!(kinds[(from + 1) % kinds.len()], OperationKind::Approve);
        assert_eq!(
            WorkloadProfile::TransferApproveTransferFrom.sender_mode(),
            SenderMode::PerAccount
        );
    }
}
