//! Per-call lifecycle.

/// Lifecycle state of one submitted call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallState {
    /// Built but not handed to the session yet.
    #[default]
    Pending,
    /// Handed to the session, outcome not known.
    Submitted,
    /// The ledger confirmed the call.
    Confirmed,
    /// The call failed. There is no retry.
    Failed,
}

/// Event driving a [`CallState`] transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    /// The call was handed to the session.
    Submit,
    /// The session reported success.
    Confirm,
    /// The session reported an error or the call timed out.
    Fail,
}

impl CallState {
    /// Returns the state reached on `event`, or `None` if the transition is not allowed.
    pub const fn on(self, event: CallEvent) -> Option<Self> {
        match (self, event) {
            (Self::Pending, CallEvent::Submit) => Some(Self::Submitted),
            (Self::Submitted, CallEvent::Confirm) => Some(Self::Confirmed),
            (Self::Submitted, CallEvent::Fail) => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns `true` for states that accept no further event.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(CallState::Pending, CallEvent::Submit, Some(CallState::Submitted))]
    #[case(CallState::Submitted, CallEvent::Confirm, Some(CallState::Confirmed))]
    #[case(CallState::Submitted, CallEvent::Fail, Some(CallState::Failed))]
    #[case(CallState::Pending, CallEvent::Confirm, None)]
    #[case(CallState::Submitted, CallEvent::Submit, None)]
    #[case(CallState::Failed, CallEvent::Submit, None)]
    #[case(CallState::Confirmed, CallEvent::Fail, None)]
    fn transitions(
        #[case] from: CallState,
        #[case] event: CallEvent,
        #[case] expected: Option<CallState>,
    ) {
        assert_eq!(from.on(event), expected);
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for state in [CallState::Confirmed, CallState::Failed] {
            assert!(state.is_terminal());
            for event in [CallEvent::Submit, CallEvent::Confirm, CallEvent::Fail] {
                assert_eq!(state.on(event), None);
            }
        }
    }
}
