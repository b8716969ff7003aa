//! Property tests for the status transition table.

use proptest::prelude::*;

use crate::escrow::types::TransactionStatus;

fn any_status() -> impl Strategy<Value = TransactionStatus> {
    prop::sample::select(TransactionStatus::ALL.to_vec())
}

proptest! {
    /// Terminal states never have an outgoing transition.
    #[test]
    fn prop_terminal_states_are_final(from in any_status(), to in any_status()) {
        if from.is_terminal() {
            prop_assert!(!from.can_transition_to(to));
        }
    }

    /// Cancellation is reachable from every non-terminal state.
    #[test]
    fn prop_cancel_reachable_from_non_terminal(from in any_status()) {
        if !from.is_terminal() {
            prop_assert!(from.can_transition_to(TransactionStatus::Cancelled));
        }
    }

    /// Disputes open from every non-terminal, non-disputed state.
    #[test]
    fn prop_dispute_reachable(from in any_status()) {
        if !from.is_terminal() && from != TransactionStatus::Disputed {
            prop_assert!(from.can_transition_to(TransactionStatus::Disputed));
        }
    }

    /// No transition is a self-loop.
    #[test]
    fn prop_no_self_loops(s in any_status()) {
        prop_assert!(!s.can_transition_to(s));
    }

    /// The wire spelling round-trips through parse.
    #[test]
    fn prop_parse_round_trip(s in any_status()) {
        prop_assert_eq!(TransactionStatus::parse(s.as_str()), Some(s));
    }
}
