//! Property-based tests for WorkflowService.

use proptest::prelude::*;
use tally_shared::types::UserId;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{TransactionStatus, WorkflowAction};

/// Strategy for generating random TransactionStatus values.
fn arb_status() -> impl Strategy<Value = TransactionStatus> {
    prop::sample::select(TransactionStatus::ALL.to_vec())
}

/// Strategy for generating random user ids.
fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating non-blank reasons.
fn arb_reason() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,40}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Approve succeeds exactly from Pending.
    #[test]
    fn prop_approve_only_from_pending(status in arb_status(), user in arb_user()) {
        let result = WorkflowService::approve(status, user);
        if status == TransactionStatus::Pending {
            prop_assert_eq!(result.unwrap().new_status(), TransactionStatus::Approved);
        } else {
            let refused = matches!(result, Err(WorkflowError::ImmutableState { .. }));
            prop_assert!(refused);
        }
    }

    /// Reject never drops existing notes.
    #[test]
    fn prop_reject_preserves_notes(
        notes in proptest::option::of("[a-zA-Z0-9 .,]{0,80}"),
        reason in arb_reason(),
    ) {
        let action = WorkflowService::reject(TransactionStatus::Pending, notes.as_deref(), &reason).unwrap();
        let WorkflowAction::Reject { notes: merged, .. } = action else {
            return Err(TestCaseError::fail("expected reject"));
        };

        if let Some(original) = notes.as_deref() {
            prop_assert!(merged.starts_with(original));
        }
        let suffix = format!("Rejection reason: {reason}");
        prop_assert!(merged.ends_with(&suffix));
    }

    /// Delete gate admits exactly Draft and Rejected.
    #[test]
    fn prop_delete_gate(status in arb_status()) {
        let allowed = matches!(status, TransactionStatus::Draft | TransactionStatus::Rejected);
        prop_assert_eq!(WorkflowService::ensure_can_delete(status).is_ok(), allowed);
    }

    /// Update gate admits exactly Draft.
    #[test]
    fn prop_update_gate(status in arb_status(), requested in proptest::option::of(arb_status())) {
        let result = WorkflowService::resolve_edit_status(status, requested);
        if status != TransactionStatus::Draft {
            let refused = matches!(result, Err(WorkflowError::ImmutableState { .. }));
            prop_assert!(refused);
        } else if let Ok(next) = result {
            prop_assert!(matches!(next, TransactionStatus::Draft | TransactionStatus::Pending));
        }
    }
}
