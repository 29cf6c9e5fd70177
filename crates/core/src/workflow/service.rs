//! Workflow service for transaction state transitions.
//!
//! This module implements the status state machine and the status gates
//! that decide whether a transaction may be edited, deleted, approved or
//! rejected.

use chrono::Utc;
use tally_shared::types::UserId;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{GuardedOperation, TransactionStatus, WorkflowAction};

/// Stateless service for managing transaction workflow transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// Separator placed between existing notes and a rejection reason.
    pub const NOTE_SEPARATOR: &'static str = "\n\n";

    fn guard(
        allowed: bool,
        operation: GuardedOperation,
        status: TransactionStatus,
    ) -> Result<(), WorkflowError> {
        if allowed {
            Ok(())
        } else {
            Err(WorkflowError::ImmutableState { operation, status })
        }
    }

    /// Fields and items may only change while the transaction is a draft.
    ///
    /// # Errors
    ///
    /// Returns `ImmutableState` for any status other than Draft.
    pub fn ensure_can_update(status: TransactionStatus) -> Result<(), WorkflowError> {
        Self::guard(status.is_editable(), GuardedOperation::Update, status)
    }

    /// Only drafts and rejected transactions may be deleted.
    ///
    /// # Errors
    ///
    /// Returns `ImmutableState` for Pending or Approved.
    pub fn ensure_can_delete(status: TransactionStatus) -> Result<(), WorkflowError> {
        Self::guard(status.is_deletable(), GuardedOperation::Delete, status)
    }

    /// Attachments may only be added to drafts.
    ///
    /// # Errors
    ///
    /// Returns `ImmutableState` for any status other than Draft.
    pub fn ensure_can_attach(status: TransactionStatus) -> Result<(), WorkflowError> {
        Self::guard(status.is_editable(), GuardedOperation::Attach, status)
    }

    /// Status a new transaction is stored with.
    ///
    /// Defaults to Draft. Any of the four statuses may be given, so entries
    /// imported from another ledger can arrive already approved or rejected.
    #[must_use]
    pub fn initial_status(requested: Option<TransactionStatus>) -> TransactionStatus {
        requested.unwrap_or(TransactionStatus::Draft)
    }

    /// Resolve the status requested by an edit of a draft.
    ///
    /// An edit may keep the draft or submit it (Draft → Pending). Approval
    /// and rejection only happen through their own operations.
    ///
    /// # Errors
    ///
    /// Returns `ImmutableState` if `current` is not Draft and
    /// `InvalidTransition` if `requested` is Approved or Rejected.
    pub fn resolve_edit_status(
        current: TransactionStatus,
        requested: Option<TransactionStatus>,
    ) -> Result<TransactionStatus, WorkflowError> {
        Self::ensure_can_update(current)?;

        match requested {
            None => Ok(current),
            Some(to @ (TransactionStatus::Draft | TransactionStatus::Pending)) => Ok(to),
            Some(to) => Err(WorkflowError::InvalidTransition { from: current, to }),
        }
    }

    /// Approve a pending transaction.
    ///
    /// # Returns
    /// * `Ok(WorkflowAction::Approve)` if the transition is valid
    /// * `Err(WorkflowError::ImmutableState)` if not in Pending status
    pub fn approve(
        current_status: TransactionStatus,
        approved_by: UserId,
    ) -> Result<WorkflowAction, WorkflowError> {
        Self::guard(
            current_status == TransactionStatus::Pending,
            GuardedOperation::Approve,
            current_status,
        )?;

        Ok(WorkflowAction::Approve {
            new_status: TransactionStatus::Approved,
            approved_by,
            approved_at: Utc::now(),
        })
    }

    /// Reject a pending transaction, appending the reason to its notes.
    ///
    /// # Returns
    /// * `Ok(WorkflowAction::Reject)` carrying the accumulated notes
    /// * `Err(WorkflowError::ImmutableState)` if not in Pending status
    /// * `Err(WorkflowError::RejectionReasonRequired)` if reason is blank
    pub fn reject(
        current_status: TransactionStatus,
        existing_notes: Option<&str>,
        rejection_reason: &str,
    ) -> Result<WorkflowAction, WorkflowError> {
        Self::guard(
            current_status == TransactionStatus::Pending,
            GuardedOperation::Reject,
            current_status,
        )?;

        let reason = rejection_reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::RejectionReasonRequired);
        }

        Ok(WorkflowAction::Reject {
            new_status: TransactionStatus::Rejected,
            notes: Self::append_rejection_note(existing_notes, reason),
        })
    }

    /// Appends `Rejection reason: <reason>` to existing notes, never replacing them.
    #[must_use]
    pub fn append_rejection_note(existing_notes: Option<&str>, reason: &str) -> String {
        let line = format!("Rejection reason: {reason}");
        match existing_notes {
            Some(notes) if !notes.is_empty() => {
                format!("{notes}{}{line}", Self::NOTE_SEPARATOR)
            }
            _ => line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_from_pending() {
        let user = UserId::new();
        let action = WorkflowService::approve(TransactionStatus::Pending, user).unwrap();
        assert_eq!(action.new_status(), TransactionStatus::Approved);
        match action {
            WorkflowAction::Approve { approved_by, .. } => assert_eq!(approved_by, user),
            WorkflowAction::Reject { .. } => panic!("expected approve"),
        }
    }

    #[test]
    fn test_second_approve_fails() {
        let user = UserId::new();
        let first = WorkflowService::approve(TransactionStatus::Pending, user).unwrap();
        let second = WorkflowService::approve(first.new_status(), user);
        assert_eq!(
            second.unwrap_err(),
            WorkflowError::ImmutableState {
                operation: GuardedOperation::Approve,
                status: TransactionStatus::Approved,
            }
        );
    }

    #[test]
    fn test_reject_appends_notes() {
        let action = WorkflowService::reject(
            TransactionStatus::Pending,
            Some("Office supplies for Q1"),
            "Missing receipt",
        )
        .unwrap();

        match action {
            WorkflowAction::Reject { new_status, notes } => {
                assert_eq!(new_status, TransactionStatus::Rejected);
                assert_eq!(
                    notes,
                    "Office supplies for Q1\n\nRejection reason: Missing receipt"
                );
            }
            WorkflowAction::Approve { .. } => panic!("expected reject"),
        }
    }

    #[test]
    fn test_reject_without_prior_notes() {
        let action = WorkflowService::reject(TransactionStatus::Pending, None, "Duplicate").unwrap();
        match action {
            WorkflowAction::Reject { notes, .. } => assert_eq!(notes, "Rejection reason: Duplicate"),
            WorkflowAction::Approve { .. } => panic!("expected reject"),
        }
    }

    #[test]
    fn test_reject_requires_reason() {
        assert_eq!(
            WorkflowService::reject(TransactionStatus::Pending, None, "   ").unwrap_err(),
            WorkflowError::RejectionReasonRequired
        );
    }

    #[test]
    fn test_reject_checks_status_before_reason() {
        assert!(matches!(
            WorkflowService::reject(TransactionStatus::Draft, None, ""),
            Err(WorkflowError::ImmutableState { .. })
        ));
    }

    #[test]
    fn test_update_and_delete_gates() {
        assert!(WorkflowService::ensure_can_update(TransactionStatus::Draft).is_ok());
        assert!(WorkflowService::ensure_can_update(TransactionStatus::Approved).is_err());
        assert!(WorkflowService::ensure_can_delete(TransactionStatus::Rejected).is_ok());
        assert!(WorkflowService::ensure_can_delete(TransactionStatus::Approved).is_err());
        assert!(WorkflowService::ensure_can_attach(TransactionStatus::Pending).is_err());
    }

    #[test]
    fn test_initial_status_accepts_every_status() {
        assert_eq!(
            WorkflowService::initial_status(None),
            TransactionStatus::Draft
        );
        for status in [
            TransactionStatus::Draft,
            TransactionStatus::Pending,
            TransactionStatus::Approved,
            TransactionStatus::Rejected,
        ] {
            assert_eq!(WorkflowService::initial_status(Some(status)), status);
        }
    }

    #[test]
    fn test_resolve_edit_status() {
        assert_eq!(
            WorkflowService::resolve_edit_status(TransactionStatus::Draft, None),
            Ok(TransactionStatus::Draft)
        );
        assert_eq!(
            WorkflowService::resolve_edit_status(
                TransactionStatus::Draft,
                Some(TransactionStatus::Pending)
            ),
            Ok(TransactionStatus::Pending)
        );
        assert!(matches!(
            WorkflowService::resolve_edit_status(
                TransactionStatus::Draft,
                Some(TransactionStatus::Approved)
            ),
            Err(WorkflowError::InvalidTransition { .. })
        ));
        assert!(matches!(
            WorkflowService::resolve_edit_status(
                TransactionStatus::Pending,
                Some(TransactionStatus::Draft)
            ),
            Err(WorkflowError::ImmutableState { .. })
        ));
    }
}
