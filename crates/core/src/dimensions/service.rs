//! Dimension tag and period rules.
//!
//! Repositories load the referenced rows, then call in here before writing.

use chrono::NaiveDate;
use uuid::Uuid;

use super::error::DimensionError;
use super::types::{DimensionKind, DimensionRef, PeriodRecord, PeriodStatus};
use crate::ledger::{DimensionTags, LineItemInput};

/// Dimension and period rules. No database dependencies.
pub struct DimensionService;

impl DimensionService {
    /// Checks every dimension tag on a set of line items.
    ///
    /// A tag must name an existing row. A subsidiary account must also hang
    /// under the account the item posts to.
    ///
    /// # Errors
    ///
    /// Returns the first `UnknownTag` or `SubsidiaryMismatch`.
    pub fn validate_tags<L>(items: &[LineItemInput], lookup: L) -> Result<(), DimensionError>
    where
        L: Fn(DimensionKind, Uuid) -> Option<DimensionRef>,
    {
        for (index, item) in items.iter().enumerate() {
            for (kind, id) in tags(&item.dimensions) {
                let Some(found) = lookup(kind, id) else {
                    return Err(DimensionError::UnknownTag { index, kind, id });
                };
                if kind == DimensionKind::SubsidiaryAccount
                    && found.account_id != Some(item.account_id)
                {
                    return Err(DimensionError::SubsidiaryMismatch { index, id });
                }
            }
        }
        Ok(())
    }

    /// Every distinct tag used by a set of items, grouped by kind.
    #[must_use]
    pub fn referenced(items: &[LineItemInput], kind: DimensionKind) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = items
            .iter()
            .flat_map(|item| tags(&item.dimensions))
            .filter(|(k, _)| *k == kind)
            .map(|(_, id)| id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// End must not precede start.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange`.
    pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), DimensionError> {
        if end < start {
            return Err(DimensionError::InvalidDateRange { start, end });
        }
        Ok(())
    }

    /// Like [`Self::validate_range`], skipped unless both ends are known.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange`.
    pub fn validate_optional_range(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(), DimensionError> {
        match (start, end) {
            (Some(start), Some(end)) => Self::validate_range(start, end),
            _ => Ok(()),
        }
    }

    /// Closes an open period.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotOpen` for a closed or locked period.
    pub fn close_period(status: PeriodStatus) -> Result<PeriodStatus, DimensionError> {
        match status {
            PeriodStatus::Open => Ok(PeriodStatus::Closed),
            status => Err(DimensionError::PeriodNotOpen {
                action: "closed",
                status,
            }),
        }
    }

    /// Only open periods may be deleted.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotOpen`.
    pub fn ensure_period_deletable(status: PeriodStatus) -> Result<(), DimensionError> {
        match status {
            PeriodStatus::Open => Ok(()),
            status => Err(DimensionError::PeriodNotOpen {
                action: "deleted",
                status,
            }),
        }
    }

    /// A date may be booked unless a closed or locked period covers it.
    ///
    /// Dates outside every period are bookable.
    ///
    /// # Errors
    ///
    /// Returns `PeriodClosed` naming the first covering period that is not open.
    pub fn ensure_bookable(date: NaiveDate, periods: &[PeriodRecord]) -> Result<(), DimensionError> {
        match periods
            .iter()
            .find(|period| period.contains_date(date) && !period.is_open())
        {
            Some(period) => Err(DimensionError::PeriodClosed {
                date,
                period: period.name.clone(),
                status: period.status,
            }),
            None => Ok(()),
        }
    }

    /// Rows referenced by ledger lines cannot be deleted.
    ///
    /// # Errors
    ///
    /// Returns `InUse`.
    pub fn ensure_deletable(kind: DimensionKind, used_by_items: bool) -> Result<(), DimensionError> {
        if used_by_items {
            return Err(DimensionError::InUse {
                kind,
                reason: "transaction items",
            });
        }
        Ok(())
    }
}

fn tags(dimensions: &DimensionTags) -> impl Iterator<Item = (DimensionKind, Uuid)> {
    [
        dimensions.department_id.map(|id| (DimensionKind::Department, id)),
        dimensions.project_id.map(|id| (DimensionKind::Project, id)),
        dimensions
            .subsidiary_account_id
            .map(|id| (DimensionKind::SubsidiaryAccount, id)),
    ]
    .into_iter()
    .flatten()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use rust_decimal_macros::dec;
    use tally_shared::types::{AccountId, PeriodId};

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    fn tagged(account_id: AccountId, dimensions: DimensionTags) -> LineItemInput {
        LineItemInput {
            dimensions,
            ..LineItemInput::debit(account_id, dec!(10))
        }
    }

    #[test]
    fn test_known_tags_pass() {
        let cash = AccountId::new();
        let (department, project, subsidiary) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let rows = HashMap::from([
            ((DimensionKind::Department, department), DimensionRef { account_id: None }),
            ((DimensionKind::Project, project), DimensionRef { account_id: None }),
            (
                (DimensionKind::SubsidiaryAccount, subsidiary),
                DimensionRef {
                    account_id: Some(cash),
                },
            ),
        ]);
        let items = vec![
            tagged(
                cash,
                DimensionTags {
                    department_id: Some(department),
                    project_id: Some(project),
                    subsidiary_account_id: Some(subsidiary),
                },
            ),
            tagged(cash, DimensionTags::default()),
        ];

        let result = DimensionService::validate_tags(&items, |kind, id| rows.get(&(kind, id)).copied());
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_unknown_tag_names_item_and_kind() {
        let cash = AccountId::new();
        let ghost = Uuid::new_v4();
        let items = vec![
            tagged(cash, DimensionTags::default()),
            tagged(
                cash,
                DimensionTags {
                    project_id: Some(ghost),
                    ..DimensionTags::default()
                },
            ),
        ];
        assert_eq!(
            DimensionService::validate_tags(&items, |_, _| None),
            Err(DimensionError::UnknownTag {
                index: 1,
                kind: DimensionKind::Project,
                id: ghost,
            })
        );
    }

    #[test]
    fn test_subsidiary_must_sit_under_item_account() {
        let (cash, bank) = (AccountId::new(), AccountId::new());
        let subsidiary = Uuid::new_v4();
        let items = vec![tagged(
            cash,
            DimensionTags {
                subsidiary_account_id: Some(subsidiary),
                ..DimensionTags::default()
            },
        )];
        assert_eq!(
            DimensionService::validate_tags(&items, |_, _| Some(DimensionRef {
                account_id: Some(bank)
            })),
            Err(DimensionError::SubsidiaryMismatch {
                index: 0,
                id: subsidiary
            })
        );
    }

    #[test]
    fn test_referenced_dedups() {
        let cash = AccountId::new();
        let department = Uuid::new_v4();
        let tags = DimensionTags {
            department_id: Some(department),
            ..DimensionTags::default()
        };
        let items = vec![tagged(cash, tags.clone()), tagged(cash, tags)];
        assert_eq!(
            DimensionService::referenced(&items, DimensionKind::Department),
            vec![department]
        );
        assert!(DimensionService::referenced(&items, DimensionKind::Project).is_empty());
    }

    #[test]
    fn test_date_ranges() {
        assert!(DimensionService::validate_range(date(3, 1), date(3, 1)).is_ok());
        assert_eq!(
            DimensionService::validate_range(date(3, 31), date(3, 1)),
            Err(DimensionError::InvalidDateRange {
                start: date(3, 31),
                end: date(3, 1)
            })
        );
        assert!(DimensionService::validate_optional_range(Some(date(3, 31)), None).is_ok());
        assert!(
            DimensionService::validate_optional_range(Some(date(3, 31)), Some(date(3, 1))).is_err()
        );
    }

    #[test]
    fn test_close_only_open_periods() {
        assert_eq!(
            DimensionService::close_period(PeriodStatus::Open),
            Ok(PeriodStatus::Closed)
        );
        for status in [PeriodStatus::Closed, PeriodStatus::Locked] {
            let err = DimensionService::close_period(status).unwrap_err();
            assert_eq!(err.http_status_code(), 422);
            assert!(DimensionService::ensure_period_deletable(status).is_err());
        }
        assert!(DimensionService::ensure_period_deletable(PeriodStatus::Open).is_ok());
    }

    #[test]
    fn test_closed_period_blocks_booking() {
        let march = PeriodRecord {
            id: PeriodId::new(),
            name: "March 2026".into(),
            start_date: date(3, 1),
            end_date: date(3, 31),
            status: PeriodStatus::Closed,
        };
        let april = PeriodRecord {
            id: PeriodId::new(),
            name: "April 2026".into(),
            start_date: date(4, 1),
            end_date: date(4, 30),
            status: PeriodStatus::Open,
        };
        let periods = [march, april];

        assert!(matches!(
            DimensionService::ensure_bookable(date(3, 15), &periods),
            Err(DimensionError::PeriodClosed { ref period, .. }) if period == "March 2026"
        ));
        assert!(DimensionService::ensure_bookable(date(4, 1), &periods).is_ok());
        assert!(DimensionService::ensure_bookable(date(6, 1), &periods).is_ok());
    }

    #[test]
    fn test_in_use_rows_cannot_be_deleted() {
        assert!(DimensionService::ensure_deletable(DimensionKind::Project, false).is_ok());
        assert!(matches!(
            DimensionService::ensure_deletable(DimensionKind::Project, true),
            Err(DimensionError::InUse { .. })
        ));
    }
}
