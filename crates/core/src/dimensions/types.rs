//! Dimension and period domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, PeriodId};

/// The analytic dimensions a line item can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    /// Organizational unit.
    Department,
    /// Time-boxed piece of work, optionally owned by a department.
    Project,
    /// Sub-ledger under one chart account.
    SubsidiaryAccount,
}

impl DimensionKind {
    /// Request field carrying this tag.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Department => "department_id",
            Self::Project => "project_id",
            Self::SubsidiaryAccount => "subsidiary_account_id",
        }
    }

    /// Human readable name used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Department => "department",
            Self::Project => "project",
            Self::SubsidiaryAccount => "subsidiary account",
        }
    }
}

/// Generates a lowercase string enum with `ALL`, `as_str` and `parse`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every value in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stored name.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }

            /// Parses a stored name; `None` for anything else.
            #[must_use]
            pub fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Whether a department or subsidiary account accepts new tags.
    DimensionStatus {
        /// Usable.
        Active => "active",
        /// Kept for history only.
        Inactive => "inactive",
    }
}

string_enum! {
    /// Project lifecycle.
    ProjectStatus {
        /// Not started.
        Planning => "planning",
        /// Running.
        Active => "active",
        /// On hold.
        Paused => "paused",
        /// Finished.
        Completed => "completed",
        /// Abandoned.
        Cancelled => "cancelled",
    }
}

string_enum! {
    /// What a subsidiary account tracks.
    SubsidiaryType {
        /// Cost center.
        CostCenter => "cost_center",
        /// Profit center.
        ProfitCenter => "profit_center",
        /// Branch office.
        Branch => "branch",
        /// Division.
        Division => "division",
        /// Anything else.
        Custom => "custom",
    }
}

string_enum! {
    /// Accounting period status.
    PeriodStatus {
        /// Accepts postings.
        Open => "open",
        /// Closed for postings.
        Closed => "closed",
        /// Closed and frozen.
        Locked => "locked",
    }
}

/// A tagged dimension as the tag validator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionRef {
    /// Chart account a subsidiary account hangs under; `None` for the others.
    pub account_id: Option<AccountId>,
}

/// Accounting period as loaded from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// Period ID.
    pub id: PeriodId,
    /// Unique name, e.g. "March 2026".
    pub name: String,
    /// First day, inclusive.
    pub start_date: NaiveDate,
    /// Last day, inclusive.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: PeriodStatus,
}

impl PeriodRecord {
    /// Returns true if transactions can be booked into this period.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PeriodStatus::Open
    }

    /// Returns true if the date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_enums_parse_what_they_print() {
        for status in ProjectStatus::ALL {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(*status));
        }
        for kind in SubsidiaryType::ALL {
            assert_eq!(SubsidiaryType::parse(kind.as_str()), Some(*kind));
        }
        assert_eq!(PeriodStatus::parse("locked"), Some(PeriodStatus::Locked));
        assert_eq!(DimensionStatus::parse("Active"), None);
    }

    #[test]
    fn test_period_contains_both_ends() {
        let period = PeriodRecord {
            id: PeriodId::new(),
            name: "March 2026".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            status: PeriodStatus::Open,
        };
        assert!(period.contains_date(period.start_date));
        assert!(period.contains_date(period.end_date));
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));
        assert!(period.is_open());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&SubsidiaryType::ProfitCenter).unwrap(),
            "\"profit_center\""
        );
        assert_eq!(DimensionKind::SubsidiaryAccount.field(), "subsidiary_account_id");
    }
}
