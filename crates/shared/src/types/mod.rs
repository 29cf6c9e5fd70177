//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{
    BALANCE_TOLERANCE, MAX_AMOUNT, is_storable_amount, is_whole_cents, round_money,
    within_tolerance,
};
pub use pagination::{MAX_PER_PAGE, PageMeta, PageRequest, PageResponse, SortOrder, whitelisted_sort};
