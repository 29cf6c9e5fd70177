//! Analytic dimensions and accounting periods.
//!
//! - `types` - departments, projects, subsidiary accounts, period status
//! - `service` - tag validation, period close and booking rules
//! - `error` - dimension errors

pub mod error;
pub mod service;
pub mod types;

pub use error::DimensionError;
pub use service::DimensionService;
pub use types::{
    DimensionKind, DimensionRef, DimensionStatus, PeriodRecord, PeriodStatus, ProjectStatus,
    SubsidiaryType,
};
