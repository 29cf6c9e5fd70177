//! Attachment storage using Apache OpenDAL.
//!
//! Blobs go to a local directory in normal operation and to process memory
//! in tests. The returned key is what transactions record as their
//! attachment path.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{StorageService, StoredFile};
