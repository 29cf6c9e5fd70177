//! Storage configuration types.

use std::path::PathBuf;

/// Where attachment blobs live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    /// Local filesystem directory.
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// Process memory, lost on restart. Used by tests.
    Memory,
}

impl StorageProvider {
    /// Create local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Builds a provider from the `storage.backend` setting.
    ///
    /// `memory` selects the in-memory backend; anything else is a
    /// filesystem rooted at `root`.
    #[must_use]
    pub fn from_settings(backend: &str, root: &str) -> Self {
        if backend.eq_ignore_ascii_case("memory") {
            Self::Memory
        } else {
            Self::local_fs(root)
        }
    }

    /// Provider name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LocalFs { .. } => "fs",
            Self::Memory => "memory",
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Allowed MIME types for upload.
    pub allowed_mime_types: Vec<String>,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: Self::default_mime_types(),
        }
    }

    /// Set maximum file size.
    #[must_use]
    pub const fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Receipts and supporting documents.
    #[must_use]
    pub fn default_mime_types() -> Vec<String> {
        [
            "application/pdf",
            "image/png",
            "image/jpeg",
            "image/gif",
            "image/webp",
            "application/vnd.ms-excel",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "text/csv",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Check if a MIME type is allowed.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(mime_type))
    }
}
