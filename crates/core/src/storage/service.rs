//! Storage service implementation using Apache OpenDAL.

use opendal::{Operator, services};
use tally_shared::types::TransactionId;
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// A blob written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Storage key, recorded on the owning transaction.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Content type as uploaded.
    pub content_type: String,
}

/// Storage service for transaction attachments.
#[derive(Debug, Clone)]
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?;
                Operator::new(services::Fs::default().root(root))
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
        };
        Ok(operator)
    }

    /// Validate an upload against size and MIME constraints.
    ///
    /// # Errors
    ///
    /// Returns `EmptyFile`, `FileTooLarge` or `InvalidMimeType`.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size == 0 {
            return Err(StorageError::EmptyFile);
        }
        if size > self.config.max_file_size {
            return Err(StorageError::FileTooLarge {
                size,
                max: self.config.max_file_size,
            });
        }
        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::InvalidMimeType {
                mime_type: content_type.to_string(),
            });
        }
        Ok(())
    }

    /// Storage key for an attachment of a transaction.
    ///
    /// Format: `transactions/{transaction_id}/{random}-{sanitized_filename}`
    #[must_use]
    pub fn storage_key(transaction_id: TransactionId, filename: &str) -> String {
        format!(
            "transactions/{transaction_id}/{}-{}",
            Uuid::new_v4().simple(),
            sanitize_filename(filename)
        )
    }

    /// Validates and writes an attachment, returning where it was stored.
    ///
    /// # Errors
    ///
    /// Returns a validation error before anything is written, or
    /// `Operation` if the backend write fails.
    pub async fn store_attachment(
        &self,
        transaction_id: TransactionId,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredFile, StorageError> {
        let size = u64::try_from(data.len()).unwrap_or(u64::MAX);
        self.validate_upload(content_type, size)?;

        let path = Self::storage_key(transaction_id, filename);
        self.operator
            .write_with(&path, data)
            .content_type(content_type)
            .await?;

        Ok(StoredFile {
            path,
            size,
            content_type: content_type.to_string(),
        })
    }

    /// Read a stored file.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the key does not exist.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let buffer = self.operator.read(key).await?;
        Ok(buffer.to_vec())
    }

    /// Delete a file from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if a file exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        self.operator.stat(key).await.is_ok()
    }

    /// Get the storage provider name.
    #[must_use]
    pub const fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }
}

/// Replaces everything outside `[A-Za-z0-9._-]` with `_`.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_sanitized_filename_safe_chars(filename in ".*") {
            let sanitized = sanitize_filename(&filename);
            for c in sanitized.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized filename: {}", c);
            }
        }

        #[test]
        fn prop_file_size_validation(
            max_size in 1u64..10_000_000,
            file_size in 1u64..20_000_000,
        ) {
            let service = StorageService::from_config(
                StorageConfig::new(StorageProvider::Memory).with_max_file_size(max_size),
            )
            .expect("memory backend");
            let result = service.validate_upload("application/pdf", file_size);
            if file_size <= max_size {
                prop_assert!(result.is_ok());
            } else {
                let is_too_large = matches!(result, Err(StorageError::FileTooLarge { .. }));
                prop_assert!(is_too_large);
            }
        }
    }
}
