//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::record::{ContentRecord, RecordKey};
use crate::storage::{ErrorStatus, Storage, StorageError, StorageErrorKind};

const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores records in memory. Every `get` is appended to a lookup log so
/// tests can assert the order and number of lookups, and individual keys
/// can be made to fail.
///
/// # Example
///
/// ```ignore
/// use folio_storage::{ContentRecord, MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_record(ContentRecord::new("post", "ko", "Post", "# Post"));
///
/// assert!(storage.get("post", "ko").unwrap().is_some());
/// assert_eq!(storage.lookups().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    records: RwLock<HashMap<RecordKey, ContentRecord>>,
    failures: RwLock<HashMap<RecordKey, StorageErrorKind>>,
    lookups: RwLock<Vec<RecordKey>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_record(self, record: ContentRecord) -> Self {
        self.records.write().unwrap().insert(record.key(), record);
        self
    }

    /// Make lookups of `(slug, locale)` fail with `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, slug: &str, locale: &str, kind: StorageErrorKind) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(RecordKey::new(slug, locale), kind);
        self
    }

    /// Keys passed to `get`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn lookups(&self) -> Vec<RecordKey> {
        self.lookups.read().unwrap().clone()
    }

    /// Clear the lookup log.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_lookups(&self) {
        self.lookups.write().unwrap().clear();
    }

    fn failure(&self, key: &RecordKey) -> Option<StorageError> {
        let kind = *self.failures.read().unwrap().get(key)?;
        let status = match kind {
            StorageErrorKind::Timeout => ErrorStatus::Temporary,
            StorageErrorKind::Unavailable => ErrorStatus::Persistent,
            _ => ErrorStatus::Permanent,
        };
        Some(
            StorageError::new(kind)
                .with_status(status)
                .with_path(key.to_string())
                .with_backend(BACKEND),
        )
    }
}

impl Storage for MockStorage {
    fn get(&self, slug: &str, locale: &str) -> Result<Option<ContentRecord>, StorageError> {
        let key = RecordKey::new(slug, locale);
        self.lookups.write().unwrap().push(key.clone());
        if let Some(err) = self.failure(&key) {
            return Err(err);
        }
        Ok(self.records.read().unwrap().get(&key).cloned())
    }

    fn put(&self, record: &ContentRecord) -> Result<(), StorageError> {
        let key = record.key();
        if let Some(err) = self.failure(&key) {
            return Err(err);
        }
        self.records.write().unwrap().insert(key, record.clone());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<RecordKey>, StorageError> {
        let mut keys: Vec<_> = self.records.read().unwrap().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
