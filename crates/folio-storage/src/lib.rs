//! Content record storage for Folio.
//!
//! This crate provides a [`Storage`] trait for fetching and persisting
//! [`ContentRecord`]s, one per (slug, locale) pair. This enables:
//!
//! - **Unit testing** of the locale resolver and page layer without I/O
//! - **Backend flexibility** (filesystem today, a hosted backend behind the same trait)
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `get()`, `put()`, and `keys()` methods
//! - [`FsStorage`] implementation over `<root>/<locale>/<slug>.{json,md}`
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use folio_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new("content".into());
//! if let Some(record) = storage.get("my-post", "ko")? {
//!     println!("{}: {}", record.slug, record.title);
//! }
//! ```

mod front_matter;
mod fs;
#[cfg(feature = "mock")]
mod mock;
mod record;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use record::{ContentRecord, RecordKey};
pub use storage::{ErrorStatus, Storage, StorageError, StorageErrorKind};
