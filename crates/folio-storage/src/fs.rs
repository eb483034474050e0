//! Filesystem storage backend.
//!
//! Layout: `<root>/<locale>/<slug>.json` for serialized records and
//! `<root>/<locale>/<slug>.md` for legacy Markdown with YAML front matter.
//! When both exist for a key, the JSON record wins.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::front_matter::parse_legacy;
use crate::record::{ContentRecord, RecordKey};
use crate::storage::{Storage, StorageError, StorageErrorKind};

const BACKEND: &str = "Fs";

/// Filesystem-backed content store.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Create storage rooted at `root`. The directory need not exist yet.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reject segments that would escape or restructure the content tree.
    fn validate_segment(segment: &str) -> Result<(), StorageError> {
        let invalid = segment.is_empty()
            || segment.starts_with('.')
            || segment.contains(['/', '\\', '\0']);
        if invalid {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(segment)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    fn record_path(&self, slug: &str, locale: &str, ext: &str) -> Result<PathBuf, StorageError> {
        Self::validate_segment(slug)?;
        Self::validate_segment(locale)?;
        Ok(self.root.join(locale).join(format!("{slug}.{ext}")))
    }

    /// Read a file, mapping "not found" to `None`.
    fn read_optional(path: &Path) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(e, Some(path.to_path_buf())).with_backend(BACKEND)),
        }
    }

    fn io_error(err: std::io::Error, path: &Path) -> StorageError {
        StorageError::io(err, Some(path.to_path_buf())).with_backend(BACKEND)
    }
}

impl Storage for FsStorage {
    fn get(&self, slug: &str, locale: &str) -> Result<Option<ContentRecord>, StorageError> {
        let json_path = self.record_path(slug, locale, "json")?;
        if let Some(text) = Self::read_optional(&json_path)? {
            let record = serde_json::from_str(&text)
                .map_err(|e| StorageError::parse(e, json_path.clone()).with_backend(BACKEND))?;
            return Ok(Some(record));
        }

        let md_path = self.record_path(slug, locale, "md")?;
        Ok(Self::read_optional(&md_path)?.map(|text| parse_legacy(slug, locale, &text)))
    }

    fn put(&self, record: &ContentRecord) -> Result<(), StorageError> {
        let path = self.record_path(&record.slug, &record.locale, "json")?;
        let dir = self.root.join(&record.locale);
        fs::create_dir_all(&dir).map_err(|e| Self::io_error(e, &dir))?;

        let json = serde_json::to_string_pretty(record).map_err(|e| {
            StorageError::new(StorageErrorKind::Other)
                .with_source(e)
                .with_path(&path)
                .with_backend(BACKEND)
        })?;

        // Write-then-rename so readers never observe a partial record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| Self::io_error(e, &tmp))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_error(e, &path))?;
        tracing::debug!(key = %record.key(), "Stored record");
        Ok(())
    }

    fn keys(&self) -> Result<Vec<RecordKey>, StorageError> {
        let locales = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_error(e, &self.root)),
        };

        let mut keys = BTreeSet::new();
        for entry in locales {
            let entry = entry.map_err(|e| Self::io_error(e, &self.root))?;
            let locale_dir = entry.path();
            let locale = entry.file_name().to_string_lossy().into_owned();
            if !locale_dir.is_dir() || Self::validate_segment(&locale).is_err() {
                continue;
            }
            let files = fs::read_dir(&locale_dir).map_err(|e| Self::io_error(e, &locale_dir))?;
            for file in files {
                let path = file.map_err(|e| Self::io_error(e, &locale_dir))?.path();
                let is_record = path
                    .extension()
                    .is_some_and(|ext| ext == "json" || ext == "md");
                let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if is_record && path.is_file() && Self::validate_segment(slug).is_ok() {
                    keys.insert(RecordKey::new(slug, &locale));
                }
            }
        }
        Ok(keys.into_iter().collect())
    }
}
