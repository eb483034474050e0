//! Content records.

use std::collections::BTreeSet;
use std::fmt;

use folio_document::ContentBody;
use serde::{Deserialize, Serialize};

/// One document in one locale.
///
/// Serialized in camelCase to match the hosted backend's JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    pub slug: String,
    pub locale: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Document tree, or Markdown text for legacy records.
    pub body: ContentBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ContentRecord {
    /// Create a draft record with id `{locale}/{slug}`.
    #[must_use]
    pub fn new(
        slug: impl Into<String>,
        locale: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<ContentBody>,
    ) -> Self {
        let slug = slug.into();
        let locale = locale.into();
        Self {
            id: format!("{locale}/{slug}"),
            slug,
            locale,
            title: title.into(),
            summary: String::new(),
            tags: BTreeSet::new(),
            body: body.into(),
            published_at: None,
            updated_at: String::new(),
            category: None,
        }
    }

    #[must_use]
    pub fn with_published_at(mut self, date: impl Into<String>) -> Self {
        self.published_at = Some(date.into());
        self
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.slug, &self.locale)
    }
}

/// Storage address of a record.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub slug: String,
    pub locale: String,
}

impl RecordKey {
    #[must_use]
    pub fn new(slug: &str, locale: &str) -> Self {
        Self {
            slug: slug.to_owned(),
            locale: locale.to_owned(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.locale, self.slug)
    }
}
