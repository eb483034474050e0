//! Rendered page views and page errors.

use folio_locale::LocaleMiss;
use folio_renderer::{Enhancement, RenderWarning, RenderedDocument, TocEntry};
use folio_storage::{ContentRecord, RecordKey, StorageError};
use serde::Serialize;

/// A record rendered for one request.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub slug: String,
    /// Locale the reader asked for.
    pub requested_locale: String,
    /// Locale of the record actually served.
    pub locale: String,
    /// Whether `locale` differs from the first locale on the chain.
    pub is_fallback: bool,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    pub updated_at: String,
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub enhancements: Vec<Enhancement>,
    pub warnings: Vec<RenderWarning>,
}

impl PageView {
    pub(crate) fn new(
        record: ContentRecord,
        requested_locale: &str,
        is_fallback: bool,
        rendered: RenderedDocument,
    ) -> Self {
        Self {
            slug: record.slug,
            requested_locale: requested_locale.to_owned(),
            locale: record.locale,
            is_fallback,
            title: record.title,
            summary: record.summary,
            tags: record.tags.into_iter().collect(),
            category: record.category,
            published_at: record.published_at,
            updated_at: record.updated_at,
            html: rendered.html,
            toc: rendered.toc,
            enhancements: rendered.enhancements,
            warnings: rendered.warnings,
        }
    }

    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.slug, &self.locale)
    }
}

/// Error returned when a page cannot be produced.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// No locale on the fallback chain has a record.
    #[error("Page not found: {0}")]
    NotFound(#[from] LocaleMiss),
    /// A listed record could no longer be read.
    #[error("Record {0} disappeared during build")]
    Vanished(RecordKey),
    /// Storage backend failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use folio_locale::Locale;
    use folio_renderer::Renderer;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_page_view_json_shape() {
        let mut record = ContentRecord::new("hello", "ko", "Hello", "# Hi")
            .with_published_at("2024-05-01");
        record.tags.insert("rust".to_owned());
        let rendered = Renderer::default().render(&record.body, "ko");
        let view = PageView::new(record, "ko-KR", true, rendered);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["requestedLocale"], "ko-KR");
        assert_eq!(json["locale"], "ko");
        assert_eq!(json["isFallback"], true);
        assert_eq!(json["publishedAt"], "2024-05-01");
        assert_eq!(json["tags"], serde_json::json!(["rust"]));
        assert!(json.get("category").is_none());
        assert_eq!(view.key(), RecordKey::new("hello", "ko"));
    }

    #[test]
    fn test_not_found_display() {
        let err = PageError::from(LocaleMiss {
            slug: "gone".to_owned(),
            tried: vec![Locale::parse("fr").unwrap(), Locale::parse("ko").unwrap()],
        });
        assert_eq!(err.to_string(), "Page not found: no record for `gone` (tried fr, ko)");
    }
}
