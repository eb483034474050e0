//! Page layer over storage, locale resolution and rendering.

use std::sync::Arc;

use folio_locale::{FallbackPolicy, LocaleResolver};
use folio_renderer::{RenderOptions, Renderer, ThemeError, TocEntry};
use folio_storage::{ContentRecord, RecordKey, Storage};
use rayon::prelude::*;

use crate::page::{PageError, PageView};

/// One entry of a full build.
#[derive(Debug)]
pub struct BuiltPage {
    pub key: RecordKey,
    pub result: Result<PageView, PageError>,
}

/// Outcome of [`Site::build`].
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Published pages, sorted by key.
    pub pages: Vec<BuiltPage>,
    /// Unpublished records left out of the build.
    pub drafts: Vec<RecordKey>,
}

impl BuildReport {
    /// Pages that failed to render.
    pub fn failures(&self) -> impl Iterator<Item = (&RecordKey, &PageError)> {
        self.pages
            .iter()
            .filter_map(|page| page.result.as_ref().err().map(|e| (&page.key, e)))
    }
}

/// Resolves and renders pages.
///
/// A `Site` holds no per-request state; [`render_page`](Self::render_page)
/// takes `&self` and pages render in parallel during builds.
pub struct Site {
    storage: Arc<dyn Storage>,
    resolver: LocaleResolver,
    renderer: Renderer,
}

impl Site {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, policy: FallbackPolicy, options: RenderOptions) -> Self {
        Self {
            resolver: LocaleResolver::new(Arc::clone(&storage), policy),
            storage,
            renderer: Renderer::new(options),
        }
    }

    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Resolve `slug` for `locale` along the fallback chain and render it.
    ///
    /// # Errors
    ///
    /// Returns `PageError::NotFound` if no locale on the chain has a record.
    pub fn render_page(&self, slug: &str, locale: &str) -> Result<PageView, PageError> {
        let resolution = self.resolver.resolve_detailed(slug, locale)?;
        let is_fallback = resolution.is_fallback();
        Ok(self.render_record(resolution.record, locale, is_fallback))
    }

    /// Table of contents of the page served for `slug` in `locale`.
    ///
    /// # Errors
    ///
    /// Returns `PageError::NotFound` if no locale on the chain has a record.
    pub fn toc(&self, slug: &str, locale: &str) -> Result<Vec<TocEntry>, PageError> {
        self.render_page(slug, locale).map(|page| page.toc)
    }

    /// Render several requests in parallel, preserving input order.
    pub fn render_many(&self, requests: &[(String, String)]) -> Vec<Result<PageView, PageError>> {
        requests
            .par_iter()
            .map(|(slug, locale)| self.render_page(slug, locale))
            .collect()
    }

    /// Render every published record in storage.
    ///
    /// Each stored (slug, locale) is rendered exactly as stored, without
    /// fallback. Per-page failures are reported in the result and do not
    /// stop the build.
    ///
    /// # Errors
    ///
    /// Returns `PageError::Storage` if the stored keys cannot be listed.
    pub fn build(&self) -> Result<BuildReport, PageError> {
        let keys = self.storage.keys()?;
        tracing::info!(records = keys.len(), "Building site");

        let loaded: Vec<(RecordKey, Result<ContentRecord, PageError>)> = keys
            .into_par_iter()
            .map(|key| {
                let record = self.load(&key);
                (key, record)
            })
            .collect();

        let mut report = BuildReport::default();
        let mut published = Vec::with_capacity(loaded.len());
        for (key, record) in loaded {
            match record {
                Ok(record) if !record.is_published() => report.drafts.push(key),
                other => published.push((key, other)),
            }
        }

        report.pages = published
            .into_par_iter()
            .map(|(key, record)| {
                let result = record.map(|record| {
                    let locale = record.locale.clone();
                    self.render_record(record, &locale, false)
                });
                BuiltPage { key, result }
            })
            .collect();

        for (key, error) in report.failures() {
            tracing::warn!(key = %key, error = %error, "Page failed to build");
        }
        tracing::info!(
            pages = report.pages.len(),
            drafts = report.drafts.len(),
            "Site built"
        );
        Ok(report)
    }

    /// Highlight stylesheet for the configured theme.
    ///
    /// # Errors
    ///
    /// Returns `ThemeError` if the theme is not bundled.
    pub fn css(&self) -> Result<String, ThemeError> {
        self.renderer.css()
    }

    fn load(&self, key: &RecordKey) -> Result<ContentRecord, PageError> {
        self.storage
            .get(&key.slug, &key.locale)?
            .ok_or_else(|| PageError::Vanished(key.clone()))
    }

    fn render_record(&self, record: ContentRecord, requested: &str, is_fallback: bool) -> PageView {
        let rendered = self.renderer.render(&record.body, &record.locale);
        for warning in &rendered.warnings {
            tracing::debug!(slug = %record.slug, locale = %record.locale, warning = %warning, "Render warning");
        }
        PageView::new(record, requested, is_fallback, rendered)
    }
}

#[cfg(test)]
mod tests {
    use folio_document::{Content, DocumentNode};
    use folio_locale::Locale;
    use folio_storage::{FsStorage, MockStorage, StorageErrorKind};
    use pretty_assertions::assert_eq;

    use super::*;

    fn policy() -> FallbackPolicy {
        FallbackPolicy::new(Locale::parse("ko").unwrap())
    }

    fn heading_doc(text: &str) -> DocumentNode {
        DocumentNode::doc(vec![
            DocumentNode::heading(2, vec![Content::text(text)]).into(),
            DocumentNode::paragraph(vec![Content::text("body")]).into(),
        ])
    }

    fn storage() -> Arc<MockStorage> {
        Arc::new(
            MockStorage::new()
                .with_record(
                    ContentRecord::new("post", "ko", "글", heading_doc("소개"))
                        .with_published_at("2024-01-01"),
                )
                .with_record(
                    ContentRecord::new("post", "en", "Post", heading_doc("Intro"))
                        .with_published_at("2024-01-02"),
                )
                .with_record(ContentRecord::new("draft", "ko", "Draft", "# Draft")),
        )
    }

    fn site(storage: &Arc<MockStorage>) -> Site {
        let storage: Arc<dyn Storage> = Arc::clone(storage) as Arc<dyn Storage>;
        Site::new(storage, policy(), RenderOptions::default())
    }

    #[test]
    fn test_render_page_exact_locale() {
        let storage = storage();
        let page = site(&storage).render_page("post", "en").unwrap();
        assert_eq!(page.locale, "en");
        assert!(!page.is_fallback);
        assert_eq!(page.title, "Post");
        assert!(page.html.starts_with(r#"<div class="folio-content" lang="en">"#));
        assert_eq!(page.toc[0].id, "intro");
    }

    #[test]
    fn test_render_page_falls_back_to_canonical() {
        let storage = storage();
        let page = site(&storage).render_page("post", "fr").unwrap();
        assert_eq!(page.requested_locale, "fr");
        assert_eq!(page.locale, "ko");
        assert!(page.is_fallback);
        assert!(page.html.contains(r#"lang="ko""#));
        assert_eq!(page.toc[0].id, "소개");
    }

    #[test]
    fn test_render_page_not_found() {
        let storage = storage();
        let err = site(&storage).render_page("missing", "en").unwrap_err();
        let PageError::NotFound(miss) = err else {
            panic!("expected NotFound, got {err:?}");
        };
        assert_eq!(miss.slug, "missing");
        assert_eq!(miss.tried.len(), 2);
    }

    #[test]
    fn test_toc() {
        let storage = storage();
        let toc = site(&storage).toc("post", "en").unwrap();
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].text, "Intro");
    }

    #[test]
    fn test_render_many_preserves_order() {
        let storage = storage();
        let requests = vec![
            ("post".to_owned(), "ko".to_owned()),
            ("missing".to_owned(), "ko".to_owned()),
            ("post".to_owned(), "en".to_owned()),
        ];
        let results = site(&storage).render_many(&requests);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().title, "글");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().title, "Post");
    }

    #[test]
    fn test_parallel_render_matches_sequential() {
        let storage = storage();
        let site = site(&storage);
        let requests: Vec<(String, String)> = (0..16)
            .map(|i| ("post".to_owned(), if i % 2 == 0 { "ko" } else { "en" }.to_owned()))
            .collect();
        let parallel = site.render_many(&requests);
        for ((slug, locale), result) in requests.iter().zip(parallel) {
            assert_eq!(result.unwrap(), site.render_page(slug, locale).unwrap());
        }
    }

    #[test]
    fn test_build_skips_drafts() {
        let storage = storage();
        let report = site(&storage).build().unwrap();

        let keys: Vec<String> = report.pages.iter().map(|p| p.key.to_string()).collect();
        assert_eq!(keys, ["en/post", "ko/post"]);
        assert_eq!(report.drafts, vec![RecordKey::new("draft", "ko")]);
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn test_build_reports_per_page_failures() {
        let storage = Arc::new(
            MockStorage::new()
                .with_record(ContentRecord::new("a", "ko", "A", "# A").with_published_at("2024"))
                .with_record(ContentRecord::new("b", "ko", "B", "# B").with_published_at("2024"))
                .with_failure("b", "ko", StorageErrorKind::Unavailable),
        );
        let report = site(&storage).build().unwrap();

        assert_eq!(report.pages.len(), 2);
        let failures: Vec<String> = report.failures().map(|(key, _)| key.to_string()).collect();
        assert_eq!(failures, ["ko/b"]);
        assert!(report.pages[0].result.is_ok());
    }

    #[test]
    fn test_build_from_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("ko")).unwrap();
        std::fs::write(
            dir.path().join("ko/hello.md"),
            "---\ntitle: 안녕\ndate: 2024-03-01\n---\n## 첫 글\n\n본문",
        )
        .unwrap();

        let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(dir.path().to_path_buf()));
        let site = Site::new(storage, policy(), RenderOptions::default());
        let report = site.build().unwrap();

        assert_eq!(report.pages.len(), 1);
        let page = report.pages[0].result.as_ref().unwrap();
        assert_eq!(page.title, "안녕");
        assert_eq!(page.toc[0].id, "첫-글");
    }

    #[test]
    fn test_site_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Site>();
    }
}
