//! Hover link previews.

use std::fmt::Write;

use folio_renderer::{TargetId, escape_html, is_previewable, sanitize_src};
use serde::Deserialize;

use crate::guard::MountGuard;

/// Metadata returned by the preview service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PreviewData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl PreviewData {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.image.is_none()
    }
}

/// Error fetching a preview. Always shown as "preview unavailable".
#[derive(Debug, thiserror::Error)]
pub enum PreviewFetchError {
    #[error("preview request failed")]
    Request(#[from] ureq::Error),
    #[error("preview service returned HTTP {status}")]
    Status { status: u16 },
    #[error("preview service returned no metadata")]
    Empty,
}

/// Fetches preview metadata for a URL.
pub trait PreviewFetcher {
    fn fetch(&self, url: &str) -> Result<PreviewData, PreviewFetchError>;
}

/// Preview lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewState {
    Idle,
    Loading,
    Ready(PreviewData),
    Unavailable,
}

impl PreviewState {
    fn as_attr(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Unavailable => "unavailable",
        }
    }
}

/// A pending fetch issued by [`LinkPreview::hover`].
#[derive(Clone, Debug)]
pub struct PreviewRequest {
    pub target: TargetId,
    pub url: String,
    guard: MountGuard,
}

impl PreviewRequest {
    /// Whether the component that issued this request is still mounted.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.guard.is_mounted()
    }

    pub fn run(&self, fetcher: &dyn PreviewFetcher) -> Result<PreviewData, PreviewFetchError> {
        fetcher.fetch(&self.url)
    }
}

/// Interactive preview mounted in place of an external anchor.
#[derive(Clone, Debug)]
pub struct LinkPreview {
    target: TargetId,
    href: String,
    inner_html: String,
    class: String,
    state: PreviewState,
    guard: MountGuard,
}

impl LinkPreview {
    pub(crate) fn new(
        target: TargetId,
        href: String,
        inner_html: String,
        class: String,
        guard: MountGuard,
    ) -> Self {
        Self {
            target,
            href,
            inner_html,
            class,
            state: PreviewState::Idle,
            guard,
        }
    }

    #[must_use]
    pub fn target(&self) -> TargetId {
        self.target
    }

    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    #[must_use]
    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// Pointer entered the anchor. The first hover starts the fetch; later
    /// hovers return `None`.
    pub fn hover(&mut self) -> Option<PreviewRequest> {
        if self.state != PreviewState::Idle {
            return None;
        }
        self.state = PreviewState::Loading;
        Some(PreviewRequest {
            target: self.target,
            url: self.href.clone(),
            guard: self.guard.clone(),
        })
    }

    /// Apply a fetch result. Returns `false` when the result is stale: the
    /// request was issued by an unmounted view, by another component, or
    /// the preview is no longer loading.
    pub fn complete(
        &mut self,
        request: &PreviewRequest,
        result: Result<PreviewData, PreviewFetchError>,
    ) -> bool {
        if !request.is_live() || request.target != self.target || self.state != PreviewState::Loading
        {
            tracing::debug!(key = %request.target, "Ignored stale preview result");
            return false;
        }
        self.state = match result {
            Ok(data) if !data.is_empty() => PreviewState::Ready(data),
            Ok(_) => PreviewState::Unavailable,
            Err(e) => {
                tracing::debug!(url = %self.href, error = %e, "Preview unavailable");
                PreviewState::Unavailable
            }
        };
        true
    }

    /// Component markup: the original anchor plus a card for the current
    /// state.
    #[must_use]
    pub fn html(&self) -> String {
        let mut out = format!(
            r#"<span class="link-preview" data-key="{}" data-state="{}"><a href="{}" class="{}" rel="noopener noreferrer" target="_blank">{}</a>"#,
            self.target,
            self.state.as_attr(),
            escape_html(&self.href),
            escape_html(&self.class),
            self.inner_html
        );
        match &self.state {
            PreviewState::Idle | PreviewState::Loading => {}
            PreviewState::Ready(data) => {
                out.push_str(r#"<span class="link-preview-card">"#);
                if let Some(src) = data.image.as_deref().and_then(sanitize_src) {
                    let _ = write!(out, r#"<img src="{}" alt="" loading="lazy">"#, escape_html(src));
                }
                if let Some(title) = &data.title {
                    let _ = write!(out, "<strong>{}</strong>", escape_html(title));
                }
                if let Some(description) = &data.description {
                    let _ = write!(out, "<span>{}</span>", escape_html(description));
                }
                out.push_str("</span>");
            }
            PreviewState::Unavailable => out.push_str(
                r#"<span class="link-preview-card link-preview-unavailable">Preview unavailable</span>"#,
            ),
        }
        out.push_str("</span>");
        out
    }
}

/// How an anchor is mounted.
#[derive(Clone, Debug)]
pub enum LinkMount {
    /// External anchor with a hover preview.
    Preview(LinkPreview),
    /// Internal, fragment or non-http(s) anchor, left as authored.
    Plain {
        href: String,
        inner_html: String,
        class: String,
    },
}

impl LinkMount {
    /// Classify an anchor by its href.
    pub fn for_anchor(
        target: TargetId,
        href: &str,
        inner_html: &str,
        class: &str,
        guard: &MountGuard,
    ) -> Self {
        if is_previewable(href) {
            Self::Preview(LinkPreview::new(
                target,
                href.to_owned(),
                inner_html.to_owned(),
                class.to_owned(),
                guard.clone(),
            ))
        } else {
            Self::Plain {
                href: href.to_owned(),
                inner_html: inner_html.to_owned(),
                class: class.to_owned(),
            }
        }
    }

    #[must_use]
    pub fn as_preview(&self) -> Option<&LinkPreview> {
        match self {
            Self::Preview(preview) => Some(preview),
            Self::Plain { .. } => None,
        }
    }

    pub fn as_preview_mut(&mut self) -> Option<&mut LinkPreview> {
        match self {
            Self::Preview(preview) => Some(preview),
            Self::Plain { .. } => None,
        }
    }

    #[must_use]
    pub fn html(&self) -> String {
        match self {
            Self::Preview(preview) => preview.html(),
            Self::Plain {
                href,
                inner_html,
                class,
            } if class.is_empty() => format!(r#"<a href="{}">{inner_html}</a>"#, escape_html(href)),
            Self::Plain {
                href,
                inner_html,
                class,
            } => format!(
                r#"<a href="{}" class="{}">{inner_html}</a>"#,
                escape_html(href),
                escape_html(class)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_renderer::NodeKey;
    use pretty_assertions::assert_eq;

    use super::*;

    fn target() -> TargetId {
        TargetId {
            node: NodeKey(1),
            slot: 1,
        }
    }

    fn preview(guard: &MountGuard) -> LinkPreview {
        LinkPreview::new(
            target(),
            "https://example.com".to_owned(),
            "<strong>Example</strong>".to_owned(),
            "external-link".to_owned(),
            guard.clone(),
        )
    }

    fn data() -> PreviewData {
        PreviewData {
            title: Some("Example".to_owned()),
            description: Some("An example <site>".to_owned()),
            image: Some("javascript:alert(1)".to_owned()),
        }
    }

    #[test]
    fn test_hover_requests_once() {
        let guard = MountGuard::new();
        let mut preview = preview(&guard);

        let request = preview.hover().unwrap();
        assert_eq!(request.url, "https://example.com");
        assert_eq!(preview.state(), &PreviewState::Loading);
        assert!(preview.hover().is_none());

        assert!(preview.complete(&request, Ok(data())));
        assert!(matches!(preview.state(), PreviewState::Ready(_)));
        assert!(preview.hover().is_none());
    }

    #[test]
    fn test_failure_is_unavailable() {
        let guard = MountGuard::new();
        let mut preview = preview(&guard);
        let request = preview.hover().unwrap();

        assert!(preview.complete(&request, Err(PreviewFetchError::Status { status: 502 })));
        assert_eq!(preview.state(), &PreviewState::Unavailable);
        assert!(preview.html().contains("Preview unavailable"));
    }

    #[test]
    fn test_empty_metadata_is_unavailable() {
        let guard = MountGuard::new();
        let mut preview = preview(&guard);
        let request = preview.hover().unwrap();
        assert!(preview.complete(&request, Ok(PreviewData::default())));
        assert_eq!(preview.state(), &PreviewState::Unavailable);
    }

    #[test]
    fn test_result_after_unmount_is_ignored() {
        let guard = MountGuard::new();
        let mut preview = preview(&guard);
        let request = preview.hover().unwrap();

        guard.unmount();

        assert!(!preview.complete(&request, Ok(data())));
        assert_eq!(preview.state(), &PreviewState::Loading);
    }

    #[test]
    fn test_html_preserves_anchor_and_escapes_card() {
        let guard = MountGuard::new();
        let mut preview = preview(&guard);
        assert_eq!(
            preview.html(),
            r#"<span class="link-preview" data-key="1.1" data-state="idle"><a href="https://example.com" class="external-link" rel="noopener noreferrer" target="_blank"><strong>Example</strong></a></span>"#
        );

        let request = preview.hover().unwrap();
        preview.complete(&request, Ok(data()));
        let html = preview.html();
        assert!(html.contains("<strong>Example</strong><span>An example &lt;site&gt;</span>"));
        assert!(!html.contains("javascript"));
    }

    #[test]
    fn test_internal_links_mount_plain() {
        let guard = MountGuard::new();
        let mount = LinkMount::for_anchor(target(), "/about", "About", "", &guard);
        assert!(mount.as_preview().is_none());
        assert_eq!(mount.html(), r#"<a href="/about">About</a>"#);

        let mount = LinkMount::for_anchor(target(), "#intro", "Intro", "toc", &guard);
        assert_eq!(mount.html(), r##"<a href="#intro" class="toc">Intro</a>"##);

        let mount = LinkMount::for_anchor(target(), "https://x.dev", "X", "", &guard);
        assert!(mount.as_preview().is_some());
    }

    #[test]
    fn test_non_http_links_mount_plain() {
        let guard = MountGuard::new();
        let mount = LinkMount::for_anchor(target(), "mailto:me@x.dev", "Mail", "", &guard);
        assert!(mount.as_preview().is_none());
        assert_eq!(mount.html(), r#"<a href="mailto:me@x.dev">Mail</a>"#);

        let mount = LinkMount::for_anchor(target(), "docs/x", "Docs", "", &guard);
        assert!(mount.as_preview().is_none());
    }

    #[test]
    fn test_preview_data_json() {
        let data: PreviewData =
            serde_json::from_value(serde_json::json!({"title": "T", "extra": 1})).unwrap();
        assert_eq!(data.title.as_deref(), Some("T"));
        assert_eq!(data.image, None);
    }
}
