//! Client enhancement layer for rendered Folio documents.
//!
//! The renderer lists every element that needs client behavior in
//! [`RenderedDocument::enhancements`](folio_renderer::RenderedDocument), each
//! addressed by a [`TargetId`](folio_renderer::TargetId) that also appears in
//! the HTML as `data-key`. [`Enhancer`] tracks an [`ElementState`] per
//! (target, behavior) and processes each entry at most once per mount:
//!
//! - images are attached to a [`ZoomController`] and detached on
//!   [`Enhancer::teardown`]
//! - external anchors mount as [`LinkPreview`]s that fetch lazily on first
//!   hover; results arriving after unmount are dropped via [`MountGuard`]
//! - code blocks become [`CodeWindow`]s whose copy action writes the source
//!   captured at render time
//!
//! No DOM is involved; the page template renders component markup from
//! [`LinkMount::html`] and [`CodeWindow::title_bar_html`].

mod code;
mod enhancer;
mod guard;
mod http;
mod preview;

pub use code::{ClipboardError, ClipboardSink, CodeWindow};
pub use enhancer::{ElementState, EnhanceReport, Enhancer, ZoomController};
pub use guard::MountGuard;
pub use http::HttpPreviewFetcher;
pub use preview::{
    LinkMount, LinkPreview, PreviewData, PreviewFetchError, PreviewFetcher, PreviewRequest,
    PreviewState,
};
