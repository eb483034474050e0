//! Document tree to HTML render pipeline for Folio.
//!
//! [`Renderer::render`] takes a stored [`ContentBody`](folio_document::ContentBody)
//! and produces a [`RenderedDocument`]: the HTML, the table of contents, and a
//! manifest of [`Enhancement`]s for the client layer (image zoom, link
//! previews, code windows).
//!
//! # Passes
//!
//! 1. Slug pass: every well-formed heading gets a unique anchor id.
//! 2. Code pass: every code block gets its language (declared or detected)
//!    and verbatim source.
//! 3. Serialization: HTML is emitted node by node. A node that fails is
//!    replaced by a `render-placeholder` element and reported as a
//!    [`RenderWarning`]; the rest of the document renders normally.
//!
//! All passes number nodes identically in pre-order ([`NodeKey`]), which is
//! also the `data-key` attribute tying HTML elements to enhancements.
//!
//! Legacy Markdown bodies are converted with `folio-markdown` first (with
//! math, then without), falling back to escaped source.

mod annotate;
mod document;
mod highlight;
mod html;
mod key;
mod math;
mod renderer;
mod sanitize;
mod slug;

pub use document::{Behavior, Enhancement, RenderWarning, RenderedDocument, TocEntry};
pub use highlight::{ThemeError, highlight_css, theme_names};
pub use key::{NodeKey, TargetId};
pub use renderer::{RenderOptions, Renderer};
pub use sanitize::{
    escape_html, is_external, is_previewable, sanitize_color, sanitize_href, sanitize_src,
};
pub use slug::{SlugRegistry, slugify};
