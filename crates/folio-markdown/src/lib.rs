//! Markdown to document tree conversion.
//!
//! [`MarkdownConverter`] turns Markdown text into a [`DocumentNode`] tree using
//! `pulldown-cmark`. It is shared by two callers:
//!
//! - the ingestion engine, which converts pasted text into editor fragments
//! - the render pipeline, which converts legacy Markdown bodies before rendering
//!
//! Conversion is strict where the output would silently lose content: invalid
//! LaTeX (when math is enabled), control characters, runaway nesting, and
//! non-blank input that yields no blocks all return [`ConvertError`]. Callers
//! decide how to fall back.
//!
//! # Example
//!
//! ```
//! use folio_document::NodeType;
//! use folio_markdown::MarkdownConverter;
//!
//! let doc = MarkdownConverter::new().convert("# Title\n\n- a\n- b").unwrap();
//! let types: Vec<_> = doc.child_nodes().map(|n| n.node_type.clone()).collect();
//! assert_eq!(types, vec![NodeType::Heading, NodeType::BulletList]);
//! ```
//!
//! [`DocumentNode`]: folio_document::DocumentNode

mod builder;
mod converter;
mod front_matter;
mod math;

pub use converter::{ConvertError, DEFAULT_MAX_DEPTH, MarkdownConverter};
pub use front_matter::split_front_matter;
pub use math::check_latex;
