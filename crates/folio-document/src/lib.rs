//! Canonical rich-text document tree for Folio.
//!
//! This crate provides the [`DocumentNode`] tree that the editor produces and
//! the renderer consumes. The JSON shape follows the `ProseMirror` convention:
//!
//! ```json
//! {"type": "heading", "attrs": {"level": 2}, "content": [
//!     {"type": "text", "text": "Install", "marks": [{"type": "bold"}]}
//! ]}
//! ```
//!
//! # Leniency
//!
//! Node and mark tags outside the known vocabulary deserialize as
//! [`NodeType::Unknown`] / [`MarkType::Unknown`], and attributes are kept as an
//! open JSON map. Typed accessors such as [`DocumentNode::heading_level`]
//! validate attributes on demand and return [`NodeError`], so one malformed
//! node never prevents the rest of a stored document from loading.
//!
//! # Example
//!
//! ```
//! use folio_document::{Content, DocumentNode};
//!
//! let doc = DocumentNode::doc(vec![
//!     DocumentNode::heading(1, vec![Content::text("Hello")]).into(),
//!     DocumentNode::paragraph(vec![Content::text("World")]).into(),
//! ]);
//! assert_eq!(doc.plain_text(), "Hello\nWorld");
//! assert!(folio_document::validate(&doc).is_empty());
//! ```

mod body;
mod mark;
mod node;
mod validate;

pub use body::ContentBody;
pub use mark::{Mark, MarkType};
pub use node::{Alignment, Attrs, Content, DocumentNode, NodeError, NodeType, TextLeaf};
pub use validate::{SchemaViolation, ViolationKind, validate};
