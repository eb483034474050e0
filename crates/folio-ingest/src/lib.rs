//! Paste and drop ingestion for the Folio editor.
//!
//! [`IngestEngine`] turns clipboard and drop payloads into document
//! fragments inserted into an [`EditorSurface`]:
//!
//! 1. A leading clipboard image is uploaded and inserted as an `image` node.
//!    Upload failure shows an inline error and inserts nothing.
//! 2. Otherwise the text (`text/markdown`, then `text/plain`) is sniffed.
//!    Text that does not look like Markdown is left to the default paste.
//! 3. Markdown runs through a [`TieredParser`]: math-aware GFM, then GFM
//!    only, then verbatim text. The first strategy that succeeds wins.
//!
//! Handlers only capture the insertion position; the work runs in
//! [`IngestEngine::flush`].
//!
//! # Example
//!
//! ```
//! use folio_document::NodeType;
//! use folio_ingest::{BlockEditor, ClipboardPayload, ImageFile, IngestEngine};
//!
//! let mut engine = IngestEngine::new(|_: &ImageFile| -> Option<String> { None });
//! let mut editor = BlockEditor::default();
//!
//! assert!(!engine.on_paste(&editor, &ClipboardPayload::plain("hello world")));
//! assert!(engine.on_paste(&editor, &ClipboardPayload::plain("# Title\n\n- a\n- b")));
//! engine.flush(&mut editor);
//!
//! let types: Vec<_> = editor.doc().child_nodes().map(|n| n.node_type.clone()).collect();
//! assert_eq!(types, vec![NodeType::Heading, NodeType::BulletList]);
//! ```

mod editor;
mod engine;
mod payload;
mod sniff;
mod strategy;

pub use editor::{BlockEditor, EditorSurface, ImageUploader};
pub use engine::{IngestEngine, InsertionOutcome, InsertionReport, PendingInsertion};
pub use payload::{ClipboardItem, ClipboardPayload, DropPayload, ImageFile, Point};
pub use sniff::{SniffMode, Trigger, heuristic_triggers, looks_like_markdown};
pub use strategy::{
    Fragment, GfmStrategy, MathStrategy, ParseFailure, ParseOutcome, ParseStrategy,
    PlainTextStrategy, TieredParser,
};
