//! Editor-side collaborators of the ingestion engine.

use folio_document::{Content, DocumentNode, NodeType};

use crate::payload::{ImageFile, Point};

/// Uploads pasted or dropped images.
///
/// Implementations never fail loudly: `None` means the upload did not
/// produce a public URL.
pub trait ImageUploader {
    fn upload(&self, file: &ImageFile) -> Option<String>;
}

impl<F> ImageUploader for F
where
    F: Fn(&ImageFile) -> Option<String>,
{
    fn upload(&self, file: &ImageFile) -> Option<String> {
        self(file)
    }
}

/// The editing surface insertions are applied to.
///
/// Positions are indices between top-level blocks: `0` is before the first
/// block and `block_count()` is after the last.
pub trait EditorSurface {
    /// Current caret position.
    fn caret(&self) -> usize;

    fn block_count(&self) -> usize;

    /// Insert blocks at `at`, which is at most `block_count()`.
    fn insert_nodes(&mut self, at: usize, nodes: Vec<DocumentNode>);

    /// Insert text verbatim at `at`, which is at most `block_count()`.
    fn insert_text(&mut self, at: usize, text: &str);

    /// Position nearest to a viewport coordinate, if it is over the editor.
    fn position_at(&self, point: Point) -> Option<usize>;

    /// Show an inline error message.
    fn show_error(&mut self, message: &str);
}

/// Block-level editor over a `doc` node.
///
/// The caret sits between top-level blocks and moves past inserted
/// content. Drop coordinates map to blocks by a fixed row height.
#[derive(Clone, Debug)]
pub struct BlockEditor {
    doc: DocumentNode,
    caret: usize,
    row_height: u32,
    errors: Vec<String>,
}

impl Default for BlockEditor {
    fn default() -> Self {
        Self::new(DocumentNode::doc(Vec::new()))
    }
}

impl BlockEditor {
    /// Editor over `doc` with the caret at the end.
    ///
    /// A root that is not a `doc` node is wrapped in one.
    #[must_use]
    pub fn new(doc: DocumentNode) -> Self {
        let doc = if doc.node_type == NodeType::Doc {
            doc
        } else {
            DocumentNode::doc(vec![doc.into()])
        };
        let caret = doc.content.len();
        Self {
            doc,
            caret,
            row_height: 24,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_row_height(mut self, row_height: u32) -> Self {
        self.row_height = row_height.max(1);
        self
    }

    /// Move the caret, clamped to the document.
    pub fn set_caret(&mut self, caret: usize) {
        self.caret = caret.min(self.doc.content.len());
    }

    /// Remove the block at `index`, if any.
    pub fn remove_block(&mut self, index: usize) -> Option<Content> {
        if index >= self.doc.content.len() {
            return None;
        }
        let removed = self.doc.content.remove(index);
        if self.caret > index {
            self.caret -= 1;
        }
        Some(removed)
    }

    #[must_use]
    pub fn doc(&self) -> &DocumentNode {
        &self.doc
    }

    #[must_use]
    pub fn into_doc(self) -> DocumentNode {
        self.doc
    }

    /// Error messages shown so far.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn splice(&mut self, at: usize, blocks: Vec<Content>) {
        let at = at.min(self.doc.content.len());
        let count = blocks.len();
        self.doc.content.splice(at..at, blocks);
        if self.caret >= at {
            self.caret += count;
        }
    }
}

impl EditorSurface for BlockEditor {
    fn caret(&self) -> usize {
        self.caret
    }

    fn block_count(&self) -> usize {
        self.doc.content.len()
    }

    fn insert_nodes(&mut self, at: usize, nodes: Vec<DocumentNode>) {
        self.splice(at, nodes.into_iter().map(Content::from).collect());
    }

    /// Text lands in a single paragraph, unchanged.
    fn insert_text(&mut self, at: usize, text: &str) {
        let paragraph = DocumentNode::paragraph(vec![Content::text(text)]);
        self.splice(at, vec![paragraph.into()]);
    }

    fn position_at(&self, point: Point) -> Option<usize> {
        let row = usize::try_from(point.y / self.row_height).ok()?;
        Some(row.min(self.doc.content.len()))
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_owned());
    }
}
