//! Paste and drop handling.

use std::collections::VecDeque;

use folio_document::DocumentNode;

use crate::editor::{EditorSurface, ImageUploader};
use crate::payload::{ClipboardPayload, DropPayload, ImageFile};
use crate::sniff::{SniffMode, looks_like_markdown};
use crate::strategy::{Fragment, TieredParser};

/// Work captured by an event handler and applied by [`IngestEngine::flush`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingInsertion {
    /// Pasted Markdown to parse.
    Parse { text: String, at: usize },
    /// An image to upload.
    Image { file: ImageFile, at: usize },
}

impl PendingInsertion {
    /// Position captured when the event was handled.
    #[must_use]
    pub fn position(&self) -> usize {
        match self {
            Self::Parse { at, .. } | Self::Image { at, .. } => *at,
        }
    }
}

/// What a flushed insertion did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InsertionOutcome {
    /// Parsed content was inserted by the named strategy.
    Parsed {
        strategy: &'static str,
        blocks: usize,
    },
    /// An uploaded image was inserted.
    Image { src: String },
    /// The upload failed; nothing was inserted.
    UploadFailed { name: String },
}

/// Report of one flushed insertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertionReport {
    /// Position captured at event time.
    pub requested_at: usize,
    /// Position actually used, clamped to the document at flush time.
    pub at: usize,
    pub outcome: InsertionOutcome,
}

impl InsertionReport {
    #[must_use]
    pub fn inserted(&self) -> bool {
        !matches!(self.outcome, InsertionOutcome::UploadFailed { .. })
    }
}

/// Converts paste and drop events into editor insertions.
///
/// Event handlers run synchronously: they decide whether the event is
/// handled and capture the insertion position. Parsing and uploads happen
/// later in [`flush`](Self::flush), at the captured position even if the
/// caret has moved since.
pub struct IngestEngine {
    uploader: Box<dyn ImageUploader>,
    parser: TieredParser,
    sniff: SniffMode,
    queue: VecDeque<PendingInsertion>,
}

impl std::fmt::Debug for IngestEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestEngine")
            .field("parser", &self.parser)
            .field("sniff", &self.sniff)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl IngestEngine {
    pub fn new(uploader: impl ImageUploader + 'static) -> Self {
        Self {
            uploader: Box::new(uploader),
            parser: TieredParser::default(),
            sniff: SniffMode::default(),
            queue: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn with_sniff_mode(mut self, mode: SniffMode) -> Self {
        self.sniff = mode;
        self
    }

    #[must_use]
    pub fn with_parser(mut self, parser: TieredParser) -> Self {
        self.parser = parser;
        self
    }

    /// Queued insertions, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &PendingInsertion> {
        self.queue.iter()
    }

    /// Handle a paste. Returns `false` when the default paste should run.
    ///
    /// A leading image is always handled and never reaches text handling.
    /// Text is handled only when it sniffs as Markdown.
    pub fn on_paste(&mut self, editor: &dyn EditorSurface, payload: &ClipboardPayload) -> bool {
        let at = editor.caret();
        if let Some(file) = payload.leading_image() {
            tracing::debug!(name = %file.name, at, "Queued pasted image");
            self.queue.push_back(PendingInsertion::Image {
                file: file.clone(),
                at,
            });
            return true;
        }

        let Some(text) = payload.text() else {
            return false;
        };
        if !looks_like_markdown(text, self.sniff) {
            return false;
        }
        tracing::debug!(len = text.len(), at, "Queued markdown paste");
        self.queue.push_back(PendingInsertion::Parse {
            text: text.to_owned(),
            at,
        });
        true
    }

    /// Handle a drop. Image files are queued at the drop position, or at
    /// the caret when the point is outside the editor.
    pub fn on_drop(&mut self, editor: &dyn EditorSurface, payload: &DropPayload) -> bool {
        let at = editor
            .position_at(payload.point)
            .unwrap_or_else(|| editor.caret());
        let mut handled = false;
        for file in payload.images() {
            self.queue.push_back(PendingInsertion::Image {
                file: file.clone(),
                at,
            });
            handled = true;
        }
        handled
    }

    /// Apply queued insertions in order.
    pub fn flush(&mut self, editor: &mut dyn EditorSurface) -> Vec<InsertionReport> {
        let mut reports = Vec::with_capacity(self.queue.len());
        // Several images dropped at one point land in drop order.
        let mut shift: Option<(usize, usize)> = None;
        while let Some(job) = self.queue.pop_front() {
            let requested_at = job.position();
            let base = match shift {
                Some((origin, offset)) if origin == requested_at => requested_at + offset,
                _ => requested_at,
            };
            let at = base.min(editor.block_count());
            if at != base {
                tracing::debug!(requested_at, at, "Clamped stale insertion position");
            }

            let outcome = match job {
                PendingInsertion::Parse { text, .. } => self.insert_parsed(editor, at, &text),
                PendingInsertion::Image { file, .. } => self.insert_image(editor, at, &file),
            };
            let inserted = match &outcome {
                InsertionOutcome::Parsed { blocks, .. } => *blocks,
                InsertionOutcome::Image { .. } => 1,
                InsertionOutcome::UploadFailed { .. } => 0,
            };
            shift = match shift {
                Some((origin, offset)) if origin == requested_at => {
                    Some((origin, offset + inserted))
                }
                _ => Some((requested_at, inserted)),
            };

            reports.push(InsertionReport {
                requested_at,
                at,
                outcome,
            });
        }
        reports
    }

    fn insert_parsed(
        &self,
        editor: &mut dyn EditorSurface,
        at: usize,
        text: &str,
    ) -> InsertionOutcome {
        let outcome = self.parser.parse(text);
        let blocks = outcome.fragment.block_count();
        match outcome.fragment {
            Fragment::Nodes(nodes) => editor.insert_nodes(at, nodes),
            Fragment::PlainText(text) => editor.insert_text(at, &text),
        }
        InsertionOutcome::Parsed {
            strategy: outcome.strategy,
            blocks,
        }
    }

    fn insert_image(
        &self,
        editor: &mut dyn EditorSurface,
        at: usize,
        file: &ImageFile,
    ) -> InsertionOutcome {
        match self.uploader.upload(file) {
            Some(src) => {
                editor.insert_nodes(at, vec![DocumentNode::image(src.clone(), file.name.clone())]);
                InsertionOutcome::Image { src }
            }
            None => {
                tracing::warn!(name = %file.name, "Image upload failed");
                editor.show_error(&format!("Could not upload {}", file.name));
                InsertionOutcome::UploadFailed {
                    name: file.name.clone(),
                }
            }
        }
    }
}
