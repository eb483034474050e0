//! Markdown converter configuration and entry point.

use folio_document::DocumentNode;
use pulldown_cmark::{Options, Parser};

use crate::builder::TreeBuilder;

/// Default nesting limit for converted trees.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Reasons a conversion is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    /// A math span whose LaTeX does not parse.
    #[error("invalid math `{latex}`: {message}")]
    Math { latex: String, message: String },
    /// A control character the document model cannot represent.
    #[error("unsupported character {ch:?} at byte {offset}")]
    UnsupportedCharacter { offset: usize, ch: char },
    /// Nesting deeper than the configured limit.
    #[error("nesting depth {depth} exceeds limit of {limit}")]
    TooDeep { depth: usize, limit: usize },
    /// Non-blank input that produced no blocks.
    #[error("markdown produced no content")]
    Empty,
}

/// Markdown to [`DocumentNode`] converter.
///
/// Defaults: GFM on (tables, strikethrough, task lists, footnotes), math off,
/// nesting limit [`DEFAULT_MAX_DEPTH`].
#[derive(Clone, Debug)]
pub struct MarkdownConverter {
    gfm: bool,
    math: bool,
    max_depth: usize,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            gfm: true,
            math: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Enable or disable GitHub Flavored Markdown extensions.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Enable or disable `$...$` and `$$...$$` math.
    ///
    /// With math enabled every math span is validated and any parse error
    /// fails the whole conversion.
    #[must_use]
    pub fn with_math(mut self, enabled: bool) -> Self {
        self.math = enabled;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Get parser options for the current configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        };
        if self.math {
            options |= Options::ENABLE_MATH;
        }
        options
    }

    /// Convert Markdown text into a `doc` node.
    ///
    /// Blank input yields an empty document.
    pub fn convert(&self, markdown: &str) -> Result<DocumentNode, ConvertError> {
        if let Some((offset, ch)) = markdown
            .char_indices()
            .find(|&(_, c)| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        {
            return Err(ConvertError::UnsupportedCharacter { offset, ch });
        }

        let parser = Parser::new_ext(markdown, self.parser_options());
        let doc = TreeBuilder::new(self.max_depth).build(parser)?;

        if doc.content.is_empty() && !markdown.trim().is_empty() {
            return Err(ConvertError::Empty);
        }
        Ok(doc)
    }
}
