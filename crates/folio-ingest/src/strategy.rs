//! Tiered parse strategies for pasted Markdown.

use folio_document::{Content, DocumentNode};
use folio_markdown::{ConvertError, MarkdownConverter};

/// Parsed paste content, ready for insertion.
#[derive(Clone, Debug, PartialEq)]
pub enum Fragment {
    /// Top-level blocks.
    Nodes(Vec<DocumentNode>),
    /// Text inserted as-is.
    PlainText(String),
}

impl Fragment {
    fn from_doc(doc: DocumentNode) -> Self {
        let nodes = doc
            .content
            .into_iter()
            .filter_map(|child| match child {
                Content::Node(node) => Some(node),
                Content::Text(_) => None,
            })
            .collect();
        Self::Nodes(nodes)
    }

    /// Number of blocks the fragment inserts.
    #[must_use]
    pub fn block_count(&self) -> usize {
        match self {
            Self::Nodes(nodes) => nodes.len(),
            Self::PlainText(_) => 1,
        }
    }
}

/// A strategy rejected the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{strategy} strategy failed: {source}")]
pub struct ParseFailure {
    pub strategy: &'static str,
    #[source]
    pub source: ConvertError,
}

/// One way of turning pasted text into a [`Fragment`].
pub trait ParseStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(&self, text: &str) -> Result<Fragment, ParseFailure>;
}

fn convert(
    strategy: &'static str,
    converter: &MarkdownConverter,
    text: &str,
) -> Result<Fragment, ParseFailure> {
    converter
        .convert(text)
        .map(Fragment::from_doc)
        .map_err(|source| ParseFailure { strategy, source })
}

/// GFM extensions plus `$...$` / `$$...$$` math.
#[derive(Debug, Clone)]
pub struct MathStrategy {
    converter: MarkdownConverter,
}

impl Default for MathStrategy {
    fn default() -> Self {
        Self {
            converter: MarkdownConverter::new().with_gfm(true).with_math(true),
        }
    }
}

impl ParseStrategy for MathStrategy {
    fn name(&self) -> &'static str {
        "math"
    }

    fn parse(&self, text: &str) -> Result<Fragment, ParseFailure> {
        convert(self.name(), &self.converter, text)
    }
}

/// GFM extensions only; dollar signs stay literal.
#[derive(Debug, Clone)]
pub struct GfmStrategy {
    converter: MarkdownConverter,
}

impl Default for GfmStrategy {
    fn default() -> Self {
        Self {
            converter: MarkdownConverter::new().with_gfm(true).with_math(false),
        }
    }
}

impl ParseStrategy for GfmStrategy {
    fn name(&self) -> &'static str {
        "gfm"
    }

    fn parse(&self, text: &str) -> Result<Fragment, ParseFailure> {
        convert(self.name(), &self.converter, text)
    }
}

/// Verbatim text. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextStrategy;

impl ParseStrategy for PlainTextStrategy {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn parse(&self, text: &str) -> Result<Fragment, ParseFailure> {
        Ok(Fragment::PlainText(text.to_owned()))
    }
}

/// Result of a tiered parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    /// Name of the strategy that produced the fragment.
    pub strategy: &'static str,
    pub fragment: Fragment,
    /// Failures of the strategies tried before it, in order.
    pub failures: Vec<ParseFailure>,
}

/// Tries strategies in order and stops at the first success.
///
/// The plain text strategy always runs last, so [`TieredParser::parse`]
/// cannot fail.
pub struct TieredParser {
    strategies: Vec<Box<dyn ParseStrategy>>,
}

impl Default for TieredParser {
    fn default() -> Self {
        Self::with_strategies(vec![
            Box::new(MathStrategy::default()),
            Box::new(GfmStrategy::default()),
        ])
    }
}

impl std::fmt::Debug for TieredParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredParser")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

impl TieredParser {
    /// Parser over `strategies` followed by plain text.
    #[must_use]
    pub fn with_strategies(strategies: Vec<Box<dyn ParseStrategy>>) -> Self {
        Self { strategies }
    }

    /// Strategy names in the order they are attempted.
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies
            .iter()
            .map(|s| s.name())
            .chain([PlainTextStrategy.name()])
            .collect()
    }

    #[must_use]
    pub fn parse(&self, text: &str) -> ParseOutcome {
        let mut failures = Vec::new();
        for strategy in &self.strategies {
            match strategy.parse(text) {
                Ok(fragment) => {
                    return ParseOutcome {
                        strategy: strategy.name(),
                        fragment,
                        failures,
                    };
                }
                Err(failure) => {
                    tracing::debug!(strategy = failure.strategy, error = %failure.source, "Parse strategy failed");
                    failures.push(failure);
                }
            }
        }
        ParseOutcome {
            strategy: PlainTextStrategy.name(),
            fragment: Fragment::PlainText(text.to_owned()),
            failures,
        }
    }
}
