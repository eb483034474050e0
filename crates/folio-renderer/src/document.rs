//! Render output types.

use std::fmt;

use serde::Serialize;

use crate::key::{NodeKey, TargetId};

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Anchor id, unique within the document.
    pub id: String,
    /// Heading plain text.
    pub text: String,
    /// Heading level (1-6).
    pub depth: u8,
}

/// Element the client enhancement layer should process.
///
/// Each entry matches exactly one element in the HTML carrying
/// `data-enhance` and `data-key` attributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Enhancement {
    /// An image to register with the zoom overlay.
    Zoom {
        target: TargetId,
        src: String,
        alt: String,
    },
    /// An external anchor to mount as a hover preview.
    LinkPreview {
        target: TargetId,
        href: String,
        /// Anchor inner markup as rendered.
        inner_html: String,
        /// Anchor class attribute.
        class: String,
    },
    /// A code block to decorate with a window title bar and copy control.
    CodeWindow {
        target: TargetId,
        language: Option<String>,
        /// Source text exactly as authored, without highlighting markup.
        raw: String,
    },
}

/// Enhancement behavior kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Behavior {
    Zoom,
    LinkPreview,
    CodeWindow,
}

impl Behavior {
    /// Value of the `data-enhance` attribute.
    #[must_use]
    pub fn as_attr(self) -> &'static str {
        match self {
            Self::Zoom => "zoom",
            Self::LinkPreview => "link-preview",
            Self::CodeWindow => "code",
        }
    }
}

impl Enhancement {
    #[must_use]
    pub fn target(&self) -> TargetId {
        match self {
            Self::Zoom { target, .. }
            | Self::LinkPreview { target, .. }
            | Self::CodeWindow { target, .. } => *target,
        }
    }

    #[must_use]
    pub fn behavior(&self) -> Behavior {
        match self {
            Self::Zoom { .. } => Behavior::Zoom,
            Self::LinkPreview { .. } => Behavior::LinkPreview,
            Self::CodeWindow { .. } => Behavior::CodeWindow,
        }
    }
}

/// A node that rendered as a placeholder or degraded output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderWarning {
    /// Node position, when the warning concerns one node.
    pub key: Option<NodeKey>,
    pub node_type: String,
    pub message: String,
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key {
            Some(key) => write!(f, "{} #{key}: {}", self.node_type, self.message),
            None => write!(f, "{}: {}", self.node_type, self.message),
        }
    }
}

/// Output of one render. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub enhancements: Vec<Enhancement>,
    pub warnings: Vec<RenderWarning>,
}

impl RenderedDocument {
    /// Enhancements of one behavior, in document order.
    pub fn targets(&self, behavior: Behavior) -> impl Iterator<Item = &Enhancement> {
        self.enhancements
            .iter()
            .filter(move |e| e.behavior() == behavior)
    }
}
