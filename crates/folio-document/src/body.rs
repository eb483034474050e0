//! Stored content bodies.

use serde::{Deserialize, Serialize};

use crate::node::DocumentNode;

/// Body of a content record.
///
/// Current records hold a [`DocumentNode`] tree; legacy records hold raw
/// Markdown. In JSON the two are distinguished by shape (object vs string).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentBody {
    Document(DocumentNode),
    Markdown(String),
}

impl ContentBody {
    /// Whether this is a legacy Markdown body.
    #[must_use]
    pub fn is_markdown(&self) -> bool {
        matches!(self, Self::Markdown(_))
    }
}

impl From<DocumentNode> for ContentBody {
    fn from(node: DocumentNode) -> Self {
        Self::Document(node)
    }
}

impl From<String> for ContentBody {
    fn from(markdown: String) -> Self {
        Self::Markdown(markdown)
    }
}

impl From<&str> for ContentBody {
    fn from(markdown: &str) -> Self {
        Self::Markdown(markdown.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::NodeType;

    #[test]
    fn test_body_shapes() {
        let body: ContentBody = serde_json::from_value(json!("# Legacy")).unwrap();
        assert_eq!(body, ContentBody::Markdown("# Legacy".to_owned()));
        assert!(body.is_markdown());

        let body: ContentBody = serde_json::from_value(json!({"type": "doc"})).unwrap();
        match body {
            ContentBody::Document(node) => assert_eq!(node.node_type, NodeType::Doc),
            ContentBody::Markdown(_) => panic!("expected document body"),
        }
    }
}
