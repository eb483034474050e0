//! Stable node identity within one rendered document.

use std::fmt;

use folio_document::DocumentNode;
use serde::Serialize;

/// Pre-order index of an element node (the root is `0`).
///
/// Every pass numbers nodes the same way, so annotations computed by one
/// pass can be looked up by the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeKey(pub usize);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of an enhancement target.
///
/// Element nodes use `slot == 0`. Links are marks rather than nodes, so
/// they are addressed by their enclosing node plus a document-wide ordinal
/// starting at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TargetId {
    pub node: NodeKey,
    pub slot: u32,
}

impl TargetId {
    #[must_use]
    pub fn node(key: NodeKey) -> Self {
        Self { node: key, slot: 0 }
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.slot == 0 {
            write!(f, "{}", self.node)
        } else {
            write!(f, "{}.{}", self.node, self.slot)
        }
    }
}

/// Visit every element node in pre-order with its key.
pub(crate) fn preorder<'a>(root: &'a DocumentNode, mut visit: impl FnMut(NodeKey, &'a DocumentNode)) {
    let mut next = 0;
    walk(root, &mut next, &mut visit);
}

fn walk<'a, F>(node: &'a DocumentNode, next: &mut usize, visit: &mut F)
where
    F: FnMut(NodeKey, &'a DocumentNode),
{
    let key = NodeKey(*next);
    *next += 1;
    visit(key, node);
    for child in node.child_nodes() {
        walk(child, next, visit);
    }
}

#[cfg(test)]
mod tests {
    use folio_document::{Content, NodeType};

    use super::*;

    #[test]
    fn test_preorder_numbering() {
        let doc = DocumentNode::doc(vec![
            DocumentNode::blockquote(vec![
                DocumentNode::paragraph(vec![Content::text("a")]).into(),
            ])
            .into(),
            DocumentNode::horizontal_rule().into(),
        ]);
        let mut seen = Vec::new();
        preorder(&doc, |key, node| seen.push((key.0, node.node_type.clone())));
        assert_eq!(
            seen,
            vec![
                (0, NodeType::Doc),
                (1, NodeType::Blockquote),
                (2, NodeType::Paragraph),
                (3, NodeType::HorizontalRule),
            ]
        );
    }

    #[test]
    fn test_target_display() {
        assert_eq!(TargetId::node(NodeKey(4)).to_string(), "4");
        assert_eq!(
            TargetId {
                node: NodeKey(4),
                slot: 2
            }
            .to_string(),
            "4.2"
        );
    }
}
