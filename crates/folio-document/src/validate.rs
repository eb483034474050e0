//! Structural invariants of the document tree.

use crate::node::{Content, DocumentNode, NodeType};

/// Kind of structural violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// A block node inside a textblock.
    BlockInTextblock,
    /// A text leaf or inline-only node directly inside a container.
    InlineInContainer,
    /// An atom node with children.
    ContentInAtom,
    /// A code block child that is not an unmarked text leaf.
    MarkedCodeText,
    /// Heading level missing or outside 1..=6.
    InvalidHeadingLevel,
    /// Node type outside the vocabulary.
    UnknownType,
}

/// A single violation, located by child-index path from the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Child indices from root to the offending node.
    pub path: Vec<usize>,
    /// Type tag of the offending node (or its parent for leaf violations).
    pub node_type: String,
    pub kind: ViolationKind,
}

/// Check a tree against the document invariants.
///
/// Returns every violation found; an empty vector means the tree is valid.
/// Nothing here is fatal for rendering, which degrades per node; this is
/// for the editor and for storage-side checks.
#[must_use]
pub fn validate(root: &DocumentNode) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    let mut path = Vec::new();
    check(root, &mut path, &mut violations);
    violations
}

fn report(
    out: &mut Vec<SchemaViolation>,
    path: &[usize],
    node_type: &NodeType,
    kind: ViolationKind,
) {
    out.push(SchemaViolation {
        path: path.to_vec(),
        node_type: node_type.as_str().to_owned(),
        kind,
    });
}

fn check(node: &DocumentNode, path: &mut Vec<usize>, out: &mut Vec<SchemaViolation>) {
    match &node.node_type {
        NodeType::Unknown(_) => report(out, path, &node.node_type, ViolationKind::UnknownType),
        NodeType::Heading if node.heading_level().is_err() => {
            report(out, path, &node.node_type, ViolationKind::InvalidHeadingLevel);
        }
        _ => {}
    }

    let ty = &node.node_type;
    for (i, child) in node.content.iter().enumerate() {
        path.push(i);
        match child {
            Content::Text(leaf) => {
                if ty.is_container() || ty.is_atom() {
                    let kind = if ty.is_atom() {
                        ViolationKind::ContentInAtom
                    } else {
                        ViolationKind::InlineInContainer
                    };
                    report(out, path, ty, kind);
                } else if *ty == NodeType::CodeBlock && !leaf.marks.is_empty() {
                    report(out, path, ty, ViolationKind::MarkedCodeText);
                }
            }
            Content::Node(child_node) => {
                let child_ty = &child_node.node_type;
                if ty.is_atom() {
                    report(out, path, ty, ViolationKind::ContentInAtom);
                } else if *ty == NodeType::CodeBlock {
                    report(out, path, ty, ViolationKind::MarkedCodeText);
                } else if ty.is_textblock() && !child_ty.is_inline() {
                    report(out, path, ty, ViolationKind::BlockInTextblock);
                } else if ty.is_container() && !child_ty.is_block() {
                    report(out, path, ty, ViolationKind::InlineInContainer);
                }
                check(child_node, path, out);
            }
        }
        path.pop();
    }
}
