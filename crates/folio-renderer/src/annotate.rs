//! Slug and code passes.
//!
//! Both passes walk the tree in the same pre-order as the serializer and
//! record their results under each node's [`NodeKey`].

use std::collections::{BTreeMap, HashMap, HashSet};

use folio_document::{DocumentNode, NodeError, NodeType};

use crate::highlight::detect_language;
use crate::key::{NodeKey, preorder};
use crate::slug::SlugRegistry;

/// Anchor assigned to a heading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HeadingAnchor {
    pub id: String,
    pub text: String,
    pub depth: u8,
}

/// Language and verbatim source of a code block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CodeInfo {
    pub language: Option<String>,
    pub raw: String,
}

impl CodeInfo {
    pub(crate) fn from_node(node: &DocumentNode) -> Result<Self, NodeError> {
        let raw = node.plain_text();
        let language = match node.code_language()? {
            Some(declared) => Some(declared.to_owned()),
            None => detect_language(&raw),
        };
        Ok(Self { language, raw })
    }
}

/// Assign anchors to every well-formed heading, in traversal order.
///
/// Headings in `skip` get no anchor and reserve no id.
pub(crate) fn slug_pass(
    root: &DocumentNode,
    skip: &HashSet<NodeKey>,
) -> BTreeMap<NodeKey, HeadingAnchor> {
    let mut registry = SlugRegistry::new();
    let mut anchors = BTreeMap::new();
    preorder(root, |key, node| {
        if node.node_type != NodeType::Heading || skip.contains(&key) {
            return;
        }
        let Ok(depth) = node.heading_level() else {
            return;
        };
        let text = node.plain_text().trim().to_owned();
        let id = registry.issue(&text);
        anchors.insert(key, HeadingAnchor { id, text, depth });
    });
    anchors
}

/// Resolve language and raw text for every well-formed code block.
pub(crate) fn code_pass(root: &DocumentNode) -> HashMap<NodeKey, CodeInfo> {
    let mut code = HashMap::new();
    preorder(root, |key, node| {
        if node.node_type == NodeType::CodeBlock
            && let Ok(info) = CodeInfo::from_node(node)
        {
            code.insert(key, info);
        }
    });
    code
}

#[cfg(test)]
mod tests {
    use folio_document::{Content, TextLeaf};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_slug_pass_order_and_dedup() {
        let doc = DocumentNode::doc(vec![
            DocumentNode::heading(1, vec![Content::text("A")]).into(),
            DocumentNode::blockquote(vec![
                DocumentNode::heading(2, vec![Content::text(" A ")]).into(),
            ])
            .into(),
            DocumentNode::heading(7, vec![Content::text("skipped")]).into(),
        ]);
        let anchors = slug_pass(&doc, &HashSet::new());
        let ids: Vec<_> = anchors.iter().map(|(k, a)| (k.0, a.id.as_str(), a.depth)).collect();
        assert_eq!(ids, vec![(1, "a", 1), (3, "a-1", 2)]);
        assert_eq!(anchors[&NodeKey(3)].text, "A");
    }

    #[test]
    fn test_slug_pass_skipped_heading_reserves_nothing() {
        let doc = DocumentNode::doc(vec![
            DocumentNode::heading(2, vec![Content::text("Setup")]).into(),
            DocumentNode::heading(2, vec![Content::text("Setup")]).into(),
        ]);
        let anchors = slug_pass(&doc, &HashSet::from([NodeKey(1)]));
        let ids: Vec<_> = anchors.iter().map(|(k, a)| (k.0, a.id.as_str())).collect();
        assert_eq!(ids, vec![(3, "setup")]);
    }

    #[test]
    fn test_code_pass_keeps_raw_text() {
        let code = DocumentNode::new(
            NodeType::CodeBlock,
            vec![
                TextLeaf::new("let a = 1 < 2;\n").into(),
                TextLeaf::new("let b = \"<b>\";").into(),
            ],
        )
        .with_attr("language", "rust");
        let doc = DocumentNode::doc(vec![code.into()]);

        let info = &code_pass(&doc)[&NodeKey(1)];

        assert_eq!(info.language.as_deref(), Some("rust"));
        assert_eq!(info.raw, "let a = 1 < 2;\nlet b = \"<b>\";");
    }

    #[test]
    fn test_code_pass_detects_language() {
        let doc = DocumentNode::doc(vec![
            DocumentNode::code_block(None, "#!/usr/bin/env python\nprint(1)").into(),
            DocumentNode::code_block(None, "plain").into(),
        ]);
        let code = code_pass(&doc);
        assert_eq!(code[&NodeKey(1)].language.as_deref(), Some("py"));
        assert_eq!(code[&NodeKey(2)].language, None);
    }
}
