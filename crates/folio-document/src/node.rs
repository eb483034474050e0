//! Document tree nodes and typed attribute access.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::mark::Mark;

/// Open attribute set carried by every element node.
pub type Attrs = serde_json::Map<String, Value>;

/// Node type tag.
///
/// The vocabulary is fixed, but unknown tags are preserved as
/// [`NodeType::Unknown`] so that stored documents written by a newer editor
/// still load.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    CodeBlock,
    Image,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    BulletList,
    OrderedList,
    ListItem,
    TaskList,
    TaskItem,
    Blockquote,
    MathBlock,
    InlineMath,
    HorizontalRule,
    HardBreak,
    Unknown(String),
}

impl NodeType {
    /// Parse a tag name. Never fails; unrecognized names become `Unknown`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "doc" => Self::Doc,
            "paragraph" => Self::Paragraph,
            "heading" => Self::Heading,
            "codeBlock" => Self::CodeBlock,
            "image" => Self::Image,
            "table" => Self::Table,
            "tableRow" => Self::TableRow,
            "tableCell" => Self::TableCell,
            "tableHeader" => Self::TableHeader,
            "bulletList" => Self::BulletList,
            "orderedList" => Self::OrderedList,
            "listItem" => Self::ListItem,
            "taskList" => Self::TaskList,
            "taskItem" => Self::TaskItem,
            "blockquote" => Self::Blockquote,
            "mathBlock" | "blockMath" => Self::MathBlock,
            "inlineMath" => Self::InlineMath,
            "horizontalRule" => Self::HorizontalRule,
            "hardBreak" => Self::HardBreak,
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// Tag name as stored in JSON.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Doc => "doc",
            Self::Paragraph => "paragraph",
            Self::Heading => "heading",
            Self::CodeBlock => "codeBlock",
            Self::Image => "image",
            Self::Table => "table",
            Self::TableRow => "tableRow",
            Self::TableCell => "tableCell",
            Self::TableHeader => "tableHeader",
            Self::BulletList => "bulletList",
            Self::OrderedList => "orderedList",
            Self::ListItem => "listItem",
            Self::TaskList => "taskList",
            Self::TaskItem => "taskItem",
            Self::Blockquote => "blockquote",
            Self::MathBlock => "mathBlock",
            Self::InlineMath => "inlineMath",
            Self::HorizontalRule => "horizontalRule",
            Self::HardBreak => "hardBreak",
            Self::Unknown(name) => name,
        }
    }

    /// Nodes whose children are block nodes.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Doc
                | Self::Blockquote
                | Self::ListItem
                | Self::TaskItem
                | Self::TableCell
                | Self::TableHeader
                | Self::BulletList
                | Self::OrderedList
                | Self::TaskList
                | Self::Table
                | Self::TableRow
        )
    }

    /// Nodes whose children are text leaves and inline atoms.
    #[must_use]
    pub fn is_textblock(&self) -> bool {
        matches!(self, Self::Paragraph | Self::Heading | Self::CodeBlock)
    }

    /// Nodes that never have children.
    #[must_use]
    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            Self::Image | Self::MathBlock | Self::InlineMath | Self::HorizontalRule | Self::HardBreak
        )
    }

    /// Nodes allowed inside a textblock.
    ///
    /// Images are both: they appear inline in Markdown-derived paragraphs and
    /// as standalone blocks when inserted by upload.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Image | Self::InlineMath | Self::HardBreak)
    }

    /// Nodes allowed as children of a container.
    #[must_use]
    pub fn is_block(&self) -> bool {
        !matches!(self, Self::InlineMath | Self::HardBreak | Self::Doc)
    }
}

impl Serialize for NodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// Error reading a node's attributes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    /// A required attribute is absent.
    #[error("{node} node is missing attribute `{attr}`")]
    MissingAttr {
        /// Node tag name.
        node: String,
        /// Attribute name.
        attr: &'static str,
    },
    /// An attribute is present with the wrong type or an out-of-range value.
    #[error("{node} node has invalid `{attr}`: {reason}")]
    InvalidAttr {
        /// Node tag name.
        node: String,
        /// Attribute name.
        attr: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// The node type is outside the known vocabulary.
    #[error("unknown node type `{0}`")]
    UnknownType(String),
    /// The mark type is outside the known vocabulary.
    #[error("unknown mark type `{0}`")]
    UnknownMark(String),
}

/// Table cell alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Attribute value as stored in JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
enum TextTag {
    #[default]
    #[serde(rename = "text")]
    Text,
}

/// Leaf carrying text and a set of inline marks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextLeaf {
    #[serde(rename = "type")]
    tag: TextTag,
    /// Text content.
    pub text: String,
    /// Marks in application order (outermost first).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl TextLeaf {
    /// Create an unmarked leaf.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            tag: TextTag::Text,
            text: text.into(),
            marks: Vec::new(),
        }
    }

    /// Add a mark, ignoring duplicates of the same mark.
    #[must_use]
    pub fn with_mark(mut self, mark: Mark) -> Self {
        if !self.marks.contains(&mark) {
            self.marks.push(mark);
        }
        self
    }

    /// Replace the mark set.
    #[must_use]
    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }
}

/// Child of an element node: either a text leaf or another element.
///
/// Deserialization tries [`TextLeaf`] first, which only matches objects tagged
/// `"type": "text"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(TextLeaf),
    Node(DocumentNode),
}

impl Content {
    /// Shorthand for an unmarked text leaf.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextLeaf::new(text))
    }

    /// Element node, if this is one.
    #[must_use]
    pub fn as_node(&self) -> Option<&DocumentNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Text(_) => None,
        }
    }

    /// Text leaf, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&TextLeaf> {
        match self {
            Self::Text(leaf) => Some(leaf),
            Self::Node(_) => None,
        }
    }
}

impl From<TextLeaf> for Content {
    fn from(leaf: TextLeaf) -> Self {
        Self::Text(leaf)
    }
}

impl From<DocumentNode> for Content {
    fn from(node: DocumentNode) -> Self {
        Self::Node(node)
    }
}

/// Element node of the document tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Node type tag.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Attribute set (level, language, src, ...).
    #[serde(
        default,
        deserialize_with = "nullable_attrs",
        skip_serializing_if = "Attrs::is_empty"
    )]
    pub attrs: Attrs,
    /// Ordered children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Content>,
}

/// `"attrs": null` is common in editor output and means "no attributes".
fn nullable_attrs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Attrs, D::Error> {
    Ok(Option::<Attrs>::deserialize(deserializer)?.unwrap_or_default())
}

impl DocumentNode {
    /// Create a node with no attributes.
    #[must_use]
    pub fn new(node_type: NodeType, content: Vec<Content>) -> Self {
        Self {
            node_type,
            attrs: Attrs::new(),
            content,
        }
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn doc(content: Vec<Content>) -> Self {
        Self::new(NodeType::Doc, content)
    }

    #[must_use]
    pub fn paragraph(content: Vec<Content>) -> Self {
        Self::new(NodeType::Paragraph, content)
    }

    #[must_use]
    pub fn heading(level: u8, content: Vec<Content>) -> Self {
        Self::new(NodeType::Heading, content).with_attr("level", level)
    }

    /// Code block holding `text` verbatim as a single unmarked leaf.
    #[must_use]
    pub fn code_block(language: Option<&str>, text: impl Into<String>) -> Self {
        let text = text.into();
        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![Content::text(text)]
        };
        let node = Self::new(NodeType::CodeBlock, content);
        match language {
            Some(lang) => node.with_attr("language", lang),
            None => node,
        }
    }

    #[must_use]
    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::new(NodeType::Image, Vec::new())
            .with_attr("src", src.into())
            .with_attr("alt", alt.into())
    }

    #[must_use]
    pub fn blockquote(content: Vec<Content>) -> Self {
        Self::new(NodeType::Blockquote, content)
    }

    #[must_use]
    pub fn bullet_list(items: Vec<Content>) -> Self {
        Self::new(NodeType::BulletList, items)
    }

    #[must_use]
    pub fn ordered_list(start: u64, items: Vec<Content>) -> Self {
        Self::new(NodeType::OrderedList, items).with_attr("start", start)
    }

    #[must_use]
    pub fn list_item(content: Vec<Content>) -> Self {
        Self::new(NodeType::ListItem, content)
    }

    #[must_use]
    pub fn task_list(items: Vec<Content>) -> Self {
        Self::new(NodeType::TaskList, items)
    }

    #[must_use]
    pub fn task_item(checked: bool, content: Vec<Content>) -> Self {
        Self::new(NodeType::TaskItem, content).with_attr("checked", checked)
    }

    #[must_use]
    pub fn table(rows: Vec<Content>) -> Self {
        Self::new(NodeType::Table, rows)
    }

    #[must_use]
    pub fn table_row(cells: Vec<Content>) -> Self {
        Self::new(NodeType::TableRow, cells)
    }

    #[must_use]
    pub fn table_cell(content: Vec<Content>) -> Self {
        Self::new(NodeType::TableCell, content)
    }

    #[must_use]
    pub fn table_header(content: Vec<Content>) -> Self {
        Self::new(NodeType::TableHeader, content)
    }

    #[must_use]
    pub fn math_block(latex: impl Into<String>) -> Self {
        Self::new(NodeType::MathBlock, Vec::new()).with_attr("latex", latex.into())
    }

    #[must_use]
    pub fn inline_math(latex: impl Into<String>) -> Self {
        Self::new(NodeType::InlineMath, Vec::new()).with_attr("latex", latex.into())
    }

    #[must_use]
    pub fn horizontal_rule() -> Self {
        Self::new(NodeType::HorizontalRule, Vec::new())
    }

    #[must_use]
    pub fn hard_break() -> Self {
        Self::new(NodeType::HardBreak, Vec::new())
    }

    /// Iterate over element children, skipping text leaves.
    pub fn child_nodes(&self) -> impl Iterator<Item = &DocumentNode> {
        self.content.iter().filter_map(Content::as_node)
    }

    /// Flatten the subtree to plain text.
    ///
    /// Blocks inside containers are separated by newlines; hard breaks become
    /// a single space; inline math contributes its LaTeX source and images
    /// their alt text.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self.node_type {
            NodeType::HardBreak => out.push(' '),
            NodeType::InlineMath | NodeType::MathBlock => {
                if let Some(Value::String(latex)) = self.attrs.get("latex") {
                    out.push_str(latex);
                }
            }
            NodeType::Image => {
                if let Some(Value::String(alt)) = self.attrs.get("alt") {
                    out.push_str(alt);
                }
            }
            _ => {
                let separate = self.node_type.is_container();
                for (i, child) in self.content.iter().enumerate() {
                    if separate && i > 0 {
                        out.push('\n');
                    }
                    match child {
                        Content::Text(leaf) => out.push_str(&leaf.text),
                        Content::Node(node) => node.push_plain_text(out),
                    }
                }
            }
        }
    }

    /// Count of element nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.child_nodes().map(DocumentNode::node_count).sum::<usize>()
    }

    fn missing(&self, attr: &'static str) -> NodeError {
        NodeError::MissingAttr {
            node: self.node_type.as_str().to_owned(),
            attr,
        }
    }

    fn invalid(&self, attr: &'static str, reason: impl Into<String>) -> NodeError {
        NodeError::InvalidAttr {
            node: self.node_type.as_str().to_owned(),
            attr,
            reason: reason.into(),
        }
    }

    fn required_str(&self, attr: &'static str) -> Result<&str, NodeError> {
        match self.attrs.get(attr) {
            Some(Value::String(s)) => Ok(s),
            None | Some(Value::Null) => Err(self.missing(attr)),
            Some(other) => Err(self.invalid(attr, format!("expected string, got {other}"))),
        }
    }

    fn optional_str(&self, attr: &'static str) -> Result<Option<&str>, NodeError> {
        match self.attrs.get(attr) {
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            None | Some(Value::Null) => Ok(None),
            Some(other) => Err(self.invalid(attr, format!("expected string, got {other}"))),
        }
    }

    /// Heading level, validated to 1..=6.
    pub fn heading_level(&self) -> Result<u8, NodeError> {
        let value = self.attrs.get("level").ok_or_else(|| self.missing("level"))?;
        let level = value
            .as_u64()
            .ok_or_else(|| self.invalid("level", format!("expected integer, got {value}")))?;
        match u8::try_from(level) {
            Ok(level @ 1..=6) => Ok(level),
            _ => Err(self.invalid("level", format!("{level} is outside 1..=6"))),
        }
    }

    /// Declared code block language. Empty strings count as undeclared.
    pub fn code_language(&self) -> Result<Option<&str>, NodeError> {
        self.optional_str("language")
    }

    /// Image source URL (required, non-empty).
    pub fn image_src(&self) -> Result<&str, NodeError> {
        let src = self.required_str("src")?;
        if src.trim().is_empty() {
            return Err(self.invalid("src", "empty source"));
        }
        Ok(src)
    }

    pub fn image_alt(&self) -> Result<Option<&str>, NodeError> {
        self.optional_str("alt")
    }

    pub fn image_title(&self) -> Result<Option<&str>, NodeError> {
        self.optional_str("title")
    }

    /// LaTeX source of a math node.
    pub fn latex(&self) -> Result<&str, NodeError> {
        self.required_str("latex")
    }

    /// Task item state. Missing means unchecked.
    pub fn checked(&self) -> Result<bool, NodeError> {
        match self.attrs.get("checked") {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.invalid("checked", format!("expected bool, got {other}"))),
        }
    }

    /// Ordered list start number. Missing means 1.
    pub fn list_start(&self) -> Result<u64, NodeError> {
        match self.attrs.get("start") {
            None | Some(Value::Null) => Ok(1),
            Some(value) => value
                .as_u64()
                .ok_or_else(|| self.invalid("start", format!("expected integer, got {value}"))),
        }
    }

    /// Table cell alignment.
    pub fn cell_align(&self) -> Result<Option<Alignment>, NodeError> {
        match self.optional_str("align")? {
            None => Ok(None),
            Some("left") => Ok(Some(Alignment::Left)),
            Some("center") => Ok(Some(Alignment::Center)),
            Some("right") => Ok(Some(Alignment::Right)),
            Some(other) => Err(self.invalid("align", format!("unknown alignment `{other}`"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::mark::Mark;

    #[test]
    fn test_node_type_roundtrip_names() {
        for name in ["doc", "codeBlock", "tableHeader", "taskItem", "inlineMath"] {
            assert_eq!(NodeType::from_name(name).as_str(), name);
        }
        assert_eq!(NodeType::from_name("blockMath"), NodeType::MathBlock);
    }

    #[test]
    fn test_unknown_node_type_preserved() {
        let node: DocumentNode = serde_json::from_value(json!({"type": "youtube"})).unwrap();
        assert_eq!(node.node_type, NodeType::Unknown("youtube".to_owned()));
        assert_eq!(serde_json::to_value(&node).unwrap(), json!({"type": "youtube"}));
    }

    #[test]
    fn test_deserialize_prosemirror_json() {
        let node: DocumentNode = serde_json::from_value(json!({
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [
                    {"type": "text", "text": "Setup", "marks": [{"type": "bold"}]}
                ]},
                {"type": "paragraph", "attrs": null}
            ]
        }))
        .unwrap();

        let heading = node.child_nodes().next().unwrap();
        assert_eq!(heading.heading_level(), Ok(2));
        let leaf = heading.content[0].as_text().unwrap();
        assert_eq!(leaf.text, "Setup");
        assert_eq!(leaf.marks, vec![Mark::bold()]);
        assert!(node.child_nodes().nth(1).unwrap().attrs.is_empty());
    }

    #[test]
    fn test_text_leaf_missing_text_becomes_unknown_node() {
        let content: Content = serde_json::from_value(json!({"type": "text"})).unwrap();
        let node = content.as_node().unwrap();
        assert_eq!(node.node_type, NodeType::Unknown("text".to_owned()));
    }

    #[test]
    fn test_heading_level_validation() {
        let node = DocumentNode::new(NodeType::Heading, vec![]);
        assert!(matches!(node.heading_level(), Err(NodeError::MissingAttr { .. })));

        let node = node.with_attr("level", 9);
        assert!(matches!(node.heading_level(), Err(NodeError::InvalidAttr { .. })));

        let node = DocumentNode::new(NodeType::Heading, vec![]).with_attr("level", "two");
        assert!(matches!(node.heading_level(), Err(NodeError::InvalidAttr { .. })));
    }

    #[test]
    fn test_code_language_empty_is_none() {
        let node = DocumentNode::code_block(Some(""), "x");
        assert_eq!(node.code_language(), Ok(None));
        let node = DocumentNode::code_block(Some("rust"), "x");
        assert_eq!(node.code_language(), Ok(Some("rust")));
    }

    #[test]
    fn test_image_src_required() {
        let node = DocumentNode::new(NodeType::Image, vec![]);
        assert!(node.image_src().is_err());
        let node = DocumentNode::image("", "alt");
        assert!(node.image_src().is_err());
        let node = DocumentNode::image("/a.png", "alt");
        assert_eq!(node.image_src(), Ok("/a.png"));
    }

    #[test]
    fn test_checked_and_start_defaults() {
        let item = DocumentNode::new(NodeType::TaskItem, vec![]);
        assert_eq!(item.checked(), Ok(false));
        let list = DocumentNode::new(NodeType::OrderedList, vec![]);
        assert_eq!(list.list_start(), Ok(1));
        let list = list.with_attr("start", -3);
        assert!(list.list_start().is_err());
    }

    #[test]
    fn test_plain_text() {
        let doc = DocumentNode::doc(vec![
            DocumentNode::heading(
                2,
                vec![
                    Content::text("Install "),
                    TextLeaf::new("npm").with_mark(Mark::code()).into(),
                ],
            )
            .into(),
            DocumentNode::paragraph(vec![
                Content::text("a"),
                DocumentNode::hard_break().into(),
                Content::text("b "),
                DocumentNode::inline_math("x^2").into(),
            ])
            .into(),
        ]);
        assert_eq!(doc.plain_text(), "Install npm\na b x^2");
    }

    #[test]
    fn test_with_mark_deduplicates() {
        let leaf = TextLeaf::new("x").with_mark(Mark::bold()).with_mark(Mark::bold());
        assert_eq!(leaf.marks.len(), 1);
    }

    #[test]
    fn test_node_count() {
        let doc = DocumentNode::doc(vec![
            DocumentNode::bullet_list(vec![
                DocumentNode::list_item(vec![DocumentNode::paragraph(vec![]).into()]).into(),
            ])
            .into(),
        ]);
        assert_eq!(doc.node_count(), 4);
    }
}
