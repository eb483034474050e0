//! Event stream to tree builder.

use folio_document::{Alignment, Content, DocumentNode, Mark, MarkType, NodeType, TextLeaf};
use pulldown_cmark::{Alignment as CmarkAlignment, CodeBlockKind, Event, HeadingLevel, Tag, TagEnd};

use crate::converter::ConvertError;
use crate::math::check_latex;

/// An element node under construction.
struct Frame {
    node: DocumentNode,
    /// Paragraph opened to hold loose inline content (tight list items,
    /// table cells). Closed by the next block boundary.
    implicit: bool,
}

struct CodeCapture {
    language: Option<String>,
    text: String,
}

struct ImageCapture {
    src: String,
    title: String,
    alt: String,
}

/// Builds a [`DocumentNode`] tree from `pulldown-cmark` events.
///
/// Inline content is never placed directly inside a container: the builder
/// opens an implicit paragraph for it. Display math is hoisted out of the
/// paragraph it was parsed into.
pub(crate) struct TreeBuilder {
    stack: Vec<Frame>,
    marks: Vec<Mark>,
    max_depth: usize,
    code: Option<CodeCapture>,
    image: Option<ImageCapture>,
    alignments: Vec<Option<Alignment>>,
    cell: usize,
    in_head: bool,
    /// Text prepended to the next textblock (footnote labels).
    prefix: Option<String>,
}

impl TreeBuilder {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            stack: vec![Frame {
                node: DocumentNode::doc(Vec::new()),
                implicit: false,
            }],
            marks: Vec::new(),
            max_depth,
            code: None,
            image: None,
            alignments: Vec::new(),
            cell: 0,
            in_head: false,
            prefix: None,
        }
    }

    pub(crate) fn build<'a>(
        mut self,
        events: impl Iterator<Item = Event<'a>>,
    ) -> Result<DocumentNode, ConvertError> {
        for event in events {
            self.event(event)?;
        }
        while self.stack.len() > 1 {
            self.close();
        }
        Ok(self
            .stack
            .pop()
            .map_or_else(|| DocumentNode::doc(Vec::new()), |frame| frame.node))
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), ConvertError> {
        match event {
            Event::Start(tag) => self.start_tag(tag)?,
            Event::End(tag) => self.end_tag(tag)?,
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                self.push_text(&text)?;
            }
            Event::Code(code) => {
                if let Some(image) = &mut self.image {
                    image.alt.push_str(&code);
                } else {
                    self.ensure_textblock()?;
                    let mut marks = self.marks.clone();
                    marks.push(Mark::code());
                    self.push_leaf(&code, marks);
                }
            }
            Event::InlineMath(latex) => {
                check_math(&latex)?;
                self.push_inline(DocumentNode::inline_math(latex.as_ref()))?;
            }
            Event::DisplayMath(latex) => {
                check_math(&latex)?;
                let in_heading = self
                    .stack
                    .last()
                    .is_some_and(|f| f.node.node_type == NodeType::Heading);
                let node = if in_heading {
                    DocumentNode::inline_math(latex.as_ref())
                } else {
                    DocumentNode::math_block(latex.as_ref())
                };
                self.push_inline(node)?;
            }
            Event::FootnoteReference(label) => self.push_text(&format!("[^{label}]"))?,
            Event::SoftBreak => self.push_text(" ")?,
            Event::HardBreak => {
                if let Some(image) = &mut self.image {
                    image.alt.push(' ');
                } else {
                    self.push_inline(DocumentNode::hard_break())?;
                }
            }
            Event::Rule => {
                self.close_implicit();
                self.check_depth()?;
                self.append(DocumentNode::horizontal_rule().into());
            }
            Event::TaskListMarker(checked) => self.mark_task(checked),
        }
        Ok(())
    }

    fn start_tag(&mut self, tag: Tag<'_>) -> Result<(), ConvertError> {
        match tag {
            Tag::Paragraph | Tag::HtmlBlock => self.open_block(DocumentNode::paragraph(Vec::new())),
            Tag::Heading { level, .. } => {
                self.open_block(DocumentNode::heading(heading_level_to_num(level), Vec::new()))
            }
            Tag::BlockQuote(_) => self.open_block(DocumentNode::blockquote(Vec::new())),
            Tag::CodeBlock(kind) => {
                self.close_implicit();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeCapture {
                    language,
                    text: String::new(),
                });
                Ok(())
            }
            Tag::List(None) => self.open_block(DocumentNode::bullet_list(Vec::new())),
            Tag::List(Some(start)) => self.open_block(DocumentNode::ordered_list(start, Vec::new())),
            Tag::Item => self.open_block(DocumentNode::list_item(Vec::new())),
            Tag::FootnoteDefinition(label) => {
                let node = DocumentNode::blockquote(Vec::new()).with_attr("footnote", label.as_ref());
                self.open_block(node)?;
                self.prefix = Some(format!("[^{label}]: "));
                Ok(())
            }
            Tag::Table(alignments) => {
                self.alignments = alignments.into_iter().map(convert_alignment).collect();
                self.open_block(DocumentNode::table(Vec::new()))
            }
            Tag::TableHead => {
                self.in_head = true;
                self.cell = 0;
                self.open(DocumentNode::table_row(Vec::new()), false)
            }
            Tag::TableRow => {
                self.cell = 0;
                self.open(DocumentNode::table_row(Vec::new()), false)
            }
            Tag::TableCell => {
                let node = if self.in_head {
                    DocumentNode::table_header(Vec::new())
                } else {
                    DocumentNode::table_cell(Vec::new())
                };
                let node = match self.alignments.get(self.cell).copied().flatten() {
                    Some(align) => node.with_attr("align", align.as_str()),
                    None => node,
                };
                self.open(node, false)
            }
            Tag::Emphasis => {
                self.marks.push(Mark::italic());
                Ok(())
            }
            Tag::Strong => {
                self.marks.push(Mark::bold());
                Ok(())
            }
            Tag::Strikethrough => {
                self.marks.push(Mark::strike());
                Ok(())
            }
            Tag::Link {
                dest_url, title, ..
            } => {
                self.marks.push(Mark::link(dest_url.as_ref(), Some(title.as_ref())));
                Ok(())
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(ImageCapture {
                    src: dest_url.into_string(),
                    title: title.into_string(),
                    alt: String::new(),
                });
                Ok(())
            }
            Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::MetadataBlock(_) => {
                self.close_implicit();
                Ok(())
            }
            Tag::Superscript | Tag::Subscript => Ok(()),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) -> Result<(), ConvertError> {
        match tag {
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::Table
            | TagEnd::TableRow => self.end_block(),
            TagEnd::TableCell => {
                self.end_block();
                self.cell += 1;
            }
            TagEnd::HtmlBlock => {
                self.trim_trailing_newline();
                self.end_block();
            }
            TagEnd::TableHead => {
                self.end_block();
                self.in_head = false;
            }
            TagEnd::FootnoteDefinition => {
                self.end_block();
                self.prefix = None;
            }
            TagEnd::CodeBlock => {
                if let Some(mut code) = self.code.take() {
                    if code.text.ends_with('\n') {
                        code.text.pop();
                    }
                    self.check_depth()?;
                    self.append(DocumentNode::code_block(code.language.as_deref(), code.text).into());
                }
            }
            TagEnd::Emphasis => self.pop_mark(&MarkType::Italic),
            TagEnd::Strong => self.pop_mark(&MarkType::Bold),
            TagEnd::Strikethrough => self.pop_mark(&MarkType::Strike),
            TagEnd::Link => self.pop_mark(&MarkType::Link),
            TagEnd::Image => {
                if let Some(image) = self.image.take() {
                    let mut node = DocumentNode::image(image.src, image.alt);
                    if !image.title.is_empty() {
                        node = node.with_attr("title", image.title);
                    }
                    self.push_inline(node)?;
                }
            }
            TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::MetadataBlock(_) => self.close_implicit(),
            TagEnd::Superscript | TagEnd::Subscript => {}
        }
        Ok(())
    }

    fn check_depth(&self) -> Result<(), ConvertError> {
        let depth = self.stack.len();
        if depth > self.max_depth {
            return Err(ConvertError::TooDeep {
                depth,
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn open(&mut self, node: DocumentNode, implicit: bool) -> Result<(), ConvertError> {
        self.check_depth()?;
        let textblock = node.node_type.is_textblock();
        self.stack.push(Frame { node, implicit });
        if textblock && let Some(prefix) = self.prefix.take() {
            self.push_leaf(&prefix, Vec::new());
        }
        Ok(())
    }

    fn open_block(&mut self, node: DocumentNode) -> Result<(), ConvertError> {
        self.close_implicit();
        self.open(node, false)
    }

    fn end_block(&mut self) {
        self.close_implicit();
        self.close();
    }

    fn close(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(frame) = self.stack.pop() {
            for block in hoist_math(frame.node) {
                self.append(block.into());
            }
        }
    }

    fn close_implicit(&mut self) {
        if self.stack.last().is_some_and(|f| f.implicit) {
            self.close();
        }
    }

    fn append(&mut self, content: Content) {
        if let Some(top) = self.stack.last_mut() {
            top.node.content.push(content);
        }
    }

    fn ensure_textblock(&mut self) -> Result<(), ConvertError> {
        let in_textblock = self
            .stack
            .last()
            .is_some_and(|f| f.node.node_type.is_textblock());
        if !in_textblock {
            self.open(DocumentNode::paragraph(Vec::new()), true)?;
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) -> Result<(), ConvertError> {
        if let Some(code) = &mut self.code {
            code.text.push_str(text);
            return Ok(());
        }
        if let Some(image) = &mut self.image {
            image.alt.push_str(text);
            return Ok(());
        }
        if text.is_empty() {
            return Ok(());
        }
        self.ensure_textblock()?;
        let marks = self.marks.clone();
        self.push_leaf(text, marks);
        Ok(())
    }

    /// Append text, merging with the previous leaf when marks are equal.
    fn push_leaf(&mut self, text: &str, marks: Vec<Mark>) {
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        if let Some(Content::Text(last)) = top.node.content.last_mut()
            && last.marks == marks
        {
            last.text.push_str(text);
            return;
        }
        top.node
            .content
            .push(TextLeaf::new(text).with_marks(marks).into());
    }

    fn push_inline(&mut self, node: DocumentNode) -> Result<(), ConvertError> {
        if let Some(image) = &mut self.image {
            if let Ok(latex) = node.latex() {
                image.alt.push_str(latex);
            }
            return Ok(());
        }
        self.ensure_textblock()?;
        self.append(node.into());
        Ok(())
    }

    fn pop_mark(&mut self, mark_type: &MarkType) {
        if let Some(pos) = self.marks.iter().rposition(|m| &m.mark_type == mark_type) {
            self.marks.remove(pos);
        }
    }

    /// Turn the innermost list item into a task item, and its bullet list
    /// into a task list.
    fn mark_task(&mut self, checked: bool) {
        let Some(idx) = self
            .stack
            .iter()
            .rposition(|f| f.node.node_type == NodeType::ListItem)
        else {
            return;
        };
        let item = &mut self.stack[idx].node;
        item.node_type = NodeType::TaskItem;
        item.attrs.insert("checked".to_owned(), checked.into());
        if let Some(list) = idx.checked_sub(1).map(|i| &mut self.stack[i].node)
            && list.node_type == NodeType::BulletList
        {
            list.node_type = NodeType::TaskList;
        }
    }

    fn trim_trailing_newline(&mut self) {
        if let Some(top) = self.stack.last_mut()
            && let Some(Content::Text(last)) = top.node.content.last_mut()
        {
            let trimmed = last.text.trim_end_matches('\n').len();
            last.text.truncate(trimmed);
        }
    }
}

fn check_math(latex: &str) -> Result<(), ConvertError> {
    check_latex(latex).map_err(|message| ConvertError::Math {
        latex: latex.to_owned(),
        message,
    })
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn convert_alignment(align: CmarkAlignment) -> Option<Alignment> {
    match align {
        CmarkAlignment::None => None,
        CmarkAlignment::Left => Some(Alignment::Left),
        CmarkAlignment::Center => Some(Alignment::Center),
        CmarkAlignment::Right => Some(Alignment::Right),
    }
}

/// Split a paragraph around any display math it contains.
fn hoist_math(node: DocumentNode) -> Vec<DocumentNode> {
    let has_math = node
        .child_nodes()
        .any(|n| n.node_type == NodeType::MathBlock);
    if node.node_type != NodeType::Paragraph || !has_math {
        return vec![node];
    }

    let mut blocks = Vec::new();
    let mut run = Vec::new();
    for child in node.content {
        match child {
            Content::Node(math) if math.node_type == NodeType::MathBlock => {
                flush_run(&mut blocks, &mut run);
                blocks.push(math);
            }
            other => run.push(other),
        }
    }
    flush_run(&mut blocks, &mut run);
    blocks
}

fn flush_run(blocks: &mut Vec<DocumentNode>, run: &mut Vec<Content>) {
    let mut content = std::mem::take(run);
    if let Some(Content::Text(first)) = content.first_mut() {
        first.text = first.text.trim_start().to_owned();
    }
    if let Some(Content::Text(last)) = content.last_mut() {
        last.text.truncate(last.text.trim_end().len());
    }
    content.retain(|c| !matches!(c, Content::Text(leaf) if leaf.text.is_empty()));
    if !content.is_empty() {
        blocks.push(DocumentNode::paragraph(content));
    }
}
