//! HTML serialization with per-node containment.
//!
//! Every element node is emitted through [`HtmlSerializer::node`]. A node
//! that fails validation has its partial output discarded and is replaced
//! by a placeholder element; siblings and ancestors are unaffected.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write;

use folio_document::{Content, DocumentNode, Mark, MarkType, NodeError, NodeType};

use crate::annotate::{CodeInfo, HeadingAnchor};
use crate::document::{Behavior, Enhancement, RenderWarning};
use crate::highlight::highlight;
use crate::key::{NodeKey, TargetId};
use crate::math::{error_html, render_math};
use crate::renderer::RenderOptions;
use crate::sanitize::{escape_html, is_previewable, sanitize_color, sanitize_href, sanitize_src};

const EXTERNAL_LINK_CLASS: &str = "external-link";

/// Collected output of one serialization.
pub(crate) struct HtmlOutput {
    pub html: String,
    pub enhancements: Vec<Enhancement>,
    pub warnings: Vec<RenderWarning>,
    /// Headings that made it into the HTML.
    pub emitted: HashSet<NodeKey>,
}

/// An open inline mark.
struct OpenMark {
    mark: Mark,
    close: &'static str,
    /// Output offset after the opening tag and index of the link enhancement.
    link: Option<(usize, usize)>,
}

pub(crate) struct HtmlSerializer<'a> {
    options: &'a RenderOptions,
    anchors: &'a BTreeMap<NodeKey, HeadingAnchor>,
    code: &'a HashMap<NodeKey, CodeInfo>,
    out: String,
    next: usize,
    current: NodeKey,
    link_ordinal: u32,
    enhancements: Vec<Enhancement>,
    warnings: Vec<RenderWarning>,
    emitted: HashSet<NodeKey>,
}

impl<'a> HtmlSerializer<'a> {
    pub(crate) fn new(
        options: &'a RenderOptions,
        anchors: &'a BTreeMap<NodeKey, HeadingAnchor>,
        code: &'a HashMap<NodeKey, CodeInfo>,
    ) -> Self {
        Self {
            options,
            anchors,
            code,
            out: String::new(),
            next: 0,
            current: NodeKey(0),
            link_ordinal: 0,
            enhancements: Vec::new(),
            warnings: Vec::new(),
            emitted: HashSet::new(),
        }
    }

    pub(crate) fn document(mut self, root: &DocumentNode, locale: &str) -> HtmlOutput {
        let _ = write!(
            self.out,
            r#"<div class="folio-content" lang="{}">"#,
            escape_html(locale)
        );
        self.node(root, false);
        self.out.push_str("</div>");
        HtmlOutput {
            html: self.out,
            enhancements: self.enhancements,
            warnings: self.warnings,
            emitted: self.emitted,
        }
    }

    fn node(&mut self, node: &DocumentNode, inline: bool) {
        let key = NodeKey(self.next);
        self.next += 1;
        let parent = std::mem::replace(&mut self.current, key);
        let checkpoint = (self.out.len(), self.enhancements.len(), self.warnings.len());

        if let Err(e) = self.try_node(key, node) {
            let end = key.0 + node.node_count();
            self.out.truncate(checkpoint.0);
            self.enhancements.truncate(checkpoint.1);
            self.warnings.truncate(checkpoint.2);
            self.emitted.retain(|k| k.0 < key.0 || k.0 >= end);
            self.placeholder(key, node, inline, &e);
        }

        // Keys stay aligned with the annotation passes whether or not the
        // subtree was visited.
        self.next = key.0 + node.node_count();
        self.current = parent;
    }

    fn placeholder(&mut self, key: NodeKey, node: &DocumentNode, inline: bool, error: &NodeError) {
        let tag = if inline { "span" } else { "div" };
        let node_type = node.node_type.as_str();
        let _ = write!(
            self.out,
            r#"<{tag} class="render-placeholder" data-node-type="{}"></{tag}>"#,
            escape_html(node_type)
        );
        tracing::debug!(key = %key, node_type, error = %error, "Rendered placeholder");
        self.warnings.push(RenderWarning {
            key: Some(key),
            node_type: node_type.to_owned(),
            message: error.to_string(),
        });
    }

    fn warn(&mut self, node_type: &str, message: String) {
        tracing::debug!(key = %self.current, node_type, %message, "Degraded output");
        self.warnings.push(RenderWarning {
            key: Some(self.current),
            node_type: node_type.to_owned(),
            message,
        });
    }

    fn try_node(&mut self, key: NodeKey, node: &DocumentNode) -> Result<(), NodeError> {
        match &node.node_type {
            NodeType::Doc => self.children(&node.content, false),
            NodeType::Paragraph => self.wrap("<p>", "</p>", &node.content, true),
            NodeType::Heading => self.heading(key, node)?,
            NodeType::CodeBlock => self.code_block(key, node)?,
            NodeType::Image => self.image(key, node)?,
            NodeType::Blockquote => {
                self.wrap("<blockquote>", "</blockquote>", &node.content, false);
            }
            NodeType::BulletList => self.wrap("<ul>", "</ul>", &node.content, false),
            NodeType::OrderedList => {
                let start = node.list_start()?;
                if start == 1 {
                    self.out.push_str("<ol>");
                } else {
                    let _ = write!(self.out, r#"<ol start="{start}">"#);
                }
                self.children(&node.content, false);
                self.out.push_str("</ol>");
            }
            NodeType::ListItem => self.wrap("<li>", "</li>", &node.content, false),
            NodeType::TaskList => {
                self.wrap(r#"<ul class="task-list">"#, "</ul>", &node.content, false);
            }
            NodeType::TaskItem => {
                let checked = node.checked()?;
                let _ = write!(
                    self.out,
                    r#"<li class="task-item" data-checked="{checked}"><input type="checkbox"{} disabled> "#,
                    if checked { " checked" } else { "" }
                );
                self.children(&node.content, false);
                self.out.push_str("</li>");
            }
            NodeType::Table => self.table(node),
            NodeType::TableRow => self.wrap("<tr>", "</tr>", &node.content, false),
            NodeType::TableCell | NodeType::TableHeader => {
                let tag = if node.node_type == NodeType::TableHeader {
                    "th"
                } else {
                    "td"
                };
                match node.cell_align()? {
                    Some(align) => {
                        let _ = write!(
                            self.out,
                            r#"<{tag} style="text-align:{}">"#,
                            align.as_str()
                        );
                    }
                    None => {
                        let _ = write!(self.out, "<{tag}>");
                    }
                }
                self.children(&node.content, false);
                let _ = write!(self.out, "</{tag}>");
            }
            NodeType::MathBlock => {
                let latex = node.latex()?;
                self.out.push_str(r#"<div class="math-block">"#);
                self.math(latex, true);
                self.out.push_str("</div>");
            }
            NodeType::InlineMath => {
                let latex = node.latex()?;
                self.math(latex, false);
            }
            NodeType::HorizontalRule => self.out.push_str("<hr>"),
            NodeType::HardBreak => self.out.push_str("<br>"),
            NodeType::Unknown(name) => return Err(NodeError::UnknownType(name.clone())),
        }
        Ok(())
    }

    fn wrap(&mut self, open: &str, close: &str, content: &[Content], in_textblock: bool) {
        self.out.push_str(open);
        self.children(content, in_textblock);
        self.out.push_str(close);
    }

    fn heading(&mut self, key: NodeKey, node: &DocumentNode) -> Result<(), NodeError> {
        let level = node.heading_level()?;
        let anchors = self.anchors;
        let id = anchors.get(&key).map_or("", |a| a.id.as_str());
        let _ = write!(
            self.out,
            r#"<h{level} id="{}" style="scroll-margin-top:{}px">"#,
            escape_html(id),
            self.options.scroll_margin
        );
        self.children(&node.content, true);
        let _ = write!(self.out, "</h{level}>");
        self.emitted.insert(key);
        Ok(())
    }

    fn code_block(&mut self, key: NodeKey, node: &DocumentNode) -> Result<(), NodeError> {
        let code = self.code;
        let info = match code.get(&key) {
            Some(info) => info.clone(),
            None => CodeInfo::from_node(node)?,
        };
        let target = TargetId::node(key);

        let _ = write!(
            self.out,
            r#"<div class="code-window" data-enhance="{}" data-key="{target}""#,
            Behavior::CodeWindow.as_attr()
        );
        if let Some(lang) = &info.language {
            let _ = write!(self.out, r#" data-language="{}""#, escape_html(lang));
        }
        self.out.push_str("><pre><code");
        if let Some(lang) = &info.language {
            let _ = write!(self.out, r#" class="language-{}""#, escape_html(lang));
        }
        self.out.push('>');

        let highlighted = if self.options.highlight {
            info.language
                .as_deref()
                .and_then(|lang| highlight(&info.raw, lang))
        } else {
            None
        };
        match highlighted {
            Some(html) => self.out.push_str(&html),
            None => self.out.push_str(&escape_html(&info.raw)),
        }
        self.out.push_str("</code></pre></div>");

        self.enhancements.push(Enhancement::CodeWindow {
            target,
            language: info.language,
            raw: info.raw,
        });
        Ok(())
    }

    fn image(&mut self, key: NodeKey, node: &DocumentNode) -> Result<(), NodeError> {
        let src = node.image_src()?;
        let src = sanitize_src(src).ok_or_else(|| NodeError::InvalidAttr {
            node: node.node_type.as_str().to_owned(),
            attr: "src",
            reason: "unsafe URL scheme".to_owned(),
        })?;
        let alt = node.image_alt()?.unwrap_or("");
        let title = node.image_title()?;
        let target = TargetId::node(key);

        let _ = write!(
            self.out,
            r#"<img src="{}" alt="{}""#,
            escape_html(src),
            escape_html(alt)
        );
        if let Some(title) = title {
            let _ = write!(self.out, r#" title="{}""#, escape_html(title));
        }
        let _ = write!(
            self.out,
            r#" loading="lazy" data-enhance="{}" data-key="{target}">"#,
            Behavior::Zoom.as_attr()
        );

        self.enhancements.push(Enhancement::Zoom {
            target,
            src: src.to_owned(),
            alt: alt.to_owned(),
        });
        Ok(())
    }

    fn table(&mut self, node: &DocumentNode) {
        let head_rows = node
            .content
            .iter()
            .take_while(|c| c.as_node().is_some_and(is_header_row))
            .count();
        self.out.push_str("<table>");
        if head_rows > 0 {
            self.wrap("<thead>", "</thead>", &node.content[..head_rows], false);
        }
        if head_rows < node.content.len() {
            self.wrap("<tbody>", "</tbody>", &node.content[head_rows..], false);
        }
        self.out.push_str("</table>");
    }

    fn math(&mut self, latex: &str, display: bool) {
        match render_math(latex, display) {
            Ok(mathml) => {
                let class = if display { "math-display" } else { "math-inline" };
                let tag = if display { "div" } else { "span" };
                let _ = write!(self.out, r#"<{tag} class="math {class}">{mathml}</{tag}>"#);
            }
            Err(message) => {
                self.out.push_str(&error_html(latex, &message, display));
                let node_type = if display { "mathBlock" } else { "inlineMath" };
                self.warn(node_type, format!("invalid LaTeX: {message}"));
            }
        }
    }

    /// Serialize a content sequence.
    ///
    /// Marks shared by adjacent text leaves stay open across them, so a
    /// link split over differently styled runs becomes a single anchor.
    fn children(&mut self, content: &[Content], in_textblock: bool) {
        let mut open: Vec<OpenMark> = Vec::new();
        for child in content {
            match child {
                Content::Text(leaf) => {
                    let marks = ordered_marks(&leaf.marks);
                    let keep = open
                        .iter()
                        .zip(&marks)
                        .take_while(|(o, m)| o.mark == **m)
                        .count();
                    self.close_marks(&mut open, keep);
                    for mark in &marks[keep..] {
                        let opened = self.open_mark(mark);
                        open.push(opened);
                    }
                    self.out.push_str(&escape_html(&leaf.text));
                }
                Content::Node(node) => {
                    if !(in_textblock && node.node_type.is_inline()) {
                        self.close_marks(&mut open, 0);
                    }
                    self.node(node, in_textblock);
                }
            }
        }
        self.close_marks(&mut open, 0);
    }

    fn open_mark(&mut self, mark: &Mark) -> OpenMark {
        let simple = |open: &str, close: &'static str| (open.to_owned(), close);
        let mut link = None;
        let (open, close) = match &mark.mark_type {
            MarkType::Bold => simple("<strong>", "</strong>"),
            MarkType::Italic => simple("<em>", "</em>"),
            MarkType::Strike => simple("<s>", "</s>"),
            MarkType::Code => simple("<code>", "</code>"),
            MarkType::Color => match mark.color_value() {
                Ok(value) => match sanitize_color(value) {
                    Some(color) => (
                        format!(r#"<span style="color:{}">"#, escape_html(color)),
                        "</span>",
                    ),
                    None => {
                        self.warn("color", format!("dropped unsafe color `{value}`"));
                        simple("", "")
                    }
                },
                Err(e) => {
                    self.warn("color", e.to_string());
                    simple("", "")
                }
            },
            MarkType::Link => match mark.href() {
                Ok(href) => match sanitize_href(href) {
                    Some(href) => {
                        let open = self.link_open(href, mark.title());
                        if is_previewable(href) {
                            link = Some((self.out.len() + open.len(), self.enhancements.len() - 1));
                        }
                        (open, "</a>")
                    }
                    None => {
                        self.warn("link", format!("dropped unsafe href `{href}`"));
                        simple("", "")
                    }
                },
                Err(e) => {
                    self.warn("link", e.to_string());
                    simple("", "")
                }
            },
            MarkType::Unknown(_) => simple("", ""),
        };
        self.out.push_str(&open);
        OpenMark {
            mark: mark.clone(),
            close,
            link,
        }
    }

    /// Opening anchor tag. External `http(s)` links also register a preview
    /// enhancement whose inner markup is filled in when the anchor closes.
    fn link_open(&mut self, href: &str, title: Option<&str>) -> String {
        let mut open = format!(r#"<a href="{}""#, escape_html(href));
        if let Some(title) = title {
            let _ = write!(open, r#" title="{}""#, escape_html(title));
        }
        if is_previewable(href) {
            self.link_ordinal += 1;
            let target = TargetId {
                node: self.current,
                slot: self.link_ordinal,
            };
            let _ = write!(
                open,
                r#" class="{EXTERNAL_LINK_CLASS}" rel="noopener noreferrer" target="_blank" data-enhance="{}" data-key="{target}""#,
                Behavior::LinkPreview.as_attr()
            );
            self.enhancements.push(Enhancement::LinkPreview {
                target,
                href: href.to_owned(),
                inner_html: String::new(),
                class: EXTERNAL_LINK_CLASS.to_owned(),
            });
        }
        open.push('>');
        open
    }

    fn close_marks(&mut self, open: &mut Vec<OpenMark>, keep: usize) {
        while open.len() > keep {
            let Some(mark) = open.pop() else { break };
            if let Some((start, index)) = mark.link {
                let inner = self.out.get(start..).unwrap_or_default().to_owned();
                if let Some(Enhancement::LinkPreview { inner_html, .. }) =
                    self.enhancements.get_mut(index)
                {
                    *inner_html = inner;
                }
            }
            self.out.push_str(mark.close);
        }
    }
}

fn is_header_row(row: &DocumentNode) -> bool {
    row.node_type == NodeType::TableRow
        && row.child_nodes().next().is_some()
        && row
            .child_nodes()
            .all(|cell| cell.node_type == NodeType::TableHeader)
}

/// Nesting rank; lower ranks open first (outermost).
fn mark_rank(mark: &Mark) -> u8 {
    match mark.mark_type {
        MarkType::Link => 0,
        MarkType::Color => 1,
        MarkType::Bold => 2,
        MarkType::Italic => 3,
        MarkType::Strike => 4,
        MarkType::Unknown(_) => 5,
        MarkType::Code => 6,
    }
}

fn ordered_marks(marks: &[Mark]) -> Vec<Mark> {
    let mut ordered = marks.to_vec();
    ordered.sort_by_key(mark_rank);
    ordered.dedup();
    ordered
}
