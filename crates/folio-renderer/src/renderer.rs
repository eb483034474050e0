//! Render pipeline entry point.

use std::collections::HashSet;

use folio_document::{ContentBody, DocumentNode};
use folio_markdown::MarkdownConverter;

use crate::annotate::{code_pass, slug_pass};
use crate::document::{RenderWarning, RenderedDocument, TocEntry};
use crate::highlight::{ThemeError, highlight_css};
use crate::html::HtmlSerializer;
use crate::key::NodeKey;
use crate::sanitize::escape_html;

/// Renderer configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Heading `scroll-margin-top` in pixels, so anchored headings clear a
    /// fixed site header.
    pub scroll_margin: u32,
    /// Emit `syntect` class spans inside code blocks.
    pub highlight: bool,
    /// Theme used by [`Renderer::css`].
    pub theme: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scroll_margin: 80,
            highlight: true,
            theme: "base16-ocean.dark".to_owned(),
        }
    }
}

/// Transforms stored content into HTML plus its enhancement manifest.
///
/// Rendering is a pure function of the body, the locale and the options.
/// A `Renderer` holds no per-document state and can be shared across
/// threads.
///
/// # Example
///
/// ```
/// use folio_document::{Content, ContentBody, DocumentNode};
/// use folio_renderer::Renderer;
///
/// let body = ContentBody::Document(DocumentNode::doc(vec![
///     DocumentNode::heading(2, vec![Content::text("Install")]).into(),
/// ]));
/// let rendered = Renderer::default().render(&body, "en");
/// assert_eq!(rendered.toc[0].id, "install");
/// assert!(rendered.html.contains(r#"<h2 id="install""#));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a stored body. Never fails; degraded parts are reported in
    /// [`RenderedDocument::warnings`].
    #[must_use]
    pub fn render(&self, body: &ContentBody, locale: &str) -> RenderedDocument {
        match body {
            ContentBody::Document(root) => self.render_document(root, locale),
            ContentBody::Markdown(text) => self.render_markdown(text, locale),
        }
    }

    #[must_use]
    pub fn render_document(&self, root: &DocumentNode, locale: &str) -> RenderedDocument {
        self.render_tree(root, locale, Vec::new())
    }

    /// Render a legacy Markdown body.
    ///
    /// The body is rendered as given; front matter is removed by storage
    /// when the record is loaded. Conversion is tried with math enabled, then without. If both fail
    /// the source is shown escaped inside `<pre class="markdown-source">`.
    #[must_use]
    pub fn render_markdown(&self, body: &str, locale: &str) -> RenderedDocument {
        let mut warnings = Vec::new();

        let with_math = MarkdownConverter::new().with_math(true).convert(body);
        let converted = match with_math {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::debug!(error = %e, "Math-aware conversion failed");
                warnings.push(markdown_warning(format!(
                    "math conversion failed ({e}), rendered without math"
                )));
                match MarkdownConverter::new().convert(body) {
                    Ok(doc) => Some(doc),
                    Err(e) => {
                        tracing::debug!(error = %e, "Markdown conversion failed");
                        warnings.push(markdown_warning(format!(
                            "conversion failed ({e}), rendered as source"
                        )));
                        None
                    }
                }
            }
        };

        match converted {
            Some(doc) => self.render_tree(&doc, locale, warnings),
            None => RenderedDocument {
                html: format!(
                    r#"<div class="folio-content" lang="{}"><pre class="markdown-source">{}</pre></div>"#,
                    escape_html(locale),
                    escape_html(body)
                ),
                toc: Vec::new(),
                enhancements: Vec::new(),
                warnings,
            },
        }
    }

    /// Stylesheet for highlighted code with the configured theme.
    pub fn css(&self) -> Result<String, ThemeError> {
        highlight_css(&self.options.theme)
    }

    fn render_tree(
        &self,
        root: &DocumentNode,
        locale: &str,
        mut warnings: Vec<RenderWarning>,
    ) -> RenderedDocument {
        let code = code_pass(root);
        let mut anchors = slug_pass(root, &HashSet::new());
        let mut output = HtmlSerializer::new(&self.options, &anchors, &code).document(root, locale);

        // Headings inside a failed container give their ids back. Failures do
        // not depend on ids, so the second serialization emits the same nodes.
        if output.emitted.len() < anchors.len() {
            let dropped: HashSet<NodeKey> = anchors
                .keys()
                .filter(|key| !output.emitted.contains(key))
                .copied()
                .collect();
            anchors = slug_pass(root, &dropped);
            output = HtmlSerializer::new(&self.options, &anchors, &code).document(root, locale);
        }

        let toc = anchors
            .into_iter()
            .filter(|(key, _)| output.emitted.contains(key))
            .map(|(_, anchor)| TocEntry {
                id: anchor.id,
                text: anchor.text,
                depth: anchor.depth,
            })
            .collect();
        warnings.extend(output.warnings);

        RenderedDocument {
            html: output.html,
            toc,
            enhancements: output.enhancements,
            warnings,
        }
    }
}

fn markdown_warning(message: String) -> RenderWarning {
    RenderWarning {
        key: None,
        node_type: "markdown".to_owned(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use folio_document::{Content, Mark, NodeType, TextLeaf};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::document::{Behavior, Enhancement};
    use crate::key::TargetId;

    fn render(content: Vec<Content>) -> RenderedDocument {
        Renderer::default().render_document(&DocumentNode::doc(content), "en")
    }

    fn plain() -> Renderer {
        Renderer::new(RenderOptions {
            highlight: false,
            ..RenderOptions::default()
        })
    }

    #[test]
    fn test_toc_matches_heading_ids() {
        let rendered = render(vec![
            DocumentNode::heading(1, vec![Content::text("A")]).into(),
            DocumentNode::heading(2, vec![Content::text("A")]).into(),
            DocumentNode::heading(3, vec![Content::text("B")]).into(),
        ]);

        let toc: Vec<_> = rendered
            .toc
            .iter()
            .map(|e| (e.id.as_str(), e.text.as_str(), e.depth))
            .collect();
        assert_eq!(toc, vec![("a", "A", 1), ("a-1", "A", 2), ("b", "B", 3)]);

        let a = rendered.html.find(r#"<h1 id="a""#).unwrap();
        let a1 = rendered.html.find(r#"<h2 id="a-1""#).unwrap();
        let b = rendered.html.find(r#"<h3 id="b""#).unwrap();
        assert!(a < a1 && a1 < b);
    }

    #[test]
    fn test_heading_scroll_margin() {
        let renderer = Renderer::new(RenderOptions {
            scroll_margin: 96,
            ..RenderOptions::default()
        });
        let doc = DocumentNode::doc(vec![
            DocumentNode::heading(2, vec![Content::text("Setup")]).into(),
        ]);
        let rendered = renderer.render_document(&doc, "en");
        assert!(
            rendered
                .html
                .contains(r#"<h2 id="setup" style="scroll-margin-top:96px">Setup</h2>"#)
        );
    }

    #[test]
    fn test_render_is_pure() {
        let body = ContentBody::Document(DocumentNode::doc(vec![
            DocumentNode::heading(1, vec![Content::text("Title")]).into(),
            DocumentNode::code_block(Some("rust"), "fn main() {}").into(),
            DocumentNode::image("/a.png", "A").into(),
        ]));
        let renderer = Renderer::default();
        assert_eq!(renderer.render(&body, "ko"), renderer.render(&body, "ko"));
    }

    #[test]
    fn test_document_wrapper_and_lang() {
        let rendered = render(vec![
            DocumentNode::paragraph(vec![Content::text("a < b")]).into(),
        ]);
        assert_eq!(
            rendered.html,
            r#"<div class="folio-content" lang="en"><p>a &lt; b</p></div>"#
        );

        let rendered = Renderer::default().render_document(&DocumentNode::doc(vec![]), "x\"y");
        assert!(rendered.html.starts_with(r#"<div class="folio-content" lang="x&quot;y">"#));
    }

    #[test]
    fn test_malformed_heading_is_contained() {
        let rendered = render(vec![
            DocumentNode::heading(9, vec![Content::text("bad")]).into(),
            DocumentNode::paragraph(vec![Content::text("after")]).into(),
        ]);

        assert!(rendered.html.contains(
            r#"<div class="render-placeholder" data-node-type="heading"></div><p>after</p>"#
        ));
        assert!(!rendered.html.contains("bad"));
        assert!(rendered.toc.is_empty());
        assert_eq!(rendered.warnings.len(), 1);
        assert_eq!(rendered.warnings[0].key, Some(NodeKey(1)));
    }

    #[test]
    fn test_unknown_node_is_placeholder() {
        let embed = DocumentNode::new(
            NodeType::Unknown("embed".to_owned()),
            vec![DocumentNode::image("/inner.png", "inner").into()],
        );
        let rendered = render(vec![embed.into(), DocumentNode::image("/b.png", "b").into()]);

        assert!(rendered.html.contains(r#"data-node-type="embed""#));
        assert!(!rendered.html.contains("inner.png"));
        // doc 0, embed 1, its image 2, sibling image 3
        assert_eq!(rendered.enhancements.len(), 1);
        assert_eq!(rendered.enhancements[0].target(), TargetId::node(NodeKey(3)));
        assert!(rendered.html.contains(r#"data-key="3""#));
    }

    #[test]
    fn test_failed_cell_drops_nested_heading_from_toc() {
        let cell = DocumentNode::table_cell(vec![
            DocumentNode::heading(2, vec![Content::text("Inside")]).into(),
        ])
        .with_attr("align", "diagonal");
        let table = DocumentNode::table(vec![DocumentNode::table_row(vec![cell.into()]).into()]);
        let rendered = render(vec![
            table.into(),
            DocumentNode::heading(2, vec![Content::text("Outside")]).into(),
        ]);

        let ids: Vec<_> = rendered.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["outside"]);
        assert!(rendered.html.contains(r#"data-node-type="tableCell""#));
        assert_eq!(rendered.warnings.len(), 1);
    }

    #[test]
    fn test_failed_cell_releases_heading_id() {
        let cell = DocumentNode::table_cell(vec![
            DocumentNode::heading(2, vec![Content::text("Setup")]).into(),
        ])
        .with_attr("align", "diagonal");
        let table = DocumentNode::table(vec![DocumentNode::table_row(vec![cell.into()]).into()]);
        let rendered = render(vec![
            table.into(),
            DocumentNode::heading(2, vec![Content::text("Setup")]).into(),
        ]);

        let ids: Vec<_> = rendered.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["setup"]);
        assert!(rendered.html.contains(r#"<h2 id="setup""#));
        assert!(!rendered.html.contains("setup-1"));
        assert_eq!(rendered.warnings.len(), 1);
    }

    #[test]
    fn test_code_window_keeps_raw_source() {
        let source = "if a < b {\n    println!(\"<ok>\");\n}";
        let rendered = render(vec![DocumentNode::code_block(Some("rust"), source).into()]);

        assert!(rendered.html.contains(
            r#"<div class="code-window" data-enhance="code" data-key="1" data-language="rust"><pre><code class="language-rust">"#
        ));
        assert!(rendered.html.contains("<span class="));
        assert_eq!(
            rendered.enhancements,
            vec![Enhancement::CodeWindow {
                target: TargetId::node(NodeKey(1)),
                language: Some("rust".to_owned()),
                raw: source.to_owned(),
            }]
        );
    }

    #[test]
    fn test_code_without_highlighting_is_escaped() {
        let doc = DocumentNode::doc(vec![DocumentNode::code_block(None, "<b>").into()]);
        let rendered = plain().render_document(&doc, "en");
        assert!(
            rendered
                .html
                .contains(r#"data-key="1"><pre><code>&lt;b&gt;</code></pre></div>"#)
        );
    }

    #[test]
    fn test_image_zoom_target() {
        let image = DocumentNode::image("/cat.png", "A cat").with_attr("title", "Cat");
        let rendered = render(vec![image.into()]);

        assert!(rendered.html.contains(
            r#"<img src="/cat.png" alt="A cat" title="Cat" loading="lazy" data-enhance="zoom" data-key="1">"#
        ));
        let zooms: Vec<_> = rendered.targets(Behavior::Zoom).collect();
        assert_eq!(
            zooms,
            vec![&Enhancement::Zoom {
                target: TargetId::node(NodeKey(1)),
                src: "/cat.png".to_owned(),
                alt: "A cat".to_owned(),
            }]
        );
    }

    #[test]
    fn test_unsafe_image_src_is_placeholder() {
        let rendered = render(vec![DocumentNode::image("javascript:alert(1)", "x").into()]);
        assert!(!rendered.html.contains("javascript"));
        assert!(rendered.html.contains(r#"data-node-type="image""#));
        assert!(rendered.enhancements.is_empty());
    }

    #[test]
    fn test_external_link_spanning_leaves() {
        let link = Mark::link("https://example.com", None);
        let rendered = render(vec![
            DocumentNode::paragraph(vec![
                Content::text("see "),
                TextLeaf::new("bold")
                    .with_marks(vec![Mark::bold(), link.clone()])
                    .into(),
                TextLeaf::new(" docs").with_mark(link).into(),
            ])
            .into(),
        ]);

        assert!(rendered.html.contains(
            r#"<p>see <a href="https://example.com" class="external-link" rel="noopener noreferrer" target="_blank" data-enhance="link-preview" data-key="1.1"><strong>bold</strong> docs</a></p>"#
        ));
        assert_eq!(
            rendered.enhancements,
            vec![Enhancement::LinkPreview {
                target: TargetId {
                    node: NodeKey(1),
                    slot: 1,
                },
                href: "https://example.com".to_owned(),
                inner_html: "<strong>bold</strong> docs".to_owned(),
                class: "external-link".to_owned(),
            }]
        );
    }

    #[test]
    fn test_internal_link_is_plain() {
        let rendered = render(vec![
            DocumentNode::paragraph(vec![
                TextLeaf::new("About")
                    .with_mark(Mark::link("/about", Some("About us")))
                    .into(),
            ])
            .into(),
        ]);
        assert!(
            rendered
                .html
                .contains(r#"<p><a href="/about" title="About us">About</a></p>"#)
        );
        assert!(rendered.enhancements.is_empty());
    }

    #[test]
    fn test_non_http_links_have_no_preview() {
        let rendered = render(vec![
            DocumentNode::paragraph(vec![
                TextLeaf::new("mail")
                    .with_mark(Mark::link("mailto:me@example.com", None))
                    .into(),
                TextLeaf::new("docs").with_mark(Mark::link("docs/x", None)).into(),
            ])
            .into(),
        ]);
        assert!(rendered.html.contains(
            r#"<p><a href="mailto:me@example.com">mail</a><a href="docs/x">docs</a></p>"#
        ));
        assert!(rendered.enhancements.is_empty());
    }

    #[test]
    fn test_unsafe_link_keeps_text() {
        let rendered = render(vec![
            DocumentNode::paragraph(vec![
                TextLeaf::new("click")
                    .with_mark(Mark::link("javascript:alert(1)", None))
                    .into(),
            ])
            .into(),
        ]);
        assert!(rendered.html.contains("<p>click</p>"));
        assert_eq!(rendered.warnings.len(), 1);
        assert_eq!(rendered.warnings[0].key, Some(NodeKey(1)));
    }

    #[test]
    fn test_color_mark() {
        let rendered = render(vec![
            DocumentNode::paragraph(vec![
                TextLeaf::new("red").with_mark(Mark::color("#f00")).into(),
                TextLeaf::new("bad")
                    .with_mark(Mark::color("red;background:url(x)"))
                    .into(),
            ])
            .into(),
        ]);
        assert!(
            rendered
                .html
                .contains(r#"<p><span style="color:#f00">red</span>bad</p>"#)
        );
        assert_eq!(rendered.warnings.len(), 1);
    }

    #[test]
    fn test_lists_and_tasks() {
        let rendered = render(vec![
            DocumentNode::ordered_list(
                3,
                vec![
                    DocumentNode::list_item(vec![
                        DocumentNode::paragraph(vec![Content::text("three")]).into(),
                    ])
                    .into(),
                ],
            )
            .into(),
            DocumentNode::task_list(vec![
                DocumentNode::task_item(
                    true,
                    vec![DocumentNode::paragraph(vec![Content::text("done")]).into()],
                )
                .into(),
            ])
            .into(),
        ]);
        assert!(
            rendered
                .html
                .contains(r#"<ol start="3"><li><p>three</p></li></ol>"#)
        );
        assert!(rendered.html.contains(
            r#"<ul class="task-list"><li class="task-item" data-checked="true"><input type="checkbox" checked disabled> <p>done</p></li></ul>"#
        ));
    }

    #[test]
    fn test_table_sections() {
        let rendered = render(vec![
            DocumentNode::table(vec![
                DocumentNode::table_row(vec![
                    DocumentNode::table_header(vec![
                        DocumentNode::paragraph(vec![Content::text("H")]).into(),
                    ])
                    .with_attr("align", "center")
                    .into(),
                ])
                .into(),
                DocumentNode::table_row(vec![
                    DocumentNode::table_cell(vec![
                        DocumentNode::paragraph(vec![Content::text("c")]).into(),
                    ])
                    .into(),
                ])
                .into(),
            ])
            .into(),
        ]);
        assert!(rendered.html.contains(
            r#"<table><thead><tr><th style="text-align:center"><p>H</p></th></tr></thead><tbody><tr><td><p>c</p></td></tr></tbody></table>"#
        ));
    }

    #[test]
    fn test_math_nodes() {
        let rendered = render(vec![
            DocumentNode::math_block(r"\frac{a}{b}").into(),
            DocumentNode::paragraph(vec![
                Content::text("x is "),
                DocumentNode::inline_math(r"\frac{1").into(),
            ])
            .into(),
        ]);
        assert!(
            rendered
                .html
                .contains(r#"<div class="math-block"><div class="math math-display"><math"#)
        );
        assert!(rendered.html.contains(r#"<span class="math math-error math-inline""#));
        assert_eq!(rendered.warnings.len(), 1);
        assert_eq!(rendered.warnings[0].node_type, "inlineMath");
    }

    #[test]
    fn test_legacy_markdown_with_math() {
        let body = ContentBody::from("# Title\n\nEnergy $E=mc^2$.\n");
        let rendered = Renderer::default().render(&body, "en");

        assert_eq!(rendered.toc[0].id, "title");
        assert!(rendered.html.contains(r#"<span class="math math-inline"><math"#));
        assert!(rendered.warnings.is_empty());
    }

    #[test]
    fn test_legacy_markdown_opening_with_rule() {
        let body = ContentBody::from("---\n\nIntro paragraph\n\n---\n\n# Real\n");
        let rendered = Renderer::default().render(&body, "en");

        assert!(rendered.html.contains("<p>Intro paragraph</p>"));
        assert_eq!(rendered.html.matches("<hr>").count(), 2);
        assert_eq!(rendered.toc[0].id, "real");
    }

    #[test]
    fn test_legacy_markdown_falls_back_to_source() {
        let body = ContentBody::from("[ref]: https://example.com\n");
        let rendered = Renderer::default().render(&body, "en");

        assert!(rendered.html.contains(
            r#"<pre class="markdown-source">[ref]: https://example.com
</pre>"#
        ));
        assert!(rendered.toc.is_empty());
        assert_eq!(rendered.warnings.len(), 2);
        assert!(rendered.warnings.iter().all(|w| w.key.is_none()));
    }

    #[test]
    fn test_renderer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Renderer>();
    }

    #[test]
    fn test_css_for_theme() {
        assert!(Renderer::default().css().unwrap().contains('{'));
        let renderer = Renderer::new(RenderOptions {
            theme: "no-such-theme".to_owned(),
            ..RenderOptions::default()
        });
        assert!(matches!(renderer.css(), Err(ThemeError::Unknown(_))));
    }
}
