//! Code window decoration and copy.

use folio_renderer::{TargetId, escape_html};

/// Error writing to the system clipboard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("clipboard write failed: {0}")]
pub struct ClipboardError(pub String);

/// Destination of copy actions.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// A `String` sink holds the last copied text.
impl ClipboardSink for String {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.clear();
        self.push_str(text);
        Ok(())
    }
}

/// Decoration state of one code block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeWindow {
    target: TargetId,
    language: Option<String>,
    raw: String,
    copied: bool,
}

impl CodeWindow {
    pub(crate) fn new(target: TargetId, language: Option<String>, raw: String) -> Self {
        Self {
            target,
            language,
            raw,
            copied: false,
        }
    }

    #[must_use]
    pub fn target(&self) -> TargetId {
        self.target
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Source text captured at render time.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn copied(&self) -> bool {
        self.copied
    }

    /// Copy the raw source.
    pub fn copy(&mut self, sink: &mut dyn ClipboardSink) -> Result<(), ClipboardError> {
        let result = sink.write_text(&self.raw);
        self.copied = result.is_ok();
        if let Err(e) = &result {
            tracing::debug!(key = %self.target, error = %e, "Copy failed");
        }
        result
    }

    /// Title bar with window controls, language label and copy button.
    #[must_use]
    pub fn title_bar_html(&self) -> String {
        let label = self.language.as_deref().unwrap_or("text");
        let button = if self.copied { "Copied" } else { "Copy" };
        format!(
            concat!(
                r#"<div class="code-window-bar">"#,
                r#"<span class="code-window-dot code-window-close"></span>"#,
                r#"<span class="code-window-dot code-window-minimize"></span>"#,
                r#"<span class="code-window-dot code-window-maximize"></span>"#,
                r#"<span class="code-window-title">{label}</span>"#,
                r#"<button type="button" class="code-copy" data-key="{key}" aria-label="Copy code">{button}</button>"#,
                "</div>"
            ),
            label = escape_html(label),
            key = self.target,
            button = button,
        )
    }
}

#[cfg(test)]
mod tests {
    use folio_renderer::NodeKey;

    use super::*;

    struct Broken;

    impl ClipboardSink for Broken {
        fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError("permission denied".to_owned()))
        }
    }

    fn window() -> CodeWindow {
        CodeWindow::new(
            TargetId::node(NodeKey(2)),
            Some("rust".to_owned()),
            "let x = \"<y>\";".to_owned(),
        )
    }

    #[test]
    fn test_copy_writes_raw_text() {
        let mut window = window();
        let mut clipboard = String::from("old");
        window.copy(&mut clipboard).unwrap();
        assert_eq!(clipboard, "let x = \"<y>\";");
        assert!(window.copied());
        assert!(window.title_bar_html().contains(">Copied</button>"));
    }

    #[test]
    fn test_copy_failure() {
        let mut window = window();
        assert!(window.copy(&mut Broken).is_err());
        assert!(!window.copied());
    }

    #[test]
    fn test_title_bar() {
        let html = window().title_bar_html();
        assert_eq!(html.matches("code-window-dot").count(), 3);
        assert!(html.contains(r#"<span class="code-window-title">rust</span>"#));
        assert!(html.contains(r#"data-key="2""#));

        let plain = CodeWindow::new(TargetId::node(NodeKey(1)), None, String::new());
        assert!(plain.title_bar_html().contains(">text</span>"));
    }
}
