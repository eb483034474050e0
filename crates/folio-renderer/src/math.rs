//! LaTeX math rendering via pulldown-latex → MathML.

use pulldown_latex::config::{DisplayMode, RenderConfig};
use pulldown_latex::mathml::push_mathml;
use pulldown_latex::{Parser, Storage};

use crate::sanitize::escape_html;

/// Render LaTeX to MathML.
///
/// On failure returns the error message; the caller emits
/// [`error_html`] in its place.
pub(crate) fn render_math(latex: &str, display: bool) -> Result<String, String> {
    let storage = Storage::new();
    let parser = Parser::new(latex, &storage);
    let config = RenderConfig {
        display_mode: if display {
            DisplayMode::Block
        } else {
            DisplayMode::Inline
        },
        ..Default::default()
    };

    let events: Vec<_> = parser.collect();
    let errors: Vec<String> = events
        .iter()
        .filter_map(|e| e.as_ref().err().map(ToString::to_string))
        .collect();
    if !errors.is_empty() {
        return Err(errors.join("; "));
    }

    let mut mathml = String::new();
    push_mathml(&mut mathml, events.into_iter(), config).map_err(|e| e.to_string())?;
    Ok(mathml)
}

/// Escaped source span shown when math fails to render.
pub(crate) fn error_html(latex: &str, error: &str, display: bool) -> String {
    let mode_class = if display { "math-display" } else { "math-inline" };
    format!(
        r#"<span class="math math-error {mode_class}" title="{}"><code>{}</code></span>"#,
        escape_html(error),
        escape_html(latex)
    )
}
