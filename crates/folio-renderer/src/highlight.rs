//! Syntax highlighting with `syntect` class-style spans.

use std::sync::LazyLock;

use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Error producing a highlighting stylesheet.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("unknown highlight theme `{0}`")]
    Unknown(String),
    #[error("failed to generate theme CSS: {0}")]
    Css(#[from] syntect::Error),
}

/// Guess a language from the first line (shebangs, modelines).
pub(crate) fn detect_language(raw: &str) -> Option<String> {
    let first = raw.lines().next()?;
    let syntax = SYNTAX_SET.find_syntax_by_first_line(first)?;
    Some(
        syntax
            .file_extensions
            .first()
            .cloned()
            .unwrap_or_else(|| syntax.name.to_lowercase()),
    )
}

/// Highlight `raw` as `language` into classed spans.
///
/// Returns `None` for unknown languages or when `syntect` fails, in which
/// case the caller emits escaped text.
pub(crate) fn highlight(raw: &str, language: &str) -> Option<String> {
    let syntax = SYNTAX_SET.find_syntax_by_token(language)?;
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
    for line in LinesWithEndings::from(raw) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::debug!(language, error = %e, "Highlighting failed");
            return None;
        }
    }
    Some(generator.finalize())
}

/// Stylesheet for the class names emitted by the renderer.
pub fn highlight_css(theme: &str) -> Result<String, ThemeError> {
    let theme_def = THEME_SET
        .themes
        .get(theme)
        .ok_or_else(|| ThemeError::Unknown(theme.to_owned()))?;
    Ok(css_for_theme_with_class_style(theme_def, ClassStyle::Spaced)?)
}

/// Names of the bundled highlight themes, sorted.
#[must_use]
pub fn theme_names() -> Vec<&'static str> {
    THEME_SET.themes.keys().map(String::as_str).collect()
}
