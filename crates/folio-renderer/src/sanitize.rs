//! Escaping and attribute sanitization.

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Whether an anchor leaves the site (href not starting with `/` or `#`).
#[must_use]
pub fn is_external(href: &str) -> bool {
    !href.starts_with('/') && !href.starts_with('#')
}

/// Whether an external anchor gets a hover preview: only `http` and
/// `https` targets have metadata to fetch.
#[must_use]
pub fn is_previewable(href: &str) -> bool {
    is_external(href) && matches!(scheme(href).as_deref(), Some("http" | "https"))
}

/// Scheme of a URL, lowercased, ignoring embedded whitespace and control
/// characters (`java\tscript:` is `javascript`).
fn scheme(url: &str) -> Option<String> {
    let compact: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let (scheme, _) = compact.split_once(':')?;
    if scheme.is_empty() || scheme.contains(['/', '?', '#']) {
        return None;
    }
    Some(scheme.to_ascii_lowercase())
}

/// Return the trimmed href if it is safe to emit, `None` otherwise.
///
/// Relative URLs and `http`, `https`, `mailto`, `tel` are allowed.
#[must_use]
pub fn sanitize_href(href: &str) -> Option<&str> {
    let trimmed = href.trim();
    if trimmed.is_empty() {
        return None;
    }
    match scheme(trimmed).as_deref() {
        None | Some("http" | "https" | "mailto" | "tel") => Some(trimmed),
        Some(_) => None,
    }
}

/// Like [`sanitize_href`] for image sources, additionally allowing inline
/// `data:image/...` URLs.
#[must_use]
pub fn sanitize_src(src: &str) -> Option<&str> {
    let trimmed = src.trim();
    match scheme(trimmed).as_deref() {
        Some("data") if trimmed.get(..11).is_some_and(|p| p.eq_ignore_ascii_case("data:image/")) => {
            Some(trimmed)
        }
        Some("mailto" | "tel") => None,
        _ => sanitize_href(trimmed),
    }
}

/// Return the color if it is a plain CSS color value.
///
/// Accepts hex (`#rgb`, `#rrggbb`, `#rrggbbaa`), named colors,
/// `rgb()/rgba()/hsl()/hsla()` with numeric arguments and `var(--name)`.
#[must_use]
pub fn sanitize_color(color: &str) -> Option<&str> {
    let c = color.trim();
    let valid = if let Some(hex) = c.strip_prefix('#') {
        matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|ch| ch.is_ascii_hexdigit())
    } else if let Some(name) = c.strip_prefix("var(--").and_then(|r| r.strip_suffix(')')) {
        !name.is_empty() && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    } else if let Some((func, args)) = c.split_once('(') {
        matches!(func, "rgb" | "rgba" | "hsl" | "hsla")
            && args.strip_suffix(')').is_some_and(|args| {
                args.chars()
                    .all(|ch| ch.is_ascii_digit() || matches!(ch, ',' | '.' | '%' | ' ' | '/'))
            })
    } else {
        !c.is_empty() && c.len() <= 32 && c.chars().all(|ch| ch.is_ascii_alphabetic())
    };
    valid.then_some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_is_external() {
        assert!(is_external("https://example.com"));
        assert!(is_external("mailto:a@b.c"));
        assert!(!is_external("/posts/a"));
        assert!(!is_external("#install"));
    }

    #[test]
    fn test_is_previewable() {
        assert!(is_previewable("https://example.com"));
        assert!(is_previewable("HTTP://example.com"));
        assert!(!is_previewable("mailto:a@b.c"));
        assert!(!is_previewable("tel:+82"));
        assert!(!is_previewable("docs/x"));
        assert!(!is_previewable("/posts/a"));
    }

    #[test]
    fn test_sanitize_href() {
        assert_eq!(sanitize_href(" https://a.com "), Some("https://a.com"));
        assert_eq!(sanitize_href("/about"), Some("/about"));
        assert_eq!(sanitize_href("notes/a:b"), Some("notes/a:b"));
        assert_eq!(sanitize_href("javascript:alert(1)"), None);
        assert_eq!(sanitize_href("JaVa\tScript:alert(1)"), None);
        assert_eq!(sanitize_href("vbscript:x"), None);
        assert_eq!(sanitize_href(""), None);
    }

    #[test]
    fn test_sanitize_src() {
        assert_eq!(sanitize_src("data:image/png;base64,AA"), Some("data:image/png;base64,AA"));
        assert_eq!(sanitize_src("data:text/html,<b>"), None);
        assert_eq!(sanitize_src("mailto:x"), None);
        assert_eq!(sanitize_src("/img/a.png"), Some("/img/a.png"));
    }

    #[test]
    fn test_sanitize_color() {
        for ok in ["#f00", "#ff000080", "red", "rgb(1, 2, 3)", "hsl(10 20% 30%)", "var(--accent)"] {
            assert_eq!(sanitize_color(ok), Some(ok), "{ok}");
        }
        for bad in ["red;background:url(x)", "expression(alert(1))", "#ggg", "url(x)", ""] {
            assert_eq!(sanitize_color(bad), None, "{bad}");
        }
    }
}
