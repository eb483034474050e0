//! YAML front matter splitting.

/// Split a leading `---` delimited YAML block from Markdown text.
///
/// Returns `(Some(yaml), body)` when the text opens with a front matter block,
/// otherwise `(None, text)`. The closing delimiter must sit on its own line.
///
/// ```
/// use folio_markdown::split_front_matter;
///
/// let (yaml, body) = split_front_matter("---\ntitle: Hi\n---\n# Body\n");
/// assert_eq!(yaml, Some("title: Hi\n"));
/// assert_eq!(body, "# Body\n");
/// ```
#[must_use]
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let text_no_bom = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(rest) = text_no_bom
        .strip_prefix("---\n")
        .or_else(|| text_no_bom.strip_prefix("---\r\n"))
    else {
        return (None, text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }
    (None, text)
}
