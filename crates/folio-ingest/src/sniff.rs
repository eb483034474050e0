//! Markdown detection for pasted text.

use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::RegexSet;
use serde::Deserialize;

/// How pasted text is classified as Markdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SniffMode {
    /// Line-level pattern matching for common Markdown syntax.
    #[default]
    Heuristic,
    /// A parse of the text; anything beyond plain paragraphs counts.
    Structural,
}

/// Markdown syntax recognized by the heuristic sniffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Heading,
    List,
    Blockquote,
    Fence,
    Emphasis,
    InlineCode,
    Table,
    Math,
    Html,
    Footnote,
    Link,
}

const TRIGGERS: [(Trigger, &str); 11] = [
    (Trigger::Heading, r"(?m)^ {0,3}#{1,6}[ \t]+\S"),
    (Trigger::List, r"(?m)^[ \t]*(?:[-*+]|\d{1,9}[.)])[ \t]+\S"),
    (Trigger::Blockquote, r"(?m)^ {0,3}>"),
    (Trigger::Fence, r"(?m)^ {0,3}(?:```|~~~)"),
    (
        Trigger::Emphasis,
        r"\*\*\S(?:.*?\S)?\*\*|__\S(?:.*?\S)?__|~~\S(?:.*?\S)?~~|(?:^|[^\w*])\*[^\s*](?:[^*\n]*[^\s*])?\*",
    ),
    (Trigger::InlineCode, r"`[^`\n]+`"),
    (Trigger::Table, r"(?m)^[ \t]*\|.*\|[ \t]*$"),
    (Trigger::Math, r"\$\$|\$[^\s$](?:[^$\n]*[^\s$])?\$"),
    (Trigger::Html, r"</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>"),
    (Trigger::Footnote, r"\[\^[^\]\s]+\]"),
    (Trigger::Link, r"!?\[[^\]\n]+\]\([^)\s]+\)"),
];

static HEURISTIC: LazyLock<RegexSet> =
    LazyLock::new(|| RegexSet::new(TRIGGERS.iter().map(|(_, pattern)| pattern)).unwrap());

/// Triggers matched anywhere in `text`, in declaration order.
#[must_use]
pub fn heuristic_triggers(text: &str) -> Vec<Trigger> {
    HEURISTIC
        .matches(text)
        .into_iter()
        .map(|i| TRIGGERS[i].0)
        .collect()
}

/// Whether `text` should be handled as Markdown.
#[must_use]
pub fn looks_like_markdown(text: &str, mode: SniffMode) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    match mode {
        SniffMode::Heuristic => HEURISTIC.is_match(text),
        SniffMode::Structural => has_structure(text),
    }
}

fn has_structure(text: &str) -> bool {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_MATH;
    Parser::new_ext(text, options).any(|event| {
        !matches!(
            event,
            Event::Start(Tag::Paragraph)
                | Event::End(TagEnd::Paragraph)
                | Event::Text(_)
                | Event::SoftBreak
                | Event::HardBreak
        )
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_text_is_not_markdown() {
        for mode in [SniffMode::Heuristic, SniffMode::Structural] {
            assert!(!looks_like_markdown("hello world", mode));
            assert!(!looks_like_markdown("   \n", mode));
        }
        assert!(!looks_like_markdown(
            "It costs $5 and $10.\nSee you.",
            SniffMode::Heuristic
        ));
    }

    #[test]
    fn test_heading_and_list() {
        let text = "# Title\n\n- a\n- b";
        assert_eq!(
            heuristic_triggers(text),
            vec![Trigger::Heading, Trigger::List]
        );
        assert!(looks_like_markdown(text, SniffMode::Structural));
    }

    #[test]
    fn test_each_trigger() {
        let cases = [
            ("> quoted", Trigger::Blockquote),
            ("```\ncode\n```", Trigger::Fence),
            ("some **bold** text", Trigger::Emphasis),
            ("an *aside* here", Trigger::Emphasis),
            ("run `ls`", Trigger::InlineCode),
            ("| a | b |", Trigger::Table),
            ("area $\\pi r^2$", Trigger::Math),
            ("<kbd>Ctrl</kbd>", Trigger::Html),
            ("claim[^1]", Trigger::Footnote),
            ("see [docs](https://x.dev)", Trigger::Link),
            ("1. first", Trigger::List),
        ];
        for (text, trigger) in cases {
            assert!(
                heuristic_triggers(text).contains(&trigger),
                "{text:?} should trigger {trigger:?}"
            );
        }
    }

    #[test]
    fn test_heading_needs_space() {
        assert!(heuristic_triggers("#hashtag").is_empty());
        assert!(heuristic_triggers("2 * 3 * 4").is_empty());
    }

    #[test]
    fn test_structural_detects_inline_markup() {
        assert!(looks_like_markdown("a *b* c", SniffMode::Structural));
        assert!(looks_like_markdown("x\n\n---\n", SniffMode::Structural));
        assert!(!looks_like_markdown("two\nlines", SniffMode::Structural));
    }
}
