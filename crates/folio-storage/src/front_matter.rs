//! Legacy Markdown records with YAML front matter.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use folio_document::ContentBody;
use folio_markdown::split_front_matter;
use regex::Regex;
use serde::Deserialize;

use crate::record::ContentRecord;

static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*#*[ \t]*$").unwrap());

/// Parsed front matter fields.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Tags,
}

/// `tags` written as a YAML list or a comma-separated string.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
pub(crate) enum Tags {
    #[default]
    None,
    List(Vec<String>),
    Joined(String),
}

impl Tags {
    fn into_set(self) -> BTreeSet<String> {
        let raw = match self {
            Self::None => Vec::new(),
            Self::List(list) => list,
            Self::Joined(joined) => joined.split(',').map(str::to_owned).collect(),
        };
        raw.into_iter()
            .map(|tag| tag.trim().to_owned())
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

/// How a leading `---` block reads.
#[derive(Debug)]
pub(crate) enum Block {
    /// A YAML mapping (or an empty block) with the expected fields.
    Fields(FrontMatter),
    /// A YAML mapping whose fields have the wrong shape.
    Invalid,
    /// Not a mapping. The block belongs to the body.
    Body,
}

/// Classify the content between the `---` fences.
pub(crate) fn classify_block(yaml: &str) -> Block {
    if yaml.trim().is_empty() {
        return Block::Fields(FrontMatter::default());
    }
    match serde_yaml::from_str::<serde_yaml::Value>(yaml) {
        Ok(value @ serde_yaml::Value::Mapping(_)) => {
            serde_yaml::from_value(value).map_or(Block::Invalid, Block::Fields)
        }
        _ => Block::Body,
    }
}

/// Build a record from a legacy Markdown file.
///
/// Missing or malformed front matter yields defaults. The title falls back
/// to the first H1 of the body, then to the slug. The body keeps the
/// Markdown without its front matter. A leading `---` block that is not a
/// YAML mapping stays in the body, so a post opening with a horizontal
/// rule keeps its first section.
pub(crate) fn parse_legacy(slug: &str, locale: &str, text: &str) -> ContentRecord {
    let (fields, body) = match split_front_matter(text) {
        (Some(yaml), rest) => match classify_block(yaml) {
            Block::Fields(fields) => (fields, rest),
            Block::Invalid => {
                tracing::warn!(slug, locale, "Ignoring invalid front matter");
                (FrontMatter::default(), rest)
            }
            Block::Body => (FrontMatter::default(), text),
        },
        (None, _) => (FrontMatter::default(), text),
    };

    let title = fields
        .title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| first_h1(body))
        .unwrap_or_else(|| slug.to_owned());

    let mut record = ContentRecord::new(slug, locale, title, ContentBody::Markdown(body.to_owned()));
    record.summary = fields.summary.unwrap_or_default();
    record.tags = fields.tags.into_set();
    record.category = fields.category;
    record.updated_at = fields.date.clone().unwrap_or_default();
    record.published_at = fields.date;
    record
}

fn first_h1(markdown: &str) -> Option<String> {
    H1_RE
        .captures(markdown)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_owned())
}
