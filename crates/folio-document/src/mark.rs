//! Inline marks on text leaves.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::node::{Attrs, NodeError};

/// Mark type tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MarkType {
    Bold,
    Italic,
    Strike,
    Code,
    Link,
    Color,
    Unknown(String),
}

impl MarkType {
    /// Parse a tag name; `textStyle` is the editor's name for colored text.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "strike" => Self::Strike,
            "code" => Self::Code,
            "link" => Self::Link,
            "color" | "textStyle" => Self::Color,
            other => Self::Unknown(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Strike => "strike",
            Self::Code => "code",
            Self::Link => "link",
            Self::Color => "color",
            Self::Unknown(name) => name,
        }
    }
}

impl Serialize for MarkType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MarkType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// Inline mark: a type tag plus attributes (`href` for links, `color` for color).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: MarkType,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

impl Mark {
    fn simple(mark_type: MarkType) -> Self {
        Self {
            mark_type,
            attrs: Attrs::new(),
        }
    }

    #[must_use]
    pub fn bold() -> Self {
        Self::simple(MarkType::Bold)
    }

    #[must_use]
    pub fn italic() -> Self {
        Self::simple(MarkType::Italic)
    }

    #[must_use]
    pub fn strike() -> Self {
        Self::simple(MarkType::Strike)
    }

    #[must_use]
    pub fn code() -> Self {
        Self::simple(MarkType::Code)
    }

    /// Link mark; an empty `title` is omitted.
    #[must_use]
    pub fn link(href: impl Into<String>, title: Option<&str>) -> Self {
        let mut mark = Self::simple(MarkType::Link);
        mark.attrs.insert("href".to_owned(), Value::String(href.into()));
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            mark.attrs.insert("title".to_owned(), Value::String(title.to_owned()));
        }
        mark
    }

    #[must_use]
    pub fn color(color: impl Into<String>) -> Self {
        let mut mark = Self::simple(MarkType::Color);
        mark.attrs.insert("color".to_owned(), Value::String(color.into()));
        mark
    }

    fn attr_str(&self, attr: &'static str) -> Result<&str, NodeError> {
        match self.attrs.get(attr) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s),
            None | Some(Value::Null) => Err(NodeError::MissingAttr {
                node: format!("{} mark", self.mark_type.as_str()),
                attr,
            }),
            Some(other) => Err(NodeError::InvalidAttr {
                node: format!("{} mark", self.mark_type.as_str()),
                attr,
                reason: format!("expected non-empty string, got {other}"),
            }),
        }
    }

    /// Link target.
    pub fn href(&self) -> Result<&str, NodeError> {
        self.attr_str("href")
    }

    /// Optional link title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.attrs.get("title").and_then(Value::as_str)
    }

    /// Text color as authored (unsanitized).
    pub fn color_value(&self) -> Result<&str, NodeError> {
        self.attr_str("color")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_simple_mark_json() {
        let mark: Mark = serde_json::from_value(json!({"type": "italic"})).unwrap();
        assert_eq!(mark, Mark::italic());
        assert_eq!(serde_json::to_value(Mark::bold()).unwrap(), json!({"type": "bold"}));
    }

    #[test]
    fn test_text_style_alias() {
        let mark: Mark =
            serde_json::from_value(json!({"type": "textStyle", "attrs": {"color": "#f00"}}))
                .unwrap();
        assert_eq!(mark.mark_type, MarkType::Color);
        assert_eq!(mark.color_value(), Ok("#f00"));
    }

    #[test]
    fn test_link_attrs() {
        let mark = Mark::link("https://example.com", Some(""));
        assert_eq!(mark.href(), Ok("https://example.com"));
        assert_eq!(mark.title(), None);

        let mark = Mark::link("/about", Some("About"));
        assert_eq!(mark.title(), Some("About"));
    }

    #[test]
    fn test_link_without_href_is_error() {
        let mark: Mark = serde_json::from_value(json!({"type": "link"})).unwrap();
        assert!(matches!(mark.href(), Err(NodeError::MissingAttr { .. })));
    }

    #[test]
    fn test_unknown_mark_preserved() {
        let mark: Mark = serde_json::from_value(json!({"type": "highlight"})).unwrap();
        assert_eq!(mark.mark_type, MarkType::Unknown("highlight".to_owned()));
    }
}
