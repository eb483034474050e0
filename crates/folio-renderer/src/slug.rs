//! Heading anchors.

use std::collections::{HashMap, HashSet};

/// Convert heading text to an anchor slug.
///
/// Unicode alphanumerics are kept and lowercased; runs of whitespace, `-`
/// and `_` collapse to one dash; everything else is dropped. Text with
/// nothing left becomes `section`.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }
    if result.is_empty() {
        result.push_str("section");
    }
    result
}

/// Issues unique anchor ids within one document.
///
/// Collisions get `-1`, `-2`, ... appended. An id is never issued twice,
/// even when a heading's own text slugifies to an earlier generated suffix.
#[derive(Debug, Default)]
pub struct SlugRegistry {
    issued: HashSet<String>,
    counts: HashMap<String, usize>,
}

impl SlugRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut n = self.counts.get(&base).copied().unwrap_or(0);
        let mut candidate = if n == 0 {
            base.clone()
        } else {
            format!("{base}-{n}")
        };
        while self.issued.contains(&candidate) {
            n += 1;
            candidate = format!("{base}-{n}");
        }
        self.counts.insert(base, n + 1);
        self.issued.insert(candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("snake_case"), "snake-case");
        assert_eq!(slugify("설치 방법"), "설치-방법");
        assert_eq!(slugify("Ünïcode Straße"), "ünïcode-straße");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "section");
        assert_eq!(slugify("?!"), "section");
    }

    #[test]
    fn test_registry_suffixes() {
        let mut registry = SlugRegistry::new();
        assert_eq!(registry.issue("FAQ"), "faq");
        assert_eq!(registry.issue("FAQ"), "faq-1");
        assert_eq!(registry.issue("FAQ"), "faq-2");
    }

    #[test]
    fn test_registry_never_reissues() {
        let mut registry = SlugRegistry::new();
        assert_eq!(registry.issue("FAQ"), "faq");
        assert_eq!(registry.issue("FAQ 1"), "faq-1");
        assert_eq!(registry.issue("FAQ"), "faq-2");
        assert_eq!(registry.issue("faq-2"), "faq-2-1");
    }
}
