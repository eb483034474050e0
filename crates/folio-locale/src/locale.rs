//! Locale tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Invalid locale tag.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid locale tag `{tag}`: {reason}")]
pub struct LocaleError {
    pub tag: String,
    pub reason: &'static str,
}

/// Normalized BCP 47 style locale tag (`ko`, `en`, `pt-BR`, `zh-Hant-TW`).
///
/// Parsing accepts `-` or `_` separators and normalizes case: language
/// lowercase, script titlecase, region uppercase, variants lowercase.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn parse(tag: &str) -> Result<Self, LocaleError> {
        let err = |reason| LocaleError {
            tag: tag.to_owned(),
            reason,
        };

        let mut subtags = tag.trim().split(['-', '_']);
        let language = subtags.next().unwrap_or_default();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(err("language must be 2-3 letters"));
        }
        let mut normalized = language.to_ascii_lowercase();

        // Position: 0 = expecting script, 1 = expecting region, 2 = variants only.
        let mut position = 0;
        for subtag in subtags {
            let alpha = subtag.chars().all(|c| c.is_ascii_alphabetic());
            let digits = subtag.chars().all(|c| c.is_ascii_digit());
            let alnum = subtag.chars().all(|c| c.is_ascii_alphanumeric());
            normalized.push('-');
            if position == 0 && subtag.len() == 4 && alpha {
                let mut chars = subtag.chars();
                if let Some(first) = chars.next() {
                    normalized.push(first.to_ascii_uppercase());
                }
                normalized.push_str(&chars.as_str().to_ascii_lowercase());
                position = 1;
            } else if position <= 1 && ((subtag.len() == 2 && alpha) || (subtag.len() == 3 && digits))
            {
                normalized.push_str(&subtag.to_ascii_uppercase());
                position = 2;
            } else if (5..=8).contains(&subtag.len()) && alnum {
                normalized.push_str(&subtag.to_ascii_lowercase());
                position = 2;
            } else {
                return Err(err("unrecognized subtag"));
            }
        }

        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The language-general locale (`pt-BR` → `pt`).
    #[must_use]
    pub fn language(&self) -> Locale {
        let language = self.0.split('-').next().unwrap_or(&self.0);
        Self(language.to_owned())
    }

    /// Whether the tag carries subtags beyond the language.
    #[must_use]
    pub fn is_specific(&self) -> bool {
        self.0.contains('-')
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
