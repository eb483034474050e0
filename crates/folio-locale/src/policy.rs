//! Fallback chain construction.

use std::collections::HashMap;

use crate::locale::Locale;

/// Ordered fallback configuration.
///
/// The chain for a requested locale is
/// `[requested] ++ (override list, or its language when language fallback
/// applies) ++ [canonical]`, deduplicated keeping the first occurrence, with
/// the canonical locale always last.
#[derive(Clone, Debug)]
pub struct FallbackPolicy {
    canonical: Locale,
    overrides: HashMap<Locale, Vec<Locale>>,
    language_fallback: bool,
}

impl FallbackPolicy {
    /// Policy with language fallback enabled and no overrides.
    #[must_use]
    pub fn new(canonical: Locale) -> Self {
        Self {
            canonical,
            overrides: HashMap::new(),
            language_fallback: true,
        }
    }

    /// Replace the intermediate fallbacks for `locale`.
    #[must_use]
    pub fn with_override(mut self, locale: Locale, fallbacks: Vec<Locale>) -> Self {
        self.overrides.insert(locale, fallbacks);
        self
    }

    /// Try `pt` between `pt-BR` and the canonical locale.
    #[must_use]
    pub fn with_language_fallback(mut self, enabled: bool) -> Self {
        self.language_fallback = enabled;
        self
    }

    #[must_use]
    pub fn canonical(&self) -> &Locale {
        &self.canonical
    }

    /// Build the chain for a raw requested tag.
    ///
    /// An unparseable tag yields `[canonical]`.
    #[must_use]
    pub fn chain(&self, requested: &str) -> Vec<Locale> {
        match Locale::parse(requested) {
            Ok(locale) => self.chain_for(&locale),
            Err(e) => {
                tracing::debug!(requested, error = %e, "Unparseable locale, using canonical");
                vec![self.canonical.clone()]
            }
        }
    }

    /// Build the chain for a parsed locale.
    #[must_use]
    pub fn chain_for(&self, requested: &Locale) -> Vec<Locale> {
        let mut candidates = vec![requested.clone()];
        match self.overrides.get(requested) {
            Some(fallbacks) => candidates.extend(fallbacks.iter().cloned()),
            None if self.language_fallback && requested.is_specific() => {
                candidates.push(requested.language());
            }
            None => {}
        }

        let mut chain: Vec<Locale> = Vec::with_capacity(candidates.len() + 1);
        for locale in candidates {
            if locale != self.canonical && !chain.contains(&locale) {
                chain.push(locale);
            }
        }
        chain.push(self.canonical.clone());
        chain
    }
}
