//! Record lookup along the fallback chain.

use std::sync::Arc;

use folio_storage::{ContentRecord, Storage};

use crate::locale::Locale;
use crate::policy::FallbackPolicy;

/// No record exists anywhere on the fallback chain.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("no record for `{slug}` (tried {})", join_tags(.tried))]
pub struct LocaleMiss {
    pub slug: String,
    /// Locales queried, in order.
    pub tried: Vec<Locale>,
}

fn join_tags(tried: &[Locale]) -> String {
    tried
        .iter()
        .map(Locale::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A successful lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    pub record: ContentRecord,
    /// Locale the record was found under.
    pub served: Locale,
    /// Position of `served` in the chain; 0 means the requested locale.
    pub depth: usize,
}

impl Resolution {
    /// Whether a locale other than the first candidate was served.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.depth > 0
    }
}

/// Resolves (slug, requested locale) to the best available record.
///
/// Lookups run sequentially in chain order. A storage error is logged and
/// treated as a miss for that locale; nothing is retried.
pub struct LocaleResolver {
    storage: Arc<dyn Storage>,
    policy: FallbackPolicy,
}

impl LocaleResolver {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, policy: FallbackPolicy) -> Self {
        Self { storage, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    /// Return the first record found on the chain for `requested`.
    pub fn resolve(&self, slug: &str, requested: &str) -> Result<ContentRecord, LocaleMiss> {
        self.resolve_detailed(slug, requested).map(|r| r.record)
    }

    /// Like [`resolve`](Self::resolve), also reporting which locale served.
    pub fn resolve_detailed(&self, slug: &str, requested: &str) -> Result<Resolution, LocaleMiss> {
        let chain = self.policy.chain(requested);
        for (depth, locale) in chain.iter().enumerate() {
            match self.storage.get(slug, locale.as_str()) {
                Ok(Some(record)) => {
                    if depth > 0 {
                        tracing::debug!(slug, requested, served = %locale, "Serving fallback locale");
                    }
                    return Ok(Resolution {
                        record,
                        served: locale.clone(),
                        depth,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(slug, locale = %locale, error = %e, "Lookup failed, treating as miss");
                }
            }
        }
        Err(LocaleMiss {
            slug: slug.to_owned(),
            tried: chain,
        })
    }
}
