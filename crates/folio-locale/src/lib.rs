//! Locale fallback resolution.
//!
//! Given a slug and a requested locale, [`LocaleResolver`] walks a finite
//! fallback chain built by [`FallbackPolicy`] and returns the first stored
//! record. The chain always ends at the canonical (authoring) locale.
//!
//! ```
//! use folio_locale::{FallbackPolicy, Locale};
//!
//! let policy = FallbackPolicy::new(Locale::parse("ko").unwrap());
//! let chain: Vec<String> = policy.chain("pt-br").iter().map(ToString::to_string).collect();
//! assert_eq!(chain, ["pt-BR", "pt", "ko"]);
//! ```

mod locale;
mod policy;
mod resolver;

pub use locale::{Locale, LocaleError};
pub use policy::FallbackPolicy;
pub use resolver::{LocaleMiss, LocaleResolver, Resolution};
