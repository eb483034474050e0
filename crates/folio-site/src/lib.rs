//! Page rendering and site builds for Folio.
//!
//! This crate provides:
//! - [`Site`]: locale resolution plus rendering for a single page request
//! - [`Site::build`]: parallel rendering of every published record
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use folio_locale::{FallbackPolicy, Locale};
//! use folio_renderer::RenderOptions;
//! use folio_site::Site;
//! use folio_storage::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("content")));
//! let policy = FallbackPolicy::new(Locale::parse("ko")?);
//! let site = Site::new(storage, policy, RenderOptions::default());
//!
//! let page = site.render_page("my-post", "en")?;
//! println!("{} ({})", page.title, page.locale);
//! # Ok(())
//! # }
//! ```

mod page;
mod site;

pub use page::{PageError, PageView};
pub use site::{BuildReport, BuiltPage, Site};

// Re-export TocEntry from folio-renderer for convenience
pub use folio_renderer::TocEntry;
