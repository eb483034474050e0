//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod ingest;
pub(crate) mod preview;
pub(crate) mod render;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_site::Site;
use folio_storage::{FsStorage, Storage};

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use ingest::IngestArgs;
pub(crate) use preview::PreviewArgs;
pub(crate) use render::{RenderArgs, TocArgs};

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Content source directory (overrides config).
    #[arg(short, long, global = true)]
    source_dir: Option<PathBuf>,

    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Load config, layering these flags over `settings`.
    pub(crate) fn load_config(&self, settings: CliSettings) -> Result<Config, CliError> {
        let settings = CliSettings {
            source_dir: self.source_dir.clone(),
            ..settings
        };
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }
}

/// Site over the configured content directory.
pub(crate) fn open_site(config: &Config) -> Result<Site, CliError> {
    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(
        config.content_resolved.source_dir.clone(),
    ));
    Ok(Site::new(
        storage,
        config.fallback_policy()?,
        config.render.options(),
    ))
}

/// Requested locale, or the canonical locale when none is given.
pub(crate) fn requested_locale(config: &Config, locale: Option<&str>) -> String {
    locale.map_or_else(|| config.locale.canonical.to_string(), str::to_owned)
}
