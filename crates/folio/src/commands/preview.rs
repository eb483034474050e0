//! `folio preview` command implementation.

use clap::Args;
use folio_config::CliSettings;
use folio_enhance::{HttpPreviewFetcher, PreviewFetcher};

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the preview command.
#[derive(Args)]
pub(crate) struct PreviewArgs {
    /// URL to preview.
    url: String,

    /// Preview service endpoint (overrides config).
    #[arg(long, env = "FOLIO_PREVIEW_ENDPOINT")]
    endpoint: Option<String>,
}

impl PreviewArgs {
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(CliSettings {
            preview_endpoint: self.endpoint,
            ..CliSettings::default()
        })?;

        let endpoint = config.preview.endpoint.as_deref().ok_or_else(|| {
            CliError::Validation("preview.endpoint is not configured".to_owned())
        })?;
        let fetcher = HttpPreviewFetcher::new(endpoint, config.preview.timeout());
        output.info(&format!("Fetching {}", fetcher.request_url(&self.url)));

        let data = fetcher.fetch(&self.url)?;
        for (label, value) in [
            ("Title", &data.title),
            ("Description", &data.description),
            ("Image", &data.image),
        ] {
            if let Some(value) = value {
                output.emit(&format!("{label}: {value}"))?;
            }
        }
        Ok(())
    }
}
