//! CLI error types.

use folio_config::ConfigError;
use folio_enhance::PreviewFetchError;
use folio_renderer::ThemeError;
use folio_site::PageError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Page(#[from] PageError),

    #[error("{0}")]
    Theme(#[from] ThemeError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("Link preview failed: {0}")]
    Preview(#[from] PreviewFetchError),

    #[error("{0}")]
    Validation(String),
}
