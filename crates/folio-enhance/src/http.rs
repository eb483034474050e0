//! Preview fetcher backed by an HTTP metadata endpoint.

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use ureq::Agent;

use crate::preview::{PreviewData, PreviewFetchError, PreviewFetcher};

/// RFC 3986 unreserved characters stay literal.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Calls `GET {endpoint}?url=<encoded>` and reads the JSON reply.
pub struct HttpPreviewFetcher {
    agent: Agent,
    endpoint: String,
}

impl HttpPreviewFetcher {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request URL for previewing `url`.
    #[must_use]
    pub fn request_url(&self, url: &str) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{separator}url={}",
            self.endpoint,
            utf8_percent_encode(url, QUERY_ENCODE_SET)
        )
    }
}

impl PreviewFetcher for HttpPreviewFetcher {
    fn fetch(&self, url: &str) -> Result<PreviewData, PreviewFetchError> {
        let request_url = self.request_url(url);
        tracing::debug!(url, "Fetching link preview");

        let response = self
            .agent
            .get(&request_url)
            .header("Accept", "application/json")
            .call()?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(PreviewFetchError::Status { status });
        }

        let data: PreviewData = response.into_body().read_json()?;
        if data.is_empty() {
            return Err(PreviewFetchError::Empty);
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_encodes_target() {
        let fetcher = HttpPreviewFetcher::new("https://api.example.com/preview", Duration::from_secs(1));
        assert_eq!(
            fetcher.request_url("https://blog.dev/a b?x=1&y=2"),
            "https://api.example.com/preview?url=https%3A%2F%2Fblog.dev%2Fa%20b%3Fx%3D1%26y%3D2"
        );
    }

    #[test]
    fn test_request_url_appends_to_query() {
        let fetcher = HttpPreviewFetcher::new("https://api.example.com/preview?key=k", Duration::from_secs(1));
        assert_eq!(
            fetcher.request_url("https://x.dev/~me"),
            "https://api.example.com/preview?key=k&url=https%3A%2F%2Fx.dev%2F~me"
        );
    }
}
