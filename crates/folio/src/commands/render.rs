//! `folio render` and `folio toc` command implementations.

use std::fmt::Write;

use clap::Args;
use folio_config::CliSettings;
use folio_site::{PageView, TocEntry};

use super::{GlobalArgs, open_site, requested_locale};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Page slug.
    slug: String,

    /// Requested locale (default: canonical locale).
    #[arg(short, long)]
    locale: Option<String>,

    /// Print the full page view as JSON instead of HTML.
    #[arg(long)]
    json: bool,

    /// Disable syntax highlighting.
    #[arg(long)]
    no_highlight: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(CliSettings {
            highlight: self.no_highlight.then_some(false),
            ..CliSettings::default()
        })?;
        let site = open_site(&config)?;

        let locale = requested_locale(&config, self.locale.as_deref());
        let page = site.render_page(&self.slug, &locale)?;
        report_page(&output, &page);

        if self.json {
            output.emit(&serde_json::to_string_pretty(&page)?)?;
        } else {
            output.emit(&page.html)?;
        }
        Ok(())
    }
}

/// Arguments for the toc command.
#[derive(Args)]
pub(crate) struct TocArgs {
    /// Page slug.
    slug: String,

    /// Requested locale (default: canonical locale).
    #[arg(short, long)]
    locale: Option<String>,
}

impl TocArgs {
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(CliSettings::default())?;
        let site = open_site(&config)?;

        let locale = requested_locale(&config, self.locale.as_deref());
        let toc = site.toc(&self.slug, &locale)?;
        if toc.is_empty() {
            output.warning("No headings");
            return Ok(());
        }
        output.emit(&format_toc(&toc))?;
        Ok(())
    }
}

fn report_page(output: &Output, page: &PageView) {
    if page.is_fallback {
        output.warning(&format!(
            "Serving {} for requested locale {}",
            page.locale, page.requested_locale
        ));
    }
    for warning in &page.warnings {
        output.warning(&format!("Render warning: {warning}"));
    }
}

/// Indented outline, two spaces per level below the shallowest heading.
fn format_toc(toc: &[TocEntry]) -> String {
    let base = toc.iter().map(|entry| entry.depth).min().unwrap_or(1);
    let mut out = String::new();
    for entry in toc {
        let indent = usize::from(entry.depth - base) * 2;
        let _ = writeln!(out, "{:indent$}- {} (#{})", "", entry.text, entry.id);
    }
    out
}
