//! `folio build` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use folio_config::CliSettings;
use folio_renderer::escape_html;
use folio_site::PageView;

use super::{GlobalArgs, open_site};
use crate::error::CliError;
use crate::output::Output;

/// Stylesheet written at the output root.
const CSS_FILENAME: &str = "folio.css";

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Output directory (default: dist/ next to folio.toml).
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Highlight theme (overrides config).
    #[arg(long)]
    theme: Option<String>,
}

impl BuildArgs {
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(CliSettings {
            theme: self.theme,
            ..CliSettings::default()
        })?;

        let out_dir = self.out.unwrap_or_else(|| {
            config
                .config_path
                .as_deref()
                .and_then(Path::parent)
                .unwrap_or(Path::new("."))
                .join("dist")
        });

        output.info(&format!(
            "Source: {}",
            config.content_resolved.source_dir.display()
        ));
        output.info(&format!("Output: {}", out_dir.display()));

        let site = open_site(&config)?;
        let report = site.build()?;

        std::fs::create_dir_all(&out_dir)?;
        std::fs::write(out_dir.join(CSS_FILENAME), site.css()?)?;

        let mut written = 0;
        for page in &report.pages {
            match &page.result {
                Ok(view) => {
                    write_page(&out_dir, view)?;
                    written += 1;
                }
                Err(e) => output.warning(&format!("Skipped {}: {e}", page.key)),
            }
        }
        for key in &report.drafts {
            output.info(&format!("Draft skipped: {key}"));
        }

        let failed = report.failures().count();
        if failed > 0 {
            return Err(CliError::Validation(format!(
                "{failed} page(s) failed to build"
            )));
        }
        output.success(&format!("Built {written} page(s)"));
        output.highlight(&out_dir.display().to_string());
        Ok(())
    }
}

/// Write `<locale>/<slug>.html` and its `<slug>.json` page data.
fn write_page(out_dir: &Path, page: &PageView) -> Result<(), CliError> {
    let dir = out_dir.join(&page.locale);
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join(format!("{}.html", page.slug)), page_document(page))?;
    std::fs::write(
        dir.join(format!("{}.json", page.slug)),
        serde_json::to_string_pretty(page)?,
    )?;
    tracing::debug!(key = %page.key(), "Wrote page");
    Ok(())
}

/// Standalone HTML document around the rendered content.
fn page_document(page: &PageView) -> String {
    format!(
        "<!doctype html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<link rel=\"stylesheet\" href=\"../{CSS_FILENAME}\">\n</head>\n<body>\n{html}\n</body>\n</html>\n",
        lang = escape_html(&page.locale),
        title = escape_html(&page.title),
        html = page.html,
    )
}
