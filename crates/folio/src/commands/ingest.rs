//! `folio ingest` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use folio_config::CliSettings;
use folio_ingest::{
    BlockEditor, ClipboardItem, ClipboardPayload, EditorSurface, ImageFile, IngestEngine,
    InsertionOutcome,
};
use folio_renderer::Renderer;

use super::{GlobalArgs, requested_locale};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the ingest command.
#[derive(Args)]
pub(crate) struct IngestArgs {
    /// Files to paste, in order. Images take the upload path.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// URL prefix for pasted images (default: image uploads fail).
    #[arg(long)]
    media_url: Option<String>,

    /// Print rendered HTML instead of document JSON.
    #[arg(long)]
    html: bool,
}

impl IngestArgs {
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let config = global.load_config(CliSettings::default())?;

        let media_url = self.media_url.clone();
        let uploader = move |file: &ImageFile| -> Option<String> {
            media_url
                .as_deref()
                .map(|prefix| format!("{}/{}", prefix.trim_end_matches('/'), file.name))
        };
        let mut engine = IngestEngine::new(uploader).with_sniff_mode(config.ingest.sniff);
        let mut editor = BlockEditor::default();

        for path in &self.files {
            let payload = read_payload(path)?;
            if engine.on_paste(&editor, &payload) {
                for report in engine.flush(&mut editor) {
                    match report.outcome {
                        InsertionOutcome::Parsed { strategy, blocks } => output.info(&format!(
                            "{}: {blocks} block(s) via {strategy} at {}",
                            path.display(),
                            report.at
                        )),
                        InsertionOutcome::Image { src } => {
                            output.info(&format!("{}: image {src}", path.display()));
                        }
                        InsertionOutcome::UploadFailed { name } => {
                            output.warning(&format!("{}: upload failed for {name}", path.display()));
                        }
                    }
                }
            } else if let Some(text) = payload.text() {
                // Default paste: text that does not look like Markdown.
                editor.insert_text(editor.caret(), text);
                output.info(&format!("{}: pasted as plain text", path.display()));
            }
        }

        for message in editor.errors() {
            output.error(message);
        }

        if self.html {
            let locale = requested_locale(&config, None);
            let rendered = Renderer::new(config.render.options()).render_document(editor.doc(), &locale);
            output.emit(&rendered.html)?;
        } else {
            output.emit(&serde_json::to_string_pretty(editor.doc())?)?;
        }
        Ok(())
    }
}

/// Clipboard payload equivalent to copying the file's contents.
fn read_payload(path: &Path) -> Result<ClipboardPayload, CliError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Some(mime) = image_mime(path) {
        let bytes = std::fs::read(path)?;
        return Ok(ClipboardPayload::new(vec![ClipboardItem::Image(
            ImageFile::new(name, mime, bytes),
        )]));
    }

    let text = std::fs::read_to_string(path)?;
    let mime = if is_markdown_file(path) {
        "text/markdown"
    } else {
        "text/plain"
    };
    Ok(ClipboardPayload::new(vec![ClipboardItem::text(mime, text)]))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn image_mime(path: &Path) -> Option<&'static str> {
    match extension(path)?.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

fn is_markdown_file(path: &Path) -> bool {
    extension(path).is_some_and(|ext| ext == "md" || ext == "markdown")
}
