// Report generation and export of the current result

use crate::clipboard::ClipboardChain;
use crate::modal::ModalKind;
use crate::model::Notice;
use crate::pdf;
use crate::session::Session;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const REPORT_TITLE: &str = "Phishing Analysis Report";
pub const DEFAULT_REPORT_FILE: &str = "phishing-report.pdf";
pub const COPIED_NOTICE: &str = "Copied to clipboard!";
pub const COPY_FAILED_NOTICE: &str = "Could not copy the report to the clipboard.";
pub const NOTHING_TO_EXPORT: &str = "Analyze a URL before exporting a report.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
    Pdf,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "pdf" => Some(ReportFormat::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "md",
            ReportFormat::Pdf => "pdf",
        }
    }
}

/// Everything a report is made of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportContext {
    pub url: String,
    pub status_label: String,
    pub confidence_text: String,
    pub reasons: Vec<String>,
}

pub fn build_report(ctx: &ReportContext) -> String {
    let reasons = ctx
        .reasons
        .iter()
        .map(|reason| format!("- {}", reason))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\nURL: {}\nResult: {}\nConfidence: {}\n\nReasons:\n{}",
        REPORT_TITLE, ctx.url, ctx.status_label, ctx.confidence_text, reasons
    )
}

pub fn generate_json_report(ctx: &ReportContext) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(ctx)
}

pub fn generate_markdown_report(ctx: &ReportContext) -> String {
    let mut report = String::new();
    report.push_str(&format!("# {}\n\n", REPORT_TITLE));
    report.push_str(&format!("- **URL:** `{}`\n", ctx.url));
    report.push_str(&format!("- **Result:** {}\n", ctx.status_label));
    report.push_str(&format!("- **Confidence:** {}\n\n", ctx.confidence_text));
    report.push_str("## Reasons\n\n");
    for reason in &ctx.reasons {
        report.push_str(&format!("- {}\n", reason));
    }
    report
}

/// Renders the report in `format`. PDF output is binary; the text
/// formats are UTF-8.
pub fn render_report(
    ctx: &ReportContext,
    format: ReportFormat,
    generated_at: DateTime<Local>,
) -> Result<Vec<u8>, serde_json::Error> {
    Ok(match format {
        ReportFormat::Text => build_report(ctx).into_bytes(),
        ReportFormat::Json => generate_json_report(ctx)?.into_bytes(),
        ReportFormat::Markdown => generate_markdown_report(ctx).into_bytes(),
        ReportFormat::Pdf => render_document(ctx, generated_at),
    })
}

/// Paginated PDF: the title once, then the wrapped report body.
pub fn render_document(ctx: &ReportContext, generated_at: DateTime<Local>) -> Vec<u8> {
    let text = build_report(ctx);
    let body = text
        .strip_prefix(&format!("{}\n", REPORT_TITLE))
        .unwrap_or(&text);
    pdf::render(REPORT_TITLE, body, generated_at)
}

pub fn save_report(content: &[u8], path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

/// The share dialog's two actions.
pub struct ReportExporter {
    clipboard: ClipboardChain,
}

impl ReportExporter {
    pub fn new(clipboard: ClipboardChain) -> Self {
        Self { clipboard }
    }

    pub fn clipboard(&self) -> &ClipboardChain {
        &self.clipboard
    }

    /// Copies the report, falling back through the clipboard chain. The
    /// share dialog closes whether or not the copy worked.
    pub fn copy_to_clipboard(&mut self, session: &mut Session) -> bool {
        let copied = match session.report_context() {
            Some(ctx) => match self.clipboard.copy(&build_report(&ctx)) {
                Ok(strategy) => {
                    info!("Report copied with {}", strategy);
                    session.set_notice(Notice::info(COPIED_NOTICE));
                    true
                }
                Err(e) => {
                    warn!("Clipboard copy failed: {}", e);
                    session.set_notice(Notice::error(COPY_FAILED_NOTICE));
                    false
                }
            },
            None => {
                session.set_notice(Notice::error(NOTHING_TO_EXPORT));
                false
            }
        };

        session.modals.close(ModalKind::Share);
        copied
    }

    /// Writes the PDF report to `path` and closes the share dialog.
    pub fn export_document(
        &self,
        session: &mut Session,
        path: &Path,
        generated_at: DateTime<Local>,
    ) -> bool {
        let saved = match session.report_context() {
            Some(ctx) => {
                let document = render_document(&ctx, generated_at);
                match save_report(&document, path) {
                    Ok(()) => {
                        info!("Report saved to {}", path.display());
                        session.set_notice(Notice::info(format!(
                            "Report saved to {}",
                            path.display()
                        )));
                        true
                    }
                    Err(e) => {
                        warn!("Could not write {}: {}", path.display(), e);
                        session.set_notice(Notice::error(format!(
                            "Could not save report to {}: {}",
                            path.display(),
                            e
                        )));
                        false
                    }
                }
            }
            None => {
                session.set_notice(Notice::error(NOTHING_TO_EXPORT));
                false
            }
        };

        session.modals.close(ModalKind::Share);
        saved
    }
}
