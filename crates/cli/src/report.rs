//! Per-file results and how they are printed.

use std::path::PathBuf;

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use remerge_core::errors::FileError;
use remerge_core::{FileAction, FileReport, Outcome};

use crate::style;

/// The result of processing one input file.
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<FileAction>,
    pub outcome: Outcome,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileEntry {
    pub fn from_result(path: PathBuf, result: Result<FileReport, FileError>) -> Self {
        match result {
            Ok(report) => Self {
                message: report.message(),
                path: report.path,
                action: Some(report.action),
                outcome: report.outcome,
                error: None,
            },
            // A file that could not be processed counts as one failure.
            Err(e) => Self {
                path,
                action: None,
                outcome: Outcome::failed(1),
                message: "Failed to process file".to_string(),
                error: Some(e.to_string()),
            },
        }
    }

    /// One styled line for human output.
    pub fn render_line(&self) -> String {
        let label = style::path(&self.path.display().to_string());
        if let Some(err) = &self.error {
            return style::failed(&format!("{}: {}", label, err));
        }

        let mut text = format!("{}: {}", label, self.message);
        if self.action == Some(FileAction::WouldRewrite) {
            text.push_str(&style::muted(" (dry run, not written)"));
        }

        let o = &self.outcome;
        if self.action == Some(FileAction::NoConflicts) {
            style::muted(&text)
        } else if o.is_fully_successful() {
            style::resolved(&text)
        } else if o.resolved > 0 || o.reduced > 0 {
            style::partial(&text)
        } else {
            style::failed(&text)
        }
    }
}

/// Everything a run produced, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub files: Vec<FileEntry>,
    pub total: Outcome,
}

impl RunReport {
    pub fn new(files: Vec<FileEntry>) -> Self {
        let total: Outcome = files.iter().map(|f| f.outcome).collect();
        Self { files, total }
    }

    pub fn is_success(&self) -> bool {
        self.total.is_fully_successful()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Totals table, or `None` when no conflict was seen at all.
    pub fn summary_table(&self) -> Option<Table> {
        if self.total.total() == 0 {
            return None;
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Resolved", "Reduced", "Failed", "Files"]);
        table.add_row(vec![
            Cell::new(self.total.resolved).fg(Color::Green),
            Cell::new(self.total.reduced).fg(Color::Yellow),
            Cell::new(self.total.failed).fg(Color::Red),
            Cell::new(self.files.len()),
        ]);
        Some(table)
    }
}
