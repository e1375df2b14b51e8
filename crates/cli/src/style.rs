//! Terminal styling for per-file result lines.

use console::Style;

/// A file whose conflicts were all resolved (green check).
pub fn resolved(msg: &str) -> String {
    format!("{} {}", Style::new().green().apply_to("✓"), msg)
}

/// A file left with unresolved conflicts, or a fatal error (red cross).
pub fn failed(msg: &str) -> String {
    format!("{} {}", Style::new().red().apply_to("✗"), msg)
}

/// A file where some, but not all, conflicts made progress (yellow).
pub fn partial(msg: &str) -> String {
    format!("{} {}", Style::new().yellow().apply_to("⚠"), msg)
}

/// Secondary text: files without conflicts, dry-run notes.
pub fn muted(msg: &str) -> String {
    Style::new().dim().apply_to(msg).to_string()
}

pub fn path(msg: &str) -> String {
    Style::new().bold().apply_to(msg).to_string()
}
