//! Parsed conflict blocks and the outcomes of resolving them.

use super::sides::{Line, Triple};

/// Terminator inserted after every emitted line.
pub const LINE_TERMINATOR: &str = "\n";

// ---------------------------------------------------------------------------
// Conflict
// ---------------------------------------------------------------------------

/// One diff3-style conflict block.
///
/// `markers` holds the lines opening each section (`<<<<<<<`, `|||||||`,
/// `=======`); `end_marker` is the closing `>>>>>>>` line. All four markers
/// use the same number of marker characters. Bodies exclude the marker lines
/// and may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub markers: Triple<Line>,
    pub end_marker: Line,
    pub bodies: Triple<Vec<String>>,
}

impl Conflict {
    /// A copy of this conflict with the same markers and new bodies.
    pub fn with_bodies(&self, bodies: Triple<Vec<String>>) -> Self {
        Self {
            markers: self.markers.clone(),
            end_marker: self.end_marker.clone(),
            bodies,
        }
    }

    /// A copy of this conflict with `f` applied to every body line.
    pub fn map_lines<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&str) -> String,
    {
        let bodies: Triple<Vec<String>> = self
            .bodies
            .as_ref()
            .map(|body| body.iter().map(|line| f(line)).collect());
        self.with_bodies(bodies)
    }

    /// Number of repeated marker characters used by this conflict.
    pub fn marker_width(&self) -> usize {
        self.markers
            .ours
            .text
            .chars()
            .take_while(|&c| c == '<')
            .count()
    }

    /// The conflict as lines of marker text, markers included.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        section(&self.markers.ours, &self.bodies.ours)
            .chain(section(&self.markers.base, &self.bodies.base))
            .chain(section(&self.markers.theirs, &self.bodies.theirs))
            .chain(std::iter::once(self.end_marker.text.as_str()))
    }

    /// Render the conflict back to marker text, one terminator per line.
    pub fn render(&self) -> String {
        render_lines(self.lines())
    }
}

fn section<'a>(marker: &'a Line, body: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
    std::iter::once(marker.text.as_str()).chain(body.iter().map(String::as_str))
}

/// Join lines, appending [`LINE_TERMINATOR`] after each one.
pub fn render_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for line in lines {
        out.push_str(line.as_ref());
        out.push_str(LINE_TERMINATOR);
    }
    out
}

// ---------------------------------------------------------------------------
// Item / Resolution
// ---------------------------------------------------------------------------

/// One element of parsed input, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A line outside any conflict.
    Plain(String),
    /// A complete conflict block.
    Conflict(Conflict),
}

impl Item {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Item::Conflict(_))
    }
}

/// Result of attempting to resolve a single conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No heuristic applied; the original conflict is kept as-is.
    Unresolved(Conflict),
    /// Fully resolved text.
    Resolved(String),
    /// Common lines were pulled out but the remaining middle still has markers.
    PartiallyResolved(String),
}
