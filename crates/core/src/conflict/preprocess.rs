//! Rewrites applied to a conflict before the three-way heuristics run.

use tracing::debug;

use super::model::Conflict;
use super::sides::Triple;

/// Prefix of a line separating independently resolvable parts of a conflict.
pub const SPLIT_MARKER: &str = "~~~~~~~";

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// Expand tabs in every body line to stops every `width` columns.
pub fn untabify(conflict: Conflict, width: usize) -> Conflict {
    conflict.map_lines(|line| untabify_line(line, width))
}

/// Expand tabs in a single line. Columns restart at zero for every line.
pub fn untabify_line(line: &str, width: usize) -> String {
    if width == 0 || !line.contains('\t') {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    for c in line.chars() {
        if c == '\t' {
            out.extend(std::iter::repeat(' ').take(width - col));
            col = 0;
        } else {
            out.push(c);
            col = (col + 1) % width;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Line endings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineEnding {
    Lf,
    Crlf,
    Mixed,
}

fn line_ending(line: &str) -> LineEnding {
    if line.ends_with('\r') {
        LineEnding::Crlf
    } else {
        LineEnding::Lf
    }
}

fn body_line_ending(body: &[String]) -> LineEnding {
    let mut endings = body.iter().map(|l| line_ending(l));
    match endings.next() {
        None => LineEnding::Mixed,
        Some(first) if endings.all(|e| e == first) => first,
        Some(_) => LineEnding::Mixed,
    }
}

fn with_ending(line: &str, ending: LineEnding) -> String {
    match ending {
        LineEnding::Lf => line.strip_suffix('\r').unwrap_or(line).to_string(),
        LineEnding::Crlf if line.ends_with('\r') => line.to_string(),
        LineEnding::Crlf => format!("{line}\r"),
        LineEnding::Mixed => line.to_string(),
    }
}

/// Make a side whose line endings disagree with the other two match them.
///
/// Skipped when any body is empty or uses mixed endings, and when all three
/// sides already agree.
pub fn normalize_line_endings(conflict: Conflict) -> Conflict {
    if conflict.bodies.iter().any(|body| body.is_empty()) {
        return conflict;
    }

    let endings = conflict.bodies.as_ref().map(|body| body_line_ending(body));
    if endings.iter().any(|&e| e == LineEnding::Mixed) || endings.all_equal() {
        return conflict;
    }

    // Only two styles remain, so exactly one side is the odd one out.
    let Triple { ours, base, theirs } = endings;
    let majority = if ours == base || ours == theirs { ours } else { base };
    debug!(?majority, "normalizing line endings of the differing side");

    let bodies = conflict.bodies.clone();
    let fix = |body: Vec<String>, ending: LineEnding| -> Vec<String> {
        if ending == majority {
            body
        } else {
            body.iter().map(|l| with_ending(l, majority)).collect()
        }
    };

    conflict.with_bodies(Triple::new(
        fix(bodies.ours, ours),
        fix(bodies.base, base),
        fix(bodies.theirs, theirs),
    ))
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

fn split_positions(body: &[String]) -> Vec<usize> {
    body.iter()
        .enumerate()
        .filter(|(_, line)| line.starts_with(SPLIT_MARKER))
        .map(|(idx, _)| idx)
        .collect()
}

/// Cut `body` at the separator positions, dropping the separators.
fn cut(body: &[String], positions: &[usize]) -> Vec<Vec<String>> {
    let mut parts = Vec::with_capacity(positions.len() + 1);
    let mut start = 0;
    for &pos in positions {
        parts.push(body[start..pos].to_vec());
        start = pos + 1;
    }
    parts.push(body[start..].to_vec());
    parts
}

/// Split a conflict on [`SPLIT_MARKER`] lines.
///
/// Separators must sit at the same positions in all three bodies; otherwise
/// the conflict is returned whole. Parts whose ours body is empty are
/// dropped.
pub fn split_conflict(conflict: Conflict) -> Vec<Conflict> {
    let positions = conflict.bodies.as_ref().map(|body| split_positions(body));
    if positions.ours.is_empty() || !positions.all_equal() {
        return vec![conflict];
    }

    let cuts = &positions.ours;
    let Triple { ours, base, theirs } = conflict
        .bodies
        .as_ref()
        .map(|body| cut(body, cuts).into_iter());

    let parts: Vec<Conflict> = ours
        .zip(base)
        .zip(theirs)
        .map(|((o, b), t)| conflict.with_bodies(Triple::new(o, b, t)))
        .filter(|part| !part.bodies.ours.is_empty())
        .collect();

    debug!(separators = cuts.len(), parts = parts.len(), "split conflict");
    parts
}
