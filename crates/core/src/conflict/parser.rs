//! Single-pass scanner turning text into plain lines and conflict blocks.
//!
//! A conflict opens with a run of at least [`MIN_MARKER_WIDTH`] `<`
//! characters. The length of that run fixes the width every other marker of
//! the same conflict must have, so wider markers (as produced for nested
//! conflicts) and longer runs of `<` in plain content are told apart.

use tracing::debug;

use super::model::{Conflict, Item};
use super::sides::{Line, Triple};
use crate::errors::ParseError;

/// Minimum number of repeated characters that makes a marker line.
pub const MIN_MARKER_WIDTH: usize = 7;

/// Number of unconsumed lines shown in a parse error.
const PREVIEW_LINES: usize = 5;

/// Parse `content` into an ordered sequence of plain lines and conflicts.
///
/// Lines are split on `\n`; a `\r` before it stays in the line text. A final
/// terminator does not start another line, but empty input is a single empty
/// line.
pub fn parse(content: &str) -> Result<Vec<Item>, ParseError> {
    let lines = split_lines(content);
    let mut scanner = Scanner::new(&lines);
    let mut items = Vec::new();

    while !scanner.at_end() {
        let (plain, start) = scanner.break_at_marker('<', None);
        items.extend(plain.iter().map(|line| Item::Plain(line.text.clone())));

        if let Some(start) = start {
            let conflict = scanner.read_conflict(start)?;
            items.push(Item::Conflict(conflict));
        }
    }

    Ok(items)
}

/// Split text into numbered lines.
pub fn split_lines(content: &str) -> Vec<Line> {
    let body = content.strip_suffix('\n').unwrap_or(content);
    body.split('\n')
        .enumerate()
        .map(|(idx, text)| Line::new(idx + 1, text))
        .collect()
}

/// Length of the run of `ch` at the start of `text`.
fn leading_run(text: &str, ch: char) -> usize {
    text.chars().take_while(|&c| c == ch).count()
}

/// Whether `text` is a marker line of `ch`.
///
/// Without a known width any run of at least [`MIN_MARKER_WIDTH`] counts;
/// with one, the run must be exactly that long.
fn is_marker(text: &str, ch: char, width: Option<usize>) -> bool {
    let run = leading_run(text, ch);
    match width {
        None => run >= MIN_MARKER_WIDTH,
        Some(width) => run == width,
    }
}

struct Scanner<'a> {
    lines: &'a [Line],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(lines: &'a [Line]) -> Self {
        Self { lines, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// Consume lines up to and including the next marker line.
    ///
    /// Returns the lines before the marker and the marker itself, or every
    /// remaining line and `None` when no marker is found.
    fn break_at_marker(
        &mut self,
        ch: char,
        width: Option<usize>,
    ) -> (&'a [Line], Option<&'a Line>) {
        let start = self.pos;
        let rest = &self.lines[start..];

        match rest.iter().position(|line| is_marker(&line.text, ch, width)) {
            Some(offset) => {
                self.pos = start + offset + 1;
                (&rest[..offset], Some(&rest[offset]))
            }
            None => {
                self.pos = self.lines.len();
                (rest, None)
            }
        }
    }

    /// Like [`break_at_marker`](Self::break_at_marker) but a missing marker is
    /// a structural error.
    fn read_to_marker(
        &mut self,
        ch: char,
        width: usize,
    ) -> Result<(&'a [Line], &'a Line), ParseError> {
        let scan_from = self
            .lines
            .get(self.pos)
            .map(|line| line.number)
            .unwrap_or(self.lines.len() + 1);

        match self.break_at_marker(ch, Some(width)) {
            (body, Some(marker)) => Ok((body, marker)),
            (rest, None) => {
                let preview = rest
                    .iter()
                    .take(PREVIEW_LINES)
                    .map(|line| format!("{}\t{}", line.number, line.text))
                    .collect::<Vec<_>>()
                    .join("\n");
                Err(ParseError::UnterminatedMarker {
                    marker: ch,
                    line: scan_from,
                    preview,
                })
            }
        }
    }

    fn read_conflict(&mut self, start: &'a Line) -> Result<Conflict, ParseError> {
        let width = leading_run(&start.text, '<');

        let (ours, base_marker) = self.read_to_marker('|', width)?;
        let (base, theirs_marker) = self.read_to_marker('=', width)?;
        let (theirs, end_marker) = self.read_to_marker('>', width)?;

        debug!(
            line = start.number,
            width,
            ours = ours.len(),
            base = base.len(),
            theirs = theirs.len(),
            "parsed conflict"
        );

        let texts = |lines: &[Line]| lines.iter().map(|l| l.text.clone()).collect::<Vec<_>>();

        Ok(Conflict {
            markers: Triple::new(start.clone(), base_marker.clone(), theirs_marker.clone()),
            end_marker: end_marker.clone(),
            bodies: Triple::new(texts(ours), texts(base), texts(theirs)),
        })
    }
}
