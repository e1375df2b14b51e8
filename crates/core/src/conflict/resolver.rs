//! Heuristic resolution of parsed conflicts.
//!
//! Each conflict goes through optional preprocessing (tab expansion, line
//! ending normalisation, splitting on `~~~~~~~` separators) and then the
//! three-way algorithm: lines shared by all sides at the top and bottom are
//! pulled out, and the remaining middle is resolved directly if one of the
//! enabled heuristics applies.

use tracing::debug;

use super::model::{render_lines, Conflict, Item, Resolution, LINE_TERMINATOR};
use super::outcome::{Outcome, ProcessedText};
use super::parser::parse;
use super::preprocess::{normalize_line_endings, split_conflict, untabify};
use super::sides::Triple;
use crate::config::ResolutionOptions;
use crate::errors::ParseError;

/// Parse and resolve a whole file's content.
///
/// When `content` does not end with a line terminator, neither does the
/// returned text.
pub fn resolve_text(
    options: &ResolutionOptions,
    content: &str,
) -> Result<ProcessedText, ParseError> {
    let items = parse(content)?;
    Ok(resolve_parsed(options, content, &items))
}

/// Resolve `items` previously parsed from `content`.
pub fn resolve_parsed(
    options: &ResolutionOptions,
    content: &str,
    items: &[Item],
) -> ProcessedText {
    let mut processed = resolve_all(options, items);

    if !content.ends_with('\n') {
        if let Some(stripped) = processed.text.strip_suffix(LINE_TERMINATOR) {
            let len = stripped.len();
            processed.text.truncate(len);
        }
    }

    processed
}

/// Resolve every conflict in `items` with the given options.
pub fn resolve_all(options: &ResolutionOptions, items: &[Item]) -> ProcessedText {
    ConflictResolver::new(options.clone()).resolve_all(items)
}

/// Applies the configured heuristics to conflicts.
#[derive(Debug, Clone, Default)]
pub struct ConflictResolver {
    options: ResolutionOptions,
}

impl ConflictResolver {
    pub fn new(options: ResolutionOptions) -> Self {
        Self { options }
    }

    /// Resolve all items in order; plain lines pass through unchanged.
    pub fn resolve_all(&self, items: &[Item]) -> ProcessedText {
        items
            .iter()
            .map(|item| match item {
                Item::Plain(line) => ProcessedText::plain(line),
                Item::Conflict(conflict) => self.resolve_conflict_full(conflict),
            })
            .collect()
    }

    /// Preprocess, split, and resolve a single conflict.
    ///
    /// A conflict that was split into several parts still counts as one
    /// conflict: reduced if any part was reduced or failed, resolved if all
    /// parts resolved. When splitting discards every part the result is empty
    /// text with a zero outcome.
    pub fn resolve_conflict_full(&self, conflict: &Conflict) -> ProcessedText {
        let mut conflict = conflict.clone();
        if let Some(width) = self.options.untabify_width {
            conflict = untabify(conflict, width);
        }
        if self.options.line_endings {
            conflict = normalize_line_endings(conflict);
        }

        // A split that discards every part leaves nothing to emit.
        let parts = if self.options.split_on_markers {
            split_conflict(conflict)
        } else {
            vec![conflict]
        };

        let combined: ProcessedText = parts
            .iter()
            .map(|part| ProcessedText::from_resolution(self.resolve_conflict(part)))
            .collect();

        if parts.len() == 1 {
            return combined;
        }

        let outcome = combined.outcome;
        let collapsed = if outcome.failed > 0 || outcome.reduced > 0 {
            Outcome::reduced(1)
        } else if outcome.resolved > 0 {
            Outcome::resolved(1)
        } else {
            outcome
        };
        debug!(parts = parts.len(), ?outcome, ?collapsed, "collapsed split conflict outcome");

        ProcessedText {
            outcome: collapsed,
            text: combined.text,
        }
    }

    /// Core three-way resolution of one conflict.
    pub fn resolve_conflict(&self, conflict: &Conflict) -> Resolution {
        let bodies = &conflict.bodies;

        let (top, bottom) = if self.options.reduce {
            let top = match_count(bodies.as_ref().map(|b| b.as_slice()));
            let reversed = bodies
                .as_ref()
                .map(|b| b.iter().skip(top).rev().collect::<Vec<_>>());
            let bottom = match_count(reversed.as_ref().map(|b| b.as_slice()));
            (top, bottom)
        } else {
            (0, 0)
        };

        if top == 0 && bottom == 0 {
            return match self.resolve_direct(bodies) {
                Some(lines) => {
                    debug!(line = conflict.markers.ours.number, "resolved conflict");
                    Resolution::Resolved(render_lines(&lines))
                }
                None => {
                    debug!(line = conflict.markers.ours.number, "left conflict unresolved");
                    Resolution::Unresolved(conflict.clone())
                }
            };
        }

        let trimmed = bodies.as_ref().map(|body| {
            let start = top.min(body.len());
            let end = body.len().saturating_sub(bottom).max(start);
            body[start..end].to_vec()
        });
        let prefix = bodies.ours[..top].iter().map(String::as_str);
        let suffix = bodies.ours[bodies.ours.len() - bottom..]
            .iter()
            .map(String::as_str);

        match self.resolve_direct(&trimmed) {
            Some(middle) => {
                debug!(
                    line = conflict.markers.ours.number,
                    top, bottom, "resolved reduced conflict"
                );
                Resolution::Resolved(render_lines(
                    prefix.chain(middle.iter().map(String::as_str)).chain(suffix),
                ))
            }
            None => {
                debug!(
                    line = conflict.markers.ours.number,
                    top, bottom, "reduced conflict"
                );
                let reduced = conflict.with_bodies(trimmed);
                Resolution::PartiallyResolved(render_lines(
                    prefix.chain(reduced.lines()).chain(suffix),
                ))
            }
        }
    }

    /// Resolve three line lists without reduction.
    ///
    /// Tries indentation-aware resolution first (if enabled), then the plain
    /// heuristics. `None` means no heuristic applied.
    pub fn resolve_direct(&self, sides: &Triple<Vec<String>>) -> Option<Vec<String>> {
        if self.options.indentation {
            if let Some(lines) = self.resolve_indented(sides) {
                return Some(lines);
            }
        }
        self.resolve_lines(sides)
    }

    /// Resolve the common indentation of each side separately from the text.
    fn resolve_indented(&self, sides: &Triple<Vec<String>>) -> Option<Vec<String>> {
        let indents = sides.as_ref().map(|body| common_indent(body));
        if indents.iter().all(|&n| n == 0) {
            return None;
        }

        let indent = resolve_trivial(indents.as_ref())?;
        let dedented: Triple<Vec<String>> = sides
            .as_ref()
            .zip(indents)
            .map(|(body, n)| body.iter().map(|line| line[n..].to_string()).collect());
        let resolved = self.resolve_lines(&dedented)?;

        let pad = " ".repeat(indent);
        debug!(indent, "resolved conflict after removing indentation");
        Some(resolved.into_iter().map(|line| format!("{pad}{line}")).collect())
    }

    fn resolve_lines(&self, sides: &Triple<Vec<String>>) -> Option<Vec<String>> {
        if self.options.trivial {
            if let Some(lines) = resolve_trivial(sides.as_ref()) {
                return Some(lines);
            }
        }

        if self.options.added_lines {
            let mut candidates = [
                added_on_both_sides(&sides.ours, &sides.theirs, &sides.base),
                added_on_both_sides(&sides.theirs, &sides.ours, &sides.base),
            ]
            .into_iter()
            .flatten();

            // Both patterns matching is ambiguous.
            if let (Some(lines), None) = (candidates.next(), candidates.next()) {
                return Some(lines);
            }
        }

        None
    }
}

// ---------------------------------------------------------------------------
// Heuristics
// ---------------------------------------------------------------------------

/// If one side equals base take the other; if both sides agree take either.
fn resolve_trivial<T: PartialEq + Clone>(sides: Triple<&T>) -> Option<T> {
    if sides.ours == sides.base {
        Some(sides.theirs.clone())
    } else if sides.theirs == sides.base {
        Some(sides.ours.clone())
    } else if sides.ours == sides.theirs {
        Some(sides.ours.clone())
    } else {
        None
    }
}

/// `x` appended after base and `y` prepended before it: keep both additions.
fn added_on_both_sides(x: &[String], y: &[String], base: &[String]) -> Option<Vec<String>> {
    let n = base.len();
    if x.len() < n || y.len() < n {
        return None;
    }
    if x[x.len() - n..] != *base || y[..n] != *base {
        return None;
    }

    let mut lines = x.to_vec();
    lines.extend_from_slice(&y[n..]);
    Some(lines)
}

fn common_prefix_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Number of leading lines shared by all sides, with base as the pivot.
fn match_count<T: PartialEq>(sides: Triple<&[T]>) -> usize {
    if sides.base.is_empty() {
        common_prefix_len(sides.ours, sides.theirs)
    } else {
        common_prefix_len(sides.base, sides.ours).min(common_prefix_len(sides.base, sides.theirs))
    }
}

/// Number of leading spaces every line of `body` has.
fn common_indent(body: &[String]) -> usize {
    body.iter()
        .map(|line| line.bytes().take_while(|&b| b == b' ').count())
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::sides::Line;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn conflict(ours: &[&str], base: &[&str], theirs: &[&str]) -> Conflict {
        Conflict {
            markers: Triple::new(
                Line::new(1, "<<<<<<< ours"),
                Line::new(2, "||||||| base"),
                Line::new(3, "======= theirs"),
            ),
            end_marker: Line::new(4, ">>>>>>>"),
            bodies: Triple::new(lines(ours), lines(base), lines(theirs)),
        }
    }

    fn resolver() -> ConflictResolver {
        ConflictResolver::default()
    }

    #[test]
    fn test_trivial_rules() {
        let r = resolver();
        assert_eq!(
            r.resolve_conflict(&conflict(&["x"], &["x"], &["y"])),
            Resolution::Resolved("y\n".into())
        );
        assert_eq!(
            r.resolve_conflict(&conflict(&["y"], &["x"], &["x"])),
            Resolution::Resolved("y\n".into())
        );
        assert_eq!(
            r.resolve_conflict(&conflict(&["z"], &["x"], &["z"])),
            Resolution::Resolved("z\n".into())
        );
    }

    #[test]
    fn test_deletion_yields_empty_text() {
        let r = resolver();
        assert_eq!(
            r.resolve_conflict(&conflict(&["x"], &["x"], &[])),
            Resolution::Resolved(String::new())
        );
    }

    #[test]
    fn test_unresolvable_keeps_conflict() {
        let c = conflict(&["a"], &["b"], &["c"]);
        assert_eq!(resolver().resolve_conflict(&c), Resolution::Unresolved(c));
    }

    #[test]
    fn test_trivial_disabled() {
        let r = ConflictResolver::new(ResolutionOptions {
            trivial: false,
            ..ResolutionOptions::default()
        });
        let c = conflict(&["a"], &["o"], &["o"]);
        assert_eq!(r.resolve_conflict(&c), Resolution::Unresolved(c));
    }

    #[test]
    fn test_reduction_resolves_middle() {
        // Shared first and last line; only ours changed the middle.
        let c = conflict(&["h", "new", "t"], &["h", "old", "t"], &["h", "old", "t"]);
        assert_eq!(
            resolver().resolve_conflict(&c),
            Resolution::Resolved("h\nnew\nt\n".into())
        );
    }

    #[test]
    fn test_reduction_leaves_markers_around_middle() {
        let c = conflict(&["h", "a", "t"], &["h", "b", "t"], &["h", "c", "t"]);
        assert_eq!(
            resolver().resolve_conflict(&c),
            Resolution::PartiallyResolved(
                "h\n<<<<<<< ours\na\n||||||| base\nb\n======= theirs\nc\n>>>>>>>\nt\n".into()
            )
        );
    }

    #[test]
    fn test_reduction_with_empty_base() {
        let c = conflict(&["s", "a"], &[], &["s", "b"]);
        assert_eq!(
            resolver().resolve_conflict(&c),
            Resolution::PartiallyResolved(
                "s\n<<<<<<< ours\na\n||||||| base\n======= theirs\nb\n>>>>>>>\n".into()
            )
        );
    }

    #[test]
    fn test_reduce_disabled() {
        let r = ConflictResolver::new(ResolutionOptions {
            reduce: false,
            ..ResolutionOptions::default()
        });
        let c = conflict(&["h", "a", "t"], &["h", "b", "t"], &["h", "c", "t"]);
        assert_eq!(r.resolve_conflict(&c), Resolution::Unresolved(c));
    }

    #[test]
    fn test_added_lines_on_both_sides() {
        let c = conflict(&["A", "B"], &["B"], &["B", "C"]);
        assert_eq!(
            resolver().resolve_conflict(&c),
            Resolution::Resolved("A\nB\nC\n".into())
        );
    }

    #[test]
    fn test_added_lines_symmetric() {
        let c = conflict(&["B", "C"], &["B"], &["A", "B"]);
        assert_eq!(
            resolver().resolve_conflict(&c),
            Resolution::Resolved("A\nB\nC\n".into())
        );
    }

    #[test]
    fn test_added_lines_ambiguous() {
        // With an empty base both orders match.
        let r = ConflictResolver::new(ResolutionOptions {
            reduce: false,
            ..ResolutionOptions::default()
        });
        let c = conflict(&["a"], &[], &["b"]);
        assert_eq!(r.resolve_conflict(&c), Resolution::Unresolved(c));
    }

    #[test]
    fn test_added_lines_disabled() {
        let r = ConflictResolver::new(ResolutionOptions {
            added_lines: false,
            ..ResolutionOptions::default()
        });
        let c = conflict(&["A", "B"], &["B"], &["B", "C"]);
        assert_eq!(r.resolve_conflict(&c), Resolution::Unresolved(c));
    }

    #[test]
    fn test_indentation_change_and_edit() {
        // Ours re-indented the block, theirs edited a line.
        let c = conflict(
            &["    if x {", "      go();", "    }"],
            &["  if x {", "    go();", "  }"],
            &["  if x {", "    run();", "  }"],
        );
        let r = ConflictResolver::new(ResolutionOptions {
            reduce: false,
            ..ResolutionOptions::default()
        });
        assert_eq!(
            r.resolve_conflict(&c),
            Resolution::Resolved("    if x {\n      run();\n    }\n".into())
        );
    }

    #[test]
    fn test_indentation_disabled() {
        let c = conflict(
            &["    if x {", "      go();", "    }"],
            &["  if x {", "    go();", "  }"],
            &["  if x {", "    run();", "  }"],
        );
        let r = ConflictResolver::new(ResolutionOptions {
            reduce: false,
            indentation: false,
            ..ResolutionOptions::default()
        });
        assert_eq!(r.resolve_conflict(&c), Resolution::Unresolved(c));
    }

    #[test]
    fn test_full_split_collapses_to_one_resolved() {
        let c = conflict(
            &["x", "~~~~~~~", "p"],
            &["x", "~~~~~~~", "q"],
            &["y", "~~~~~~~", "q"],
        );
        let out = resolver().resolve_conflict_full(&c);
        assert_eq!(out.text, "y\np\n");
        assert_eq!(out.outcome, Outcome::resolved(1));
    }

    #[test]
    fn test_full_split_collapses_to_one_reduced() {
        let c = conflict(
            &["x", "~~~~~~~", "a"],
            &["x", "~~~~~~~", "b"],
            &["y", "~~~~~~~", "c"],
        );
        let out = resolver().resolve_conflict_full(&c);
        assert_eq!(out.outcome, Outcome::reduced(1));
        assert!(out.text.starts_with("y\n<<<<<<< ours\na\n"));
    }

    #[test]
    fn test_full_split_discarding_every_part_is_empty() {
        let c = conflict(&["~~~~~~~"], &["~~~~~~~"], &["~~~~~~~"]);
        let out = resolver().resolve_conflict_full(&c);
        assert_eq!(out.text, "");
        assert_eq!(out.outcome, Outcome::EMPTY);
    }

    #[test]
    fn test_reduced_middle_resolves_indentation() {
        let c = conflict(&["h", "    a"], &["h", "  a"], &["h", "  b"]);
        assert_eq!(
            resolver().resolve_conflict(&c),
            Resolution::Resolved("h\n    b\n".into())
        );
    }

    #[test]
    fn test_indentation_prefix_ignores_trivial_flag() {
        // Ours re-indented, theirs appended; the body needs the added-lines rule.
        let c = conflict(&["    A", "    B"], &["  B"], &["  B", "  C"]);
        let r = ConflictResolver::new(ResolutionOptions {
            trivial: false,
            reduce: false,
            ..ResolutionOptions::default()
        });
        assert_eq!(
            r.resolve_conflict(&c),
            Resolution::Resolved("    A\n    B\n    C\n".into())
        );

        let r = ConflictResolver::new(ResolutionOptions {
            trivial: false,
            reduce: false,
            indentation: false,
            ..ResolutionOptions::default()
        });
        assert_eq!(r.resolve_conflict(&c), Resolution::Unresolved(c));
    }

    #[test]
    fn test_full_untabify_enables_resolution() {
        let c = conflict(&["\tx"], &["    x"], &["    y"]);
        let r = ConflictResolver::new(ResolutionOptions {
            untabify_width: Some(4),
            ..ResolutionOptions::default()
        });
        let out = r.resolve_conflict_full(&c);
        assert_eq!(out.text, "    y\n");
        assert_eq!(out.outcome, Outcome::resolved(1));
    }

    #[test]
    fn test_full_line_endings_enable_resolution() {
        let c = conflict(&["a"], &["a"], &["a\r", "b\r"]);
        let out = resolver().resolve_conflict_full(&c);
        assert_eq!(out.text, "a\nb\n");
        assert_eq!(out.outcome, Outcome::resolved(1));
    }

    #[test]
    fn test_resolve_all_plain_and_conflicts() {
        let items = vec![
            Item::Plain("one".into()),
            Item::Conflict(conflict(&["x"], &["x"], &["y"])),
            Item::Plain("two".into()),
            Item::Conflict(conflict(&["a"], &["b"], &["c"])),
        ];
        let out = resolve_all(&ResolutionOptions::default(), &items);
        assert_eq!(
            out.text,
            "one\ny\ntwo\n<<<<<<< ours\na\n||||||| base\nb\n======= theirs\nc\n>>>>>>>\n"
        );
        assert_eq!(
            out.outcome,
            Outcome {
                resolved: 1,
                reduced: 0,
                failed: 1
            }
        );
    }

    #[test]
    fn test_match_count_pivot() {
        let a = lines(&["s", "a"]);
        let b = lines(&["s", "b"]);
        let base = lines(&["s"]);
        assert_eq!(match_count(Triple::new(&a[..], &base[..], &b[..])), 1);
        assert_eq!(match_count(Triple::new(&a[..], &[][..], &b[..])), 1);
        assert_eq!(match_count(Triple::new(&a[..], &lines(&["z"])[..], &b[..])), 0);
    }

    #[test]
    fn test_common_indent() {
        assert_eq!(common_indent(&lines(&["    a", "  b"])), 2);
        assert_eq!(common_indent(&lines(&["a"])), 0);
        assert_eq!(common_indent(&[]), 0);
    }
}
