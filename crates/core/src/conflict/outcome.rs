//! Resolution statistics and the text/statistics accumulator.
//!
//! Both types combine with an explicit `combine` method rather than an
//! operator. [`Outcome::combine`] is commutative; [`ProcessedText::combine`]
//! is not, because text is concatenated in item order.

use serde::{Deserialize, Serialize};

use super::model::{Resolution, LINE_TERMINATOR};

/// Counts of conflicts by how they were handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Conflicts resolved completely.
    pub resolved: usize,
    /// Conflicts reduced but still carrying markers.
    pub reduced: usize,
    /// Conflicts left untouched.
    pub failed: usize,
}

impl Outcome {
    /// The identity element: all zeros.
    pub const EMPTY: Outcome = Outcome {
        resolved: 0,
        reduced: 0,
        failed: 0,
    };

    pub const fn resolved(n: usize) -> Self {
        Self {
            resolved: n,
            reduced: 0,
            failed: 0,
        }
    }

    pub const fn reduced(n: usize) -> Self {
        Self {
            resolved: 0,
            reduced: n,
            failed: 0,
        }
    }

    pub const fn failed(n: usize) -> Self {
        Self {
            resolved: 0,
            reduced: 0,
            failed: n,
        }
    }

    /// Pairwise sum.
    pub fn combine(self, other: Outcome) -> Outcome {
        Outcome {
            resolved: self.resolved + other.resolved,
            reduced: self.reduced + other.reduced,
            failed: self.failed + other.failed,
        }
    }

    /// No conflict was left reduced or failed.
    pub fn is_fully_successful(&self) -> bool {
        self.reduced == 0 && self.failed == 0
    }

    /// Total number of conflicts counted.
    pub fn total(&self) -> usize {
        self.resolved + self.reduced + self.failed
    }
}

/// Output text together with the outcome of producing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedText {
    pub outcome: Outcome,
    pub text: String,
}

impl ProcessedText {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A plain line: its text plus a terminator, zero outcome.
    pub fn plain(line: &str) -> Self {
        let mut text = String::with_capacity(line.len() + LINE_TERMINATOR.len());
        text.push_str(line);
        text.push_str(LINE_TERMINATOR);
        Self {
            outcome: Outcome::EMPTY,
            text,
        }
    }

    /// Convert one conflict's resolution into text and a single count.
    pub fn from_resolution(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Unresolved(conflict) => Self {
                outcome: Outcome::failed(1),
                text: conflict.render(),
            },
            Resolution::Resolved(text) => Self {
                outcome: Outcome::resolved(1),
                text,
            },
            Resolution::PartiallyResolved(text) => Self {
                outcome: Outcome::reduced(1),
                text,
            },
        }
    }

    /// Append `other` after `self`.
    pub fn combine(mut self, other: ProcessedText) -> ProcessedText {
        self.text.push_str(&other.text);
        self.outcome = self.outcome.combine(other.outcome);
        self
    }
}

impl FromIterator<ProcessedText> for ProcessedText {
    fn from_iter<I: IntoIterator<Item = ProcessedText>>(iter: I) -> Self {
        iter.into_iter().fold(ProcessedText::empty(), ProcessedText::combine)
    }
}

impl FromIterator<Outcome> for Outcome {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        iter.into_iter().fold(Outcome::EMPTY, Outcome::combine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_identity_and_sum() {
        let a = Outcome {
            resolved: 1,
            reduced: 2,
            failed: 3,
        };
        assert_eq!(a.combine(Outcome::EMPTY), a);
        assert_eq!(Outcome::EMPTY.combine(a), a);
        assert_eq!(
            a.combine(Outcome::failed(1)),
            Outcome {
                resolved: 1,
                reduced: 2,
                failed: 4
            }
        );
        assert_eq!(a.total(), 6);
    }

    #[test]
    fn test_outcome_commutative() {
        let a = Outcome::resolved(2);
        let b = Outcome::reduced(1);
        assert_eq!(a.combine(b), b.combine(a));
    }

    #[test]
    fn test_fully_successful() {
        assert!(Outcome::EMPTY.is_fully_successful());
        assert!(Outcome::resolved(3).is_fully_successful());
        assert!(!Outcome::reduced(1).is_fully_successful());
        assert!(!Outcome::failed(1).is_fully_successful());
    }

    #[test]
    fn test_processed_text_keeps_order() {
        let combined: ProcessedText = vec![
            ProcessedText::plain("a"),
            ProcessedText::from_resolution(Resolution::Resolved("b\n".into())),
            ProcessedText::plain("c"),
        ]
        .into_iter()
        .collect();

        assert_eq!(combined.text, "a\nb\nc\n");
        assert_eq!(combined.outcome, Outcome::resolved(1));
    }

    #[test]
    fn test_processed_text_associative() {
        let x = || ProcessedText::plain("x");
        let y = || ProcessedText::from_resolution(Resolution::PartiallyResolved("y\n".into()));
        let z = || ProcessedText::plain("z");

        let left = x().combine(y()).combine(z());
        let right = x().combine(y().combine(z()));
        assert_eq!(left, right);
    }

    #[test]
    fn test_outcome_serializes() {
        let rendered = toml::to_string(&Outcome::reduced(2)).unwrap();
        assert!(rendered.contains("reduced = 2"));
    }
}
