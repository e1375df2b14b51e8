//! Source lines and the three-slot container used for conflict sides.

/// A single line of input together with its 1-based source line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number in the original input.
    pub number: usize,
    /// Line text without the `\n` terminator (a preceding `\r` is kept).
    pub text: String,
}

impl Line {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// One value per conflict side, always in the order ours, base, theirs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Triple<T> {
    pub ours: T,
    pub base: T,
    pub theirs: T,
}

impl<T> Triple<T> {
    pub fn new(ours: T, base: T, theirs: T) -> Self {
        Self { ours, base, theirs }
    }

    /// Apply `f` to every side, in order.
    pub fn map<U, F>(self, mut f: F) -> Triple<U>
    where
        F: FnMut(T) -> U,
    {
        Triple {
            ours: f(self.ours),
            base: f(self.base),
            theirs: f(self.theirs),
        }
    }

    /// Pair each side with the matching side of `other`.
    pub fn zip<U>(self, other: Triple<U>) -> Triple<(T, U)> {
        Triple {
            ours: (self.ours, other.ours),
            base: (self.base, other.base),
            theirs: (self.theirs, other.theirs),
        }
    }

    pub fn as_ref(&self) -> Triple<&T> {
        Triple {
            ours: &self.ours,
            base: &self.base,
            theirs: &self.theirs,
        }
    }

    /// Iterate over the three sides in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        [&self.ours, &self.base, &self.theirs].into_iter()
    }
}

impl<T: PartialEq> Triple<T> {
    /// True when all three sides are equal.
    pub fn all_equal(&self) -> bool {
        self.ours == self.base && self.base == self.theirs
    }
}

impl<T> IntoIterator for Triple<T> {
    type Item = T;
    type IntoIter = std::array::IntoIter<T, 3>;

    fn into_iter(self) -> Self::IntoIter {
        [self.ours, self.base, self.theirs].into_iter()
    }
}
