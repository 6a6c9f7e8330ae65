//! Injection corpora.

use std::ops::Range;

/// Values injected into a template, one job per value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Corpus {
    /// Integers in a half-open range, e.g. `0..2`.
    Range(Range<i64>),
    /// Arbitrary text values.
    Values(Vec<String>),
}

impl Corpus {
    /// Parse `a..b` into a range corpus.
    pub fn parse_range(text: &str) -> Option<Self> {
        let (start, end) = text.trim().split_once("..")?;
        let start = start.trim().parse().ok()?;
        let end = end.trim().parse().ok()?;
        Some(Self::Range(start..end))
    }

    /// One value per line; a trailing newline does not add an empty value.
    pub fn from_lines(text: &str) -> Self {
        Self::Values(text.lines().map(str::to_string).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Range(range) => {
                usize::try_from(range.end.saturating_sub(range.start)).unwrap_or(0)
            }
            Self::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values in corpus order.
    pub fn values(&self) -> Box<dyn Iterator<Item = String> + '_> {
        match self {
            Self::Range(range) => Box::new(range.clone().map(|i| i.to_string())),
            Self::Values(values) => Box::new(values.iter().cloned()),
        }
    }
}
