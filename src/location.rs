//! Source location utilities.

use saphyr_parser::Span as ParserSpan;
use serde::{Deserialize, Serialize};

/// Row/column location within the source YAML document (1-indexed, character-based).
///
/// Carried by decode errors and by [`crate::Warning`]s raised while building the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// 1-indexed row number in the input stream.
    pub(crate) line: u32,
    /// 1-indexed column number in the input stream.
    pub(crate) column: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    pub const UNKNOWN: Self = Self { line: 0, column: 0 };

    /// Create a new location record from 1-indexed coordinates.
    pub const fn new(line: usize, column: usize) -> Self {
        // Error reporting only; documents past 4G lines are not a concern.
        Self {
            line: line as u32,
            column: column as u32,
        }
    }

    /// 1-indexed line.
    #[inline]
    pub fn line(&self) -> u64 {
        self.line as u64
    }

    /// 1-indexed column.
    #[inline]
    pub fn column(&self) -> u64 {
        self.column as u64
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        *self != Self::UNKNOWN
    }
}

/// Convert a `saphyr_parser::Span` to a 1-indexed [`Location`].
///
/// saphyr reports lines 1-based and columns 0-based.
pub(crate) fn location_from_span(span: &ParserSpan) -> Location {
    let start = &span.start;
    Location::new(start.line(), start.col() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_is_not_known() {
        assert!(!Location::UNKNOWN.is_known());
        assert!(Location::new(3, 7).is_known());
        assert_eq!(Location::new(3, 7).line(), 3);
        assert_eq!(Location::new(3, 7).column(), 7);
    }
}
