//! Line/column positions and the per-file line map.
//!
//! Lines are 1-based and columns are 0-based everywhere in aspect. The two
//! ordinals are distinct newtypes so that a 0-based value can never be
//! handed to an API expecting a 1-based one without an explicit conversion.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// A 1-based ordinal (line numbers).
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OneIndexed(u32);

impl OneIndexed {
    pub const FIRST: OneIndexed = OneIndexed(1);

    /// Build from a 0-based index (e.g. an index into a line table).
    pub fn from_zero_indexed(value: u32) -> OneIndexed {
        OneIndexed(value + 1)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn to_zero_indexed(self) -> u32 {
        self.0 - 1
    }

    pub fn saturating_next(self) -> OneIndexed {
        OneIndexed(self.0.saturating_add(1))
    }
}

/// A 0-based ordinal (column numbers).
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ZeroIndexed(u32);

impl ZeroIndexed {
    pub const START: ZeroIndexed = ZeroIndexed(0);

    pub fn new(value: u32) -> ZeroIndexed {
        ZeroIndexed(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// One point in a source file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: OneIndexed,
    pub column: ZeroIndexed,
}

impl Position {
    pub const START: Position = Position {
        line: OneIndexed::FIRST,
        column: ZeroIndexed::START,
    };
}

/// A resolved location: file path plus start/end positions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub path: String,
    pub start: Position,
    pub end: Position,
}

/// Byte offset of each line start, built once per file.
///
/// Resolving a `Span` to line/column is a binary search over the starts.
#[derive(Clone, Debug)]
pub struct LineMap {
    line_starts: Vec<u32>,
    len: u32,
}

impl LineMap {
    pub fn new(source: &str) -> LineMap {
        let mut line_starts = vec![0u32];
        for at in memchr::memchr_iter(b'\n', source.as_bytes()) {
            line_starts.push(at as u32 + 1);
        }
        LineMap {
            line_starts,
            len: source.len() as u32,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Resolve a byte offset to a position. Offsets past the end of the file
    /// clamp to the final position.
    pub fn position(&self, offset: u32) -> Position {
        let offset = offset.min(self.len);
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Position {
            line: OneIndexed::from_zero_indexed(line_index as u32),
            column: ZeroIndexed::new(offset - self.line_starts[line_index]),
        }
    }

    /// Resolve a span to a full `SourceLocation`. Synthetic spans resolve to
    /// the start of the file.
    pub fn location(&self, path: &str, span: Span) -> SourceLocation {
        if span.is_synthetic() {
            return SourceLocation {
                path: path.to_string(),
                start: Position::START,
                end: Position::START,
            };
        }
        SourceLocation {
            path: path.to_string(),
            start: self.position(span.start),
            end: self.position(span.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based_lines_zero_based_columns() {
        let map = LineMap::new("ab\ncd\n");
        let p = map.position(0);
        assert_eq!(p.line, OneIndexed::FIRST);
        assert_eq!(p.column, ZeroIndexed::START);

        let p = map.position(4);
        assert_eq!(p.line.get(), 2);
        assert_eq!(p.column.get(), 1);
    }

    #[test]
    fn offset_past_eof_clamps() {
        let map = LineMap::new("x");
        let p = map.position(999);
        assert_eq!(p.line.get(), 1);
        assert_eq!(p.column.get(), 1);
    }

    #[test]
    fn synthetic_span_resolves_to_file_start() {
        let map = LineMap::new("a\nb");
        let loc = map.location("f.js", Span::SYNTHETIC);
        assert_eq!(loc.start, Position::START);
        assert_eq!(loc.end, Position::START);
    }
}
