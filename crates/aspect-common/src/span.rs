//! Byte-offset source spans.
//!
//! Every token and every parsed node carries a `Span`. Synthetic nodes built
//! by rewrite passes carry `Span::SYNTHETIC` and resolve to no location.

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into one source file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Marker span for nodes constructed by rewrite passes rather than the
    /// parser. Both offsets are `u32::MAX`, which no real file can reach.
    pub const SYNTHETIC: Span = Span {
        start: u32::MAX,
        end: u32::MAX,
    };

    pub fn new(start: u32, end: u32) -> Span {
        debug_assert!(start <= end, "span start {start} past end {end}");
        Span { start, end }
    }

    /// Zero-length span at a single offset.
    pub fn empty(at: u32) -> Span {
        Span { start: at, end: at }
    }

    pub fn is_synthetic(&self) -> bool {
        *self == Span::SYNTHETIC
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Smallest span covering both inputs. Synthetic spans are absorbing on
    /// neither side: merging with one returns the other.
    pub fn cover(self, other: Span) -> Span {
        if self.is_synthetic() {
            return other;
        }
        if other.is_synthetic() {
            return self;
        }
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Slice the source text for this span. Returns an empty string for
    /// synthetic or out-of-bounds spans instead of panicking.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        let start = self.start as usize;
        let end = self.end as usize;
        if self.is_synthetic() || end > source.len() || start > end {
            ""
        } else {
            &source[start..end]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_ignores_synthetic() {
        let a = Span::new(4, 10);
        assert_eq!(a.cover(Span::SYNTHETIC), a);
        assert_eq!(Span::SYNTHETIC.cover(a), a);
        assert_eq!(Span::new(0, 2).cover(a), Span::new(0, 10));
    }

    #[test]
    fn text_is_best_effort() {
        let src = "let x = 1;";
        assert_eq!(Span::new(4, 5).text(src), "x");
        assert_eq!(Span::SYNTHETIC.text(src), "");
        assert_eq!(Span::new(4, 200).text(src), "");
    }
}
