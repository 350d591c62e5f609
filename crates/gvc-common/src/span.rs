//! Byte-offset source spans.

use serde::Serialize;

/// A half-open byte range `[start, end)` in a source unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create a new span. `end` is clamped so the span is never inverted.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        let end = if end < start { start } else { end };
        Self { start, end }
    }

    /// Span with no source position (synthesized nodes).
    #[inline]
    pub const fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    #[inline]
    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// True when the span carries a real source position.
    #[inline]
    pub const fn is_known(self) -> bool {
        self.end > 0
    }

    /// Smallest span covering both `self` and `other`.
    pub const fn merge(self, other: Span) -> Span {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Span { start, end }
    }
}
