#![forbid(unsafe_code)]

//! Style variants and row-local style spans.

use smallvec::SmallVec;

use crate::color::Rgb;

/// A visual attribute applied to a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Style {
    TextColor(Rgb),
    BackgroundColor(Rgb),
    /// Part of a caret selection.
    Selected,
    Emphasize,
    /// Underline with the given stroke thickness in pixels.
    Underline(f32),
}

/// The set of styles active on one run.
///
/// Most runs carry at most a color plus one decoration.
pub type StyleSet = SmallVec<[Style; 4]>;

/// A style applied to `[offset, offset + len)` in row-local UTF-16 units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleSpan {
    pub style: Style,
    pub offset: usize,
    pub len: usize,
}

impl StyleSpan {
    #[must_use]
    pub const fn new(style: Style, offset: usize, len: usize) -> Self {
        Self { style, offset, len }
    }

    /// Exclusive end offset.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether this span covers all of `[from, to)`.
    #[inline]
    #[must_use]
    pub const fn covers(&self, from: usize, to: usize) -> bool {
        self.offset <= from && to <= self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_is_inclusive_of_bounds() {
        let span = StyleSpan::new(Style::Emphasize, 2, 3);
        assert_eq!(span.end(), 5);
        assert!(span.covers(2, 5));
        assert!(span.covers(3, 4));
        assert!(!span.covers(1, 3));
        assert!(!span.covers(4, 6));
    }
}
