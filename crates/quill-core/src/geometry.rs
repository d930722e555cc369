#![forbid(unsafe_code)]

//! Text-grid and pixel geometry.
//!
//! A [`Point`] addresses a position between text units: `col` counts UTF-16
//! units from the start of the row, so `col == row_len` is the end of the row.

use std::cmp::Ordering;
use std::fmt;

/// A `(row, col)` position in the text grid.
///
/// Points are totally ordered, first by row, then by column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Zero-based row index.
    pub row: usize,
    /// Zero-based column, in UTF-16 units.
    pub col: usize,
}

impl Point {
    /// The origin `(0, 0)`.
    pub const ZERO: Self = Self { row: 0, col: 0 };

    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Whether this is the origin.
    #[inline]
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.row == 0 && self.col == 0
    }

    /// Clamp into a grid of `rows` rows, using `row_len` for the column bound
    /// of the (clamped) row.
    ///
    /// An empty grid clamps everything to the origin.
    #[must_use]
    pub fn clamp_to(self, rows: usize, row_len: impl FnOnce(usize) -> usize) -> Self {
        if rows == 0 {
            return Self::ZERO;
        }
        let row = self.row.min(rows - 1);
        let col = self.col.min(row_len(row));
        Self { row, col }
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.col.cmp(&other.col))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Point {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

/// A selection range reported as `(point, mark)`.
///
/// The two ends keep the order they were captured in: `start` is the caret
/// point, `end` is the mark. Use [`Range::ordered`] to get `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// The caret point (moving end).
    pub start: Point,
    /// The mark (fixed end).
    pub end: Point,
}

impl Range {
    /// Create a range from the caret point and the mark.
    #[inline]
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Return `(min, max)` by point order.
    #[must_use]
    pub fn ordered(&self) -> (Point, Point) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }

    /// Whether both ends coincide.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the range covers `row` (inclusive of both end rows).
    #[must_use]
    pub fn spans_row(&self, row: usize) -> bool {
        let (min, max) = self.ordered();
        min.row <= row && row <= max.row
    }

    /// Column interval `[from, to)` covered on `row`, given the row length.
    ///
    /// Returns `None` when the row is outside the range or the interval is
    /// empty.
    #[must_use]
    pub fn columns_on(&self, row: usize, row_len: usize) -> Option<(usize, usize)> {
        if !self.spans_row(row) {
            return None;
        }
        let (min, max) = self.ordered();
        let from = if min.row == row { min.col } else { 0 };
        let to = if max.row == row { max.col } else { row_len };
        let (from, to) = (from.min(row_len), to.min(row_len));
        (from < to).then_some((from, to))
    }
}

/// A pixel offset relative to the top-left of the viewport window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Loc {
    /// Horizontal offset in pixels.
    pub x: f64,
    /// Vertical offset in pixels (top of the visual line).
    pub y: f64,
}

impl Loc {
    /// Create a new location.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by a margin.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}
