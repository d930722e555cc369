#![forbid(unsafe_code)]

//! Soft wrapping of laid-out rows into visual lines.
//!
//! Splitting is greedy over the advance table: no hyphenation and no
//! word-boundary awareness. A budget of zero (or less) disables wrapping.
//!
//! # Example
//! ```
//! use quill_core::MonospaceMetrics;
//! use quill_text::{GlyphMetrics, layout, split};
//!
//! let mut metrics = GlyphMetrics::new(MonospaceMetrics::new(10.0, 20.0), 4);
//! let table = layout(0, "abcdefg", &mut metrics);
//!
//! let lines = split(&table, 30.0);
//! let bounds: Vec<_> = lines.iter().map(|l| (l.from, l.to)).collect();
//! assert_eq!(bounds, vec![(0, 3), (3, 6), (6, 7)]);
//!
//! assert_eq!(split(&table, 0.0).len(), 1);
//! ```

use smallvec::SmallVec;

use crate::layout::AdvanceTable;

/// One wrapped display segment of a row, covering units `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualLine {
    pub row: usize,
    /// Position of this segment among the row's visual lines.
    pub sub_index: usize,
    pub from: usize,
    pub to: usize,
    /// Sum of advances in `[from, to)`.
    pub width: f64,
}

impl VisualLine {
    /// Number of units covered.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.to - self.from
    }

    /// Only the single line of an empty row is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.to == self.from
    }

    /// Whether the caret column `col` displays on this line, given whether
    /// this is the row's last visual line.
    ///
    /// A column on a wrap boundary belongs to the following line.
    #[inline]
    #[must_use]
    pub const fn holds_col(&self, col: usize, last: bool) -> bool {
        col >= self.from && (col < self.to || (last && col == self.to))
    }
}

/// Visual lines of one row. Most rows fit on one or two lines.
pub type SubLines = SmallVec<[VisualLine; 2]>;

/// Split a row into visual lines no wider than `width_budget`.
///
/// When adding a unit would exceed the budget the current line closes and
/// that unit starts the next one. Zero-advance units never cause a split,
/// and a unit wider than the budget stays on an otherwise empty line.
#[must_use]
pub fn split(table: &AdvanceTable, width_budget: f64) -> SubLines {
    let row = table.row();
    let len = table.len();
    let mut lines = SubLines::new();

    if width_budget <= 0.0 || len == 0 {
        lines.push(VisualLine {
            row,
            sub_index: 0,
            from: 0,
            to: len,
            width: table.width(),
        });
        return lines;
    }

    let mut from = 0;
    let mut width = 0.0;
    for (col, &adv) in table.advances().iter().enumerate() {
        if adv <= 0.0 {
            continue;
        }
        if width > 0.0 && width + adv > width_budget {
            debug_assert!(from < col, "visual line would be empty");
            lines.push(VisualLine {
                row,
                sub_index: lines.len(),
                from,
                to: col,
                width,
            });
            from = col;
            width = 0.0;
        }
        width += adv;
    }
    lines.push(VisualLine {
        row,
        sub_index: lines.len(),
        from,
        to: len,
        width,
    });
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout;
    use crate::metrics::GlyphMetrics;
    use quill_core::MonospaceMetrics;

    fn table(text: &str) -> AdvanceTable {
        let mut m = GlyphMetrics::new(MonospaceMetrics::new(10.0, 20.0), 4);
        layout(0, text, &mut m)
    }

    fn bounds(lines: &[VisualLine]) -> Vec<(usize, usize)> {
        lines.iter().map(|l| (l.from, l.to)).collect()
    }

    #[test]
    fn zero_budget_is_one_line() {
        let t = table("hello world");
        let lines = split(&t, 0.0);
        assert_eq!(bounds(&lines), vec![(0, 11)]);
        assert_eq!(lines[0].width, 110.0);
        assert_eq!(bounds(&split(&t, -5.0)), vec![(0, 11)]);
    }

    #[test]
    fn empty_row_is_one_empty_line() {
        let lines = split(&table(""), 30.0);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_empty());
    }

    #[test]
    fn eleven_units_budget_35() {
        // 3 units fit (30); the 4th would make 40 > 35.
        let lines = split(&table("abcdefghijk"), 35.0);
        assert_eq!(bounds(&lines), vec![(0, 3), (3, 6), (6, 9), (9, 11)]);
        let subs: Vec<_> = lines.iter().map(|l| l.sub_index).collect();
        assert_eq!(subs, vec![0, 1, 2, 3]);
        assert_eq!(lines[3].width, 20.0);
    }

    #[test]
    fn exact_fit_does_not_split() {
        assert_eq!(bounds(&split(&table("abc"), 30.0)), vec![(0, 3)]);
    }

    #[test]
    fn oversized_unit_keeps_its_own_line() {
        // Tab is 40 wide against a 25 budget.
        let lines = split(&table("a\tb"), 25.0);
        assert_eq!(bounds(&lines), vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn zero_advance_units_never_split() {
        let lines = split(&table("ab\u{7}\u{7}cd"), 20.0);
        assert_eq!(bounds(&lines), vec![(0, 4), (4, 6)]);
    }

    #[test]
    fn surrogate_pair_stays_together() {
        let lines = split(&table("a\u{1F600}\u{1F600}"), 20.0);
        assert_eq!(bounds(&lines), vec![(0, 3), (3, 5)]);
    }

    #[test]
    fn holds_col_on_boundaries() {
        let lines = split(&table("abcdef"), 30.0);
        assert!(lines[0].holds_col(2, false));
        assert!(!lines[0].holds_col(3, false));
        assert!(lines[1].holds_col(3, true));
        assert!(lines[1].holds_col(6, true));
    }
}
