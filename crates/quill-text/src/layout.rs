#![forbid(unsafe_code)]

//! Row layout: per-unit advance tables.
//!
//! An [`AdvanceTable`] holds one advance per UTF-16 unit of a row, so
//! `advances.len() == text units` always. A surrogate pair records its
//! combined advance on the high unit and 0 on the low unit; tabs measure as
//! `tab_width` spaces; other control characters are zero-width.

use quill_core::MetricsProvider;
use quill_core::unit::{is_control, is_high_surrogate, is_low_surrogate};

use crate::metrics::GlyphMetrics;

/// Per-unit advances of one row.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceTable {
    row: usize,
    advances: Vec<f64>,
    /// Indices of low surrogates (not caret boundaries). Usually empty.
    joins: Vec<usize>,
    width: f64,
}

impl AdvanceTable {
    /// The row this table was laid out for.
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Renumber after rows were inserted or removed above.
    pub(crate) fn set_row(&mut self, row: usize) {
        self.row = row;
    }

    #[must_use]
    pub fn advances(&self) -> &[f64] {
        &self.advances
    }

    /// Number of text units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.advances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.advances.is_empty()
    }

    /// Total row width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Whether a caret may sit at `col` (not between surrogate halves).
    #[must_use]
    pub fn is_boundary(&self, col: usize) -> bool {
        col <= self.len() && self.joins.binary_search(&col).is_err()
    }

    /// Sum of advances in `[from, to)`.
    #[must_use]
    pub fn width_of(&self, from: usize, to: usize) -> f64 {
        let to = to.min(self.len());
        let from = from.min(to);
        self.advances[from..to].iter().sum()
    }

    /// X offset of `col` from the start of the row.
    #[must_use]
    pub fn x_of(&self, col: usize) -> f64 {
        self.width_of(0, col)
    }

    /// Nearest caret boundary in `[from, to]` to `x`, measured from `from`.
    ///
    /// A unit is entered once `x` passes its midpoint.
    #[must_use]
    pub fn col_at(&self, x: f64, from: usize, to: usize) -> usize {
        let to = to.min(self.len());
        let mut acc = 0.0;
        for col in from..to {
            let adv = self.advances[col];
            if adv > 0.0 && x < acc + adv / 2.0 {
                return col;
            }
            acc += adv;
            if x < acc && self.is_boundary(col + 1) {
                return col + 1;
            }
        }
        to
    }
}

/// Lay out one row.
pub fn layout<M: MetricsProvider>(
    row: usize,
    text: &str,
    metrics: &mut GlyphMetrics<M>,
) -> AdvanceTable {
    let units: Vec<u16> = text.encode_utf16().collect();
    layout_units(row, &units, metrics)
}

/// Lay out one row already encoded as UTF-16.
pub fn layout_units<M: MetricsProvider>(
    row: usize,
    units: &[u16],
    metrics: &mut GlyphMetrics<M>,
) -> AdvanceTable {
    let mut advances = Vec::with_capacity(units.len());
    let mut joins = Vec::new();
    let mut i = 0;
    while i < units.len() {
        let unit = units[i];
        if is_high_surrogate(unit) {
            if let Some(&low) = units.get(i + 1).filter(|&&u| is_low_surrogate(u)) {
                advances.push(metrics.advance_pair(unit, low));
                advances.push(0.0);
                joins.push(i + 1);
                i += 2;
                continue;
            }
        }
        let adv = if unit == u16::from(b'\t') {
            metrics.tab_advance()
        } else if is_control(unit) {
            0.0
        } else {
            // Lone surrogates measure as the replacement character.
            let ch = char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER);
            metrics.advance(ch)
        };
        advances.push(adv);
        i += 1;
    }
    let width = advances.iter().sum();
    debug_assert_eq!(advances.len(), units.len());
    AdvanceTable {
        row,
        advances,
        joins,
        width,
    }
}
