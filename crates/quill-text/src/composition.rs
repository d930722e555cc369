#![forbid(unsafe_code)]

//! Input-method composition overlay.
//!
//! While an input method is composing, the not-yet-committed text is shown
//! spliced into the row at each pinned point and underlined. The overlay is
//! display-only: nothing reaches the text source until [`commit`].
//!
//! [`commit`]: CompositionOverlay::commit

use quill_core::Point;
use quill_style::{Style, StyleSpan};

/// Underline stroke used for composed text.
pub const COMPOSITION_UNDERLINE: f32 = 1.0;

/// Composed text ready to be inserted at each pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub text: String,
    pub pins: Vec<Point>,
}

/// Pins plus one composed string.
#[derive(Debug, Clone, Default)]
pub struct CompositionOverlay {
    pins: Vec<Point>,
    composed: String,
}

impl CompositionOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin composition at every point (typically every caret).
    pub fn pin(&mut self, points: impl IntoIterator<Item = Point>) {
        self.pins.extend(points);
        self.pins.sort();
        self.pins.dedup();
    }

    /// Replace the composed text.
    pub fn set_composed(&mut self, text: impl Into<String>) {
        self.composed = text.into();
    }

    #[must_use]
    pub fn composed(&self) -> &str {
        &self.composed
    }

    #[must_use]
    pub fn pins(&self) -> &[Point] {
        &self.pins
    }

    /// Whether no composition is pinned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Whether [`apply`](Self::apply) changes anything.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.pins.is_empty() && !self.composed.is_empty()
    }

    /// Take the composed text and pins, clearing the overlay.
    ///
    /// Returns `None` when nothing was composed.
    pub fn commit(&mut self) -> Option<Commit> {
        let pins = std::mem::take(&mut self.pins);
        let text = std::mem::take(&mut self.composed);
        if pins.is_empty() || text.is_empty() {
            return None;
        }
        tracing::debug!(pins = pins.len(), units = text.encode_utf16().count(), "composition committed");
        Some(Commit { text, pins })
    }

    /// Drop the composition without committing.
    pub fn cancel(&mut self) {
        self.pins.clear();
        self.composed.clear();
    }

    /// Display text and underline spans for `row`.
    ///
    /// Returns `raw` unchanged with no spans when nothing is pinned on the
    /// row or nothing is composed. Otherwise the composed text is spliced in
    /// at each pin left to right; span offsets are positions in the output.
    #[must_use]
    pub fn apply(&self, row: usize, raw: &str) -> (String, Vec<StyleSpan>) {
        if !self.is_active() {
            return (raw.to_owned(), Vec::new());
        }
        let units: Vec<u16> = raw.encode_utf16().collect();
        let composed: Vec<u16> = self.composed.encode_utf16().collect();
        let cols = self.cols_on(row, units.len());
        if cols.is_empty() {
            return (raw.to_owned(), Vec::new());
        }

        let mut out: Vec<u16> = Vec::with_capacity(units.len() + composed.len() * cols.len());
        let mut spans = Vec::with_capacity(cols.len());
        let mut from = 0;
        for col in cols {
            out.extend_from_slice(&units[from..col]);
            spans.push(StyleSpan::new(
                Style::Underline(COMPOSITION_UNDERLINE),
                out.len(),
                composed.len(),
            ));
            out.extend_from_slice(&composed);
            from = col;
        }
        out.extend_from_slice(&units[from..]);
        (String::from_utf16_lossy(&out), spans)
    }

    /// Map a raw column on `row` to its column in the display text.
    ///
    /// A caret at a pin displays after the composed text.
    #[must_use]
    pub fn display_col(&self, row: usize, col: usize) -> usize {
        if !self.is_active() {
            return col;
        }
        let composed = self.composed.encode_utf16().count();
        let before = self
            .pins
            .iter()
            .filter(|p| p.row == row && p.col <= col)
            .count();
        col + before * composed
    }

    fn cols_on(&self, row: usize, len: usize) -> Vec<usize> {
        // Pins are sorted, so columns come out ascending.
        self.pins
            .iter()
            .filter(|p| p.row == row)
            .map(|p| p.col.min(len))
            .collect()
    }
}
