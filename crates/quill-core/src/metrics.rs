#![forbid(unsafe_code)]

//! Glyph metrics boundary.
//!
//! The host supplies font metrics through [`MetricsProvider`]. Advances must
//! be stable for the lifetime of a provider instance; layout memoizes them.

/// Font metrics supplied by the host.
pub trait MetricsProvider {
    /// Height of one visual line, in pixels.
    fn line_height(&self) -> f64;

    /// Maximum ascent above the baseline, in pixels.
    fn max_ascent(&self) -> f64;

    /// Advance of a single code point.
    fn advance(&self, ch: char) -> f64;

    /// Advance of the character encoded by a surrogate pair.
    fn advance_pair(&self, high: u16, low: u16) -> f64;

    /// Advance of a string measured as one glyph run.
    ///
    /// The default sums per-character advances.
    fn advance_str(&self, text: &str) -> f64 {
        text.chars().map(|ch| self.advance(ch)).sum()
    }
}

impl<M: MetricsProvider + ?Sized> MetricsProvider for &M {
    fn line_height(&self) -> f64 {
        (**self).line_height()
    }

    fn max_ascent(&self) -> f64 {
        (**self).max_ascent()
    }

    fn advance(&self, ch: char) -> f64 {
        (**self).advance(ch)
    }

    fn advance_pair(&self, high: u16, low: u16) -> f64 {
        (**self).advance_pair(high, low)
    }

    fn advance_str(&self, text: &str) -> f64 {
        (**self).advance_str(text)
    }
}

/// A fixed-advance provider for headless hosts and tests.
///
/// Every character (including surrogate pairs) advances by the same amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    advance: f64,
    line_height: f64,
    ascent: f64,
}

impl MonospaceMetrics {
    /// Create a provider with the given advance and line height.
    ///
    /// The ascent defaults to 80% of the line height.
    #[must_use]
    pub fn new(advance: f64, line_height: f64) -> Self {
        Self {
            advance,
            line_height,
            ascent: line_height * 0.8,
        }
    }

    /// Set the ascent.
    #[must_use]
    pub fn ascent(mut self, ascent: f64) -> Self {
        self.ascent = ascent;
        self
    }

    /// The fixed per-character advance.
    #[must_use]
    pub const fn char_advance(&self) -> f64 {
        self.advance
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(10.0, 20.0)
    }
}

impl MetricsProvider for MonospaceMetrics {
    fn line_height(&self) -> f64 {
        self.line_height
    }

    fn max_ascent(&self) -> f64 {
        self.ascent
    }

    fn advance(&self, _ch: char) -> f64 {
        self.advance
    }

    fn advance_pair(&self, _high: u16, _low: u16) -> f64 {
        self.advance
    }
}
