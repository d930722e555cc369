#![forbid(unsafe_code)]

//! Per-provider advance memo.
//!
//! Advance lookups are pure functions of code point and font, so each
//! [`GlyphMetrics`] memoizes them for the lifetime of its provider. There is
//! no eviction: a session touches a bounded alphabet.
//!
//! # Example
//! ```
//! use quill_core::MonospaceMetrics;
//! use quill_text::GlyphMetrics;
//!
//! let mut metrics = GlyphMetrics::new(MonospaceMetrics::new(8.0, 16.0), 4);
//!
//! assert_eq!(metrics.advance('a'), 8.0);
//! assert_eq!(metrics.advance('a'), 8.0);
//! assert_eq!(metrics.tab_advance(), 32.0);
//!
//! let stats = metrics.stats();
//! assert_eq!(stats.hits, 1);
//! assert_eq!(stats.misses, 1);
//! ```

use quill_core::MetricsProvider;
use rustc_hash::FxHashMap;

/// Statistics about memo performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Number of memo hits.
    pub hits: u64,
    /// Number of memo misses (provider queries).
    pub misses: u64,
    /// Current number of memoized code points.
    pub size: usize,
}

impl CacheStats {
    /// Calculate hit rate (0.0 to 1.0).
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A metrics provider plus its advance memo.
///
/// Owns the provider so the memo can never outlive the font it describes.
#[derive(Debug)]
pub struct GlyphMetrics<M> {
    provider: M,
    advances: FxHashMap<u32, f64>,
    tab_width: usize,
    tab_advance: Option<f64>,
    hits: u64,
    misses: u64,
}

impl<M: MetricsProvider> GlyphMetrics<M> {
    /// Wrap `provider`, expanding tabs to `tab_width` spaces.
    #[must_use]
    pub fn new(provider: M, tab_width: usize) -> Self {
        Self {
            provider,
            advances: FxHashMap::default(),
            tab_width,
            tab_advance: None,
            hits: 0,
            misses: 0,
        }
    }

    /// The wrapped provider.
    #[must_use]
    pub fn provider(&self) -> &M {
        &self.provider
    }

    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.provider.line_height()
    }

    #[must_use]
    pub fn max_ascent(&self) -> f64 {
        self.provider.max_ascent()
    }

    #[must_use]
    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Advance of a single code point.
    pub fn advance(&mut self, ch: char) -> f64 {
        let key = u32::from(ch);
        if let Some(&adv) = self.advances.get(&key) {
            self.hits += 1;
            return adv;
        }
        self.misses += 1;
        let adv = self.provider.advance(ch);
        self.advances.insert(key, adv);
        adv
    }

    /// Advance of the character encoded by a surrogate pair.
    ///
    /// Memoized under the decoded code point, so the pair and the `char`
    /// share one entry.
    pub fn advance_pair(&mut self, high: u16, low: u16) -> f64 {
        debug_assert!(
            quill_core::unit::is_high_surrogate(high) && quill_core::unit::is_low_surrogate(low),
            "advance_pair needs a surrogate pair"
        );
        let key = 0x1_0000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
        if let Some(&adv) = self.advances.get(&key) {
            self.hits += 1;
            return adv;
        }
        self.misses += 1;
        let adv = self.provider.advance_pair(high, low);
        self.advances.insert(key, adv);
        adv
    }

    /// Advance of the tab glyph: `tab_width` spaces measured as one string.
    pub fn tab_advance(&mut self) -> f64 {
        if let Some(adv) = self.tab_advance {
            return adv;
        }
        let adv = self.provider.advance_str(&" ".repeat(self.tab_width));
        self.tab_advance = Some(adv);
        adv
    }

    /// Whether `ch` has been memoized.
    #[must_use]
    pub fn contains(&self, ch: char) -> bool {
        self.advances.contains_key(&u32::from(ch))
    }

    /// Drop every memoized advance (e.g. after a font change).
    pub fn clear(&mut self) {
        self.advances.clear();
        self.tab_advance = None;
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    /// Get memo statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.advances.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::MonospaceMetrics;
    use std::cell::Cell;

    /// Counts provider queries so memoization is observable.
    struct Counting {
        calls: Cell<usize>,
    }

    impl MetricsProvider for Counting {
        fn line_height(&self) -> f64 {
            10.0
        }
        fn max_ascent(&self) -> f64 {
            8.0
        }
        fn advance(&self, ch: char) -> f64 {
            self.calls.set(self.calls.get() + 1);
            if ch == ' ' { 3.0 } else { 5.0 }
        }
        fn advance_pair(&self, _high: u16, _low: u16) -> f64 {
            self.calls.set(self.calls.get() + 1);
            12.0
        }
    }

    #[test]
    fn advance_is_memoized_per_code_point() {
        let mut m = GlyphMetrics::new(Counting { calls: Cell::new(0) }, 4);
        for _ in 0..5 {
            assert_eq!(m.advance('x'), 5.0);
        }
        assert_eq!(m.provider().calls.get(), 1);
        assert!(m.contains('x'));
        assert!(!m.contains('y'));
        assert_eq!(m.stats().hits, 4);
    }

    #[test]
    fn pair_shares_entry_with_decoded_char() {
        let mut m = GlyphMetrics::new(Counting { calls: Cell::new(0) }, 4);
        let mut buf = [0u16; 2];
        let units = '\u{1F600}'.encode_utf16(&mut buf);
        assert_eq!(m.advance_pair(units[0], units[1]), 12.0);
        assert_eq!(m.advance_pair(units[0], units[1]), 12.0);
        assert!(m.contains('\u{1F600}'));
        assert_eq!(m.provider().calls.get(), 1);
    }

    #[test]
    fn tab_measures_spaces_once() {
        let mut m = GlyphMetrics::new(Counting { calls: Cell::new(0) }, 4);
        assert_eq!(m.tab_advance(), 12.0);
        assert_eq!(m.tab_advance(), 12.0);
        assert_eq!(m.provider().calls.get(), 4);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut m = GlyphMetrics::new(MonospaceMetrics::default(), 2);
        m.advance('a');
        m.tab_advance();
        m.clear();
        assert_eq!(m.stats().size, 0);
        assert!(!m.contains('a'));
    }

    #[test]
    fn hit_rate() {
        let mut m = GlyphMetrics::new(MonospaceMetrics::default(), 4);
        assert_eq!(m.stats().hit_rate(), 0.0);
        m.advance('a');
        m.advance('a');
        m.advance('a');
        m.advance('b');
        assert!((m.stats().hit_rate() - 0.5).abs() < f64::EPSILON);
        m.reset_stats();
        assert_eq!(m.stats().hits, 0);
    }
}
