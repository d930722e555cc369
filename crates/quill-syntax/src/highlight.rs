#![forbid(unsafe_code)]

//! Per-row highlighting pipeline.
//!
//! A row's spans are produced by the language pass, then folded through the
//! decoration passes in order. Only the language pass output is cached; it
//! depends on the row text alone. Decorations such as the selection depend on
//! editor state and are re-applied on every query.
//!
//! # Invalidation
//!
//! [`Highlighter::refresh`] drops exactly the rows it names and renumbers
//! later rows when the row count changed. Nothing is highlighted ahead of a
//! query.
//!
//! # Background passes
//!
//! A pass run off the edit thread takes a [`Ticket`] with
//! [`Highlighter::begin`] and hands its result back through
//! [`Highlighter::complete`], which rejects the result if the row was
//! refreshed (or renumbered) after the ticket was issued.

use std::fmt;
use std::sync::Arc;

use quill_core::Range;
use quill_style::{Style, StyleSpan};
use rustc_hash::FxHashMap;

use crate::lang::Language;
use crate::theme::HighlightTheme;

/// A pure `(row, units, spans_in) -> spans_out` transform.
pub type Pass = Arc<dyn Fn(usize, &[u16], Vec<StyleSpan>) -> Vec<StyleSpan> + Send + Sync>;

/// Run `seed` through `passes` in order.
#[must_use]
pub fn fold_passes(row: usize, units: &[u16], seed: Vec<StyleSpan>, passes: &[Pass]) -> Vec<StyleSpan> {
    passes.iter().fold(seed, |spans, pass| pass(row, units, spans))
}

/// A decoration pass adding `style` over every selected column interval.
///
/// `ranges` are caret selections as reported by the caret group; their ends
/// may be in either order.
#[must_use]
pub fn selection_pass(ranges: Vec<Range>, style: Style) -> Pass {
    Arc::new(move |row: usize, units: &[u16], mut spans: Vec<StyleSpan>| {
        for range in &ranges {
            if let Some((from, to)) = range.columns_on(row, units.len()) {
                spans.push(StyleSpan::new(style, from, to - from));
            }
        }
        spans
    })
}

/// Proof that a background pass started at a given cache generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    row: usize,
    epoch: u64,
}

impl Ticket {
    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }
}

/// Cached row highlighter.
pub struct Highlighter {
    language: Language,
    theme: HighlightTheme,
    language_pass: Pass,
    decorations: Vec<Pass>,
    cache: FxHashMap<usize, Vec<StyleSpan>>,
    rows: usize,
    epoch: u64,
    /// Epoch at which each row was last refreshed.
    edited: FxHashMap<usize, u64>,
    /// Rows at or after `.0` were renumbered at epoch `.1`.
    shifted: Option<(usize, u64)>,
    hits: u64,
    misses: u64,
}

impl fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Highlighter")
            .field("language", &self.language)
            .field("decorations", &self.decorations.len())
            .field("cached_rows", &self.cache.len())
            .field("rows", &self.rows)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(Language::Plain, HighlightTheme::default())
    }
}

impl Highlighter {
    #[must_use]
    pub fn new(language: Language, theme: HighlightTheme) -> Self {
        Self {
            language,
            language_pass: language.pass(&theme),
            theme,
            decorations: Vec::new(),
            cache: FxHashMap::default(),
            rows: 0,
            epoch: 0,
            edited: FxHashMap::default(),
            shifted: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Highlighter for a language name; unknown names highlight nothing.
    #[must_use]
    pub fn for_language(name: &str) -> Self {
        Self::new(Language::from_name(name), HighlightTheme::default())
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn theme(&self) -> &HighlightTheme {
        &self.theme
    }

    /// The language pass, for running off the edit thread.
    #[must_use]
    pub fn language_pass(&self) -> Pass {
        Arc::clone(&self.language_pass)
    }

    /// Switch language. Drops every cached row.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.language_pass = language.pass(&self.theme);
        self.invalidate_all();
    }

    /// Switch theme. Drops every cached row.
    pub fn set_theme(&mut self, theme: HighlightTheme) {
        self.language_pass = self.language.pass(&theme);
        self.theme = theme;
        self.invalidate_all();
    }

    /// Append a decoration pass run after the language pass.
    pub fn push_decoration(&mut self, pass: Pass) {
        self.decorations.push(pass);
    }

    pub fn clear_decorations(&mut self) {
        self.decorations.clear();
    }

    #[must_use]
    pub fn decoration_count(&self) -> usize {
        self.decorations.len()
    }

    /// Reset for a source with `rows` rows.
    pub fn load(&mut self, rows: usize) {
        self.rows = rows;
        self.invalidate_all();
    }

    /// Row count the cache is numbered against.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn is_cached(&self, row: usize) -> bool {
        self.cache.contains_key(&row)
    }

    #[must_use]
    pub fn cached_rows(&self) -> usize {
        self.cache.len()
    }

    /// `(hits, misses)` of the language-pass cache.
    #[must_use]
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Language spans for `row`, from cache or computed now.
    pub fn language_spans(&mut self, row: usize, units: &[u16]) -> &[StyleSpan] {
        if self.cache.contains_key(&row) {
            self.hits += 1;
        } else {
            self.misses += 1;
            let spans = (self.language_pass)(row, units, Vec::new());
            tracing::trace!(row, spans = spans.len(), "row highlighted");
            self.cache.insert(row, spans);
        }
        self.cache.get(&row).map_or(&[][..], Vec::as_slice)
    }

    /// Full spans for `row`: language pass, then every decoration.
    pub fn row_spans(&mut self, row: usize, units: &[u16]) -> Vec<StyleSpan> {
        let seed = self.language_spans(row, units).to_vec();
        fold_passes(row, units, seed, &self.decorations)
    }

    /// Full spans for `row` with `extra` passes folded after the stored
    /// decorations.
    pub fn row_spans_with(&mut self, row: usize, units: &[u16], extra: &[Pass]) -> Vec<StyleSpan> {
        let spans = self.row_spans(row, units);
        fold_passes(row, units, spans, extra)
    }

    // ====================================================================
    // Background tickets
    // ====================================================================

    /// Start a background pass for `row`.
    #[must_use]
    pub fn begin(&self, row: usize) -> Ticket {
        Ticket {
            row,
            epoch: self.epoch,
        }
    }

    /// Whether a result for `ticket` would still be accepted.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        let edited = self
            .edited
            .get(&ticket.row)
            .is_some_and(|&epoch| epoch > ticket.epoch);
        let shifted = self
            .shifted
            .is_some_and(|(from, epoch)| ticket.row >= from && epoch > ticket.epoch);
        !edited && !shifted && ticket.row < self.rows
    }

    /// Store a background result. Returns `false` and discards it when the
    /// row changed since `ticket` was issued.
    pub fn complete(&mut self, ticket: Ticket, spans: Vec<StyleSpan>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(row = ticket.row, epoch = ticket.epoch, current = self.epoch, "stale highlight discarded");
            return false;
        }
        self.cache.insert(ticket.row, spans);
        true
    }

    // ====================================================================
    // Edits
    // ====================================================================

    /// Invalidate rows `[row_start, row_end)` after an edit.
    ///
    /// The range is in post-edit row numbers and `rows` is the post-edit
    /// row count. A change in row count is taken as rows inserted (or
    /// removed) inside the range; later cached rows keep their spans under
    /// their new numbers.
    pub fn refresh(&mut self, row_start: usize, row_end: usize, rows: usize) {
        let old_rows = self.rows;
        let delta = rows as isize - old_rows as isize;

        let start = row_start.min(rows);
        let mut new_end = row_end.clamp(start, rows);
        if delta > 0 {
            new_end = new_end.max(start + delta.unsigned_abs()).min(rows);
        }
        let old_end = new_end.saturating_add_signed(-delta);
        if old_end > old_rows || old_end < start {
            tracing::warn!(row_start, row_end, old_rows, rows, "highlight refresh range inconsistent; clearing");
            self.load(rows);
            return;
        }

        self.epoch += 1;
        let epoch = self.epoch;
        tracing::debug!(start, old_end, new_end, delta, epoch, "highlight refresh");

        if delta == 0 {
            self.cache.retain(|&row, _| !(start..old_end).contains(&row));
        } else {
            let cache = std::mem::take(&mut self.cache);
            self.cache = cache
                .into_iter()
                .filter_map(|(row, spans)| {
                    if row < start {
                        Some((row, spans))
                    } else if row >= old_end {
                        Some((row.saturating_add_signed(delta), spans))
                    } else {
                        None
                    }
                })
                .collect();
            self.edited.retain(|&row, _| row < start);
            let from = self.shifted.map_or(start, |(prev, _)| prev.min(start));
            self.shifted = Some((from, epoch));
        }
        for row in start..new_end {
            self.edited.insert(row, epoch);
        }
        self.rows = rows;
    }

    fn invalidate_all(&mut self) {
        self.epoch += 1;
        self.cache.clear();
        self.edited.clear();
        self.shifted = Some((0, self.epoch));
    }
}
