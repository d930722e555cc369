#![forbid(unsafe_code)]

//! Scrollable window over wrapped visual lines.
//!
//! [`ViewportBuffer`] caches an advance table and its visual lines for every
//! row, a prefix index from rows to their first visual line, and the window
//! of lines currently materialized for display starting at `top_line`.
//!
//! Small scrolls patch the window in place (cost proportional to the scroll
//! distance); jumps of two thirds of the window or more rebuild it. Both
//! paths produce the same window for the same `top_line`.

use std::collections::VecDeque;

use quill_core::{EditorConfig, Loc, MetricsProvider, Point, TextSource};

use crate::layout::{AdvanceTable, layout};
use crate::metrics::GlyphMetrics;
use crate::wrap::{SubLines, VisualLine, split};

/// Which path the last `scroll_to` took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollOutcome {
    #[default]
    Unchanged,
    /// The window was patched at its edges.
    Patched,
    /// The window was rebuilt from scratch.
    Rebuilt,
}

#[derive(Debug, Clone)]
struct RowEntry {
    table: AdvanceTable,
    lines: SubLines,
}

impl RowEntry {
    fn renumber(&mut self, row: usize) {
        self.table.set_row(row);
        for line in &mut self.lines {
            line.row = row;
        }
    }

    /// Index of the visual line displaying `col`.
    fn sub_of(&self, col: usize) -> usize {
        let last = self.lines.len() - 1;
        self.lines
            .iter()
            .position(|l| l.holds_col(col, l.sub_index == last))
            .unwrap_or(last)
    }
}

/// Visual-line layout of a whole text source plus the visible window.
#[derive(Debug)]
pub struct ViewportBuffer<M> {
    metrics: GlyphMetrics<M>,
    config: EditorConfig,
    width: f64,
    height: f64,
    rows: Vec<RowEntry>,
    /// `line_starts[r]` is the first visual line of row `r`; the final entry
    /// is the total line count.
    line_starts: Vec<usize>,
    top_line: usize,
    window: VecDeque<VisualLine>,
    last_scroll: ScrollOutcome,
}

impl<M: MetricsProvider> ViewportBuffer<M> {
    /// Create an empty buffer. Call [`ViewportBuffer::load`] before use.
    #[must_use]
    pub fn new(provider: M, config: EditorConfig) -> Self {
        Self {
            metrics: GlyphMetrics::new(provider, config.tab_width),
            config,
            width: 0.0,
            height: 0.0,
            rows: Vec::new(),
            line_starts: vec![0],
            top_line: 0,
            window: VecDeque::new(),
            last_scroll: ScrollOutcome::Unchanged,
        }
    }

    /// Lay out every row of `source` and rebuild the window at the top.
    pub fn load<S: TextSource + ?Sized>(&mut self, source: &S) {
        let _span = tracing::debug_span!("viewport.load", rows = source.rows()).entered();
        self.rows = (0..source.rows())
            .map(|row| self.lay(row, &source.text(row)))
            .collect();
        self.recompute_starts(0);
        self.top_line = 0;
        self.rebuild_window();
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    #[must_use]
    pub fn metrics(&self) -> &GlyphMetrics<M> {
        &self.metrics
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.metrics.line_height()
    }

    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Index of the first materialized visual line.
    #[must_use]
    pub fn top_line(&self) -> usize {
        self.top_line
    }

    /// The materialized window, in display order.
    #[must_use]
    pub fn window(&self) -> &VecDeque<VisualLine> {
        &self.window
    }

    /// Path taken by the most recent `scroll_to`.
    #[must_use]
    pub fn last_scroll(&self) -> ScrollOutcome {
        self.last_scroll
    }

    /// Number of cached rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Total number of visual lines.
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.line_starts.last().copied().unwrap_or(0)
    }

    /// Lines the viewport height can show: `ceil(height / line_height)`.
    #[must_use]
    pub fn window_capacity(&self) -> usize {
        let line_height = self.line_height();
        if line_height <= 0.0 || self.height <= 0.0 {
            return 0;
        }
        (self.height / line_height).ceil() as usize
    }

    #[must_use]
    pub fn advance_table(&self, row: usize) -> Option<&AdvanceTable> {
        self.rows.get(row).map(|e| &e.table)
    }

    /// Visual lines of `row`; empty when the row is not cached.
    #[must_use]
    pub fn lines_for_row(&self, row: usize) -> &[VisualLine] {
        self.rows.get(row).map_or(&[], |e| e.lines.as_slice())
    }

    /// Visual line at global index `line`.
    #[must_use]
    pub fn line_at(&self, line: usize) -> Option<VisualLine> {
        if line >= self.total_lines() {
            return None;
        }
        let row = self.line_to_row(line);
        self.rows
            .get(row)?
            .lines
            .get(line - self.line_starts[row])
            .copied()
    }

    /// Row owning visual line `line` (clamped to the last row).
    #[must_use]
    pub fn line_to_row(&self, line: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= line)
            .saturating_sub(1)
            .min(self.rows.len().saturating_sub(1))
    }

    /// First visual line of `row` (the total line count past the end).
    #[must_use]
    pub fn row_to_line(&self, row: usize) -> usize {
        self.line_starts
            .get(row)
            .copied()
            .unwrap_or_else(|| self.total_lines())
    }

    /// Visual line displaying `point` (clamped into the layout).
    #[must_use]
    pub fn point_to_line(&self, point: Point) -> usize {
        let Some(entry) = self.rows.get(point.row) else {
            return self.total_lines().saturating_sub(1);
        };
        self.line_starts[point.row] + entry.sub_of(point.col.min(entry.table.len()))
    }

    /// X offset of `point` from the start of its visual line.
    #[must_use]
    pub fn x_in_line(&self, point: Point) -> f64 {
        let Some(entry) = self.rows.get(point.row) else {
            return 0.0;
        };
        let col = point.col.min(entry.table.len());
        let line = &entry.lines[entry.sub_of(col)];
        entry.table.width_of(line.from, col)
    }

    // ====================================================================
    // Sizing and scrolling
    // ====================================================================

    /// Resize the viewport.
    ///
    /// A width change that moves the wrap budget re-splits every row; any
    /// change refills the window.
    pub fn set_size(&mut self, width: f64, height: f64) {
        let old_budget = self.budget();
        self.width = width;
        self.height = height;
        let budget = self.budget();
        if budget != old_budget {
            let _span = tracing::debug_span!("viewport.rewrap", width, budget).entered();
            let anchor = self.line_to_row(self.top_line);
            for entry in &mut self.rows {
                entry.lines = split(&entry.table, budget);
            }
            self.recompute_starts(0);
            self.top_line = self.row_to_line(anchor);
        }
        self.clamp_top();
        self.rebuild_window();
    }

    /// Scroll so that `line` is the first visual line in the window.
    ///
    /// `line` is clamped to `[0, total_lines - 1]`.
    pub fn scroll_to(&mut self, line: usize) {
        let total = self.total_lines();
        if total == 0 {
            self.last_scroll = ScrollOutcome::Unchanged;
            return;
        }
        let line = line.min(total - 1);
        if line == self.top_line {
            self.last_scroll = ScrollOutcome::Unchanged;
            return;
        }
        let distance = line.abs_diff(self.top_line);
        if 3 * distance < 2 * self.window.len() {
            self.patch_window(line);
            self.last_scroll = ScrollOutcome::Patched;
        } else {
            self.top_line = line;
            self.rebuild_window();
            self.last_scroll = ScrollOutcome::Rebuilt;
        }
    }

    /// Scroll by a signed number of visual lines.
    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_to(self.top_line.saturating_add_signed(delta));
    }

    /// Scroll the minimum amount that brings `point`'s visual line into the
    /// window. Returns whether a scroll happened.
    pub fn ensure_visible(&mut self, point: Point) -> bool {
        let line = self.point_to_line(point);
        let capacity = self.window_capacity().max(1);
        let target = if line < self.top_line {
            line
        } else if line >= self.top_line + capacity {
            line + 1 - capacity
        } else {
            return false;
        };
        self.scroll_to(target);
        true
    }

    /// Refill the window from the row cache at the current `top_line`.
    pub fn rebuild_window(&mut self) {
        let end = (self.top_line + self.window_capacity()).min(self.total_lines());
        let _span = tracing::debug_span!("viewport.rebuild", top = self.top_line, end).entered();
        self.window.clear();
        for line in self.top_line..end {
            if let Some(visual) = self.line_at(line) {
                self.window.push_back(visual);
            }
        }
        tracing::trace!(lines = self.window.len(), "window rebuilt");
    }

    fn patch_window(&mut self, line: usize) {
        let old_top = self.top_line;
        let old_end = old_top + self.window.len();
        let new_end = (line + self.window_capacity()).min(self.total_lines());
        let _span =
            tracing::debug_span!("viewport.patch", from = old_top, to = line).entered();
        if line > old_top {
            for _ in 0..(line - old_top).min(self.window.len()) {
                self.window.pop_front();
            }
            for index in old_end.max(line)..new_end {
                if let Some(visual) = self.line_at(index) {
                    self.window.push_back(visual);
                }
            }
        } else {
            self.window.truncate(new_end.saturating_sub(old_top));
            for index in (line..old_top.min(new_end)).rev() {
                if let Some(visual) = self.line_at(index) {
                    self.window.push_front(visual);
                }
            }
        }
        self.top_line = line;
        tracing::trace!(lines = self.window.len(), "window patched");
    }

    // ====================================================================
    // Edits
    // ====================================================================

    /// Re-lay out rows `[row_start, row_end)` after an edit.
    ///
    /// The range is in post-edit row numbers. When the source's row count
    /// changed, the difference is taken as rows inserted (or removed) inside
    /// the range; later cached rows are renumbered, not re-laid out.
    pub fn refresh<S: TextSource + ?Sized>(&mut self, source: &S, row_start: usize, row_end: usize) {
        let new_rows = source.rows();
        let old_rows = self.rows.len();
        let delta = new_rows as isize - old_rows as isize;

        let start = row_start.min(new_rows);
        let mut new_end = row_end.clamp(start, new_rows);
        if delta > 0 {
            new_end = new_end.max(start + delta.unsigned_abs()).min(new_rows);
        }
        let old_end = new_end.saturating_add_signed(-delta);
        if old_end > old_rows || old_end < start {
            tracing::warn!(row_start, row_end, old_rows, new_rows, "refresh range inconsistent; reloading");
            let top = self.top_line;
            self.load(source);
            self.top_line = top.min(self.total_lines().saturating_sub(1));
            self.rebuild_window();
            return;
        }

        let _span = tracing::debug_span!(
            "viewport.refresh",
            start,
            old_end,
            new_end,
            delta
        )
        .entered();

        let top_row = self.line_to_row(self.top_line);
        let top_sub = self.top_line.saturating_sub(self.row_to_line(top_row));

        let fresh: Vec<RowEntry> = (start..new_end)
            .map(|row| self.lay(row, &source.text(row)))
            .collect();
        self.rows.splice(start..old_end, fresh);
        if delta != 0 {
            for (row, entry) in self.rows.iter_mut().enumerate().skip(new_end) {
                entry.renumber(row);
            }
        }
        self.recompute_starts(start);

        if !self.rows.is_empty() {
            let row = if top_row >= old_end {
                top_row.saturating_add_signed(delta)
            } else {
                top_row
            }
            .min(self.rows.len() - 1);
            let sub = top_sub.min(self.rows[row].lines.len() - 1);
            self.top_line = self.row_to_line(row) + sub;
        }
        self.clamp_top();
        self.rebuild_window();
    }

    // ====================================================================
    // Hit testing
    // ====================================================================

    /// Pixel offset of `(row, col)` relative to the window's top-left, or
    /// `None` when its visual line is not in the window.
    #[must_use]
    pub fn locate(&self, row: usize, col: usize) -> Option<Loc> {
        let entry = self.rows.get(row)?;
        let col = col.min(entry.table.len());
        let sub = entry.sub_of(col);
        let index = self.line_starts[row] + sub;
        if index < self.top_line || index >= self.top_line + self.window.len() {
            return None;
        }
        let x = entry.table.width_of(entry.lines[sub].from, col);
        let y = (index - self.top_line) as f64 * self.line_height();
        Some(Loc::new(x, y))
    }

    /// Point under window coordinates `(x, y)`.
    ///
    /// Positions below the last line resolve to the last line.
    #[must_use]
    pub fn point_at(&self, x: f64, y: f64) -> Point {
        let total = self.total_lines();
        if total == 0 {
            return Point::ZERO;
        }
        let line_height = self.line_height();
        let offset = if y <= 0.0 || line_height <= 0.0 {
            0
        } else {
            (y / line_height).floor() as usize
        };
        self.point_on_line((self.top_line + offset).min(total - 1), x)
    }

    /// Point on visual line `line` nearest to `x` (relative to the line).
    ///
    /// On a wrapped line that is not the row's last, the column stays before
    /// the wrap boundary so the caret displays on this line.
    #[must_use]
    pub fn point_on_line(&self, line: usize, x: f64) -> Point {
        let Some(visual) = self.line_at(line) else {
            return Point::ZERO;
        };
        let entry = &self.rows[visual.row];
        let mut col = entry.table.col_at(x, visual.from, visual.to);
        let last = visual.sub_index + 1 == entry.lines.len();
        if !last && col >= visual.to {
            col = visual.to - 1;
            while col > visual.from && !entry.table.is_boundary(col) {
                col -= 1;
            }
        }
        Point::new(visual.row, col)
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn budget(&self) -> f64 {
        self.config.wrap_budget(self.width)
    }

    fn lay(&mut self, row: usize, text: &str) -> RowEntry {
        let table = layout(row, text, &mut self.metrics);
        let lines = split(&table, self.budget());
        RowEntry { table, lines }
    }

    fn recompute_starts(&mut self, from_row: usize) {
        self.line_starts.truncate(from_row + 1);
        if self.line_starts.is_empty() {
            self.line_starts.push(0);
        }
        for row in from_row..self.rows.len() {
            let next = self.line_starts[row] + self.rows[row].lines.len();
            self.line_starts.push(next);
        }
    }

    fn clamp_top(&mut self) {
        self.top_line = self.top_line.min(self.total_lines().saturating_sub(1));
    }
}
