#![forbid(unsafe_code)]

//! Carets, selections, and multi-caret groups.
//!
//! A [`Caret`] is a point plus an optional mark. Carets compare and hash by
//! point only; the mark is not part of identity. A [`CaretGroup`] keeps its
//! carets sorted and merges carets whose points coincide.
//!
//! Motion is resolved through a [`CaretNavigator`], which answers row and
//! visual-line questions. [`ViewNavigator`] implements it over a text
//! source and a [`ViewportBuffer`].

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use quill_core::unit::{byte_to_col, is_high_surrogate, is_low_surrogate};
use quill_core::{MetricsProvider, Point, Range, TextSource};
use unicode_segmentation::UnicodeSegmentation;

use crate::viewport::ViewportBuffer;

/// Row and visual-line queries needed to move carets.
pub trait CaretNavigator {
    /// Number of rows. Always at least one.
    fn rows(&self) -> usize;
    /// UTF-16 units of `row`.
    fn row_units(&self, row: usize) -> Vec<u16>;
    /// Total visual lines.
    fn total_lines(&self) -> usize;
    /// Visual line displaying `point`.
    fn line_of(&self, point: Point) -> usize;
    /// X offset of `point` within its visual line.
    fn x_in_line(&self, point: Point) -> f64;
    /// Point on visual line `line` nearest `x`.
    fn point_on_line(&self, line: usize, x: f64) -> Point;
    /// Point under window coordinates.
    fn point_at(&self, x: f64, y: f64) -> Point;

    fn row_len(&self, row: usize) -> usize {
        self.row_units(row).len()
    }
}

/// [`CaretNavigator`] over a text source and its viewport layout.
pub struct ViewNavigator<'a, S: ?Sized, M> {
    source: &'a S,
    view: &'a ViewportBuffer<M>,
}

impl<'a, S: TextSource + ?Sized, M: MetricsProvider> ViewNavigator<'a, S, M> {
    #[must_use]
    pub fn new(source: &'a S, view: &'a ViewportBuffer<M>) -> Self {
        Self { source, view }
    }
}

impl<S: TextSource + ?Sized, M: MetricsProvider> CaretNavigator for ViewNavigator<'_, S, M> {
    fn rows(&self) -> usize {
        self.source.rows().max(1)
    }

    fn row_units(&self, row: usize) -> Vec<u16> {
        self.source.text(row).encode_utf16().collect()
    }

    fn total_lines(&self) -> usize {
        self.view.total_lines()
    }

    fn line_of(&self, point: Point) -> usize {
        self.view.point_to_line(point)
    }

    fn x_in_line(&self, point: Point) -> f64 {
        self.view.x_in_line(point)
    }

    fn point_on_line(&self, line: usize, x: f64) -> Point {
        self.view.point_on_line(line, x)
    }

    fn point_at(&self, x: f64, y: f64) -> Point {
        self.view.point_at(x, y)
    }
}

/// A caret: a point, an optional mark, and a sticky horizontal position.
#[derive(Debug, Clone, Default)]
pub struct Caret {
    point: Point,
    mark: Option<Point>,
    /// X position kept across vertical moves.
    v_pos: Option<f64>,
    floating: bool,
}

impl PartialEq for Caret {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}

impl Eq for Caret {}

impl Hash for Caret {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.point.hash(state);
    }
}

impl Ord for Caret {
    fn cmp(&self, other: &Self) -> Ordering {
        self.point.cmp(&other.point)
    }
}

impl PartialOrd for Caret {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Caret {
    /// A caret at `point` with no mark.
    #[must_use]
    pub fn at(point: Point) -> Self {
        Self {
            point,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn point(&self) -> Point {
        self.point
    }

    /// Set the mark at the current point.
    pub fn mark(&mut self) {
        self.mark = Some(self.point);
    }

    pub fn clear_mark(&mut self) {
        self.mark = None;
    }

    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.mark.is_some()
    }

    #[must_use]
    pub fn mark_point(&self) -> Option<Point> {
        self.mark
    }

    /// Whether the caret is mid-drag and not yet committed.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        self.floating
    }

    /// `(point, mark)` when marked.
    #[must_use]
    pub fn marked_range(&self) -> Option<Range> {
        self.mark.map(|mark| Range::new(self.point, mark))
    }

    #[must_use]
    pub fn v_pos(&self) -> Option<f64> {
        self.v_pos
    }

    /// Move to `point`, forgetting the sticky x.
    pub fn move_to(&mut self, point: Point) {
        self.point = point;
        self.v_pos = None;
    }

    fn prepare(&mut self, with_selection: bool) {
        if !with_selection {
            self.mark = None;
        } else if self.mark.is_none() {
            self.mark();
        }
    }

    fn clamp(&mut self, nav: &impl CaretNavigator) {
        let rows = nav.rows();
        self.point = self.point.clamp_to(rows, |row| nav.row_len(row));
        if let Some(mark) = self.mark {
            self.mark = Some(mark.clamp_to(rows, |row| nav.row_len(row)));
        }
    }

    fn step_right(&mut self, nav: &impl CaretNavigator) {
        let Point { row, col } = self.point;
        let units = nav.row_units(row);
        self.point = if col < units.len() {
            let pair = is_high_surrogate(units[col])
                && units.get(col + 1).is_some_and(|&u| is_low_surrogate(u));
            Point::new(row, col + if pair { 2 } else { 1 })
        } else if row + 1 < nav.rows() {
            Point::new(row + 1, 0)
        } else {
            self.point
        };
        self.v_pos = None;
    }

    fn step_left(&mut self, nav: &impl CaretNavigator) {
        let Point { row, col } = self.point;
        self.point = if col > 0 {
            let units = nav.row_units(row);
            let pair = col >= 2 && is_low_surrogate(units[col - 1]) && is_high_surrogate(units[col - 2]);
            Point::new(row, col - if pair { 2 } else { 1 })
        } else if row > 0 {
            Point::new(row - 1, nav.row_len(row - 1))
        } else {
            self.point
        };
        self.v_pos = None;
    }

    fn step_vertical(&mut self, nav: &impl CaretNavigator, down: bool) {
        let line = nav.line_of(self.point);
        let target = if down {
            if line + 1 >= nav.total_lines() {
                return;
            }
            line + 1
        } else {
            let Some(up) = line.checked_sub(1) else {
                return;
            };
            up
        };
        let x = self.v_pos.unwrap_or_else(|| nav.x_in_line(self.point));
        self.point = nav.point_on_line(target, x);
        self.v_pos = Some(x);
    }
}

/// A non-empty, sorted set of carets.
#[derive(Debug, Clone)]
pub struct CaretGroup {
    carets: Vec<Caret>,
}

impl Default for CaretGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl CaretGroup {
    /// One caret at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            carets: vec![Caret::default()],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.carets.len()
    }

    /// Always false: a group holds at least one caret.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.carets.is_empty()
    }

    #[must_use]
    pub fn carets(&self) -> &[Caret] {
        &self.carets
    }

    /// The first caret in point order.
    #[must_use]
    pub fn primary(&self) -> &Caret {
        &self.carets[0]
    }

    #[must_use]
    pub fn points(&self) -> Vec<Point> {
        self.carets.iter().map(Caret::point).collect()
    }

    /// Every active selection range.
    #[must_use]
    pub fn marked(&self) -> Vec<Range> {
        self.carets.iter().filter_map(Caret::marked_range).collect()
    }

    /// Whether any caret is mid-drag.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        self.carets.iter().any(Caret::is_floating)
    }

    /// Replace every caret with unmarked carets at `points`.
    ///
    /// An empty list resets to a single caret at the origin.
    pub fn set_points(&mut self, points: &[Point]) {
        self.carets = points.iter().copied().map(Caret::at).collect();
        if self.carets.is_empty() {
            self.carets.push(Caret::default());
        }
        self.normalize();
    }

    /// Clamp every point and mark into the text grid.
    pub fn clamp(&mut self, nav: &impl CaretNavigator) {
        for caret in &mut self.carets {
            caret.clamp(nav);
        }
        self.normalize();
    }

    pub fn clear_marks(&mut self) {
        for caret in &mut self.carets {
            caret.clear_mark();
        }
    }

    // ====================================================================
    // Keyboard motion
    // ====================================================================

    pub fn move_right(&mut self, nav: &impl CaretNavigator, with_selection: bool) {
        self.each(nav, with_selection, |c| c.step_right(nav));
    }

    pub fn move_left(&mut self, nav: &impl CaretNavigator, with_selection: bool) {
        self.each(nav, with_selection, |c| c.step_left(nav));
    }

    pub fn move_up(&mut self, nav: &impl CaretNavigator, with_selection: bool) {
        self.each(nav, with_selection, |c| c.step_vertical(nav, false));
    }

    pub fn move_down(&mut self, nav: &impl CaretNavigator, with_selection: bool) {
        self.each(nav, with_selection, |c| c.step_vertical(nav, true));
    }

    pub fn move_home(&mut self, nav: &impl CaretNavigator, with_selection: bool) {
        self.each(nav, with_selection, |c| c.move_to(Point::new(c.point.row, 0)));
    }

    pub fn move_end(&mut self, nav: &impl CaretNavigator, with_selection: bool) {
        self.each(nav, with_selection, |c| {
            let row = c.point.row;
            c.move_to(Point::new(row, nav.row_len(row)));
        });
    }

    fn each(
        &mut self,
        nav: &impl CaretNavigator,
        with_selection: bool,
        mut step: impl FnMut(&mut Caret),
    ) {
        for caret in &mut self.carets {
            caret.clamp(nav);
            caret.prepare(with_selection);
            step(caret);
        }
        self.normalize();
    }

    // ====================================================================
    // Pointer
    // ====================================================================

    /// Collapse to a single unmarked caret under `(x, y)`.
    pub fn click(&mut self, nav: &impl CaretNavigator, x: f64, y: f64) {
        self.carets = vec![Caret::at(nav.point_at(x, y))];
    }

    /// Add a caret under `(x, y)`, merging with any caret already there.
    pub fn add_caret(&mut self, nav: &impl CaretNavigator, x: f64, y: f64) {
        self.carets.push(Caret::at(nav.point_at(x, y)));
        self.normalize();
    }

    /// Select the word under `(x, y)`.
    pub fn click_double(&mut self, nav: &impl CaretNavigator, x: f64, y: f64) {
        let at = nav.point_at(x, y);
        let units = nav.row_units(at.row);
        let (from, to) = word_around(&units, at.col);
        self.carets = vec![Caret {
            point: Point::new(at.row, to),
            mark: Some(Point::new(at.row, from)),
            ..Caret::default()
        }];
    }

    /// Select the whole row under `(x, y)`.
    pub fn click_triple(&mut self, nav: &impl CaretNavigator, x: f64, y: f64) {
        let row = nav.point_at(x, y).row;
        self.carets = vec![Caret {
            point: Point::new(row, nav.row_len(row)),
            mark: Some(Point::new(row, 0)),
            ..Caret::default()
        }];
    }

    /// Extend the primary caret's selection to `(x, y)` while dragging.
    ///
    /// The first drag event marks the caret's current point and collapses
    /// the group to that caret. The caret stays floating until
    /// [`CaretGroup::drag_end`].
    pub fn drag_to(&mut self, nav: &impl CaretNavigator, x: f64, y: f64) {
        self.carets.truncate(1);
        let caret = &mut self.carets[0];
        if caret.mark.is_none() {
            caret.mark();
        }
        caret.point = nav.point_at(x, y);
        caret.v_pos = None;
        caret.floating = true;
    }

    /// Commit floating carets. A drag that ends where it began leaves no
    /// selection.
    pub fn drag_end(&mut self) {
        for caret in &mut self.carets {
            caret.floating = false;
            if caret.mark == Some(caret.point) {
                caret.mark = None;
            }
        }
    }

    fn normalize(&mut self) {
        self.carets.sort();
        self.carets.dedup_by(|later, earlier| later.point == earlier.point);
        debug_assert!(!self.carets.is_empty());
    }
}

/// Word segment around `col`, as `(from, to)` columns.
fn word_around(units: &[u16], col: usize) -> (usize, usize) {
    if units.is_empty() {
        return (0, 0);
    }
    let text = String::from_utf16_lossy(units);
    let col = col.min(units.len());
    let mut last = (0, 0);
    for (byte, word) in text.split_word_bound_indices() {
        let from = byte_to_col(&text, byte);
        let to = from + word.encode_utf16().count();
        if col < to {
            return (from, to);
        }
        last = (from, to);
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{EditorConfig, MemorySource, MonospaceMetrics};

    const LH: f64 = 20.0;

    struct Fixture {
        source: MemorySource,
        view: ViewportBuffer<MonospaceMetrics>,
    }

    impl Fixture {
        fn new(text: &str, width: f64) -> Self {
            let source = MemorySource::from_text(text);
            let mut view =
                ViewportBuffer::new(MonospaceMetrics::new(10.0, LH), EditorConfig::default());
            view.load(&source);
            view.set_size(width, 10.0 * LH);
            Self { source, view }
        }

        fn nav(&self) -> ViewNavigator<'_, MemorySource, MonospaceMetrics> {
            ViewNavigator::new(&self.source, &self.view)
        }
    }

    fn p(row: usize, col: usize) -> Point {
        Point::new(row, col)
    }

    #[test]
    fn new_group_has_one_caret_at_origin() {
        let group = CaretGroup::new();
        assert_eq!(group.len(), 1);
        assert_eq!(group.points(), vec![p(0, 0)]);
        assert!(group.marked().is_empty());
    }

    #[test]
    fn selecting_moves_keep_mark_fixed() {
        let fx = Fixture::new("hello", 0.0);
        let nav = fx.nav();
        let mut group = CaretGroup::new();
        group.move_right(&nav, true);
        group.move_right(&nav, true);
        let caret = group.primary();
        assert_eq!(caret.point(), p(0, 2));
        assert_eq!(caret.mark_point(), Some(p(0, 0)));
        assert_eq!(caret.marked_range(), Some(Range::new(p(0, 2), p(0, 0))));
        assert_eq!(group.marked(), vec![Range::new(p(0, 2), p(0, 0))]);
    }

    #[test]
    fn plain_move_clears_mark_first() {
        let fx = Fixture::new("hello", 0.0);
        let nav = fx.nav();
        let mut group = CaretGroup::new();
        group.move_right(&nav, true);
        group.move_right(&nav, false);
        assert_eq!(group.primary().point(), p(0, 2));
        assert!(!group.primary().is_marked());
    }

    #[test]
    fn right_and_left_wrap_across_rows() {
        let fx = Fixture::new("ab\ncd", 0.0);
        let nav = fx.nav();
        let mut group = CaretGroup::new();
        group.set_points(&[p(0, 2)]);
        group.move_right(&nav, false);
        assert_eq!(group.points(), vec![p(1, 0)]);
        group.move_left(&nav, false);
        assert_eq!(group.points(), vec![p(0, 2)]);
        group.set_points(&[p(1, 2)]);
        group.move_right(&nav, false);
        assert_eq!(group.points(), vec![p(1, 2)]);
        group.set_points(&[p(0, 0)]);
        group.move_left(&nav, false);
        assert_eq!(group.points(), vec![p(0, 0)]);
    }

    #[test]
    fn horizontal_steps_skip_surrogate_pairs() {
        let fx = Fixture::new("a\u{1F600}b", 0.0);
        let nav = fx.nav();
        let mut group = CaretGroup::new();
        group.set_points(&[p(0, 1)]);
        group.move_right(&nav, false);
        assert_eq!(group.points(), vec![p(0, 3)]);
        group.move_left(&nav, false);
        assert_eq!(group.points(), vec![p(0, 1)]);
    }

    #[test]
    fn vertical_moves_keep_sticky_x() {
        let fx = Fixture::new("abcdef\nab\nabcdef", 0.0);
        let nav = fx.nav();
        let mut group = CaretGroup::new();
        group.set_points(&[p(0, 5)]);
        group.move_down(&nav, false);
        assert_eq!(group.points(), vec![p(1, 2)]);
        group.move_down(&nav, false);
        assert_eq!(group.points(), vec![p(2, 5)]);
        group.move_down(&nav, false);
        assert_eq!(group.points(), vec![p(2, 5)]);
        group.move_up(&nav, false);
        group.move_up(&nav, false);
        assert_eq!(group.points(), vec![p(0, 5)]);
        group.move_up(&nav, false);
        assert_eq!(group.points(), vec![p(0, 5)]);
    }

    #[test]
    fn vertical_moves_walk_wrapped_lines() {
        // Budget 30 wraps "abcdef" as [0,3) [3,6).
        let fx = Fixture::new("abcdef", 30.0);
        let nav = fx.nav();
        let mut group = CaretGroup::new();
        group.set_points(&[p(0, 1)]);
        group.move_down(&nav, false);
        assert_eq!(group.points(), vec![p(0, 4)]);
        group.move_up(&nav, false);
        assert_eq!(group.points(), vec![p(0, 1)]);
    }

    #[test]
    fn home_and_end() {
        let fx = Fixture::new("  abc", 0.0);
        let nav = fx.nav();
        let mut group = CaretGroup::new();
        group.set_points(&[p(0, 3)]);
        group.move_end(&nav, true);
        assert_eq!(group.primary().marked_range(), Some(Range::new(p(0, 5), p(0, 3))));
        group.move_home(&nav, false);
        assert_eq!(group.points(), vec![p(0, 0)]);
        assert!(group.marked().is_empty());
    }

    #[test]
    fn out_of_range_points_clamp() {
        let fx = Fixture::new("abc\nde", 0.0);
        let nav = fx.nav();
        let mut group = CaretGroup::new();
        group.set_points(&[p(9, 9)]);
        group.clamp(&nav);
        assert_eq!(group.points(), vec![p(1, 2)]);
        group.set_points(&[p(0, 42)]);
        group.move_left(&nav, false);
        assert_eq!(group.points(), vec![p(0, 2)]);
    }

    #[test]
    fn carets_compare_by_point_only() {
        let mut a = Caret::at(p(1, 1));
        let b = Caret::at(p(1, 1));
        a.mark();
        assert_eq!(a, b);
        assert!(Caret::at(p(0, 9)) < Caret::at(p(1, 0)));
    }

    #[test]
    fn multi_caret_merge_and_order() {
        let fx = Fixture::new("abc\nabc", 0.0);
        let nav = fx.nav();
        let mut group = CaretGroup::new();
        group.add_caret(&nav, 25.0, LH + 1.0);
        group.add_caret(&nav, 0.0, 0.0);
        assert_eq!(group.points(), vec![p(0, 0), p(1, 3)]);
        group.move_right(&nav, true);
        assert_eq!(group.points(), vec![p(0, 1), p(1, 3)]);
        assert_eq!(group.marked().len(), 2);
        group.set_points(&[p(1, 0), p(0, 3)]);
        group.move_right(&nav, false);
        assert_eq!(group.points(), vec![p(1, 0), p(1, 1)]);
        group.move_left(&nav, false);
        group.move_left(&nav, false);
        assert_eq!(group.points(), vec![p(0, 2), p(0, 3)]);
    }

    #[test]
    fn click_collapses_group() {
        let fx = Fixture::new("abc\nabc", 0.0);
        let nav = fx.nav();
        let mut group = CaretGroup::new();
        group.set_points(&[p(0, 0), p(1, 1)]);
        group.click(&nav, 11.0, LH + 3.0);
        assert_eq!(group.points(), vec![p(1, 1)]);
    }

    #[test]
    fn double_click_selects_word() {
        let fx = Fixture::new("let value = 42;", 0.0);
        let nav = fx.nav();
        let mut group = CaretGroup::new();
        group.click_double(&nav, 62.0, 1.0);
        assert_eq!(group.primary().marked_range(), Some(Range::new(p(0, 9), p(0, 4))));
    }

    #[test]
    fn triple_click_selects_row() {
        let fx = Fixture::new("one\ntwo three", 0.0);
        let nav = fx.nav();
        let mut group = CaretGroup::new();
        group.click_triple(&nav, 5.0, LH + 2.0);
        assert_eq!(group.primary().marked_range(), Some(Range::new(p(1, 9), p(1, 0))));
    }

    #[test]
    fn drag_floats_until_end() {
        let fx = Fixture::new("abcdef", 0.0);
        let nav = fx.nav();
        let mut group = CaretGroup::new();
        group.click(&nav, 11.0, 1.0);
        group.drag_to(&nav, 41.0, 1.0);
        assert!(group.is_floating());
        assert_eq!(group.primary().marked_range(), Some(Range::new(p(0, 4), p(0, 1))));
        group.drag_end();
        assert!(!group.is_floating());
        assert!(group.primary().is_marked());

        group.click(&nav, 11.0, 1.0);
        group.drag_to(&nav, 11.0, 1.0);
        group.drag_end();
        assert!(!group.primary().is_marked());
    }

    #[test]
    fn word_segments() {
        let units: Vec<u16> = "foo(bar baz".encode_utf16().collect();
        assert_eq!(word_around(&units, 0), (0, 3));
        assert_eq!(word_around(&units, 3), (3, 4));
        assert_eq!(word_around(&units, 5), (4, 7));
        assert_eq!(word_around(&units, 11), (8, 11));
        assert_eq!(word_around(&[], 0), (0, 0));
    }
}
