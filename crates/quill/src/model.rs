#![forbid(unsafe_code)]

//! The editing model: one text source plus the layout, caret, highlight and
//! composition state that render it.
//!
//! Every input event is applied in a fixed order: the source is mutated
//! first, then the affected rows are refreshed in the viewport and the
//! highlighter, then the carets are updated, and finally the primary caret
//! is scrolled into view. A [`EditorModel::frame`] taken afterwards never
//! sees a half-invalidated cache.

use std::fmt;
use std::path::Path;

use quill_core::unit::{to_units, unit_len};
use quill_core::{
    Action, ActionKind, EditorConfig, Loc, MemorySource, MetricsProvider, Point, TextSource,
};
use quill_style::{StyleCompositor, StyleSpan, StyledRun, clip_runs};
use quill_syntax::{HighlightTheme, Highlighter, Language, Pass, selection_pass};
use quill_text::{CaretGroup, CompositionOverlay, ViewNavigator, ViewportBuffer, VisualLine};

use crate::frame::{Frame, FrameLine};
use crate::{Error, Result};

/// Gap between the caret line and the input-method candidate window.
const IME_ANCHOR_GAP: f64 = 5.0;

/// Editor state over a text source `S` measured by metrics provider `M`.
pub struct EditorModel<S, M> {
    source: S,
    view: ViewportBuffer<M>,
    carets: CaretGroup,
    highlighter: Highlighter,
    composition: CompositionOverlay,
}

impl<S: TextSource, M> fmt::Debug for EditorModel<S, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorModel")
            .field("rows", &self.source.rows())
            .field("carets", &self.carets)
            .field("highlighter", &self.highlighter)
            .field("composition", &self.composition)
            .finish_non_exhaustive()
    }
}

impl<M: MetricsProvider> EditorModel<MemorySource, M> {
    /// Load `path` into an in-memory source, picking the language from the
    /// file extension.
    pub fn open(path: impl AsRef<Path>, provider: M, config: EditorConfig) -> Result<Self> {
        let path = path.as_ref();
        let source = MemorySource::open(path)?;
        let language = Language::from_path(path);
        tracing::debug!(path = %path.display(), language = language.name(), "opened");
        Ok(Self::try_new(source, provider, config)?.with_language(language))
    }
}

impl<S: TextSource, M: MetricsProvider> EditorModel<S, M> {
    /// Build a model over `source`, highlighting nothing until a language
    /// is set.
    pub fn new(source: S, provider: M, config: EditorConfig) -> Self {
        let mut view = ViewportBuffer::new(provider, config);
        view.load(&source);
        let mut highlighter = Highlighter::default();
        highlighter.load(source.rows());
        Self {
            source,
            view,
            carets: CaretGroup::new(),
            highlighter,
            composition: CompositionOverlay::new(),
        }
    }

    /// Like [`EditorModel::new`], rejecting an invalid configuration.
    pub fn try_new(source: S, provider: M, config: EditorConfig) -> Result<Self> {
        config.validate().map_err(Error::Config)?;
        Ok(Self::new(source, provider, config))
    }

    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.set_language(language);
        self
    }

    pub fn set_language(&mut self, language: Language) {
        self.highlighter.set_language(language);
    }

    pub fn set_theme(&mut self, theme: HighlightTheme) {
        self.highlighter.set_theme(theme);
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn view(&self) -> &ViewportBuffer<M> {
        &self.view
    }

    pub fn carets(&self) -> &CaretGroup {
        &self.carets
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Mutable access for adding decoration passes.
    pub fn highlighter_mut(&mut self) -> &mut Highlighter {
        &mut self.highlighter
    }

    pub fn composition(&self) -> &CompositionOverlay {
        &self.composition
    }

    /// Whether an input-method composition is in progress.
    pub fn is_composing(&self) -> bool {
        !self.composition.is_empty()
    }

    // ====================================================================
    // Persistence
    // ====================================================================

    /// Save to `path`.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.source.save(path)?;
        tracing::debug!(path = %path.display(), "saved");
        Ok(())
    }

    /// Save to the source's own path. Fails with
    /// [`std::io::ErrorKind::NotFound`] when the source has none.
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = self.source.path().map(Path::to_path_buf) else {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "text source has no path",
            )));
        };
        self.save_as(path)
    }

    // ====================================================================
    // Viewport
    // ====================================================================

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.view.set_size(width, height);
    }

    pub fn scroll_to(&mut self, line: usize) {
        self.view.scroll_to(line);
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.view.scroll_by(delta);
    }

    // ====================================================================
    // Actions
    // ====================================================================

    /// Apply one input action. Returns whether any state changed.
    ///
    /// Actions are ignored while a composition is in progress.
    pub fn handle(&mut self, action: &Action) -> bool {
        if self.is_composing() {
            tracing::trace!(kind = ?action.kind, "action ignored while composing");
            return false;
        }
        match &action.kind {
            ActionKind::Typed(text) => self.input(text),
            ActionKind::Delete => self.delete(),
            ActionKind::Backspace => self.backspace(),
            ActionKind::CaretRight => self.motion(|c, nav| c.move_right(nav, false)),
            ActionKind::CaretLeft => self.motion(|c, nav| c.move_left(nav, false)),
            ActionKind::CaretUp => self.motion(|c, nav| c.move_up(nav, false)),
            ActionKind::CaretDown => self.motion(|c, nav| c.move_down(nav, false)),
            ActionKind::SelectCaretRight => self.motion(|c, nav| c.move_right(nav, true)),
            ActionKind::SelectCaretLeft => self.motion(|c, nav| c.move_left(nav, true)),
            ActionKind::SelectCaretUp => self.motion(|c, nav| c.move_up(nav, true)),
            ActionKind::SelectCaretDown => self.motion(|c, nav| c.move_down(nav, true)),
            ActionKind::Undo => self.undo(),
            ActionKind::Redo => self.redo(),
            ActionKind::Empty => false,
        }
    }

    /// Insert `text` at every caret as one undo step.
    pub fn input(&mut self, text: &str) -> bool {
        let points = self.clamped_points();
        self.insert_at(points, text)
    }

    /// Delete the unit after every caret as one undo step.
    pub fn delete(&mut self) -> bool {
        let mut points = self.clamped_points();
        let first = points[0].row;
        let mut changed = false;
        self.source.begin_edit(&points);
        for i in 0..points.len() {
            let at = points[i];
            let removed = self.source.delete(at);
            if removed.is_empty() {
                continue;
            }
            changed = true;
            let old_end = if removed == "\n" {
                Point::new(at.row + 1, 0)
            } else {
                Point::new(at.row, at.col + unit_len(&removed))
            };
            for later in &mut points[i + 1..] {
                *later = remap(*later, old_end, at);
            }
        }
        self.source.end_edit(&points);
        if changed {
            self.after_edit(first, &points);
        }
        changed
    }

    /// Delete the unit before every caret as one undo step.
    pub fn backspace(&mut self) -> bool {
        let mut points = self.clamped_points();
        let mut first = points[0].row;
        let mut changed = false;
        self.source.begin_edit(&points);
        for i in 0..points.len() {
            let at = points[i];
            let to = self.source.backspace(at);
            if to == at {
                continue;
            }
            changed = true;
            first = first.min(to.row);
            for later in &mut points[i + 1..] {
                *later = remap(*later, at, to);
            }
            points[i] = to;
        }
        self.source.end_edit(&points);
        if changed {
            self.after_edit(first, &points);
        }
        changed
    }

    pub fn undo(&mut self) -> bool {
        let points = self.source.undo();
        self.after_history(&points)
    }

    pub fn redo(&mut self) -> bool {
        let points = self.source.redo();
        self.after_history(&points)
    }

    fn insert_at(&mut self, mut points: Vec<Point>, text: &str) -> bool {
        if text.is_empty() || points.is_empty() {
            return false;
        }
        let first = points[0].row;
        self.source.begin_edit(&points);
        for i in 0..points.len() {
            let at = points[i];
            let to = self.source.insert(at, text);
            for later in &mut points[i + 1..] {
                *later = remap(*later, at, to);
            }
            points[i] = to;
        }
        self.source.end_edit(&points);
        self.after_edit(first, &points);
        true
    }

    /// Refresh rows from `first` through the last caret's row, then place
    /// the carets.
    fn after_edit(&mut self, first: usize, points: &[Point]) {
        let last = points.iter().map(|p| p.row).max().unwrap_or(first);
        let end = last.max(first) + 1;
        self.refresh(first, end);
        self.carets.set_points(points);
        self.reveal_primary();
    }

    /// One history step may touch rows under every caret, and its points
    /// only say where carets land, so every row is refreshed.
    fn after_history(&mut self, points: &[Point]) -> bool {
        if points.is_empty() {
            return false;
        }
        self.refresh(0, self.source.rows());
        self.carets.set_points(points);
        let nav = ViewNavigator::new(&self.source, &self.view);
        self.carets.clamp(&nav);
        self.reveal_primary();
        true
    }

    fn refresh(&mut self, start: usize, end: usize) {
        let _span = tracing::debug_span!("model.refresh", start, end).entered();
        self.view.refresh(&self.source, start, end);
        self.highlighter.refresh(start, end, self.source.rows());
    }

    fn motion(
        &mut self,
        step: impl FnOnce(&mut CaretGroup, &ViewNavigator<'_, S, M>),
    ) -> bool {
        let points = self.carets.points();
        let marked = self.carets.marked();
        {
            let nav = ViewNavigator::new(&self.source, &self.view);
            step(&mut self.carets, &nav);
        }
        self.reveal_primary();
        points != self.carets.points() || marked != self.carets.marked()
    }

    fn clamped_points(&mut self) -> Vec<Point> {
        let nav = ViewNavigator::new(&self.source, &self.view);
        self.carets.clamp(&nav);
        self.carets.clear_marks();
        self.carets.points()
    }

    fn reveal_primary(&mut self) {
        self.view.ensure_visible(self.carets.primary().point());
    }

    // ====================================================================
    // Pointer
    // ====================================================================

    /// Place a single caret under the pointer (host coordinates).
    pub fn click(&mut self, x: f64, y: f64) {
        let (x, y) = self.to_window(x, y);
        let nav = ViewNavigator::new(&self.source, &self.view);
        self.carets.click(&nav, x, y);
    }

    /// Add a caret under the pointer.
    pub fn add_caret(&mut self, x: f64, y: f64) {
        let (x, y) = self.to_window(x, y);
        let nav = ViewNavigator::new(&self.source, &self.view);
        self.carets.add_caret(&nav, x, y);
    }

    /// Select the word under the pointer.
    pub fn click_double(&mut self, x: f64, y: f64) {
        let (x, y) = self.to_window(x, y);
        let nav = ViewNavigator::new(&self.source, &self.view);
        self.carets.click_double(&nav, x, y);
    }

    /// Select the row under the pointer.
    pub fn click_triple(&mut self, x: f64, y: f64) {
        let (x, y) = self.to_window(x, y);
        let nav = ViewNavigator::new(&self.source, &self.view);
        self.carets.click_triple(&nav, x, y);
    }

    /// Extend the selection to the pointer while dragging.
    pub fn drag_to(&mut self, x: f64, y: f64) {
        let (x, y) = self.to_window(x, y);
        {
            let nav = ViewNavigator::new(&self.source, &self.view);
            self.carets.drag_to(&nav, x, y);
        }
        self.reveal_primary();
    }

    pub fn drag_end(&mut self) {
        self.carets.drag_end();
    }

    fn to_window(&self, x: f64, y: f64) -> (f64, f64) {
        let config = self.view.config();
        (x - config.margin_left, y - config.margin_top)
    }

    // ====================================================================
    // Input-method composition
    // ====================================================================

    /// Show `text` as the in-progress composition at every caret.
    pub fn compose(&mut self, text: &str) {
        if self.composition.is_empty() {
            self.composition.pin(self.carets.points());
        }
        self.composition.set_composed(text);
    }

    /// Insert the composed text at every pin and end the composition.
    pub fn commit_composition(&mut self) -> bool {
        let Some(commit) = self.composition.commit() else {
            return false;
        };
        self.insert_at(commit.pins, &commit.text)
    }

    pub fn cancel_composition(&mut self) {
        self.composition.cancel();
    }

    /// Where the host should place its candidate window: just below the
    /// primary caret. `None` when the caret is off screen.
    pub fn input_method_anchor(&self) -> Option<Loc> {
        let config = self.view.config();
        let point = self.carets.primary().point();
        let loc = self.view.locate(point.row, point.col)?;
        Some(loc.offset(
            config.margin_left,
            config.margin_top + self.view.line_height() + IME_ANCHOR_GAP,
        ))
    }

    // ====================================================================
    // Frame assembly
    // ====================================================================

    /// Styled lines and caret positions for the current window.
    ///
    /// Rows are highlighted on demand; only rows in the window are touched.
    pub fn frame(&mut self) -> Frame {
        let _span = tracing::debug_span!("model.frame", top = self.view.top_line()).entered();
        let config = self.view.config();
        let (margin_left, margin_top) = (config.margin_left, config.margin_top);
        let line_height = self.view.line_height();
        let selection = selection_pass(self.carets.marked(), self.highlighter.theme().selection);
        let window: Vec<VisualLine> = self.view.window().iter().copied().collect();

        let mut lines = Vec::with_capacity(window.len());
        let mut current: Option<(usize, Vec<u16>, Vec<StyledRun>)> = None;
        for (i, visual) in window.iter().enumerate() {
            if current.as_ref().is_none_or(|(row, ..)| *row != visual.row) {
                current = Some(self.compose_row(visual.row, &selection));
            }
            let Some((_, units, runs)) = current.as_ref() else {
                continue;
            };
            let last = visual.sub_index + 1 == self.view.lines_for_row(visual.row).len();
            let from = if visual.from == 0 {
                0
            } else {
                self.composition.display_col(visual.row, visual.from)
            };
            let to = if last {
                units.len()
            } else {
                self.composition.display_col(visual.row, visual.to)
            };
            lines.push(FrameLine {
                row: visual.row,
                sub_index: visual.sub_index,
                origin: Loc::new(margin_left, margin_top + i as f64 * line_height),
                width: visual.width,
                runs: clip_runs(runs, units, from, to),
            });
        }

        let carets = self
            .carets
            .carets()
            .iter()
            .filter_map(|caret| self.caret_loc(caret.point()))
            .collect();
        Frame {
            lines,
            carets,
            line_height,
        }
    }

    /// Display units and composed runs for `row`.
    fn compose_row(&mut self, row: usize, selection: &Pass) -> (usize, Vec<u16>, Vec<StyledRun>) {
        let raw = self.source.text(row);
        let raw_units = to_units(&raw);
        let (display, ime) = self.composition.apply(row, &raw);

        let mut spans: Vec<StyleSpan> = if ime.is_empty() {
            self.highlighter.row_spans(row, &raw_units)
        } else {
            // Composed text never reaches the row cache.
            let units = to_units(&display);
            self.highlighter.language_pass()(row, &units, Vec::new())
        };
        for span in selection(row, &raw_units, Vec::new()) {
            if ime.is_empty() {
                spans.push(span);
            } else {
                let from = self.composition.display_col(row, span.offset);
                let to = self.composition.display_col(row, span.end());
                spans.push(StyleSpan::new(span.style, from, to - from));
            }
        }
        spans.extend(ime);

        let units = to_units(&display);
        let runs = StyleCompositor::compose(&units, &spans);
        (row, units, runs)
    }

    /// Caret position in host coordinates, after any composed text pinned
    /// at or before it on its row.
    fn caret_loc(&self, point: Point) -> Option<Loc> {
        let config = self.view.config();
        let loc = self.view.locate(point.row, point.col)?;
        let shift = if self.composition.is_active() {
            let pinned = self
                .composition
                .pins()
                .iter()
                .filter(|pin| pin.row == point.row && pin.col <= point.col)
                .count();
            pinned as f64
                * self
                    .view
                    .metrics()
                    .provider()
                    .advance_str(self.composition.composed())
        } else {
            0.0
        };
        Some(loc.offset(config.margin_left + shift, config.margin_top))
    }
}

/// Map `point`, at or after `old_end`, across an edit that moved `old_end`
/// to `new_end`. Points inside the edited region collapse onto `new_end`.
fn remap(point: Point, old_end: Point, new_end: Point) -> Point {
    if point < old_end {
        return new_end;
    }
    if point.row == old_end.row {
        Point::new(new_end.row, new_end.col + (point.col - old_end.col))
    } else {
        Point::new(point.row - old_end.row + new_end.row, point.col)
    }
}
