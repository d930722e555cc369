#![forbid(unsafe_code)]

//! Text source boundary and an in-memory implementation.
//!
//! The layout, caret, and highlight layers only ever read rows through
//! [`TextSource::text`] and [`TextSource::rows`]; the remaining methods are
//! driven by the editing facade. [`MemorySource`] keeps rows in a `Vec` with
//! an inverse-operation undo history.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::geometry::Point;
use crate::unit::{col_to_byte, is_high_surrogate, is_low_surrogate, to_units, unit_len};

/// A mutable, row-indexed text store.
///
/// Row text never includes the row terminator. After every mutation,
/// `rows()` and `text()` must agree.
pub trait TextSource {
    /// Text of `row`, or an empty string when the row does not exist.
    fn text(&self, row: usize) -> String;

    /// Number of rows. Always at least one.
    fn rows(&self) -> usize;

    /// Length of `row` in UTF-16 units.
    fn row_len(&self, row: usize) -> usize {
        unit_len(&self.text(row))
    }

    /// Insert `text` at `at` and return the point just past the insertion.
    fn insert(&mut self, at: Point, text: &str) -> Point;

    /// Delete the character after `at` (joining rows at end of row) and
    /// return what was removed.
    fn delete(&mut self, at: Point) -> String;

    /// Delete the character before `at` (joining rows at start of row) and
    /// return the resulting point.
    fn backspace(&mut self, at: Point) -> Point;

    /// Open an edit group: every mutation until [`TextSource::end_edit`]
    /// undoes and redoes as one step. `carets` are the points to restore on
    /// undo.
    ///
    /// Sources without grouping may ignore this; each mutation is then its
    /// own undo step.
    fn begin_edit(&mut self, carets: &[Point]) {
        let _ = carets;
    }

    /// Close the open edit group. `carets` are the points to restore on
    /// redo.
    fn end_edit(&mut self, carets: &[Point]) {
        let _ = carets;
    }

    /// Revert the last edit step and return where carets should land.
    fn undo(&mut self) -> Vec<Point>;

    /// Re-apply the last undone edit step and return where carets should
    /// land.
    fn redo(&mut self) -> Vec<Point>;

    /// Path the text was loaded from or last saved to.
    fn path(&self) -> Option<&Path>;

    /// Write all rows to `path`.
    fn save(&mut self, path: &Path) -> io::Result<()>;

    /// Whether there are edits since load or the last save.
    fn is_modified(&self) -> bool;
}

/// A single edit operation for undo/redo.
#[derive(Debug, Clone)]
enum EditOp {
    Insert { at: Point, text: String },
    Delete { at: Point, text: String },
}

impl EditOp {
    fn inverse(&self) -> Self {
        match self {
            Self::Insert { at, text } => Self::Delete {
                at: *at,
                text: text.clone(),
            },
            Self::Delete { at, text } => Self::Insert {
                at: *at,
                text: text.clone(),
            },
        }
    }

    /// Caret point after the op runs.
    fn end(&self) -> Point {
        match self {
            Self::Insert { at, text } => end_of(*at, text),
            Self::Delete { at, .. } => *at,
        }
    }
}

/// One undo step: ops in application order plus the carets on either side.
#[derive(Debug, Clone)]
struct EditGroup {
    ops: Vec<EditOp>,
    before: Vec<Point>,
    after: Vec<Point>,
}

/// End point of `text` when placed at `at`.
fn end_of(at: Point, text: &str) -> Point {
    match text.rsplit_once('\n') {
        None => Point::new(at.row, at.col + unit_len(text)),
        Some((head, last)) => {
            let newlines = head.matches('\n').count() + 1;
            Point::new(at.row + newlines, unit_len(last))
        }
    }
}

/// An in-memory [`TextSource`].
#[derive(Debug, Clone)]
pub struct MemorySource {
    rows: Vec<String>,
    path: Option<PathBuf>,
    undo_stack: Vec<EditGroup>,
    redo_stack: Vec<EditGroup>,
    /// Group collecting ops between `begin_edit` and `end_edit`.
    open: Option<EditGroup>,
    max_history: usize,
    modified: bool,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    /// Create an empty source with a single empty row.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: vec![String::new()],
            path: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            open: None,
            max_history: 1000,
            modified: false,
        }
    }

    /// Create a source from text, splitting on `\n` and `\r\n`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let rows = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_owned())
            .collect();
        Self {
            rows,
            ..Self::new()
        }
    }

    /// Load a file.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut source = Self::from_text(&text);
        source.path = Some(path.to_path_buf());
        crate::debug!(path = %path.display(), rows = source.rows.len(), "opened text source");
        Ok(source)
    }

    /// Set the maximum number of undo entries.
    pub fn set_max_history(&mut self, max: usize) {
        self.max_history = max;
    }

    /// All rows joined with `\n`.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.rows.join("\n")
    }

    /// Whether an undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.open.as_ref().is_some_and(|g| !g.ops.is_empty())
    }

    /// Whether a redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clamp into the grid, snapping a column between surrogate halves back
    /// to the start of the pair.
    fn clamp(&self, at: Point) -> Point {
        let mut at = at.clamp_to(self.rows.len(), |row| unit_len(&self.rows[row]));
        if at.col > 0 {
            let units = to_units(&self.rows[at.row]);
            if units.get(at.col).is_some_and(|&u| is_low_surrogate(u)) {
                at.col -= 1;
            }
        }
        at
    }

    fn push_undo(&mut self, op: EditOp, before: Point) {
        if let Some(group) = self.open.as_mut() {
            group.ops.push(op);
        } else {
            let after = vec![op.end()];
            self.push_group(EditGroup {
                ops: vec![op],
                before: vec![before],
                after,
            });
        }
        self.redo_stack.clear();
        self.modified = true;
    }

    fn push_group(&mut self, group: EditGroup) {
        self.undo_stack.push(group);
        if self.undo_stack.len() > self.max_history {
            self.undo_stack.remove(0);
        }
    }

    /// Close the open group, if any. An empty `carets` falls back to the
    /// end of the last op.
    fn close_group(&mut self, carets: &[Point]) {
        let Some(mut group) = self.open.take() else {
            return;
        };
        let Some(last) = group.ops.last() else {
            return;
        };
        group.after = if carets.is_empty() {
            vec![last.end()]
        } else {
            carets.to_vec()
        };
        self.push_group(group);
    }

    /// Apply an op and return the point it leaves the caret at.
    fn apply_op(&mut self, op: &EditOp) -> Point {
        match op {
            EditOp::Insert { at, text } => self.splice_in(*at, text),
            EditOp::Delete { at, text } => {
                self.splice_out(*at, end_of(*at, text));
                *at
            }
        }
    }

    fn splice_in(&mut self, at: Point, text: &str) -> Point {
        let byte = col_to_byte(&self.rows[at.row], at.col);
        let tail = self.rows[at.row].split_off(byte);
        let mut parts = text.split('\n');
        self.rows[at.row].push_str(parts.next().unwrap_or(""));
        let added: Vec<String> = parts.map(str::to_owned).collect();
        let last = at.row + added.len();
        self.rows.splice(at.row + 1..at.row + 1, added);
        let col = unit_len(&self.rows[last]);
        self.rows[last].push_str(&tail);
        Point::new(last, col)
    }

    fn splice_out(&mut self, start: Point, end: Point) -> String {
        debug_assert!(start <= end, "splice_out range reversed");
        if start.row == end.row {
            let row = &mut self.rows[start.row];
            let from = col_to_byte(row, start.col);
            let to = col_to_byte(row, end.col);
            return row.drain(from..to).collect();
        }
        let from = col_to_byte(&self.rows[start.row], start.col);
        let to = col_to_byte(&self.rows[end.row], end.col);
        let joined: Vec<String> = self.rows.drain(start.row + 1..=end.row).collect();
        let first = &mut self.rows[start.row];
        let mut removed = first.split_off(from);
        let count = joined.len();
        for (i, row) in joined.iter().enumerate() {
            removed.push('\n');
            if i + 1 == count {
                removed.push_str(&row[..to]);
                first.push_str(&row[to..]);
            } else {
                removed.push_str(row);
            }
        }
        removed
    }
}

impl TextSource for MemorySource {
    fn text(&self, row: usize) -> String {
        self.rows.get(row).cloned().unwrap_or_default()
    }

    fn rows(&self) -> usize {
        self.rows.len()
    }

    fn insert(&mut self, at: Point, text: &str) -> Point {
        let at = self.clamp(at);
        if text.is_empty() {
            return at;
        }
        let text = text.replace("\r\n", "\n");
        let end = self.splice_in(at, &text);
        self.push_undo(EditOp::Insert { at, text }, at);
        end
    }

    fn delete(&mut self, at: Point) -> String {
        let at = self.clamp(at);
        let units = to_units(&self.rows[at.row]);
        let end = if at.col < units.len() {
            let pair = is_high_surrogate(units[at.col])
                && units.get(at.col + 1).is_some_and(|&u| is_low_surrogate(u));
            Point::new(at.row, at.col + if pair { 2 } else { 1 })
        } else if at.row + 1 < self.rows.len() {
            Point::new(at.row + 1, 0)
        } else {
            return String::new();
        };
        let removed = self.splice_out(at, end);
        self.push_undo(
            EditOp::Delete {
                at,
                text: removed.clone(),
            },
            at,
        );
        removed
    }

    fn backspace(&mut self, at: Point) -> Point {
        let at = self.clamp(at);
        let start = if at.col > 0 {
            let units = to_units(&self.rows[at.row]);
            let pair = at.col >= 2
                && is_low_surrogate(units[at.col - 1])
                && is_high_surrogate(units[at.col - 2]);
            Point::new(at.row, at.col - if pair { 2 } else { 1 })
        } else if at.row > 0 {
            Point::new(at.row - 1, unit_len(&self.rows[at.row - 1]))
        } else {
            return at;
        };
        let removed = self.splice_out(start, at);
        self.push_undo(
            EditOp::Delete {
                at: start,
                text: removed,
            },
            at,
        );
        start
    }

    fn begin_edit(&mut self, carets: &[Point]) {
        self.close_group(&[]);
        self.open = Some(EditGroup {
            ops: Vec::new(),
            before: carets.to_vec(),
            after: Vec::new(),
        });
    }

    fn end_edit(&mut self, carets: &[Point]) {
        self.close_group(carets);
    }

    fn undo(&mut self) -> Vec<Point> {
        self.close_group(&[]);
        let Some(group) = self.undo_stack.pop() else {
            return Vec::new();
        };
        for op in group.ops.iter().rev() {
            self.apply_op(&op.inverse());
        }
        let carets = group.before.clone();
        self.redo_stack.push(group);
        self.modified = true;
        carets
    }

    fn redo(&mut self) -> Vec<Point> {
        self.close_group(&[]);
        let Some(group) = self.redo_stack.pop() else {
            return Vec::new();
        };
        for op in &group.ops {
            self.apply_op(op);
        }
        let carets = group.after.clone();
        self.undo_stack.push(group);
        self.modified = true;
        carets
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn save(&mut self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_text())?;
        self.path = Some(path.to_path_buf());
        self.modified = false;
        crate::debug!(path = %path.display(), rows = self.rows.len(), "saved text source");
        Ok(())
    }

    fn is_modified(&self) -> bool {
        self.modified
    }
}
