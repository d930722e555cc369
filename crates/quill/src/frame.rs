#![forbid(unsafe_code)]

//! Renderable output of one redraw.

use quill_core::Loc;
use quill_style::StyledRun;

/// One visual line ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLine {
    /// Source row.
    pub row: usize,
    /// Position of this line within its row's soft-wrapped lines.
    pub sub_index: usize,
    /// Top-left of the line, margins included.
    pub origin: Loc,
    /// Laid-out width of the row text on this line.
    ///
    /// Composed input-method text is not included.
    pub width: f64,
    /// Styled runs in display order. Offsets are row-local.
    pub runs: Vec<StyledRun>,
}

impl FrameLine {
    /// Concatenated display text of the line.
    #[must_use]
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Everything a host needs to paint the viewport.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub lines: Vec<FrameLine>,
    /// Caret positions (top of the caret's line), margins included. Carets
    /// outside the window are omitted.
    pub carets: Vec<Loc>,
    pub line_height: f64,
}

impl Frame {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Display text of every line, top to bottom.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.lines.iter().map(FrameLine::text).collect()
    }
}
