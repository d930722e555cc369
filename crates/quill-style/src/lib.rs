#![forbid(unsafe_code)]

//! Styles for highlighted text.
//!
//! Highlight passes annotate a row with [`StyleSpan`]s that may overlap.
//! [`StyleCompositor`] flattens them into non-overlapping [`StyledRun`]s,
//! each carrying every style that covers it.

pub mod color;
pub mod compose;
pub mod span;

pub use color::Rgb;
pub use compose::{StyleCompositor, StyledRun, clip_runs};
pub use span::{Style, StyleSet, StyleSpan};
