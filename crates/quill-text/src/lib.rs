#![forbid(unsafe_code)]

//! Text layout for the quill editor model.
//!
//! This crate turns rows of text into positioned, wrapped visual lines:
//! - [`GlyphMetrics`] - per-provider advance memo
//! - [`AdvanceTable`] / [`layout`] - per-unit advances for one row
//! - [`VisualLine`] / [`split`] - greedy soft wrapping to a width budget
//! - [`ViewportBuffer`] - cached layout plus the visible window
//! - [`CaretGroup`] - multi-caret selection model
//! - [`CompositionOverlay`] - display-only input-method text
//!
//! # Example
//! ```
//! use quill_core::{EditorConfig, MemorySource, MonospaceMetrics, Point};
//! use quill_text::{CaretGroup, ViewNavigator, ViewportBuffer};
//!
//! let source = MemorySource::from_text("fn main() {\n    body();\n}");
//! let mut view = ViewportBuffer::new(MonospaceMetrics::new(8.0, 16.0), EditorConfig::default());
//! view.load(&source);
//! view.set_size(400.0, 160.0);
//! assert_eq!(view.window().len(), 3);
//!
//! let mut carets = CaretGroup::new();
//! let nav = ViewNavigator::new(&source, &view);
//! carets.move_down(&nav, false);
//! carets.move_end(&nav, true);
//! assert_eq!(carets.points(), vec![Point::new(1, 11)]);
//! ```

pub mod caret;
pub mod composition;
pub mod layout;
pub mod metrics;
pub mod viewport;
pub mod wrap;

pub use caret::{Caret, CaretGroup, CaretNavigator, ViewNavigator};
pub use composition::{COMPOSITION_UNDERLINE, Commit, CompositionOverlay};
pub use layout::{AdvanceTable, layout, layout_units};
pub use metrics::{CacheStats, GlyphMetrics};
pub use viewport::{ScrollOutcome, ViewportBuffer};
pub use wrap::{SubLines, VisualLine, split};
