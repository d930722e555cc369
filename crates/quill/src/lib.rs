#![forbid(unsafe_code)]

//! quill: the model layer of a code editor.
//!
//! Turns a row-indexed text source and a glyph-metrics provider into wrapped
//! visual lines, a scrollable window over them, a multi-caret selection
//! model, and per-row lexical highlighting. [`EditorModel`] sequences input
//! actions through all of it and assembles a [`Frame`] per redraw. Painting
//! is left to the host.
//!
//! # Example
//! ```
//! use quill::prelude::*;
//!
//! let source = MemorySource::from_text("class A {\n}");
//! let mut editor = EditorModel::new(source, MonospaceMetrics::default(), EditorConfig::default())
//!     .with_language(Language::Java);
//! editor.set_size(400.0, 200.0);
//! editor.handle(&Action::typed("public "));
//!
//! let frame = editor.frame();
//! assert_eq!(frame.texts(), vec!["public class A {", "}"]);
//! assert_eq!(frame.carets.len(), 1);
//! ```

use std::fmt;

pub mod frame;
pub mod model;

pub use frame::{Frame, FrameLine};
pub use model::EditorModel;

// --- Re-exports -------------------------------------------------------------

pub use quill_core::{
    Action, ActionKind, ConfigError, EditorConfig, Loc, MemorySource, MetricsProvider,
    MonospaceMetrics, Point, Range, TextSource,
};
pub use quill_style::{Rgb, Style, StyleSpan, StyledRun};
pub use quill_syntax::{HighlightTheme, Highlighter, Language, LexicalIndex};
pub use quill_text::{CaretGroup, CompositionOverlay, ScrollOutcome, ViewportBuffer, VisualLine};

pub use quill_core as core;
pub use quill_style as style;
pub use quill_syntax as syntax;
pub use quill_text as text;

// --- Error ------------------------------------------------------------------

/// Top-level error type for quill.
#[derive(Debug)]
pub enum Error {
    /// Loading or saving text failed.
    Io(std::io::Error),
    /// The configuration failed validation.
    Config(Vec<ConfigError>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Config(errors) => {
                write!(f, "invalid configuration")?;
                for (i, err) in errors.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { ", " };
                    write!(f, "{sep}{err}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Config(errors) => errors
                .first()
                .map(|err| err as &(dyn std::error::Error + 'static)),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(vec![err])
    }
}

/// Standard result type for quill APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude ----------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Action, ActionKind, EditorConfig, EditorModel, Error, Frame, HighlightTheme, Language,
        MemorySource, MetricsProvider, MonospaceMetrics, Point, Result, Style, TextSource,
    };

    pub use crate::{core, style, syntax, text};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn io_error_displays_inner() {
        let err = Error::from(std::io::Error::other("disk gone"));
        assert_eq!(err.to_string(), "disk gone");
        assert!(err.source().is_some());
    }

    #[test]
    fn config_error_lists_fields() {
        let config = EditorConfig::default().tab_width(0).margins(-1.0, 0.0);
        let Err(errors) = config.validate() else {
            panic!("expected validation errors");
        };
        let err = Error::Config(errors);
        let text = err.to_string();
        assert!(text.starts_with("invalid configuration: tab_width=0"), "{text}");
        assert!(text.contains("margin_left"), "{text}");
    }
}
