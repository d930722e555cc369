#![forbid(unsafe_code)]

//! Core: text-grid geometry, the input action vocabulary, and the boundary
//! traits for the two external collaborators (text source, glyph metrics).

pub mod action;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod metrics;
pub mod source;
pub mod unit;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, trace, warn};

pub use action::{Action, ActionKind};
pub use config::{ConfigError, DEFAULT_TAB_WIDTH, EditorConfig, EditorConfigParse};
pub use geometry::{Loc, Point, Range};
pub use metrics::{MetricsProvider, MonospaceMetrics};
pub use source::{MemorySource, TextSource};
