#![forbid(unsafe_code)]

//! Lexical highlighting for the quill editor model.
//!
//! - [`LexicalIndex`] - arena-backed keyword trie
//! - [`Language`] / [`JavaLexer`] - row-local language passes
//! - [`Highlighter`] - cached per-row pipeline with decoration passes
//! - [`HighlightTheme`] - styles per lexical category
//!
//! # Example
//! ```
//! use quill_syntax::{HighlightTheme, Highlighter, Language};
//!
//! let mut highlighter = Highlighter::new(Language::Java, HighlightTheme::default());
//! highlighter.load(1);
//! let row: Vec<u16> = "return \"done\"; // ok".encode_utf16().collect();
//! let spans = highlighter.row_spans(0, &row);
//! assert_eq!(spans.len(), 3);
//! ```

pub mod highlight;
pub mod lang;
pub mod theme;
pub mod trie;

pub use highlight::{Highlighter, Pass, Ticket, fold_passes, selection_pass};
pub use lang::{JAVA_KEYWORDS, JavaLexer, Language, plain_pass};
pub use theme::{HighlightTheme, HighlightThemeBuilder};
pub use trie::{LexicalIndex, Suggestions};
