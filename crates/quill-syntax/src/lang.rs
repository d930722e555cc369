#![forbid(unsafe_code)]

//! Per-language lexical passes.
//!
//! Lexing is row-local: no string or comment state carries across rows.

use std::path::Path;
use std::sync::Arc;

use quill_style::StyleSpan;

use crate::highlight::Pass;
use crate::theme::HighlightTheme;
use crate::trie::LexicalIndex;

/// Reserved and contextual words highlighted by the Java pass.
pub const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "continue", "for", "new", "switch", "assert", "default", "goto", "package",
    "synchronized", "boolean", "do", "if", "private", "this", "break", "double", "implements",
    "protected", "throw", "byte", "else", "import", "public", "throws", "case", "enum",
    "instanceof", "return", "transient", "catch", "extends", "int", "short", "try", "char",
    "final", "interface", "static", "void", "class", "finally", "long", "strictfp", "volatile",
    "const", "float", "native", "super", "while", "var", "record", "sealed", "with", "yield",
    "to", "transitive", "uses",
];

const QUOTE: u16 = b'"' as u16;
const ESCAPE: u16 = b'\\' as u16;
const SLASH: u16 = b'/' as u16;

/// Languages with a known lexical pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    /// No highlighting.
    #[default]
    Plain,
    Java,
    /// Recognized by name but highlighted as plain text.
    Markdown,
}

impl Language {
    /// Look up a language by name. Unknown names map to [`Language::Plain`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "java" => Self::Java,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Plain,
        }
    }

    /// Look up a language by file extension (without the dot).
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        [Self::Java, Self::Markdown]
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
            .unwrap_or(Self::Plain)
    }

    /// Look up a language from a file path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Plain, Self::from_extension)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Java => "java",
            Self::Markdown => "md",
        }
    }

    #[must_use]
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Plain => &[],
            Self::Java => &["java"],
            Self::Markdown => &["md", "markdown"],
        }
    }

    /// The language pass for this language, styled with `theme`.
    #[must_use]
    pub fn pass(self, theme: &HighlightTheme) -> Pass {
        match self {
            Self::Java => {
                let lexer = Arc::new(JavaLexer::new(theme.clone()));
                Arc::new(move |_row: usize, units: &[u16], mut spans: Vec<StyleSpan>| {
                    spans.extend(lexer.spans(units));
                    spans
                })
            }
            Self::Plain | Self::Markdown => plain_pass(),
        }
    }
}

/// A pass that returns its input unchanged.
#[must_use]
pub fn plain_pass() -> Pass {
    Arc::new(|_row: usize, _units: &[u16], spans: Vec<StyleSpan>| spans)
}

/// Single-row lexer for Java-family sources.
///
/// Recognizes `"` string literals with `\` escapes, `//` line comments and
/// keywords. A keyword only matches a whole identifier: `iffy` and `xif`
/// produce no span.
#[derive(Debug, Clone)]
pub struct JavaLexer {
    keywords: LexicalIndex,
    theme: HighlightTheme,
}

impl Default for JavaLexer {
    fn default() -> Self {
        Self::new(HighlightTheme::default())
    }
}

impl JavaLexer {
    #[must_use]
    pub fn new(theme: HighlightTheme) -> Self {
        Self::with_keywords(JAVA_KEYWORDS.iter().copied().collect(), theme)
    }

    /// Use a custom keyword set.
    #[must_use]
    pub fn with_keywords(keywords: LexicalIndex, theme: HighlightTheme) -> Self {
        Self { keywords, theme }
    }

    #[must_use]
    pub fn keywords(&self) -> &LexicalIndex {
        &self.keywords
    }

    pub fn keywords_mut(&mut self) -> &mut LexicalIndex {
        &mut self.keywords
    }

    /// Style spans for one row, ascending and non-overlapping.
    #[must_use]
    pub fn spans(&self, units: &[u16]) -> Vec<StyleSpan> {
        let len = units.len();
        let mut spans = Vec::new();
        let mut i = 0;
        while i < len {
            let unit = units[i];
            if unit == QUOTE {
                let end = scan_string(units, i);
                spans.push(StyleSpan::new(self.theme.string, i, end - i));
                i = end;
            } else if unit == SLASH && units.get(i + 1) == Some(&SLASH) {
                spans.push(StyleSpan::new(self.theme.comment, i, len - i));
                break;
            } else if is_alphabetic(unit) && (i == 0 || !is_ident_part(units[i - 1])) {
                let end = ident_end(units, i);
                if self.keywords.match_at(units, i) == Some(end - i) {
                    spans.push(StyleSpan::new(self.theme.keyword, i, end - i));
                }
                i = end;
            } else {
                i += 1;
            }
        }
        spans
    }
}

/// End (exclusive) of the string literal opening at `start`.
///
/// An unterminated literal runs to the end of the row. An escape never
/// reaches past the row end.
fn scan_string(units: &[u16], start: usize) -> usize {
    let mut end = start + 1;
    while end < units.len() {
        match units[end] {
            ESCAPE => end = (end + 2).min(units.len()),
            QUOTE => return end + 1,
            _ => end += 1,
        }
    }
    units.len()
}

fn ident_end(units: &[u16], start: usize) -> usize {
    units[start..]
        .iter()
        .position(|&u| !is_ident_part(u))
        .map_or(units.len(), |n| start + n)
}

fn is_alphabetic(unit: u16) -> bool {
    char::from_u32(u32::from(unit)).is_some_and(char::is_alphabetic)
}

fn is_ident_part(unit: u16) -> bool {
    char::from_u32(u32::from(unit)).is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
