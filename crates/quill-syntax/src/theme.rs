#![forbid(unsafe_code)]

//! Styles assigned to lexical categories.

use quill_style::{Rgb, Style};

/// Style per lexical category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightTheme {
    /// Style for reserved words (`if`, `class`, `return`, ...)
    pub keyword: Style,
    /// Style for string literals
    pub string: Style,
    /// Style for line comments
    pub comment: Style,
    /// Style for selected text
    pub selection: Style,
}

impl Default for HighlightTheme {
    fn default() -> Self {
        Self {
            keyword: Style::TextColor(Rgb::new(0xFF, 0x8A, 0x65)),
            string: Style::TextColor(Rgb::new(0x9C, 0xCC, 0x65)),
            comment: Style::TextColor(Rgb::new(0x80, 0x80, 0x80)),
            selection: Style::Selected,
        }
    }
}

impl HighlightTheme {
    #[must_use]
    pub fn builder() -> HighlightThemeBuilder {
        HighlightThemeBuilder::new()
    }
}

/// Builder for [`HighlightTheme`], starting from the defaults.
#[derive(Debug, Clone, Default)]
pub struct HighlightThemeBuilder {
    theme: HighlightTheme,
}

impl HighlightThemeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing theme.
    #[must_use]
    pub fn from_theme(theme: HighlightTheme) -> Self {
        Self { theme }
    }

    #[must_use]
    pub fn keyword(mut self, style: Style) -> Self {
        self.theme.keyword = style;
        self
    }

    #[must_use]
    pub fn string(mut self, style: Style) -> Self {
        self.theme.string = style;
        self
    }

    #[must_use]
    pub fn comment(mut self, style: Style) -> Self {
        self.theme.comment = style;
        self
    }

    /// Set the selection style (usually [`Style::Selected`] or a background).
    #[must_use]
    pub fn selection(mut self, style: Style) -> Self {
        self.theme.selection = style;
        self
    }

    #[must_use]
    pub fn build(self) -> HighlightTheme {
        self.theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_only_what_is_set() {
        let red = Style::TextColor(Rgb::new(255, 0, 0));
        let theme = HighlightTheme::builder().keyword(red).build();
        assert_eq!(theme.keyword, red);
        assert_eq!(theme.string, HighlightTheme::default().string);
        assert_eq!(theme.selection, Style::Selected);
    }

    #[test]
    fn from_theme_round_trips() {
        let base = HighlightTheme::builder()
            .selection(Style::BackgroundColor(Rgb::new(0x21, 0x42, 0x83)))
            .build();
        assert_eq!(HighlightThemeBuilder::from_theme(base).build(), base);
    }
}
