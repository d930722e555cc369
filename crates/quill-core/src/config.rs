#![forbid(unsafe_code)]

//! Editor model configuration.
//!
//! [`EditorConfig`] carries the knobs shared by layout, viewport, and frame
//! assembly. Hosts build it directly, read it from the environment with
//! [`EditorConfig::from_env`], or (with the `serde` feature) deserialize it.
//!
//! Environment variables:
//! - `QUILL_TAB_WIDTH` (1..=16)
//! - `QUILL_WRAP` (bool)
//! - `QUILL_MARGIN_LEFT`, `QUILL_MARGIN_TOP` (non-negative pixels)

use std::env;
use std::fmt;

/// Number of spaces a tab expands to unless configured otherwise.
pub const DEFAULT_TAB_WIDTH: usize = 4;

const MAX_TAB_WIDTH: usize = 16;

const ENV_TAB_WIDTH: &str = "QUILL_TAB_WIDTH";
const ENV_WRAP: &str = "QUILL_WRAP";
const ENV_MARGIN_LEFT: &str = "QUILL_MARGIN_LEFT";
const ENV_MARGIN_TOP: &str = "QUILL_MARGIN_TOP";

/// Editor model configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EditorConfig {
    /// Spaces per tab glyph.
    pub tab_width: usize,
    /// Soft-wrap rows to the viewport width.
    pub wrap: bool,
    /// Left text margin in pixels.
    pub margin_left: f64,
    /// Top text margin in pixels.
    pub margin_top: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            wrap: true,
            margin_left: 0.0,
            margin_top: 0.0,
        }
    }
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Configuration parsed from the environment, with any diagnostics.
#[derive(Debug, Clone)]
pub struct EditorConfigParse {
    pub config: EditorConfig,
    pub errors: Vec<ConfigError>,
}

impl EditorConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    #[must_use]
    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    #[must_use]
    pub fn margins(mut self, left: f64, top: f64) -> Self {
        self.margin_left = left;
        self.margin_top = top;
        self
    }

    /// Width budget handed to the wrap splitter for a viewport `width`.
    ///
    /// Returns 0 (no wrapping) when wrapping is off or the viewport is
    /// unsized (`width <= 0`). A viewport no wider than the left margin
    /// still wraps, one unit per line.
    #[must_use]
    pub fn wrap_budget(&self, width: f64) -> f64 {
        if self.wrap && width > 0.0 {
            (width - self.margin_left).max(f64::MIN_POSITIVE)
        } else {
            0.0
        }
    }

    /// Parse config from environment variables.
    ///
    /// Invalid values are ignored (and logged); see
    /// [`EditorConfig::from_env_with_diagnostics`] to inspect them.
    #[must_use]
    pub fn from_env() -> Self {
        let parsed = Self::from_env_with_diagnostics();
        for err in &parsed.errors {
            crate::warn!(%err, "ignoring invalid editor config");
        }
        parsed.config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> EditorConfigParse {
        from_env_with(|key| env::var(key).ok())
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if !(1..=MAX_TAB_WIDTH).contains(&self.tab_width) {
            errors.push(ConfigError::new(
                "tab_width",
                self.tab_width.to_string(),
                "must be in 1..=16",
            ));
        }
        validate_margin("margin_left", self.margin_left, &mut errors);
        validate_margin("margin_top", self.margin_top, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn validate_margin(field: &'static str, value: f64, errors: &mut Vec<ConfigError>) {
    if !value.is_finite() || value < 0.0 {
        errors.push(ConfigError::new(
            field,
            value.to_string(),
            "must be a finite, non-negative number",
        ));
    }
}

fn from_env_with<F>(mut get: F) -> EditorConfigParse
where
    F: FnMut(&str) -> Option<String>,
{
    let mut config = EditorConfig::default();
    let mut errors = Vec::new();

    if let Some(value) = get(ENV_TAB_WIDTH) {
        match parse_usize(&value) {
            Some(parsed) => config.tab_width = parsed,
            None => errors.push(ConfigError::new(
                "tab_width",
                value,
                "expected positive integer",
            )),
        }
    }

    if let Some(value) = get(ENV_WRAP) {
        match parse_bool(&value) {
            Some(parsed) => config.wrap = parsed,
            None => errors.push(ConfigError::new(
                "wrap",
                value,
                "expected bool (1/0/true/false)",
            )),
        }
    }

    for (key, field) in [(ENV_MARGIN_LEFT, "margin_left"), (ENV_MARGIN_TOP, "margin_top")] {
        if let Some(value) = get(key) {
            match value.trim().parse::<f64>() {
                Ok(parsed) if field == "margin_left" => config.margin_left = parsed,
                Ok(parsed) => config.margin_top = parsed,
                Err(_) => errors.push(ConfigError::new(field, value, "expected number")),
            }
        }
    }

    if let Err(mut invalid) = config.validate() {
        // Fall back to defaults for fields that parsed but are out of range.
        let defaults = EditorConfig::default();
        for err in &invalid {
            match err.field {
                "tab_width" => config.tab_width = defaults.tab_width,
                "margin_left" => config.margin_left = defaults.margin_left,
                "margin_top" => config.margin_top = defaults.margin_top,
                _ => {}
            }
        }
        errors.append(&mut invalid);
    }

    EditorConfigParse { config, errors }
}

#[inline]
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[inline]
fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}
