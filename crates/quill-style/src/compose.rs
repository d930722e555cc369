#![forbid(unsafe_code)]

//! Flatten overlapping style spans into non-overlapping styled runs.
//!
//! All span boundaries (plus the row bounds) form a distinct, ascending
//! breakpoint set. Each interval between consecutive breakpoints becomes one
//! run carrying the styles of every span that covers it, in span order.

use crate::span::{StyleSet, StyleSpan};

/// A non-overlapping text interval with its resolved styles.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRun {
    /// The run's text.
    pub text: String,
    /// Start offset in row-local UTF-16 units.
    pub offset: usize,
    /// Length in UTF-16 units.
    pub len: usize,
    /// Styles covering the whole run. Empty means default styling.
    pub styles: StyleSet,
}

impl StyledRun {
    /// Exclusive end offset.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Whether the run is plain (no styles).
    #[inline]
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Span-to-run compositor.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleCompositor;

impl StyleCompositor {
    /// Compose `spans` over the row `units` into runs covering the whole row.
    ///
    /// Spans are clamped to the row; zero-length spans contribute no
    /// breakpoints. An empty row yields no runs.
    #[must_use]
    pub fn compose(units: &[u16], spans: &[StyleSpan]) -> Vec<StyledRun> {
        let len = units.len();
        if len == 0 {
            return Vec::new();
        }

        let mut breaks: Vec<usize> = Vec::with_capacity(spans.len() * 2 + 2);
        breaks.push(0);
        breaks.push(len);
        for span in spans.iter().filter(|s| !s.is_empty()) {
            breaks.push(span.offset.min(len));
            breaks.push(span.end().min(len));
        }
        breaks.sort_unstable();
        breaks.dedup();

        let mut runs = Vec::with_capacity(breaks.len() - 1);
        for pair in breaks.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let mut styles = StyleSet::new();
            for span in spans.iter().filter(|s| !s.is_empty() && s.covers(from, to)) {
                if !styles.contains(&span.style) {
                    styles.push(span.style);
                }
            }
            runs.push(StyledRun {
                text: String::from_utf16_lossy(&units[from..to]),
                offset: from,
                len: to - from,
                styles,
            });
        }

        tracing::trace!(
            spans = spans.len(),
            runs = runs.len(),
            "composed styled runs"
        );
        runs
    }
}

/// Clip composed runs to `[from, to)`, re-slicing runs that straddle a bound.
///
/// Used to split a row's runs across its visual lines. `units` must be the
/// same row the runs were composed from.
#[must_use]
pub fn clip_runs(runs: &[StyledRun], units: &[u16], from: usize, to: usize) -> Vec<StyledRun> {
    runs.iter()
        .filter(|run| run.offset < to && run.end() > from)
        .map(|run| {
            let start = run.offset.max(from);
            let end = run.end().min(to);
            if start == run.offset && end == run.end() {
                run.clone()
            } else {
                StyledRun {
                    text: String::from_utf16_lossy(&units[start..end]),
                    offset: start,
                    len: end - start,
                    styles: run.styles.clone(),
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::span::Style;

    fn units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn no_spans_is_one_plain_run() {
        let u = units("hello");
        let runs = StyleCompositor::compose(&u, &[]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "hello");
        assert!(runs[0].is_plain());
    }

    #[test]
    fn empty_row_has_no_runs() {
        assert!(StyleCompositor::compose(&[], &[StyleSpan::new(Style::Selected, 0, 3)]).is_empty());
    }

    #[test]
    fn overlapping_spans_split_at_every_boundary() {
        let u = units("if (x) return;");
        let red = Style::TextColor(Rgb::new(255, 0, 0));
        let spans = [
            StyleSpan::new(red, 0, 2),
            StyleSpan::new(Style::Selected, 1, 5),
        ];
        let runs = StyleCompositor::compose(&u, &spans);
        let bounds: Vec<_> = runs.iter().map(|r| (r.offset, r.end())).collect();
        assert_eq!(bounds, vec![(0, 1), (1, 2), (2, 6), (6, 14)]);
        assert_eq!(runs[0].styles.as_slice(), &[red]);
        assert_eq!(runs[1].styles.as_slice(), &[red, Style::Selected]);
        assert_eq!(runs[2].styles.as_slice(), &[Style::Selected]);
        assert!(runs[3].is_plain());
        assert_eq!(runs[1].text, "f");
    }

    #[test]
    fn spans_past_row_end_are_clamped() {
        let u = units("abc");
        let runs = StyleCompositor::compose(&u, &[StyleSpan::new(Style::Emphasize, 2, 10)]);
        let bounds: Vec<_> = runs.iter().map(|r| (r.offset, r.end())).collect();
        assert_eq!(bounds, vec![(0, 2), (2, 3)]);
    }

    #[test]
    fn duplicate_styles_collapse() {
        let u = units("abcd");
        let spans = [
            StyleSpan::new(Style::Selected, 0, 4),
            StyleSpan::new(Style::Selected, 0, 4),
        ];
        let runs = StyleCompositor::compose(&u, &spans);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].styles.len(), 1);
    }

    #[test]
    fn clip_reslices_straddling_runs() {
        let u = units("abcdefgh");
        let runs = StyleCompositor::compose(&u, &[StyleSpan::new(Style::Emphasize, 2, 4)]);
        let clipped = clip_runs(&runs, &u, 3, 8);
        let parts: Vec<_> = clipped.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(parts, vec!["def", "gh"]);
        assert_eq!(clipped[0].offset, 3);
        assert_eq!(clipped[0].styles.as_slice(), &[Style::Emphasize]);
    }
}
