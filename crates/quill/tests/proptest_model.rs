//! Property-based invariant tests for `EditorModel`.
//!
//! 1. After any action sequence the viewport layout matches a fresh load of
//!    the source, and the highlighter is numbered against the same rows.
//! 2. Carets stay inside the text grid, sorted and distinct.
//! 3. Cached highlight spans always match a fresh highlight of the row.
//! 4. Undoing every edit restores the original text.

use proptest::prelude::*;
use quill::prelude::*;
use quill::{Highlighter, ViewportBuffer};

// ── Helpers ─────────────────────────────────────────────────────────────

fn action() -> impl Strategy<Value = ActionKind> {
    prop_oneof![
        3 => "[a-z \"/\n]{1,4}".prop_map(ActionKind::Typed),
        1 => Just(ActionKind::Delete),
        2 => Just(ActionKind::Backspace),
        1 => Just(ActionKind::CaretRight),
        1 => Just(ActionKind::CaretLeft),
        1 => Just(ActionKind::CaretUp),
        1 => Just(ActionKind::CaretDown),
        1 => Just(ActionKind::SelectCaretRight),
        1 => Just(ActionKind::SelectCaretDown),
        1 => Just(ActionKind::Undo),
        1 => Just(ActionKind::Redo),
    ]
}

fn editor(text: &str) -> EditorModel<MemorySource, MonospaceMetrics> {
    let mut editor = EditorModel::new(
        MemorySource::from_text(text),
        MonospaceMetrics::new(7.0, 14.0),
        EditorConfig::default(),
    )
    .with_language(Language::Java);
    editor.set_size(90.0, 70.0);
    editor
}

fn check_layout(editor: &EditorModel<MemorySource, MonospaceMetrics>) -> std::result::Result<(), TestCaseError> {
    let source = editor.source();
    let mut fresh = ViewportBuffer::new(MonospaceMetrics::new(7.0, 14.0), EditorConfig::default());
    fresh.load(source);
    fresh.set_size(90.0, 70.0);

    let view = editor.view();
    prop_assert_eq!(view.rows(), source.rows());
    prop_assert_eq!(editor.highlighter().rows(), source.rows());
    prop_assert_eq!(view.total_lines(), fresh.total_lines());
    for row in 0..source.rows() {
        prop_assert_eq!(view.lines_for_row(row), fresh.lines_for_row(row), "row {}", row);
    }
    Ok(())
}

fn check_carets(editor: &EditorModel<MemorySource, MonospaceMetrics>) -> std::result::Result<(), TestCaseError> {
    let source = editor.source();
    let points = editor.carets().points();
    prop_assert!(!points.is_empty());
    for pair in points.windows(2) {
        prop_assert!(pair[0] < pair[1], "carets out of order: {:?}", points);
    }
    for point in points {
        prop_assert!(point.row < source.rows());
        prop_assert!(point.col <= source.row_len(point.row), "{} past row end", point);
    }
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Consistency after random actions
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn caches_stay_consistent(
        text in "[a-z \n]{0,40}",
        actions in prop::collection::vec(action(), 1..40),
        clicks in prop::collection::vec((0.0f64..90.0, 0.0f64..70.0), 0..3),
    ) {
        let mut editor = editor(&text);
        editor.frame();
        for (x, y) in clicks {
            editor.add_caret(x, y);
        }
        for kind in actions {
            editor.handle(&Action::now(kind));
            check_layout(&editor)?;
            check_carets(&editor)?;

            let frame = editor.frame();
            prop_assert!(frame.lines.len() <= editor.view().window_capacity());
        }

        let mut fresh = Highlighter::new(Language::Java, HighlightTheme::default());
        fresh.load(editor.source().rows());
        for row in 0..editor.source().rows() {
            if !editor.highlighter().is_cached(row) {
                continue;
            }
            let units: Vec<u16> = editor.source().text(row).encode_utf16().collect();
            let cached = editor.highlighter_mut().row_spans(row, &units);
            prop_assert_eq!(cached, fresh.row_spans(row, &units), "row {}", row);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Undo restores
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn undo_all_restores_text(
        text in "[a-z\n]{0,30}",
        edits in prop::collection::vec(
            prop_oneof![
                "[a-z\n]{1,3}".prop_map(ActionKind::Typed),
                Just(ActionKind::Backspace),
                Just(ActionKind::Delete),
                Just(ActionKind::CaretLeft),
                Just(ActionKind::CaretDown),
            ],
            1..20,
        ),
    ) {
        let mut editor = editor(&text);
        for kind in edits {
            editor.handle(&Action::now(kind));
        }
        while editor.undo() {}
        prop_assert_eq!(editor.source().to_text(), text);
        check_layout(&editor)?;
        check_carets(&editor)?;
    }
}
