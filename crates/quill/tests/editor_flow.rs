//! End-to-end editing flows through `EditorModel`.

use quill::prelude::*;
use quill::syntax::selection_pass;
use quill::{Loc, Range, Rgb};

fn editor(text: &str) -> EditorModel<MemorySource, MonospaceMetrics> {
    let mut editor = EditorModel::new(
        MemorySource::from_text(text),
        MonospaceMetrics::new(10.0, 20.0),
        EditorConfig::default(),
    )
    .with_language(Language::Java);
    editor.set_size(400.0, 100.0);
    editor
}

fn keyword() -> Style {
    HighlightTheme::default().keyword
}

#[test]
fn java_keywords_styled_in_frame() {
    let mut editor = editor("if (x==1) { y++; }");
    let frame = editor.frame();
    let runs = &frame.lines[0].runs;
    assert_eq!(runs[0].text, "if");
    assert_eq!(runs[0].styles.as_slice(), &[keyword()]);
    assert!(runs[1..].iter().all(|run| run.is_plain()));
}

#[test]
fn multi_caret_typing_inserts_at_every_caret() {
    let mut editor = editor("ab\ncd\nef");
    // Carets at (0,1) and (2,1).
    editor.click(12.0, 5.0);
    editor.add_caret(12.0, 45.0);
    assert_eq!(editor.carets().len(), 2);

    editor.handle(&Action::typed("X\n"));
    assert_eq!(editor.source().to_text(), "aX\nb\ncd\neX\nf");
    assert_eq!(
        editor.carets().points(),
        vec![Point::new(1, 0), Point::new(4, 0)]
    );
    assert_eq!(editor.view().rows(), 5);
    assert_eq!(editor.frame().texts(), vec!["aX", "b", "cd", "eX", "f"]);
}

#[test]
fn multi_caret_edit_undoes_in_one_step() {
    let mut editor = editor("ab\ncd\nef");
    editor.click(12.0, 5.0);
    editor.add_caret(12.0, 45.0);
    editor.handle(&Action::typed("X"));
    assert_eq!(editor.source().to_text(), "aXb\ncd\neXf");

    assert!(editor.handle(&Action::now(ActionKind::Undo)));
    assert_eq!(editor.source().to_text(), "ab\ncd\nef");
    assert_eq!(
        editor.carets().points(),
        vec![Point::new(0, 1), Point::new(2, 1)]
    );

    assert!(editor.handle(&Action::now(ActionKind::Redo)));
    assert_eq!(editor.source().to_text(), "aXb\ncd\neXf");
    assert_eq!(
        editor.carets().points(),
        vec![Point::new(0, 2), Point::new(2, 2)]
    );
    assert_eq!(editor.frame().texts(), vec!["aXb", "cd", "eXf"]);
}

#[test]
fn multi_caret_row_joins_undo_in_one_step() {
    let mut editor = editor("ab\ncd\nef");
    editor.click(2.0, 25.0);
    editor.add_caret(2.0, 45.0);
    assert!(editor.handle(&Action::now(ActionKind::Backspace)));
    assert_eq!(editor.source().to_text(), "abcdef");
    assert_eq!(editor.view().rows(), 1);

    assert!(editor.handle(&Action::now(ActionKind::Undo)));
    assert_eq!(editor.source().to_text(), "ab\ncd\nef");
    assert_eq!(editor.view().rows(), 3);
    assert_eq!(
        editor.carets().points(),
        vec![Point::new(1, 0), Point::new(2, 0)]
    );
}

#[test]
fn multi_caret_backspace_on_one_row() {
    let mut editor = editor("abcdef");
    editor.click(22.0, 5.0);
    editor.add_caret(52.0, 5.0);
    assert!(editor.handle(&Action::now(ActionKind::Backspace)));
    assert_eq!(editor.source().text(0), "acdf");
    assert_eq!(
        editor.carets().points(),
        vec![Point::new(0, 1), Point::new(0, 3)]
    );
}

#[test]
fn edits_rehighlight_only_touched_rows() {
    let mut editor = editor("int a;\nint b;\nint c;");
    editor.frame();
    assert_eq!(editor.highlighter().cached_rows(), 3);

    editor.handle(&Action::now(ActionKind::CaretDown));
    editor.handle(&Action::typed("x"));
    assert!(editor.highlighter().is_cached(0));
    assert!(!editor.highlighter().is_cached(1));
    assert!(editor.highlighter().is_cached(2));

    let frame = editor.frame();
    // "xint" is not a keyword.
    assert!(frame.lines[1].runs.iter().all(|run| run.is_plain()));
}

#[test]
fn wrapped_row_spreads_over_frame_lines() {
    let mut editor = editor("while (running) { step(); }");
    editor.set_size(100.0, 100.0);
    let frame = editor.frame();
    assert!(frame.lines.len() > 1);
    assert_eq!(frame.texts().concat(), "while (running) { step(); }");
    assert_eq!(frame.lines[0].runs[0].text, "while");
    for (i, line) in frame.lines.iter().enumerate() {
        assert_eq!(line.row, 0);
        assert_eq!(line.sub_index, i);
        assert_eq!(line.origin, Loc::new(0.0, i as f64 * 20.0));
    }
}

#[test]
fn frame_only_covers_window() {
    let text: Vec<String> = (0..50).map(|i| format!("row {i}")).collect();
    let mut editor = editor(&text.join("\n"));
    editor.scroll_to(20);
    let frame = editor.frame();
    assert_eq!(frame.lines.len(), 5);
    assert_eq!(frame.lines[0].text(), "row 20");
    assert_eq!(editor.highlighter().cached_rows(), 5);
    // The caret at the origin is off screen.
    assert!(frame.carets.is_empty());
}

#[test]
fn caret_motion_scrolls_into_view() {
    let text: Vec<String> = (0..50).map(|i| format!("row {i}")).collect();
    let mut editor = editor(&text.join("\n"));
    for _ in 0..7 {
        editor.handle(&Action::now(ActionKind::CaretDown));
    }
    assert_eq!(editor.carets().primary().point(), Point::new(7, 0));
    assert_eq!(editor.view().top_line(), 3);
    assert_eq!(editor.frame().carets, vec![Loc::new(0.0, 80.0)]);
}

#[test]
fn double_and_triple_click_select() {
    let mut editor = editor("int count = 0;");
    editor.click_double(52.0, 5.0);
    let marked = editor.carets().marked();
    assert_eq!(marked.len(), 1);
    assert_eq!(marked[0].ordered(), (Point::new(0, 4), Point::new(0, 9)));

    editor.click_triple(5.0, 5.0);
    let marked = editor.carets().marked();
    assert_eq!(marked[0].ordered(), (Point::new(0, 0), Point::new(0, 14)));
}

#[test]
fn drag_selects_and_commits() {
    let mut editor = editor("abcdef\nghijkl");
    editor.click(12.0, 5.0);
    editor.drag_to(32.0, 25.0);
    assert!(editor.carets().is_floating());
    editor.drag_end();
    assert!(!editor.carets().is_floating());
    let marked = editor.carets().marked();
    assert_eq!(marked[0].ordered(), (Point::new(0, 1), Point::new(1, 3)));

    let frame = editor.frame();
    assert!(frame.lines[0].runs.iter().any(|r| r.text == "bcdef" && r.styles.contains(&Style::Selected)));
    assert!(frame.lines[1].runs.iter().any(|r| r.text == "ghi" && r.styles.contains(&Style::Selected)));
}

#[test]
fn composition_is_display_only_until_commit() {
    let mut editor = editor("ab");
    editor.handle(&Action::now(ActionKind::CaretRight));
    editor.compose("にほん");

    let frame = editor.frame();
    assert_eq!(frame.texts(), vec!["aにほんb"]);
    let underlined: Vec<_> = frame.lines[0]
        .runs
        .iter()
        .filter(|run| run.styles.iter().any(|s| matches!(s, Style::Underline(_))))
        .map(|run| run.text.clone())
        .collect();
    assert_eq!(underlined, vec!["にほん"]);
    // Caret is drawn after the composed text.
    assert_eq!(frame.carets, vec![Loc::new(40.0, 0.0)]);
    assert_eq!(editor.source().text(0), "ab");
    assert_eq!(editor.input_method_anchor(), Some(Loc::new(10.0, 25.0)));

    assert!(editor.commit_composition());
    assert_eq!(editor.source().text(0), "aにほんb");
    assert_eq!(editor.carets().points(), vec![Point::new(0, 4)]);
    assert!(!editor.is_composing());
}

#[test]
fn composed_row_is_not_cached() {
    let mut editor = editor("x");
    editor.compose("if ");
    let frame = editor.frame();
    assert_eq!(frame.lines[0].runs[0].text, "if");
    assert!(frame.lines[0].runs[0].styles.contains(&keyword()));
    assert!(!editor.highlighter().is_cached(0));
    editor.cancel_composition();
    assert_eq!(editor.frame().texts(), vec!["x"]);
}

#[test]
fn custom_decoration_runs_after_language_pass() {
    let mut editor = editor("return x;");
    let marker = Style::BackgroundColor(Rgb::new(1, 2, 3));
    let range = Range::new(Point::new(0, 7), Point::new(0, 8));
    editor
        .highlighter_mut()
        .push_decoration(selection_pass(vec![range], marker));
    let frame = editor.frame();
    assert!(frame.lines[0].runs.iter().any(|r| r.text == "x" && r.styles.contains(&marker)));
    assert_eq!(frame.lines[0].runs[0].styles.as_slice(), &[keyword()]);
}

#[test]
fn open_and_save_round_trip() -> quill::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Main.java");
    std::fs::write(&path, "class Main {}\n")?;

    let mut editor = EditorModel::open(&path, MonospaceMetrics::default(), EditorConfig::default())?;
    assert_eq!(editor.highlighter().language(), Language::Java);
    editor.handle(&Action::typed("final "));
    assert!(editor.source().is_modified());
    editor.save()?;
    assert!(!editor.source().is_modified());

    let saved = std::fs::read_to_string(&path)?;
    assert!(saved.starts_with("final class Main {}"));
    Ok(())
}

#[test]
fn open_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = EditorModel::open(
        dir.path().join("nope.java"),
        MonospaceMetrics::default(),
        EditorConfig::default(),
    );
    assert!(matches!(result, Err(Error::Io(_))));
}
