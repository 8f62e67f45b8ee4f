use super::*;
use std::{thread, time::Duration};

fn screenplay(paragraphs: &[(ParagraphType, &str)]) -> Screenplay {
    Screenplay::from_paragraphs(
        paragraphs
            .iter()
            .map(|(paragraph_type, text)| Paragraph::new(*paragraph_type, text))
            .collect(),
    )
}

fn contents(screenplay: &Screenplay) -> Vec<(ParagraphType, String)> {
    screenplay
        .paragraphs()
        .iter()
        .map(|paragraph| (paragraph.paragraph_type(), paragraph.text().to_string()))
        .collect()
}

fn owned(paragraphs: &[(ParagraphType, &str)]) -> Vec<(ParagraphType, String)> {
    paragraphs
        .iter()
        .map(|(paragraph_type, text)| (*paragraph_type, text.to_string()))
        .collect()
}

fn at(paragraph: usize, offset: usize) -> Cursor {
    Cursor { paragraph, offset }
}

/// Every action becomes its own undo step.
fn unbundled() -> HistoryConfig {
    HistoryConfig {
        window: Duration::ZERO,
        capacity: MAX_UNDO_BUNDLES,
    }
}

#[test]
fn new_screenplay_is_one_empty_scene() {
    let screenplay = Screenplay::new();
    assert_eq!(contents(&screenplay), owned(&[(ParagraphType::Scene, "")]));
    assert_eq!(screenplay.cursor(), Cursor::default());
    assert_eq!(screenplay.cursor_line_column(), (2, 0));
    assert!(!screenplay.can_undo());
    assert!(!screenplay.can_redo());
    assert!(screenplay.path().is_none());
}

#[test]
fn type_text_splits_on_newlines_with_enter_transitions() {
    let mut screenplay = Screenplay::new();
    screenplay.type_text("INT. HOUSE - DAY\nBob enters.");
    assert_eq!(
        contents(&screenplay),
        owned(&[
            (ParagraphType::Scene, "INT. HOUSE - DAY"),
            (ParagraphType::Action, "Bob enters."),
        ])
    );
    assert_eq!(screenplay.cursor(), at(1, 11));

    screenplay.convert_by_tab();
    assert_eq!(screenplay.cursor_paragraph().paragraph_type(), ParagraphType::Name);
    screenplay.type_text("\nHello.\n");
    assert_eq!(
        contents(&screenplay)[2..],
        owned(&[
            (ParagraphType::Dialogue, "Hello."),
            (ParagraphType::Name, ""),
        ])
    );
    assert_eq!(screenplay.cursor(), at(3, 0));
}

#[test]
fn type_text_moves_tail_into_new_paragraph() {
    let mut screenplay = screenplay(&[(ParagraphType::Action, "Hello world")]);
    screenplay.cursor = at(0, 5);
    screenplay.type_text(",\nbrave new");
    assert_eq!(
        contents(&screenplay),
        owned(&[
            (ParagraphType::Action, "Hello,"),
            (ParagraphType::Action, "brave new world"),
        ])
    );
    assert_eq!(screenplay.cursor(), at(1, 9));
}

#[test]
fn type_text_drops_carriage_returns_and_sentinels() {
    let mut screenplay = screenplay(&[(ParagraphType::Action, "")]);
    screenplay.type_text("a\r\0b");
    assert_eq!(screenplay.cursor_paragraph().text(), "ab");
    assert_eq!(screenplay.cursor(), at(0, 2));
}

#[test]
fn enter_on_name_ends_name_first() {
    let mut screenplay = screenplay(&[(ParagraphType::Name, "BOB")]);
    screenplay.cursor = at(0, 1);
    screenplay.enter();
    assert_eq!(
        contents(&screenplay),
        owned(&[(ParagraphType::Name, "BOB"), (ParagraphType::Dialogue, "")])
    );
    assert_eq!(screenplay.cursor(), at(1, 0));
}

#[test]
fn enter_splits_action_at_cursor() {
    let mut screenplay = screenplay(&[(ParagraphType::Action, "Hello world")]);
    screenplay.cursor = at(0, 5);
    screenplay.enter();
    assert_eq!(
        contents(&screenplay),
        owned(&[
            (ParagraphType::Action, "Hello"),
            (ParagraphType::Action, " world"),
        ])
    );
    assert_eq!(screenplay.cursor(), at(1, 0));
}

#[test]
fn delete_backward_at_paragraph_start_merges() {
    let mut screenplay = screenplay(&[(ParagraphType::Action, "ab"), (ParagraphType::Name, "cd")]);
    screenplay.cursor = at(1, 0);
    assert!(screenplay.delete_backward());
    assert_eq!(contents(&screenplay), owned(&[(ParagraphType::Action, "abcd")]));
    assert_eq!(screenplay.cursor(), at(0, 2));

    assert!(screenplay.undo());
    assert_eq!(
        contents(&screenplay),
        owned(&[(ParagraphType::Action, "ab"), (ParagraphType::Name, "cd")])
    );
}

#[test]
fn deletes_stop_at_document_edges() {
    let mut screenplay = screenplay(&[(ParagraphType::Action, "ab")]);
    assert!(!screenplay.delete_backward());

    screenplay.cursor = at(0, 2);
    assert!(!screenplay.delete_forward());
    assert_eq!(screenplay.cursor_paragraph().text(), "ab");
    assert!(!screenplay.can_undo());
}

#[test]
fn delete_forward_removes_character_under_cursor() {
    let mut screenplay = screenplay(&[(ParagraphType::Action, "abc")]);
    screenplay.cursor = at(0, 1);
    assert!(screenplay.delete_forward());
    assert_eq!(screenplay.cursor_paragraph().text(), "ac");
    assert_eq!(screenplay.cursor(), at(0, 1));
}

#[test]
fn delete_forward_at_paragraph_end_joins_next() {
    let mut screenplay = screenplay(&[
        (ParagraphType::Action, "ab"),
        (ParagraphType::Name, "cd"),
        (ParagraphType::Dialogue, "ef"),
    ]);
    screenplay.cursor = at(0, 2);
    assert!(screenplay.delete_forward());
    assert_eq!(screenplay.paragraph_count(), 2);
    assert_eq!(
        contents(&screenplay),
        owned(&[(ParagraphType::Action, "abcd"), (ParagraphType::Dialogue, "ef")])
    );
    assert_eq!(screenplay.cursor(), at(0, 2));

    assert!(screenplay.undo());
    assert_eq!(
        contents(&screenplay),
        owned(&[
            (ParagraphType::Action, "ab"),
            (ParagraphType::Name, "cd"),
            (ParagraphType::Dialogue, "ef"),
        ])
    );
    assert_eq!(screenplay.cursor(), at(0, 2));
}

#[test]
fn undoing_and_redoing_k_steps_is_a_no_op() {
    let mut screenplay = screenplay(&[
        (ParagraphType::Name, "ALICE"),
        (ParagraphType::Dialogue, "Hi."),
        (ParagraphType::Action, "He waits here."),
        (ParagraphType::Name, ""),
    ])
    .with_history_config(unbundled());
    let before = contents(&screenplay);

    // Split, merge back, retype, autocomplete, retype.
    screenplay.cursor = at(2, 3);
    screenplay.enter();
    assert_eq!(screenplay.paragraph_count(), 5);
    assert!(screenplay.delete_backward());
    assert_eq!(screenplay.paragraph_count(), 4);
    screenplay.convert_by_tab();
    screenplay.cursor = at(3, 0);
    screenplay.type_text("AL");
    assert!(screenplay.autocomplete_name());
    assert_eq!(screenplay.cursor_paragraph().text(), "ALICE");
    screenplay.convert_to_previous_type();
    let after = contents(&screenplay);
    assert_eq!(
        after,
        owned(&[
            (ParagraphType::Name, "ALICE"),
            (ParagraphType::Dialogue, "Hi."),
            (ParagraphType::Name, "He waits here."),
            (ParagraphType::Action, "ALICE"),
        ])
    );

    let mut steps = 0;
    while screenplay.undo() {
        steps += 1;
    }
    assert_eq!(contents(&screenplay), before);
    for _ in 0..steps {
        assert!(screenplay.redo());
    }
    assert_eq!(contents(&screenplay), after);

    for k in 1..=steps {
        for _ in 0..k {
            assert!(screenplay.undo());
        }
        for _ in 0..k {
            assert!(screenplay.redo());
        }
        assert_eq!(contents(&screenplay), after, "undo/redo of {k} steps");
    }
}

#[test]
fn quick_edits_share_one_undo_step() {
    let mut screenplay = Screenplay::new();
    screenplay.type_text("INT. ");
    screenplay.type_text("HOUSE");
    assert!(screenplay.undo());
    assert_eq!(screenplay.cursor_paragraph().text(), "");
    assert!(!screenplay.can_undo());
}

#[test]
fn pause_starts_new_undo_step() {
    let mut screenplay = Screenplay::new();
    screenplay.type_text("INT. ");
    thread::sleep(COALESCE_WINDOW + Duration::from_millis(50));
    screenplay.type_text("HOUSE");
    assert!(screenplay.undo());
    assert_eq!(screenplay.cursor_paragraph().text(), "INT. ");
    assert!(screenplay.can_undo());
}

#[test]
fn undo_then_redo_restores_state_and_cursor() {
    let mut screenplay = Screenplay::new();
    screenplay.type_text("INT. HOUSE\nBob enters.");
    let after = contents(&screenplay);

    assert!(screenplay.undo());
    assert_eq!(contents(&screenplay), owned(&[(ParagraphType::Scene, "")]));
    assert_eq!(screenplay.cursor(), at(0, 0));
    assert!(!screenplay.undo());

    assert!(screenplay.redo());
    assert_eq!(contents(&screenplay), after);
    assert_eq!(screenplay.cursor(), at(1, 0));
    assert!(!screenplay.redo());
}

#[test]
fn every_step_undoes_in_reverse() {
    let mut screenplay = Screenplay::new().with_history_config(unbundled());
    let mut states = vec![contents(&screenplay)];
    screenplay.type_text("EXT. PARK");
    states.push(contents(&screenplay));
    screenplay.enter();
    states.push(contents(&screenplay));
    screenplay.convert_by_tab();
    states.push(contents(&screenplay));
    screenplay.type_text("ALICE");
    states.push(contents(&screenplay));

    while screenplay.can_undo() {
        states.pop();
        screenplay.undo();
        assert_eq!(Some(&contents(&screenplay)), states.last());
    }
    assert_eq!(states.len(), 1);
}

#[test]
fn editing_after_undo_discards_redo() {
    let mut screenplay = Screenplay::new().with_history_config(unbundled());
    screenplay.type_text("a");
    screenplay.type_text("b");
    assert!(screenplay.undo());
    assert!(screenplay.can_redo());

    screenplay.type_text("c");
    assert!(!screenplay.can_redo());
    assert!(!screenplay.redo());
    assert_eq!(screenplay.cursor_paragraph().text(), "ac");
}

#[test]
fn history_drops_oldest_steps() {
    let mut screenplay = Screenplay::new().with_history_config(HistoryConfig {
        window: Duration::ZERO,
        capacity: 2,
    });
    for text in ["a", "b", "c"] {
        screenplay.type_text(text);
    }
    assert!(screenplay.undo());
    assert!(screenplay.undo());
    assert!(!screenplay.undo());
    assert_eq!(screenplay.cursor_paragraph().text(), "a");
}

#[test]
fn autocomplete_cycles_known_names() {
    let mut screenplay = screenplay(&[
        (ParagraphType::Name, "ALICE"),
        (ParagraphType::Dialogue, "Hi."),
        (ParagraphType::Name, "ALAN"),
        (ParagraphType::Dialogue, "Hello."),
        (ParagraphType::Name, ""),
    ]);
    screenplay.cursor = at(4, 0);
    screenplay.type_text("AL");

    assert!(screenplay.autocomplete_name());
    assert_eq!(screenplay.cursor_paragraph().text(), "ALAN");
    assert_eq!(screenplay.cursor(), at(4, 2));

    assert!(screenplay.autocomplete_name());
    assert_eq!(screenplay.cursor_paragraph().text(), "ALICE");
    assert!(screenplay.autocomplete_name());
    assert_eq!(screenplay.cursor_paragraph().text(), "ALAN");
}

#[test]
fn autocomplete_ignores_other_paragraphs_and_unknown_prefixes() {
    let mut screenplay = screenplay(&[
        (ParagraphType::Name, "ALICE"),
        (ParagraphType::Dialogue, "ALI"),
        (ParagraphType::Name, "ZED"),
    ]);
    screenplay.cursor = at(1, 3);
    assert!(!screenplay.autocomplete_name());
    assert_eq!(screenplay.cursor_paragraph().text(), "ALI");

    screenplay.cursor = at(2, 0);
    assert!(!screenplay.autocomplete_name());
    screenplay.cursor = at(2, 1);
    assert!(!screenplay.autocomplete_name());
    assert!(!screenplay.can_undo());
}

#[test]
fn autocomplete_index_follows_rebuild() {
    let mut screenplay = screenplay(&[(ParagraphType::Name, "")]);
    screenplay.type_text("MARGARET");
    screenplay.enter();
    screenplay.type_text("Hello.\n");
    screenplay.type_text("MA");
    assert!(!screenplay.autocomplete_name());

    screenplay.rebuild_autocomplete_index();
    assert_eq!(screenplay.names().len(), 2);
    assert!(screenplay.autocomplete_name());
    assert_eq!(screenplay.cursor_paragraph().text(), "MARGARET");
}

#[test]
fn type_conversions_are_undoable() {
    let mut screenplay =
        screenplay(&[(ParagraphType::Action, "BOB")]).with_history_config(unbundled());
    screenplay.convert_by_tab();
    assert_eq!(screenplay.cursor_paragraph().paragraph_type(), ParagraphType::Name);
    screenplay.convert_to_next_type();
    assert_eq!(
        screenplay.cursor_paragraph().paragraph_type(),
        ParagraphType::Parenthetical
    );
    screenplay.convert_to_previous_type();
    screenplay.convert_to_previous_type();
    assert_eq!(screenplay.cursor_paragraph().paragraph_type(), ParagraphType::Action);

    assert!(screenplay.undo());
    assert_eq!(screenplay.cursor_paragraph().paragraph_type(), ParagraphType::Name);
    assert_eq!(screenplay.cursor(), at(0, 0));
}

#[test]
fn tab_follows_format_table() {
    for paragraph_type in ParagraphType::ALL {
        let mut screenplay = screenplay(&[(paragraph_type, "x")]);
        screenplay.convert_by_tab();
        assert_eq!(
            screenplay.cursor_paragraph().paragraph_type(),
            paragraph_type.format().on_tab
        );
    }
}

#[test]
fn line_queries_cover_blank_lines() {
    let screenplay = screenplay(&[(ParagraphType::Scene, "INT. HOUSE"), (ParagraphType::Name, "BOB")]);
    assert_eq!(screenplay.line_count(), 5);
    assert_eq!(screenplay.paragraph_at_line(0), Some((0, 0)));
    assert_eq!(screenplay.paragraph_at_line(2), Some((0, 2)));
    assert_eq!(screenplay.paragraph_at_line(3), Some((1, 0)));
    assert_eq!(screenplay.paragraph_at_line(4), Some((1, 1)));
    assert_eq!(screenplay.paragraph_at_line(5), None);
    assert_eq!(screenplay.required_width(), 62);
}

#[test]
fn cursor_line_column_counts_previous_paragraphs() {
    let mut screenplay =
        screenplay(&[(ParagraphType::Scene, "INT. HOUSE"), (ParagraphType::Name, "BOB")]);
    screenplay.cursor = at(1, 2);
    assert_eq!(screenplay.cursor_line_column(), (4, 2));
}

#[test]
fn display_renders_each_paragraph() {
    let screenplay = screenplay(&[(ParagraphType::Scene, "INT. HOUSE"), (ParagraphType::Name, "BOB")]);
    let indent = " ".repeat(25);
    assert_eq!(
        screenplay.to_string(),
        format!("\n\nINT. HOUSE\n{indent}\n{indent}BOB\n")
    );
}

#[test]
fn save_then_open_restores_paragraphs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("draft.fountain");

    let mut screenplay = Screenplay::new();
    screenplay.type_text("INT. HOUSE - DAY\nBob enters.\n");
    screenplay.convert_by_tab();
    screenplay.type_text("BOB\n");
    screenplay.convert_by_tab();
    screenplay.type_text("quietly\nHello.");
    assert_eq!(
        contents(&screenplay),
        owned(&[
            (ParagraphType::Scene, "INT. HOUSE - DAY"),
            (ParagraphType::Action, "Bob enters."),
            (ParagraphType::Name, "BOB"),
            (ParagraphType::Parenthetical, "quietly"),
            (ParagraphType::Dialogue, "Hello."),
        ])
    );

    screenplay.save(&path).unwrap();
    assert_eq!(screenplay.path(), Some(path.as_path()));

    let reopened = Screenplay::open(&path);
    assert_eq!(reopened.paragraphs(), screenplay.paragraphs());
    assert_eq!(reopened.path(), Some(path.as_path()));
}

#[test]
fn failed_save_keeps_previous_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut screenplay = Screenplay::new();
    let missing = dir.path().join("missing").join("draft.fountain");
    assert!(screenplay.save(&missing).is_err());
    assert!(screenplay.path().is_none());
}

#[test]
fn open_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new.fountain");
    let screenplay = Screenplay::open(&path);
    assert_eq!(contents(&screenplay), owned(&[(ParagraphType::Scene, "")]));
    assert_eq!(screenplay.path(), Some(path.as_path()));
}
