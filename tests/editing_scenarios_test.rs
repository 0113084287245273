// End-to-end editing scenarios: bounds rejection, inheritance, clipboard, rectangle delete

use pianotab_editor::models::StyleValue;
use pianotab_editor::{
    Document, EditError, EditOutcome, ElementId, Inherit, Note, PianoRollMapper, SelectionEngine,
    TimeSignature,
};

/// Score of exactly one 4/4 bar (1024 ticks)
fn one_bar_document() -> Document {
    let mut doc = Document::new();
    doc.new_time_signature(TimeSignature { measure_count: 1, ..TimeSignature::default() });
    doc.remove_time_signature(0);
    doc
}

#[test]
fn test_move_past_score_end_is_rejected() {
    let mut doc = one_bar_document();
    assert_eq!(doc.total_length_ticks(), 1024.0);

    let id = doc.new_note(0, Note { time: 900.0, duration: 100.0, ..Note::default() });
    let mut engine = SelectionEngine::default();
    engine.select(&doc, id);

    // 900 + 100 + 50 = 1050 > 1024
    let result = engine.move_selected_in_time(&mut doc, 50.0);
    assert!(matches!(result, Err(EditError::OutOfBounds { .. })));
    assert_eq!(doc.note(id).unwrap().time, 900.0);
}

#[test]
fn test_transpose_off_keyboard_is_rejected() {
    let mut doc = Document::new();
    let id = doc.new_note(0, Note::default());
    assert_eq!(doc.note(id).unwrap().pitch, 40);

    let mut engine = SelectionEngine::default();
    engine.select(&doc, id);

    let result = engine.transpose_selected(&mut doc, 50);
    assert_eq!(result, Err(EditError::PitchOutOfRange { id, pitch: 90 }));
    assert_eq!(doc.note(id).unwrap().pitch, 40);
}

#[test]
fn test_inherited_color_tracks_current_global() {
    let mut doc = Document::new();
    doc.properties.global_note.color = "#FF0000".to_string();
    let id = doc.new_note(0, Note::default());
    assert_eq!(doc.effective_value(id, "color"), Some(StyleValue::from("#FF0000")));

    doc.set_value(id, "color", Inherit::Explicit(StyleValue::from("#00FF00")));
    assert_eq!(doc.effective_value(id, "color"), Some(StyleValue::from("#00FF00")));

    doc.properties.global_note.color = "#0000FF".to_string();
    doc.set_value(id, "color", Inherit::Inherit);
    assert_eq!(doc.effective_value(id, "color"), Some(StyleValue::from("#0000FF")));
    assert_eq!(doc.literal_value(id, "color"), Some(Inherit::Inherit));
}

#[test]
fn test_copy_paste_shifts_to_cursor() {
    let mut doc = Document::new();
    let originals: Vec<ElementId> = [100.0, 200.0, 300.0]
        .into_iter()
        .map(|time| doc.new_note(0, Note { time, ..Note::default() }))
        .collect();

    let mut engine = SelectionEngine::default();
    for &id in &originals {
        engine.select(&doc, id);
    }
    assert_eq!(engine.copy(&doc), EditOutcome::Applied { count: 3 });
    assert_eq!(engine.paste(&mut doc, 500.0), Ok(EditOutcome::Applied { count: 3 }));

    let pasted = engine.ids();
    let mut times: Vec<f64> = pasted.iter().map(|&id| doc.note(id).unwrap().time).collect();
    times.sort_by(f64::total_cmp);
    assert_eq!(times, vec![500.0, 600.0, 700.0]);

    for id in &pasted {
        assert!(!originals.contains(id));
    }
    let original_times: Vec<f64> = originals.iter().map(|&id| doc.note(id).unwrap().time).collect();
    assert_eq!(original_times, vec![100.0, 200.0, 300.0]);

    let all_times: Vec<f64> = doc.stave(0).notes().map(|n| n.time).collect();
    assert_eq!(all_times, vec![100.0, 200.0, 300.0, 500.0, 600.0, 700.0]);
}

#[test]
fn test_rectangle_select_then_delete() {
    let mut doc = Document::new();
    let a = doc.new_note(0, Note { time: 100.0, pitch: 40, ..Note::default() });
    let b = doc.new_note(0, Note { time: 200.0, pitch: 42, ..Note::default() });
    let c = doc.new_note(0, Note { time: 2000.0, pitch: 70, ..Note::default() });

    // 10 px per key, 1 px per tick
    let mapper = PianoRollMapper::new(0.0, 0.0, 10.0, 1.0);
    let mut engine = SelectionEngine::default();
    let selected = engine.select_in_rectangle(&doc, &mapper, 380.0, 50.0, 420.0, 250.0);
    assert_eq!(selected, 2);

    assert_eq!(engine.delete_selected(&mut doc), EditOutcome::Applied { count: 2 });
    assert!(engine.is_empty());
    assert!(doc.find_by_id(a).is_none());
    assert!(doc.find_by_id(b).is_none());

    let remaining: Vec<ElementId> = doc.stave(0).notes().map(|n| n.id).collect();
    assert_eq!(remaining, vec![c]);
    assert_eq!(doc.note(c).unwrap().time, 2000.0);
}
