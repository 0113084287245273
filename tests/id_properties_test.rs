// Property tests for id allocation, renumbering and rejected edits

use std::collections::HashSet;

use pianotab_editor::{Document, Event, EventKind, Note, SelectionEngine};
use proptest::prelude::*;

fn all_ids(doc: &Document) -> Vec<u64> {
    let mut ids: Vec<u64> = doc.line_breaks().iter().map(|lb| lb.id).collect();
    for stave in doc.staves() {
        ids.extend(stave.events().iter().map(Event::id));
    }
    ids
}

fn kind_strategy() -> impl Strategy<Value = EventKind> {
    (0..EventKind::ALL.len()).prop_map(|i| EventKind::ALL[i])
}

fn build(ops: &[(EventKind, usize, f64)]) -> Document {
    let mut doc = Document::new();
    doc.new_stave(None, 1.0);
    for &(kind, stave, time) in ops {
        let mut event = Event::with_defaults(kind);
        event.shift_time(time);
        doc.insert_event(stave, event);
    }
    doc
}

proptest! {
    #[test]
    fn prop_factory_ids_are_unique(ops in prop::collection::vec((kind_strategy(), 0..2usize, 0.0..8000.0f64), 0..60)) {
        let doc = build(&ops);
        let ids = all_ids(&doc);
        let unique: HashSet<u64> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn prop_renumber_is_idempotent(ops in prop::collection::vec((kind_strategy(), 0..2usize, 0.0..8000.0f64), 0..60)) {
        let mut doc = build(&ops);
        doc.renumber_ids();
        let once = doc.clone();
        doc.renumber_ids();
        prop_assert_eq!(&doc, &once);

        let mut ids = all_ids(&doc);
        ids.sort_unstable();
        let expected: Vec<u64> = (1..=ids.len() as u64).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn prop_notes_stay_sorted(times in prop::collection::vec(0.0..8000.0f64, 1..40)) {
        let mut doc = Document::new();
        for time in times {
            doc.new_note(0, Note { time, ..Note::default() });
        }
        let sorted: Vec<f64> = doc.stave(0).notes().map(|n| n.time).collect();
        prop_assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_rejected_move_changes_nothing(
        times in prop::collection::vec(0.0..7000.0f64, 1..10),
        delta in 9000.0..20000.0f64,
    ) {
        let mut doc = Document::new();
        let mut engine = SelectionEngine::default();
        for time in times {
            let id = doc.new_note(0, Note { time, ..Note::default() });
            engine.select(&doc, id);
        }
        let before = doc.clone();
        prop_assert!(engine.move_selected_in_time(&mut doc, delta).is_err());
        prop_assert!(engine.move_selected_in_time(&mut doc, -delta).is_err());
        prop_assert_eq!(doc, before);
    }
}
