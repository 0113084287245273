//! Serde helpers for the PianoTab file layout

use serde::{Deserialize, Serialize, Serializer};

use super::core::Stave;
use super::events::{
    Beam, CountLine, EndRepeat, Event, GraceNote, Note, Section, Slur, StartRepeat, Tempo, Text,
};

/// Serialize Option<T> as null when None (don't skip the field)
pub fn serialize_option_as_null<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(v) => serializer.serialize_some(v),
        None => serializer.serialize_none(),
    }
}

/// On-disk stave: events are grouped in one list per kind
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub(crate) struct StaveFile {
    name: String,
    scale: f64,
    event: EventLists,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct EventLists {
    note: Vec<Note>,
    grace_note: Vec<GraceNote>,
    count_line: Vec<CountLine>,
    start_repeat: Vec<StartRepeat>,
    end_repeat: Vec<EndRepeat>,
    section: Vec<Section>,
    beam: Vec<Beam>,
    text: Vec<Text>,
    slur: Vec<Slur>,
    tempo: Vec<Tempo>,
}

impl From<StaveFile> for Stave {
    fn from(file: StaveFile) -> Self {
        let lists = file.event;
        // Canonical kind order, list order within a kind
        let events: Vec<Event> = lists
            .note
            .into_iter()
            .map(Event::from)
            .chain(lists.grace_note.into_iter().map(Event::from))
            .chain(lists.count_line.into_iter().map(Event::from))
            .chain(lists.start_repeat.into_iter().map(Event::from))
            .chain(lists.end_repeat.into_iter().map(Event::from))
            .chain(lists.section.into_iter().map(Event::from))
            .chain(lists.beam.into_iter().map(Event::from))
            .chain(lists.text.into_iter().map(Event::from))
            .chain(lists.slur.into_iter().map(Event::from))
            .chain(lists.tempo.into_iter().map(Event::from))
            .collect();

        let scale = if file.scale > 0.0 { file.scale } else { 1.0 };
        Stave::from_parts(file.name, scale, events)
    }
}

impl From<Stave> for StaveFile {
    fn from(stave: Stave) -> Self {
        let (name, scale, events) = stave.into_parts();
        let mut lists = EventLists::default();
        for event in events {
            match event {
                Event::Note(e) => lists.note.push(e),
                Event::GraceNote(e) => lists.grace_note.push(e),
                Event::CountLine(e) => lists.count_line.push(e),
                Event::StartRepeat(e) => lists.start_repeat.push(e),
                Event::EndRepeat(e) => lists.end_repeat.push(e),
                Event::Section(e) => lists.section.push(e),
                Event::Beam(e) => lists.beam.push(e),
                Event::Text(e) => lists.text.push(e),
                Event::Slur(e) => lists.slur.push(e),
                Event::Tempo(e) => lists.tempo.push(e),
            }
        }
        StaveFile { name, scale, event: lists }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stave_groups_events_by_kind() {
        let stave = Stave::from_parts(
            "Stave 1".to_string(),
            1.0,
            vec![
                Event::Tempo(Tempo::default()),
                Event::Note(Note::default()),
                Event::Text(Text::default()),
            ],
        );
        let json = serde_json::to_value(&stave).unwrap();
        assert_eq!(json["event"]["note"].as_array().unwrap().len(), 1);
        assert_eq!(json["event"]["tempo"].as_array().unwrap().len(), 1);
        assert_eq!(json["event"]["graceNote"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let stave: Stave = serde_json::from_str(r#"{"name":"Left","event":{"note":[{"pitch":50}]}}"#).unwrap();
        assert_eq!(stave.name, "Left");
        assert_eq!(stave.scale, 1.0);
        assert_eq!(stave.events().len(), 1);
        assert_eq!(stave.notes().next().unwrap().pitch, 50);
    }
}
