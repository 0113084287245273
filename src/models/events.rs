//! Stave events
//!
//! The ten event kinds a stave holds. Each kind is its own struct with the
//! file-format field names; [`Event`] is the tagged variant the document and
//! the selection engine work with. Field access that is common to all kinds
//! goes through the single `each_event!` dispatch below.

use serde::{Deserialize, Serialize};

use super::ids::ElementId;
use super::inherit::{self, FromStyle, Inherit, StyleValue};
use super::properties::BlackNoteDirection;
use crate::coords::CoordinateMapper;

/// Lowest and highest piano key
pub const MIN_PITCH: i32 = 1;
pub const MAX_PITCH: i32 = 88;

/// Pitch of middle C; slur control points are stored relative to it
pub const C4_PITCH: i32 = 40;

/// Event kinds, in canonical order
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Note,
    GraceNote,
    CountLine,
    StartRepeat,
    EndRepeat,
    Section,
    Beam,
    Text,
    Slur,
    Tempo,
}

impl EventKind {
    /// Canonical walk order for renumbering and serialization
    pub const ALL: [EventKind; 10] = [
        EventKind::Note,
        EventKind::GraceNote,
        EventKind::CountLine,
        EventKind::StartRepeat,
        EventKind::EndRepeat,
        EventKind::Section,
        EventKind::Beam,
        EventKind::Text,
        EventKind::Slur,
        EventKind::Tempo,
    ];

    /// File-format list name
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Note => "note",
            EventKind::GraceNote => "graceNote",
            EventKind::CountLine => "countLine",
            EventKind::StartRepeat => "startRepeat",
            EventKind::EndRepeat => "endRepeat",
            EventKind::Section => "section",
            EventKind::Beam => "beam",
            EventKind::Text => "text",
            EventKind::Slur => "slur",
            EventKind::Tempo => "tempo",
        }
    }
}

/// Which hand plays the material
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Hand {
    #[serde(rename = "<")]
    Left,
    #[default]
    #[serde(rename = ">")]
    Right,
}

/// Side of the stave a text is attached to
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Side {
    #[serde(rename = "<")]
    Left,
    #[default]
    #[serde(rename = ">")]
    Right,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Articulation {
    #[serde(rename = "type")]
    pub kind: String,
    pub x_offset: f64,
    pub y_offset: f64,
    pub color: Inherit<String>,
}

impl Default for Articulation {
    fn default() -> Self {
        Self {
            kind: "staccato".to_string(),
            x_offset: 0.0,
            y_offset: 0.0,
            color: Inherit::Inherit,
        }
    }
}

impl Articulation {
    /// Color after inheritance from `globalArticulation.color`
    pub fn effective_color(&self, document: Option<&super::core::Document>) -> String {
        match &self.color {
            Inherit::Explicit(color) => color.clone(),
            Inherit::Inherit => {
                let value = inherit::resolve(document, &inherit::ARTICULATION_COLOR_RULE, None);
                String::from_style(value, "color")
            }
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Note {
    pub id: ElementId,
    pub time: f64,
    pub duration: f64,
    pub pitch: u8,
    pub velocity: u8,
    pub articulation: Vec<Articulation>,
    pub hand: Hand,
    pub color: Inherit<String>,
    pub color_midi_note: Inherit<String>,
    pub black_note_direction: Inherit<BlackNoteDirection>,
}

impl Default for Note {
    fn default() -> Self {
        Self {
            id: 0,
            time: 0.0,
            duration: 256.0,
            pitch: 40,
            velocity: 80,
            articulation: Vec::new(),
            hand: Hand::Right,
            color: Inherit::Inherit,
            color_midi_note: Inherit::Inherit,
            black_note_direction: Inherit::Inherit,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GraceNote {
    pub id: ElementId,
    pub time: f64,
    pub pitch: u8,
    pub velocity: u8,
    pub color: Inherit<String>,
}

impl Default for GraceNote {
    fn default() -> Self {
        Self { id: 0, time: 0.0, pitch: 40, velocity: 80, color: Inherit::Inherit }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CountLine {
    pub id: ElementId,
    pub time: f64,
    pub pitch1: u8,
    pub pitch2: u8,
    pub color: Inherit<String>,
    pub dash_pattern: Inherit<Vec<u32>>,
}

impl Default for CountLine {
    fn default() -> Self {
        Self {
            id: 0,
            time: 0.0,
            pitch1: 40,
            pitch2: 44,
            color: Inherit::Inherit,
            dash_pattern: Inherit::Inherit,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StartRepeat {
    pub id: ElementId,
    pub time: f64,
    pub color: Inherit<String>,
    pub line_width: Inherit<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EndRepeat {
    pub id: ElementId,
    pub time: f64,
    pub color: Inherit<String>,
    pub line_width: Inherit<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Section {
    pub id: ElementId,
    pub time: f64,
    pub text: String,
    pub color: Inherit<String>,
    pub line_width: Inherit<f64>,
}

impl Default for Section {
    fn default() -> Self {
        Self {
            id: 0,
            time: 0.0,
            text: "Section".to_string(),
            color: Inherit::Inherit,
            line_width: Inherit::Inherit,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Beam {
    pub id: ElementId,
    pub time: f64,
    pub staff: f64,
    pub hand: Hand,
    pub color: Inherit<String>,
    pub width: Inherit<f64>,
    pub slant: Inherit<f64>,
}

impl Default for Beam {
    fn default() -> Self {
        Self {
            id: 0,
            time: 0.0,
            staff: 0.0,
            hand: Hand::Left,
            color: Inherit::Inherit,
            width: Inherit::Inherit,
            slant: Inherit::Inherit,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Text {
    pub id: ElementId,
    pub time: f64,
    pub side: Side,
    /// Distance from the stave side in mm
    pub dist_from_side: f64,
    pub text: String,
    pub font_size: Inherit<u32>,
    pub color: Inherit<String>,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            id: 0,
            time: 0.0,
            side: Side::Right,
            dist_from_side: 10.0,
            text: "Text".to_string(),
            font_size: Inherit::Inherit,
            color: Inherit::Inherit,
        }
    }
}

/// A cubic Bezier slur.
///
/// x coordinates are semitones from C4, y coordinates are absolute ticks.
/// The first control point's y is the event time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Slur {
    pub id: ElementId,
    pub time: f64,
    #[serde(rename = "x1_semitonesFromC4")]
    pub x1_semitones: i32,
    #[serde(rename = "x2_semitonesFromC4")]
    pub x2_semitones: i32,
    #[serde(rename = "y2_time")]
    pub y2_time: f64,
    #[serde(rename = "x3_semitonesFromC4")]
    pub x3_semitones: i32,
    #[serde(rename = "y3_time")]
    pub y3_time: f64,
    #[serde(rename = "x4_semitonesFromC4")]
    pub x4_semitones: i32,
    #[serde(rename = "y4_time")]
    pub y4_time: f64,
    pub color: Inherit<String>,
    pub start_end_width: Inherit<f64>,
    pub middle_width: Inherit<f64>,
}

/// Tempo marking, used for playback only
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Tempo {
    pub id: ElementId,
    pub time: f64,
    /// Quarter-note beats per minute
    pub bpm: u32,
}

impl Default for Tempo {
    fn default() -> Self {
        Self { id: 0, time: 0.0, bpm: 120 }
    }
}

/// Any stave event
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Note(Note),
    GraceNote(GraceNote),
    CountLine(CountLine),
    StartRepeat(StartRepeat),
    EndRepeat(EndRepeat),
    Section(Section),
    Beam(Beam),
    Text(Text),
    Slur(Slur),
    Tempo(Tempo),
}

macro_rules! each_event {
    ($event:expr, $inner:ident => $body:expr) => {
        match $event {
            Event::Note($inner) => $body,
            Event::GraceNote($inner) => $body,
            Event::CountLine($inner) => $body,
            Event::StartRepeat($inner) => $body,
            Event::EndRepeat($inner) => $body,
            Event::Section($inner) => $body,
            Event::Beam($inner) => $body,
            Event::Text($inner) => $body,
            Event::Slur($inner) => $body,
            Event::Tempo($inner) => $body,
        }
    };
}

macro_rules! event_from {
    ($($kind:ident),*) => {
        $(
            impl From<$kind> for Event {
                fn from(value: $kind) -> Self {
                    Event::$kind(value)
                }
            }
        )*
    };
}

event_from!(Note, GraceNote, CountLine, StartRepeat, EndRepeat, Section, Beam, Text, Slur, Tempo);

/// Where an event sits for rectangle hit tests
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    Point { x: f64, y: f64 },
    /// Time-only events span the stave horizontally
    Row { y: f64 },
}

fn shifted_pitch_in_range(pitch: i32, delta: i32) -> bool {
    (MIN_PITCH..=MAX_PITCH).contains(&(pitch + delta))
}

fn transpose_u8(pitch: &mut u8, delta: i32) {
    // Range is checked by the caller before any mutation
    *pitch = (i32::from(*pitch) + delta).clamp(MIN_PITCH, MAX_PITCH) as u8;
}

fn literal<T: Clone + Into<StyleValue>>(value: &Inherit<T>) -> Inherit<StyleValue> {
    value.clone().map(Into::into)
}

fn store<T: FromStyle>(slot: &mut Inherit<T>, value: Inherit<StyleValue>, field: &str) {
    *slot = value.map(|v| T::from_style(v, field));
}

impl Event {
    /// An event of `kind` with every field at its default
    pub fn with_defaults(kind: EventKind) -> Self {
        match kind {
            EventKind::Note => Note::default().into(),
            EventKind::GraceNote => GraceNote::default().into(),
            EventKind::CountLine => CountLine::default().into(),
            EventKind::StartRepeat => StartRepeat::default().into(),
            EventKind::EndRepeat => EndRepeat::default().into(),
            EventKind::Section => Section::default().into(),
            EventKind::Beam => Beam::default().into(),
            EventKind::Text => Text::default().into(),
            EventKind::Slur => Slur::default().into(),
            EventKind::Tempo => Tempo::default().into(),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Note(_) => EventKind::Note,
            Event::GraceNote(_) => EventKind::GraceNote,
            Event::CountLine(_) => EventKind::CountLine,
            Event::StartRepeat(_) => EventKind::StartRepeat,
            Event::EndRepeat(_) => EventKind::EndRepeat,
            Event::Section(_) => EventKind::Section,
            Event::Beam(_) => EventKind::Beam,
            Event::Text(_) => EventKind::Text,
            Event::Slur(_) => EventKind::Slur,
            Event::Tempo(_) => EventKind::Tempo,
        }
    }

    pub fn id(&self) -> ElementId {
        each_event!(self, e => e.id)
    }

    pub(crate) fn set_id(&mut self, id: ElementId) {
        each_event!(self, e => e.id = id)
    }

    pub fn time(&self) -> f64 {
        each_event!(self, e => e.time)
    }

    /// Start and end time covered by the event
    pub fn time_span(&self) -> (f64, f64) {
        match self {
            Event::Note(n) => (n.time, n.time + n.duration),
            Event::Slur(s) => (s.time, s.time.max(s.y2_time).max(s.y3_time).max(s.y4_time)),
            other => (other.time(), other.time()),
        }
    }

    /// Move the event in time; slur control points move along
    pub fn shift_time(&mut self, delta: f64) {
        if let Event::Slur(s) = self {
            s.y2_time += delta;
            s.y3_time += delta;
            s.y4_time += delta;
        }
        each_event!(self, e => e.time += delta)
    }

    /// Every piano key this event refers to
    pub fn pitches(&self) -> Vec<i32> {
        match self {
            Event::Note(n) => vec![i32::from(n.pitch)],
            Event::GraceNote(g) => vec![i32::from(g.pitch)],
            Event::CountLine(c) => vec![i32::from(c.pitch1), i32::from(c.pitch2)],
            Event::Slur(s) => [s.x1_semitones, s.x2_semitones, s.x3_semitones, s.x4_semitones]
                .iter()
                .map(|x| C4_PITCH + x)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether transposing by `delta` keeps every pitch on the keyboard
    pub fn can_transpose(&self, delta: i32) -> bool {
        self.pitches().into_iter().all(|p| shifted_pitch_in_range(p, delta))
    }

    /// Transpose by `delta` semitones. Callers check [`Event::can_transpose`] first.
    pub fn transpose(&mut self, delta: i32) {
        match self {
            Event::Note(n) => transpose_u8(&mut n.pitch, delta),
            Event::GraceNote(g) => transpose_u8(&mut g.pitch, delta),
            Event::CountLine(c) => {
                transpose_u8(&mut c.pitch1, delta);
                transpose_u8(&mut c.pitch2, delta);
            }
            Event::Slur(s) => {
                s.x1_semitones += delta;
                s.x2_semitones += delta;
                s.x3_semitones += delta;
                s.x4_semitones += delta;
            }
            _ => {}
        }
    }

    pub fn hand(&self) -> Option<Hand> {
        match self {
            Event::Note(n) => Some(n.hand),
            Event::Beam(b) => Some(b.hand),
            _ => None,
        }
    }

    /// Set the hand tag; returns false for kinds without one
    pub fn set_hand(&mut self, hand: Hand) -> bool {
        match self {
            Event::Note(n) => n.hand = hand,
            Event::Beam(b) => b.hand = hand,
            _ => return false,
        }
        true
    }

    pub fn anchor(&self, mapper: &dyn CoordinateMapper) -> Anchor {
        let y = mapper.time_to_y(self.time());
        let pitch = match self {
            Event::Note(n) => i32::from(n.pitch),
            Event::GraceNote(g) => i32::from(g.pitch),
            Event::CountLine(c) => i32::from(c.pitch1),
            Event::Slur(s) => C4_PITCH + s.x1_semitones,
            _ => return Anchor::Row { y },
        };
        Anchor::Point { x: mapper.pitch_to_x(pitch), y }
    }

    pub fn as_note(&self) -> Option<&Note> {
        match self {
            Event::Note(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_note_mut(&mut self) -> Option<&mut Note> {
        match self {
            Event::Note(n) => Some(n),
            _ => None,
        }
    }

    pub(crate) fn style_literal(&self, field: &str) -> Inherit<StyleValue> {
        match (self, field) {
            (Event::Note(n), "color") => literal(&n.color),
            (Event::Note(n), "colorMidiNote") => literal(&n.color_midi_note),
            (Event::Note(n), "blackNoteDirection") => literal(&n.black_note_direction),
            (Event::GraceNote(g), "color") => literal(&g.color),
            (Event::CountLine(c), "color") => literal(&c.color),
            (Event::CountLine(c), "dashPattern") => literal(&c.dash_pattern),
            (Event::StartRepeat(r), "color") => literal(&r.color),
            (Event::StartRepeat(r), "lineWidth") => literal(&r.line_width),
            (Event::EndRepeat(r), "color") => literal(&r.color),
            (Event::EndRepeat(r), "lineWidth") => literal(&r.line_width),
            (Event::Section(s), "color") => literal(&s.color),
            (Event::Section(s), "lineWidth") => literal(&s.line_width),
            (Event::Beam(b), "color") => literal(&b.color),
            (Event::Beam(b), "width") => literal(&b.width),
            (Event::Beam(b), "slant") => literal(&b.slant),
            (Event::Text(t), "color") => literal(&t.color),
            (Event::Text(t), "fontSize") => literal(&t.font_size),
            (Event::Slur(s), "color") => literal(&s.color),
            (Event::Slur(s), "startEndWidth") => literal(&s.start_end_width),
            (Event::Slur(s), "middleWidth") => literal(&s.middle_width),
            _ => panic!("unknown style field `{}` on {:?}", field, self.kind()),
        }
    }

    pub(crate) fn set_style_literal(&mut self, field: &str, value: Inherit<StyleValue>) {
        match (self, field) {
            (Event::Note(n), "color") => store(&mut n.color, value, field),
            (Event::Note(n), "colorMidiNote") => store(&mut n.color_midi_note, value, field),
            (Event::Note(n), "blackNoteDirection") => store(&mut n.black_note_direction, value, field),
            (Event::GraceNote(g), "color") => store(&mut g.color, value, field),
            (Event::CountLine(c), "color") => store(&mut c.color, value, field),
            (Event::CountLine(c), "dashPattern") => store(&mut c.dash_pattern, value, field),
            (Event::StartRepeat(r), "color") => store(&mut r.color, value, field),
            (Event::StartRepeat(r), "lineWidth") => store(&mut r.line_width, value, field),
            (Event::EndRepeat(r), "color") => store(&mut r.color, value, field),
            (Event::EndRepeat(r), "lineWidth") => store(&mut r.line_width, value, field),
            (Event::Section(s), "color") => store(&mut s.color, value, field),
            (Event::Section(s), "lineWidth") => store(&mut s.line_width, value, field),
            (Event::Beam(b), "color") => store(&mut b.color, value, field),
            (Event::Beam(b), "width") => store(&mut b.width, value, field),
            (Event::Beam(b), "slant") => store(&mut b.slant, value, field),
            (Event::Text(t), "color") => store(&mut t.color, value, field),
            (Event::Text(t), "fontSize") => store(&mut t.font_size, value, field),
            (Event::Slur(s), "color") => store(&mut s.color, value, field),
            (Event::Slur(s), "startEndWidth") => store(&mut s.start_end_width, value, field),
            (Event::Slur(s), "middleWidth") => store(&mut s.middle_width, value, field),
            (event, _) => panic!("unknown style field `{}` on {:?}", field, event.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_defaults() {
        let note = Note::default();
        assert_eq!(note.pitch, 40);
        assert_eq!(note.duration, 256.0);
        assert_eq!(note.velocity, 80);
        assert_eq!(note.hand, Hand::Right);
        assert!(note.color.is_inherit());
    }

    #[test]
    fn test_time_span_includes_duration() {
        let note = Event::Note(Note { time: 900.0, duration: 100.0, ..Note::default() });
        assert_eq!(note.time_span(), (900.0, 1000.0));
        let tempo = Event::Tempo(Tempo { time: 64.0, ..Tempo::default() });
        assert_eq!(tempo.time_span(), (64.0, 64.0));
    }

    #[test]
    fn test_slur_shift_moves_control_points() {
        let mut slur = Event::Slur(Slur { time: 512.0, y2_time: 640.0, y3_time: 768.0, y4_time: 896.0, ..Slur::default() });
        assert_eq!(slur.time_span(), (512.0, 896.0));
        slur.shift_time(128.0);
        assert_eq!(slur.time_span(), (640.0, 1024.0));
    }

    #[test]
    fn test_count_line_transpose_checks_both_pitches() {
        let line = Event::CountLine(CountLine { pitch1: 80, pitch2: 86, ..CountLine::default() });
        assert!(line.can_transpose(2));
        assert!(!line.can_transpose(3));
    }

    #[test]
    fn test_slur_pitches_are_relative_to_c4() {
        let slur = Event::Slur(Slur { x1_semitones: -7, x4_semitones: 6, ..Slur::default() });
        assert_eq!(slur.pitches(), vec![33, 40, 40, 46]);
    }

    #[test]
    fn test_hand_only_on_notes_and_beams() {
        let mut text = Event::Text(Text::default());
        assert!(!text.set_hand(Hand::Left));
        let mut beam = Event::Beam(Beam::default());
        assert!(beam.set_hand(Hand::Right));
        assert_eq!(beam.hand(), Some(Hand::Right));
    }

    #[test]
    fn test_note_json_field_names() {
        let note = Note { black_note_direction: Inherit::Explicit(BlackNoteDirection::Up), ..Note::default() };
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["hand"], ">");
        assert_eq!(json["blackNoteDirection"], "^");
        assert!(json["colorMidiNote"].is_null());
    }

    #[test]
    fn test_articulation_color_inherits() {
        let mut doc = crate::models::Document::new();
        doc.properties.global_articulation.color = "#336699".to_string();
        let plain = Articulation::default();
        assert_eq!(plain.effective_color(Some(&doc)), "#336699");
        assert_eq!(plain.effective_color(None), "#000000");
        let red = Articulation { color: Inherit::Explicit("#FF0000".into()), ..Articulation::default() };
        assert_eq!(red.effective_color(Some(&doc)), "#FF0000");
        assert_eq!(
            inherit::ARTICULATION_COLOR_RULE.path,
            inherit::InheritPath::Global("properties.globalArticulation.color")
        );
    }

    #[test]
    fn test_slur_json_field_names() {
        let slur = Slur { x2_semitones: 5, y2_time: 640.0, ..Slur::default() };
        let json = serde_json::to_value(&slur).unwrap();
        assert_eq!(json["x2_semitonesFromC4"], 5);
        assert_eq!(json["y2_time"], 640.0);
    }
}
