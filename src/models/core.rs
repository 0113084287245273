//! Core data structures for the PianoTab score
//!
//! A [`Document`] owns everything: file settings, global styles, the
//! time-signature grid, line breaks and the staves with their events.
//! Elements are only created through the document's factories, which is
//! where ids are assigned, and only removed through [`Document::delete_by_id`].

use serde::{Deserialize, Serialize};

use super::events::{
    Beam, CountLine, EndRepeat, Event, EventKind, GraceNote, Note, Section, Slur, StartRepeat,
    Tempo, Text,
};
use super::ids::{ElementId, IdAllocator};
use super::inherit::{self, Inherit, StyleValue};
use super::properties::GlobalProperties;
use super::serde_helpers::StaveFile;

/// Default time unit: ticks per quarter note
pub const DEFAULT_TICKS_PER_QUARTER: f64 = 256.0;
pub const DEFAULT_ZOOM_PIXELS_QUARTER: f64 = 100.0;

/// One stave: a name, a draw scale and its events.
///
/// Events of all kinds live in one list. The notes within it are kept in
/// ascending time order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(from = "StaveFile", into = "StaveFile")]
pub struct Stave {
    pub name: String,
    pub scale: f64,
    events: Vec<Event>,
}

impl Stave {
    pub fn new(name: impl Into<String>, scale: f64) -> Self {
        Self { name: name.into(), scale, events: Vec::new() }
    }

    pub(crate) fn from_parts(name: String, scale: f64, events: Vec<Event>) -> Self {
        let mut stave = Self { name, scale, events };
        stave.sort_notes();
        stave
    }

    pub(crate) fn into_parts(self) -> (String, f64, Vec<Event>) {
        (self.name, self.scale, self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events of one kind, in list order
    pub fn events_of(&self, kind: EventKind) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().filter(move |e| e.kind() == kind)
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> + '_ {
        self.events.iter().filter_map(Event::as_note)
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events_of(kind).count()
    }

    fn push_event(&mut self, event: Event) {
        if let Event::Note(note) = &event {
            // After any note with an equal time, before the first later one
            let time = note.time;
            let index = self
                .events
                .iter()
                .position(|e| matches!(e, Event::Note(n) if n.time > time))
                .unwrap_or(self.events.len());
            self.events.insert(index, event);
        } else {
            self.events.push(event);
        }
    }

    /// Stable-sort the notes by time, leaving other kinds where they are
    pub(crate) fn sort_notes(&mut self) {
        let slots: Vec<usize> = self
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind() == EventKind::Note)
            .map(|(i, _)| i)
            .collect();

        let mut notes: Vec<Event> = slots.iter().map(|&i| self.events[i].clone()).collect();
        notes.sort_by(|a, b| a.time().total_cmp(&b.time()));

        for (slot, note) in slots.into_iter().zip(notes) {
            self.events[slot] = note;
        }
    }
}

/// A time-signature block: `measure_count` measures of one meter
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
    /// Beat grid positions inside one measure, in ticks
    pub grid_times: Vec<f64>,
    #[serde(rename = "measureAmount")]
    pub measure_count: u32,
    #[serde(rename = "timeSignatureIndicatorVisible")]
    pub indicator_visible: bool,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
            grid_times: vec![256.0, 512.0, 768.0],
            measure_count: 8,
            indicator_visible: true,
        }
    }
}

impl TimeSignature {
    /// A zero numerator or denominator has no length
    pub fn is_valid(&self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }

    pub fn ticks_per_measure(&self, ticks_per_quarter: f64) -> f64 {
        ticks_per_quarter * 4.0 * f64::from(self.numerator) / f64::from(self.denominator)
    }

    pub fn length_ticks(&self, ticks_per_quarter: f64) -> f64 {
        self.ticks_per_measure(ticks_per_quarter) * f64::from(self.measure_count)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineBreakKind {
    /// Placed by the user
    #[default]
    Manual,
    /// The line break at time 0; cannot be removed
    Locked,
}

/// Key range of one stave within a line; 0 means derived from the music
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StaveRange {
    pub lowest_key: u8,
    pub highest_key: u8,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LineBreak {
    pub id: ElementId,
    pub time: f64,
    #[serde(rename = "type")]
    pub kind: LineBreakKind,
    /// Indexed by stave
    pub stave_range: Vec<StaveRange>,
}

impl LineBreak {
    pub fn is_locked(&self) -> bool {
        self.kind == LineBreakKind::Locked
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaInfo {
    pub app_name: String,
    pub extension: String,
    pub description: String,
    pub version: String,
    pub created: String,
    pub author: String,
    pub license: String,
}

impl Default for MetaInfo {
    fn default() -> Self {
        Self {
            app_name: "PianoTab".to_string(),
            extension: ".pianotab".to_string(),
            description: "PianoTab score file".to_string(),
            version: "1.0".to_string(),
            created: timestamp(),
            author: "PianoTab Team".to_string(),
            license: "MIT".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Header {
    pub title: String,
    pub subtitle: String,
    pub composer: String,
    pub arranger: String,
    pub lyricist: String,
    pub publisher: String,
    pub copyright: String,
    pub time_stamp: String,
    pub genre: String,
    pub comment: String,
}

impl Default for Header {
    fn default() -> Self {
        let year = chrono::Local::now().format("%Y");
        Self {
            title: "Untitled".to_string(),
            subtitle: String::new(),
            composer: String::new(),
            arranger: String::new(),
            lyricist: String::new(),
            publisher: String::new(),
            copyright: format!("Copyright © {}, PianoTab. All rights reserved.", year),
            time_stamp: timestamp(),
            genre: String::new(),
            comment: String::new(),
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%d-%m-%Y_%H:%M:%S").to_string()
}

/// Settings tied to the file being edited
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FileSettings {
    /// Ticks per quarter note. Every time value in the file is in this unit.
    pub quarter_note_unit: f64,
    pub zoom_pixels_quarter: f64,
    /// 1-based index of the stave shown in the editor
    #[serde(rename = "editorRenderedStave")]
    pub rendered_stave: usize,
    pub draw_scale: f64,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            quarter_note_unit: DEFAULT_TICKS_PER_QUARTER,
            zoom_pixels_quarter: DEFAULT_ZOOM_PIXELS_QUARTER,
            rendered_stave: 1,
            draw_scale: 0.75,
        }
    }
}

/// A document element found by id
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ElementRef<'a> {
    LineBreak(&'a LineBreak),
    Event { stave: usize, event: &'a Event },
}

impl ElementRef<'_> {
    pub fn id(&self) -> ElementId {
        match self {
            ElementRef::LineBreak(lb) => lb.id,
            ElementRef::Event { event, .. } => event.id(),
        }
    }
}

/// Top-level container for a PianoTab score
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub meta_info: MetaInfo,
    pub header: Header,
    pub properties: GlobalProperties,
    pub file_settings: FileSettings,

    #[serde(rename = "baseGrid")]
    time_signatures: Vec<TimeSignature>,

    #[serde(rename = "lineBreak")]
    line_breaks: Vec<LineBreak>,

    #[serde(rename = "stave")]
    staves: Vec<Stave>,

    #[serde(skip)]
    ids: IdAllocator,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A new score: one stave, one 4/4 block of 8 measures, one locked line break
    pub fn new() -> Self {
        let mut doc = Self {
            meta_info: MetaInfo::default(),
            header: Header::default(),
            properties: GlobalProperties::default(),
            file_settings: FileSettings::default(),
            time_signatures: vec![TimeSignature::default()],
            line_breaks: Vec::new(),
            staves: vec![Stave::new("Stave 1", 1.0)],
            ids: IdAllocator::default(),
        };
        doc.ensure_locked_line_break();
        doc
    }

    pub fn ticks_per_quarter(&self) -> f64 {
        self.file_settings.quarter_note_unit
    }

    // === Staves ===

    pub fn staves(&self) -> &[Stave] {
        &self.staves
    }

    pub fn stave_count(&self) -> usize {
        self.staves.len()
    }

    pub fn has_stave(&self, index: usize) -> bool {
        index < self.staves.len()
    }

    /// Stave by index. Panics when out of range.
    pub fn stave(&self, index: usize) -> &Stave {
        self.check_stave(index);
        &self.staves[index]
    }

    fn check_stave(&self, index: usize) {
        assert!(
            index < self.staves.len(),
            "stave index {} out of range ({} staves)",
            index,
            self.staves.len()
        );
    }

    /// Append a stave and return its index
    pub fn new_stave(&mut self, name: Option<&str>, scale: f64) -> usize {
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("Stave {}", self.staves.len() + 1),
        };
        self.staves.push(Stave::new(name, scale));
        self.staves.len() - 1
    }

    /// Remove a stave with all its events. The last stave cannot be removed.
    pub fn remove_stave(&mut self, index: usize) -> bool {
        if index >= self.staves.len() || self.staves.len() == 1 {
            return false;
        }
        self.staves.remove(index);
        for lb in &mut self.line_breaks {
            if index < lb.stave_range.len() {
                lb.stave_range.remove(index);
            }
        }
        true
    }

    /// 0-based index of the stave shown in the editor
    pub fn rendered_stave(&self) -> usize {
        self.file_settings.rendered_stave.saturating_sub(1) % self.staves.len()
    }

    pub fn set_rendered_stave(&mut self, index: usize) {
        self.check_stave(index);
        self.file_settings.rendered_stave = index + 1;
    }

    // === Time grid ===

    pub fn time_signatures(&self) -> &[TimeSignature] {
        &self.time_signatures
    }

    /// Append a time-signature block. A block with a zero numerator or
    /// denominator is refused.
    pub fn new_time_signature(&mut self, block: TimeSignature) -> Option<usize> {
        if !block.is_valid() {
            log::warn!("refusing time signature {}/{}", block.numerator, block.denominator);
            return None;
        }
        self.time_signatures.push(block);
        Some(self.time_signatures.len() - 1)
    }

    /// Remove a time-signature block. The last block cannot be removed.
    pub fn remove_time_signature(&mut self, index: usize) -> bool {
        if index >= self.time_signatures.len() || self.time_signatures.len() == 1 {
            return false;
        }
        self.time_signatures.remove(index);
        true
    }

    /// Length of the whole score in ticks
    pub fn total_length_ticks(&self) -> f64 {
        let tpq = self.ticks_per_quarter();
        self.time_signatures.iter().map(|ts| ts.length_ticks(tpq)).sum()
    }

    // === Line breaks ===

    pub fn line_breaks(&self) -> &[LineBreak] {
        &self.line_breaks
    }

    /// Add a line break and return its id.
    ///
    /// A locked request is pinned to time 0 and merged into the existing
    /// locked line break, whose id is returned.
    pub fn add_line_break(
        &mut self,
        time: f64,
        kind: LineBreakKind,
        stave_range: Vec<StaveRange>,
    ) -> ElementId {
        let id = match kind {
            LineBreakKind::Locked => match self.line_breaks.iter_mut().find(|lb| lb.is_locked()) {
                Some(locked) => {
                    locked.stave_range = stave_range;
                    locked.id
                }
                None => {
                    let id = self.ids.next();
                    self.line_breaks.push(LineBreak { id, time: 0.0, kind, stave_range });
                    id
                }
            },
            LineBreakKind::Manual => {
                let id = self.ids.next();
                self.line_breaks.push(LineBreak { id, time, kind, stave_range });
                id
            }
        };
        self.ensure_locked_line_break();
        id
    }

    /// Exactly one locked line break, at time 0, first in time order
    fn ensure_locked_line_break(&mut self) {
        let mut seen_locked = false;
        self.line_breaks.retain(|lb| {
            if !lb.is_locked() {
                return true;
            }
            if seen_locked {
                log::warn!("dropping duplicate locked line break {}", lb.id);
                return false;
            }
            seen_locked = true;
            true
        });

        if !seen_locked {
            let id = self.ids.next();
            self.line_breaks.push(LineBreak {
                id,
                time: 0.0,
                kind: LineBreakKind::Locked,
                stave_range: Vec::new(),
            });
        }

        for lb in self.line_breaks.iter_mut().filter(|lb| lb.is_locked()) {
            lb.time = 0.0;
        }
        self.line_breaks.sort_by(|a, b| {
            a.time.total_cmp(&b.time).then_with(|| b.is_locked().cmp(&a.is_locked()))
        });
    }

    // === Event factories ===

    /// Assign an id to `event` and add it to stave `stave`.
    ///
    /// Panics when the stave does not exist.
    pub fn insert_event(&mut self, stave: usize, mut event: Event) -> ElementId {
        self.check_stave(stave);
        let id = self.ids.next();
        event.set_id(id);
        self.staves[stave].push_event(event);
        id
    }

    /// Add a note; notes are kept sorted by time
    pub fn new_note(&mut self, stave: usize, note: Note) -> ElementId {
        self.insert_event(stave, note.into())
    }

    pub fn new_grace_note(&mut self, stave: usize, grace_note: GraceNote) -> ElementId {
        self.insert_event(stave, grace_note.into())
    }

    pub fn new_count_line(&mut self, stave: usize, count_line: CountLine) -> ElementId {
        self.insert_event(stave, count_line.into())
    }

    pub fn new_start_repeat(&mut self, stave: usize, start_repeat: StartRepeat) -> ElementId {
        self.insert_event(stave, start_repeat.into())
    }

    pub fn new_end_repeat(&mut self, stave: usize, end_repeat: EndRepeat) -> ElementId {
        self.insert_event(stave, end_repeat.into())
    }

    pub fn new_section(&mut self, stave: usize, section: Section) -> ElementId {
        self.insert_event(stave, section.into())
    }

    pub fn new_beam(&mut self, stave: usize, beam: Beam) -> ElementId {
        self.insert_event(stave, beam.into())
    }

    pub fn new_text(&mut self, stave: usize, text: Text) -> ElementId {
        self.insert_event(stave, text.into())
    }

    pub fn new_slur(&mut self, stave: usize, slur: Slur) -> ElementId {
        self.insert_event(stave, slur.into())
    }

    pub fn new_tempo(&mut self, stave: usize, tempo: Tempo) -> ElementId {
        self.insert_event(stave, tempo.into())
    }

    // === Lookup and removal ===

    /// Find a line break or event by id. Line breaks are searched first.
    pub fn find_by_id(&self, id: ElementId) -> Option<ElementRef<'_>> {
        if let Some(lb) = self.line_breaks.iter().find(|lb| lb.id == id) {
            return Some(ElementRef::LineBreak(lb));
        }
        self.locate(id).map(|(stave, index)| ElementRef::Event {
            stave,
            event: &self.staves[stave].events[index],
        })
    }

    /// Stave and list index of an event
    pub fn locate(&self, id: ElementId) -> Option<(usize, usize)> {
        self.staves.iter().enumerate().find_map(|(stave_idx, stave)| {
            stave
                .events
                .iter()
                .position(|e| e.id() == id)
                .map(|index| (stave_idx, index))
        })
    }

    pub fn event(&self, id: ElementId) -> Option<&Event> {
        self.locate(id).map(|(s, i)| &self.staves[s].events[i])
    }

    pub(crate) fn event_mut(&mut self, id: ElementId) -> Option<&mut Event> {
        let (s, i) = self.locate(id)?;
        Some(&mut self.staves[s].events[i])
    }

    /// Look up an event, trying the expected stave before a full search
    pub(crate) fn event_in_stave_mut(&mut self, stave: usize, id: ElementId) -> Option<&mut Event> {
        let hinted = self
            .staves
            .get(stave)
            .and_then(|s| s.events.iter().position(|e| e.id() == id));
        match hinted {
            Some(index) => Some(&mut self.staves[stave].events[index]),
            None => self.event_mut(id),
        }
    }

    pub fn note(&self, id: ElementId) -> Option<&Note> {
        self.event(id).and_then(Event::as_note)
    }

    /// Remove the element with `id`. The locked line break is never removed.
    pub fn delete_by_id(&mut self, id: ElementId) -> bool {
        if let Some(index) = self.line_breaks.iter().position(|lb| lb.id == id) {
            if self.line_breaks[index].is_locked() {
                log::warn!("refusing to delete the locked line break {}", id);
                return false;
            }
            self.line_breaks.remove(index);
            return true;
        }

        match self.locate(id) {
            Some((stave, index)) => {
                self.staves[stave].events.remove(index);
                true
            }
            None => false,
        }
    }

    /// Reassign ids 1..N: line breaks first, then every stave kind by kind
    /// in canonical order. Running it twice gives the same ids.
    pub fn renumber_ids(&mut self) {
        self.ids.reset(1);
        for lb in &mut self.line_breaks {
            lb.id = self.ids.next();
        }
        for stave in &mut self.staves {
            for kind in EventKind::ALL {
                for event in stave.events.iter_mut().filter(|e| e.kind() == kind) {
                    event.set_id(self.ids.next());
                }
            }
        }
    }

    /// Number of id-bearing elements
    pub fn element_count(&self) -> usize {
        self.line_breaks.len() + self.staves.iter().map(|s| s.events.len()).sum::<usize>()
    }

    pub(crate) fn sort_notes(&mut self, stave: usize) {
        if let Some(stave) = self.staves.get_mut(stave) {
            stave.sort_notes();
        }
    }

    // === Style access ===

    /// Effective value of a style field of event `id`
    pub fn effective_value(&self, id: ElementId, field: &str) -> Option<StyleValue> {
        self.event(id).map(|event| inherit::effective_value(Some(self), event, field))
    }

    /// Literal value of a style field of event `id`, sentinel included
    pub fn literal_value(&self, id: ElementId, field: &str) -> Option<Inherit<StyleValue>> {
        self.event(id).map(|event| inherit::literal_value(event, field))
    }

    /// Set a style field of event `id`; false when the id is unknown
    pub fn set_value(&mut self, id: ElementId, field: &str, value: Inherit<StyleValue>) -> bool {
        match self.event_mut(id) {
            Some(event) => {
                inherit::set_value(event, field, value);
                true
            }
            None => false,
        }
    }

    // === Structural repair ===

    /// Re-assert the structural invariants after loading a file
    pub(crate) fn repair(&mut self) {
        if self.staves.is_empty() {
            log::warn!("document has no staves, adding one");
            self.staves.push(Stave::new("Stave 1", 1.0));
        }
        self.time_signatures.retain(|ts| {
            if !ts.is_valid() {
                log::warn!("dropping time signature {}/{}", ts.numerator, ts.denominator);
            }
            ts.is_valid()
        });
        if self.time_signatures.is_empty() {
            log::warn!("document has no time signature, adding 4/4");
            self.time_signatures.push(TimeSignature::default());
        }
        let settings = &mut self.file_settings;
        if !(settings.quarter_note_unit.is_finite() && settings.quarter_note_unit > 0.0) {
            log::warn!("invalid quarter note unit, using {}", DEFAULT_TICKS_PER_QUARTER);
            settings.quarter_note_unit = DEFAULT_TICKS_PER_QUARTER;
        }
        if !(settings.zoom_pixels_quarter.is_finite() && settings.zoom_pixels_quarter > 0.0) {
            log::warn!("invalid zoom, using {}", DEFAULT_ZOOM_PIXELS_QUARTER);
            settings.zoom_pixels_quarter = DEFAULT_ZOOM_PIXELS_QUARTER;
        }
        self.ensure_locked_line_break();

        let total = self.total_length_ticks();
        for (index, stave) in self.staves.iter_mut().enumerate() {
            stave.sort_notes();
            for event in &stave.events {
                let (start, end) = event.time_span();
                if start < 0.0 || end > total {
                    log::warn!("stave {}: {} at {} lies outside the score", index, event.kind().name(), start);
                }
                if !event.can_transpose(0) {
                    log::warn!("stave {}: {} at {} has a pitch off the keyboard", index, event.kind().name(), start);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_invariants() {
        let doc = Document::new();
        assert_eq!(doc.stave_count(), 1);
        assert_eq!(doc.time_signatures().len(), 1);
        assert_eq!(doc.line_breaks().len(), 1);
        assert!(doc.line_breaks()[0].is_locked());
        assert_eq!(doc.line_breaks()[0].time, 0.0);
        assert_eq!(doc.total_length_ticks(), 8192.0);
    }

    #[test]
    fn test_total_length_sums_blocks() {
        let mut doc = Document::new();
        doc.new_time_signature(TimeSignature { numerator: 3, denominator: 8, measure_count: 2, ..Default::default() });
        // 8 bars of 4/4 plus 2 bars of 3/8
        assert_eq!(doc.total_length_ticks(), 8192.0 + 2.0 * 384.0);
    }

    #[test]
    fn test_zero_meter_refused() {
        let mut doc = Document::new();
        assert_eq!(doc.new_time_signature(TimeSignature { denominator: 0, ..Default::default() }), None);
        assert_eq!(doc.new_time_signature(TimeSignature { numerator: 0, ..Default::default() }), None);
        assert_eq!(doc.time_signatures().len(), 1);
        assert_eq!(doc.total_length_ticks(), 8192.0);
    }

    #[test]
    fn test_new_stave_names() {
        let mut doc = Document::new();
        assert_eq!(doc.new_stave(None, 1.0), 1);
        assert_eq!(doc.stave(1).name, "Stave 2");
        assert_eq!(doc.new_stave(Some("Bass"), 0.5), 2);
        assert_eq!(doc.stave(2).scale, 0.5);
    }

    #[test]
    #[should_panic(expected = "stave index 3 out of range")]
    fn test_factory_panics_on_bad_stave() {
        let mut doc = Document::new();
        doc.new_note(3, Note::default());
    }

    #[test]
    fn test_notes_inserted_in_time_order() {
        let mut doc = Document::new();
        doc.new_note(0, Note { time: 512.0, ..Note::default() });
        doc.new_tempo(0, Tempo::default());
        doc.new_note(0, Note { time: 0.0, ..Note::default() });
        doc.new_note(0, Note { time: 256.0, ..Note::default() });
        let times: Vec<f64> = doc.stave(0).notes().map(|n| n.time).collect();
        assert_eq!(times, vec![0.0, 256.0, 512.0]);
    }

    #[test]
    fn test_equal_times_keep_creation_order() {
        let mut doc = Document::new();
        let a = doc.new_note(0, Note { time: 100.0, pitch: 10, ..Note::default() });
        let b = doc.new_note(0, Note { time: 100.0, pitch: 20, ..Note::default() });
        let ids: Vec<ElementId> = doc.stave(0).notes().map(|n| n.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_find_and_delete() {
        let mut doc = Document::new();
        let id = doc.new_text(0, Text { text: "intro".into(), ..Text::default() });
        match doc.find_by_id(id) {
            Some(ElementRef::Event { stave, event }) => {
                assert_eq!(stave, 0);
                assert_eq!(event.kind(), EventKind::Text);
            }
            other => panic!("unexpected lookup result {:?}", other),
        }
        assert!(doc.delete_by_id(id));
        assert!(doc.find_by_id(id).is_none());
        assert!(!doc.delete_by_id(id));
    }

    #[test]
    fn test_locked_line_break_survives_delete() {
        let mut doc = Document::new();
        let locked = doc.line_breaks()[0].id;
        assert!(!doc.delete_by_id(locked));
        let manual = doc.add_line_break(2048.0, LineBreakKind::Manual, vec![]);
        assert!(matches!(doc.find_by_id(manual), Some(ElementRef::LineBreak(_))));
        assert!(doc.delete_by_id(manual));
        assert_eq!(doc.line_breaks().len(), 1);
    }

    #[test]
    fn test_locked_request_merges() {
        let mut doc = Document::new();
        let locked = doc.line_breaks()[0].id;
        let range = vec![StaveRange { lowest_key: 20, highest_key: 60 }];
        let id = doc.add_line_break(500.0, LineBreakKind::Locked, range.clone());
        assert_eq!(id, locked);
        assert_eq!(doc.line_breaks().len(), 1);
        assert_eq!(doc.line_breaks()[0].time, 0.0);
        assert_eq!(doc.line_breaks()[0].stave_range, range);
    }

    #[test]
    fn test_line_breaks_ordered_by_time() {
        let mut doc = Document::new();
        doc.add_line_break(4096.0, LineBreakKind::Manual, vec![]);
        doc.add_line_break(1024.0, LineBreakKind::Manual, vec![]);
        let times: Vec<f64> = doc.line_breaks().iter().map(|lb| lb.time).collect();
        assert_eq!(times, vec![0.0, 1024.0, 4096.0]);
    }

    #[test]
    fn test_renumber_is_canonical_and_idempotent() {
        let mut doc = Document::new();
        doc.new_stave(None, 1.0);
        doc.new_tempo(0, Tempo::default());
        doc.new_note(1, Note::default());
        doc.new_note(0, Note::default());
        doc.add_line_break(1024.0, LineBreakKind::Manual, vec![]);

        doc.renumber_ids();
        let first: Vec<ElementId> = doc.line_breaks().iter().map(|lb| lb.id).collect();
        assert_eq!(first, vec![1, 2]);
        // stave 0: note before tempo in canonical order
        assert_eq!(doc.stave(0).events_of(EventKind::Note).next().unwrap().id(), 3);
        assert_eq!(doc.stave(0).events_of(EventKind::Tempo).next().unwrap().id(), 4);
        assert_eq!(doc.stave(1).notes().next().unwrap().id, 5);

        let before = doc.clone();
        doc.renumber_ids();
        assert_eq!(doc, before);
        assert_eq!(doc.new_note(0, Note::default()), 6);
    }

    #[test]
    fn test_remove_last_stave_refused() {
        let mut doc = Document::new();
        assert!(!doc.remove_stave(0));
        doc.new_stave(None, 1.0);
        assert!(doc.remove_stave(0));
        assert_eq!(doc.stave_count(), 1);
        assert!(!doc.remove_time_signature(0));
    }

    #[test]
    fn test_rendered_stave_wraps() {
        let mut doc = Document::new();
        doc.new_stave(None, 1.0);
        doc.set_rendered_stave(1);
        assert_eq!(doc.rendered_stave(), 1);
        doc.remove_stave(1);
        assert_eq!(doc.rendered_stave(), 0);
    }

    #[test]
    fn test_style_access_by_id() {
        let mut doc = Document::new();
        let id = doc.new_beam(0, Beam::default());
        assert_eq!(doc.effective_value(id, "slant"), Some(StyleValue::Number(5.0)));
        assert!(doc.set_value(id, "slant", Inherit::Explicit(StyleValue::Number(1.5))));
        assert_eq!(doc.effective_value(id, "slant"), Some(StyleValue::Number(1.5)));
        assert_eq!(doc.effective_value(999, "slant"), None);
        assert!(!doc.set_value(999, "slant", Inherit::Inherit));
    }
}
