//! Global style registry
//!
//! Every inheritable style field on an event resolves against one of the
//! `global*` groups below when its literal value is the inherit sentinel.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::inherit::StyleValue;

/// Direction a black-key notehead stem points
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BlackNoteDirection {
    #[serde(rename = "^")]
    Up,
    #[default]
    #[serde(rename = "v")]
    Down,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StopSignType {
    #[default]
    PianoTab,
    Klavarskribo,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalNote {
    pub color: String,
    pub color_left_midi_note: String,
    pub color_right_midi_note: String,
    pub stem_width: f64,
    pub stem_length: f64,
    pub beam_width: f64,
    pub black_note_direction: BlackNoteDirection,
    pub note_head_visible: bool,
    pub stem_visible: bool,
    pub midi_note_visible: bool,
    pub accidental_visible: bool,
    pub note_stop_visible: bool,
    pub continuation_dot_visible: bool,
    pub left_dot_visible: bool,
}

impl Default for GlobalNote {
    fn default() -> Self {
        Self {
            color: BLACK.to_string(),
            color_left_midi_note: BLACK.to_string(),
            color_right_midi_note: BLACK.to_string(),
            stem_width: 1.0,
            stem_length: 10.0,
            beam_width: 1.0,
            black_note_direction: BlackNoteDirection::Down,
            note_head_visible: true,
            stem_visible: true,
            midi_note_visible: true,
            accidental_visible: true,
            note_stop_visible: true,
            continuation_dot_visible: true,
            left_dot_visible: true,
        }
    }
}

/// Color plus visibility, shared by articulations and grace notes
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GlobalColored {
    pub color: String,
    pub visible: bool,
}

impl Default for GlobalColored {
    fn default() -> Self {
        Self { color: BLACK.to_string(), visible: true }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GlobalBeam {
    pub color: String,
    pub width: f64,
    pub slant: f64,
    pub visible: bool,
}

impl Default for GlobalBeam {
    fn default() -> Self {
        Self { color: BLACK.to_string(), width: 4.0, slant: 5.0, visible: true }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalCountLine {
    pub color: String,
    pub width: f64,
    pub dash_pattern: Vec<u32>,
    pub visible: bool,
}

impl Default for GlobalCountLine {
    fn default() -> Self {
        Self { color: BLACK.to_string(), width: 1.0, dash_pattern: Vec::new(), visible: true }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalSlur {
    pub color: String,
    pub middle_width: f64,
    pub start_end_width: f64,
    pub visible: bool,
}

impl Default for GlobalSlur {
    fn default() -> Self {
        Self { color: BLACK.to_string(), middle_width: 1.0, start_end_width: 0.5, visible: true }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalText {
    pub font_size: u32,
    pub family: String,
    pub color: String,
}

impl Default for GlobalText {
    fn default() -> Self {
        Self { font_size: 12, family: "Courier New".to_string(), color: BLACK.to_string() }
    }
}

/// Color, line width and visibility for sections and repeat markers
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalMarker {
    pub color: String,
    pub line_width: f64,
    pub visible: bool,
}

impl Default for GlobalMarker {
    fn default() -> Self {
        Self { color: BLACK.to_string(), line_width: 1.0, visible: true }
    }
}

/// The document-wide style registry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalProperties {
    pub global_note: GlobalNote,
    pub global_articulation: GlobalColored,
    pub global_beam: GlobalBeam,
    pub global_grace_note: GlobalColored,
    pub global_count_line: GlobalCountLine,
    pub global_slur: GlobalSlur,
    pub global_text: GlobalText,
    pub global_section: GlobalMarker,
    pub global_start_repeat: GlobalMarker,
    #[serde(alias = "globalEndrepeat")]
    pub global_end_repeat: GlobalMarker,
    pub editor_zoom_pixels_quarter: u32,
    pub stop_sign_type: StopSignType,
    pub draw_scale: f64,
    /// Render-only groups (`globalBarLine`, `globalBasegrid`, `globalStave`,
    /// `globalPage`) that no style field inherits from, kept as read
    #[serde(flatten)]
    pub render_groups: Map<String, Value>,
}

impl Default for GlobalProperties {
    fn default() -> Self {
        Self {
            global_note: GlobalNote::default(),
            global_articulation: GlobalColored::default(),
            global_beam: GlobalBeam::default(),
            global_grace_note: GlobalColored::default(),
            global_count_line: GlobalCountLine::default(),
            global_slur: GlobalSlur::default(),
            global_text: GlobalText::default(),
            global_section: GlobalMarker::default(),
            global_start_repeat: GlobalMarker::default(),
            global_end_repeat: GlobalMarker::default(),
            editor_zoom_pixels_quarter: 100,
            stop_sign_type: StopSignType::PianoTab,
            draw_scale: 0.75,
            render_groups: Map::new(),
        }
    }
}

pub(crate) const BLACK: &str = "#000000";

impl GlobalProperties {
    /// Look up an inheritable global by its dot-path, e.g.
    /// `properties.globalNote.color`.
    ///
    /// Returns `None` for paths that name no inheritable value.
    pub fn value_at(&self, path: &str) -> Option<StyleValue> {
        let rest = path.strip_prefix("properties.")?;
        let value = match rest {
            "globalNote.color" => StyleValue::Color(self.global_note.color.clone()),
            "globalNote.colorLeftMidiNote" => {
                StyleValue::Color(self.global_note.color_left_midi_note.clone())
            }
            "globalNote.colorRightMidiNote" => {
                StyleValue::Color(self.global_note.color_right_midi_note.clone())
            }
            "globalNote.blackNoteDirection" => {
                StyleValue::Direction(self.global_note.black_note_direction)
            }
            "globalArticulation.color" => StyleValue::Color(self.global_articulation.color.clone()),
            "globalGraceNote.color" => StyleValue::Color(self.global_grace_note.color.clone()),
            "globalCountLine.color" => StyleValue::Color(self.global_count_line.color.clone()),
            "globalCountLine.dashPattern" => {
                StyleValue::Pattern(self.global_count_line.dash_pattern.clone())
            }
            "globalBeam.color" => StyleValue::Color(self.global_beam.color.clone()),
            "globalBeam.width" => StyleValue::Number(self.global_beam.width),
            "globalBeam.slant" => StyleValue::Number(self.global_beam.slant),
            "globalSlur.color" => StyleValue::Color(self.global_slur.color.clone()),
            "globalSlur.startEndWidth" => StyleValue::Number(self.global_slur.start_end_width),
            "globalSlur.middleWidth" => StyleValue::Number(self.global_slur.middle_width),
            "globalText.color" => StyleValue::Color(self.global_text.color.clone()),
            "globalText.fontSize" => StyleValue::Integer(self.global_text.font_size),
            "globalSection.color" => StyleValue::Color(self.global_section.color.clone()),
            "globalSection.lineWidth" => StyleValue::Number(self.global_section.line_width),
            "globalStartRepeat.color" => StyleValue::Color(self.global_start_repeat.color.clone()),
            "globalStartRepeat.lineWidth" => {
                StyleValue::Number(self.global_start_repeat.line_width)
            }
            "globalEndRepeat.color" => StyleValue::Color(self.global_end_repeat.color.clone()),
            "globalEndRepeat.lineWidth" => StyleValue::Number(self.global_end_repeat.line_width),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_at_known_path() {
        let mut props = GlobalProperties::default();
        props.global_beam.slant = 7.5;
        assert_eq!(
            props.value_at("properties.globalBeam.slant"),
            Some(StyleValue::Number(7.5))
        );
    }

    #[test]
    fn test_value_at_unknown_path() {
        let props = GlobalProperties::default();
        assert_eq!(props.value_at("properties.globalNote.nope"), None);
        assert_eq!(props.value_at("globalNote.color"), None);
    }

    #[test]
    fn test_json_keys_are_camel_case() {
        let json = serde_json::to_value(GlobalProperties::default()).unwrap();
        assert!(json.get("globalNote").is_some());
        assert_eq!(json["globalNote"]["blackNoteDirection"], "v");
        assert!(json.get("globalEndRepeat").is_some());
    }

    #[test]
    fn test_legacy_end_repeat_key_is_read() {
        let props: GlobalProperties =
            serde_json::from_str(r##"{"globalEndrepeat": {"color": "#AA0000", "lineWidth": 3.0}}"##).unwrap();
        assert_eq!(props.global_end_repeat.color, "#AA0000");
        assert_eq!(props.global_end_repeat.line_width, 3.0);
        assert_eq!(props.value_at("properties.globalEndRepeat.lineWidth"), Some(StyleValue::Number(3.0)));
    }

    #[test]
    fn test_render_groups_pass_through() {
        let json = r#"{"globalPage": {"width": 297.0}, "globalStave": {"visible": false}}"#;
        let props: GlobalProperties = serde_json::from_str(json).unwrap();
        assert_eq!(props.render_groups["globalPage"]["width"], 297.0);

        let back = serde_json::to_value(&props).unwrap();
        assert_eq!(back["globalStave"]["visible"], false);
        assert!(back.get("renderGroups").is_none());
    }
}
