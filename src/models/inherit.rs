//! Style inheritance
//!
//! A style field on an event is an [`Inherit<T>`]: either an explicit value or
//! the inherit sentinel. The sentinel resolves through a dot-path into the
//! owning document's [`GlobalProperties`], declared once per kind and field in
//! [`inherit_rule`]. Without a document the rule's fallback constant is used.
//!
//! Field names are the file-format names (`color`, `lineWidth`, ...). Asking
//! for a field a kind does not have is a caller bug and panics.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::core::Document;
use super::events::{Event, EventKind, Hand};
use super::properties::{BlackNoteDirection, BLACK};
use super::serde_helpers::serialize_option_as_null;

/// A style field value: explicit, or inherited from the global registry
#[derive(Clone, Debug, PartialEq)]
pub enum Inherit<T> {
    Explicit(T),
    Inherit,
}

impl<T> Default for Inherit<T> {
    fn default() -> Self {
        Inherit::Inherit
    }
}

impl<T> Inherit<T> {
    pub fn is_inherit(&self) -> bool {
        matches!(self, Inherit::Inherit)
    }

    pub fn explicit(&self) -> Option<&T> {
        match self {
            Inherit::Explicit(value) => Some(value),
            Inherit::Inherit => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Inherit<U> {
        match self {
            Inherit::Explicit(value) => Inherit::Explicit(f(value)),
            Inherit::Inherit => Inherit::Inherit,
        }
    }
}

impl<T> From<Option<T>> for Inherit<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Inherit::Explicit(value),
            None => Inherit::Inherit,
        }
    }
}

// The sentinel is written as `null` so files stay compatible with the
// nullable-field format.
impl<T: Serialize> Serialize for Inherit<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_option_as_null(&self.explicit(), serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Inherit<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Inherit::from)
    }
}

/// Untyped style value, used by the name-keyed resolver API
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    Color(String),
    Number(f64),
    Integer(u32),
    Direction(BlackNoteDirection),
    Pattern(Vec<u32>),
}

impl StyleValue {
    fn type_name(&self) -> &'static str {
        match self {
            StyleValue::Color(_) => "color",
            StyleValue::Number(_) => "number",
            StyleValue::Integer(_) => "integer",
            StyleValue::Direction(_) => "direction",
            StyleValue::Pattern(_) => "pattern",
        }
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Color(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Color(value.to_string())
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<u32> for StyleValue {
    fn from(value: u32) -> Self {
        StyleValue::Integer(value)
    }
}

impl From<BlackNoteDirection> for StyleValue {
    fn from(value: BlackNoteDirection) -> Self {
        StyleValue::Direction(value)
    }
}

impl From<Vec<u32>> for StyleValue {
    fn from(value: Vec<u32>) -> Self {
        StyleValue::Pattern(value)
    }
}

/// Conversion back from [`StyleValue`] into a typed field.
/// A mismatched type is a caller bug.
pub(crate) trait FromStyle: Sized {
    fn from_style(value: StyleValue, field: &str) -> Self;
}

fn type_mismatch(field: &str, expected: &str, got: &StyleValue) -> ! {
    panic!(
        "style field `{}` expects a {} value, got {}",
        field,
        expected,
        got.type_name()
    )
}

impl FromStyle for String {
    fn from_style(value: StyleValue, field: &str) -> Self {
        match value {
            StyleValue::Color(color) => color,
            other => type_mismatch(field, "color", &other),
        }
    }
}

impl FromStyle for f64 {
    fn from_style(value: StyleValue, field: &str) -> Self {
        match value {
            StyleValue::Number(n) => n,
            StyleValue::Integer(n) => f64::from(n),
            other => type_mismatch(field, "number", &other),
        }
    }
}

impl FromStyle for u32 {
    fn from_style(value: StyleValue, field: &str) -> Self {
        match value {
            StyleValue::Integer(n) => n,
            other => type_mismatch(field, "integer", &other),
        }
    }
}

impl FromStyle for BlackNoteDirection {
    fn from_style(value: StyleValue, field: &str) -> Self {
        match value {
            StyleValue::Direction(direction) => direction,
            other => type_mismatch(field, "direction", &other),
        }
    }
}

impl FromStyle for Vec<u32> {
    fn from_style(value: StyleValue, field: &str) -> Self {
        match value {
            StyleValue::Pattern(pattern) => pattern,
            other => type_mismatch(field, "pattern", &other),
        }
    }
}

/// Where an inherited value comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InheritPath {
    Global(&'static str),
    /// Picks one of two globals by the element's hand tag
    ByHand {
        left: &'static str,
        right: &'static str,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct InheritRule {
    pub path: InheritPath,
    /// Used when the element is not attached to a document
    pub fallback: StyleValue,
}

impl InheritRule {
    fn global(path: &'static str, fallback: impl Into<StyleValue>) -> Self {
        Self { path: InheritPath::Global(path), fallback: fallback.into() }
    }
}

type RuleTable = HashMap<EventKind, HashMap<&'static str, InheritRule>>;

static INHERIT_RULES: Lazy<RuleTable> = Lazy::new(|| {
    use EventKind::*;

    let mut rules = Rules::default();
    rules.insert((Note, "color"), InheritRule::global("properties.globalNote.color", BLACK));
    rules.insert(
        (Note, "colorMidiNote"),
        InheritRule {
            path: InheritPath::ByHand {
                left: "properties.globalNote.colorLeftMidiNote",
                right: "properties.globalNote.colorRightMidiNote",
            },
            fallback: BLACK.into(),
        },
    );
    rules.insert(
        (Note, "blackNoteDirection"),
        InheritRule::global("properties.globalNote.blackNoteDirection", BlackNoteDirection::Down),
    );
    rules.insert((GraceNote, "color"), InheritRule::global("properties.globalGraceNote.color", BLACK));
    rules.insert((CountLine, "color"), InheritRule::global("properties.globalCountLine.color", BLACK));
    rules.insert(
        (CountLine, "dashPattern"),
        InheritRule::global("properties.globalCountLine.dashPattern", Vec::<u32>::new()),
    );
    rules.insert((StartRepeat, "color"), InheritRule::global("properties.globalStartRepeat.color", BLACK));
    rules.insert(
        (StartRepeat, "lineWidth"),
        InheritRule::global("properties.globalStartRepeat.lineWidth", 2.0),
    );
    rules.insert((EndRepeat, "color"), InheritRule::global("properties.globalEndRepeat.color", BLACK));
    rules.insert(
        (EndRepeat, "lineWidth"),
        InheritRule::global("properties.globalEndRepeat.lineWidth", 1.0),
    );
    rules.insert((Section, "color"), InheritRule::global("properties.globalSection.color", BLACK));
    rules.insert((Section, "lineWidth"), InheritRule::global("properties.globalSection.lineWidth", 1.0));
    rules.insert((Beam, "color"), InheritRule::global("properties.globalBeam.color", BLACK));
    rules.insert((Beam, "width"), InheritRule::global("properties.globalBeam.width", 4.0));
    rules.insert((Beam, "slant"), InheritRule::global("properties.globalBeam.slant", 5.0));
    rules.insert((Text, "color"), InheritRule::global("properties.globalText.color", BLACK));
    rules.insert((Text, "fontSize"), InheritRule::global("properties.globalText.fontSize", 12u32));
    rules.insert((Slur, "color"), InheritRule::global("properties.globalSlur.color", BLACK));
    rules.insert(
        (Slur, "startEndWidth"),
        InheritRule::global("properties.globalSlur.startEndWidth", 0.5),
    );
    rules.insert((Slur, "middleWidth"), InheritRule::global("properties.globalSlur.middleWidth", 1.0));
    rules.0
});

#[derive(Default)]
struct Rules(RuleTable);

impl Rules {
    fn insert(&mut self, (kind, field): (EventKind, &'static str), rule: InheritRule) {
        self.0.entry(kind).or_default().insert(field, rule);
    }
}

/// The inheritance rule for `field` on `kind`. Panics on an unknown field.
pub fn inherit_rule(kind: EventKind, field: &str) -> &'static InheritRule {
    INHERIT_RULES
        .get(&kind)
        .and_then(|fields| fields.get(field))
        .unwrap_or_else(|| panic!("unknown style field `{}` on {:?}", field, kind))
}

/// Names of the inheritable style fields of `kind`, sorted
pub fn style_fields(kind: EventKind) -> Vec<&'static str> {
    let mut fields: Vec<&'static str> = INHERIT_RULES
        .get(&kind)
        .map(|fields| fields.keys().copied().collect())
        .unwrap_or_default();
    fields.sort_unstable();
    fields
}

/// Stored value of a style field, sentinel included
pub fn literal_value(event: &Event, field: &str) -> Inherit<StyleValue> {
    event.style_literal(field)
}

/// Store an explicit value or the sentinel into a style field
pub fn set_value(event: &mut Event, field: &str, value: Inherit<StyleValue>) {
    event.set_style_literal(field, value);
}

/// Value of a style field after inheritance.
///
/// An explicit literal wins. Otherwise the field's path is resolved against
/// `document`'s registry at call time, so the result tracks later changes to
/// the global. With no document the rule's fallback is returned.
pub fn effective_value(document: Option<&Document>, event: &Event, field: &str) -> StyleValue {
    let rule = inherit_rule(event.kind(), field);
    match event.style_literal(field) {
        Inherit::Explicit(value) => value,
        Inherit::Inherit => resolve(document, rule, event.hand()),
    }
}

/// Articulations sit inside notes, so their one rule is not keyed by kind
pub(crate) static ARTICULATION_COLOR_RULE: Lazy<InheritRule> =
    Lazy::new(|| InheritRule::global("properties.globalArticulation.color", BLACK));

/// Resolve `rule` against `document`'s registry, or its fallback when detached
pub(crate) fn resolve(document: Option<&Document>, rule: &InheritRule, hand: Option<Hand>) -> StyleValue {
    let Some(document) = document else {
        return rule.fallback.clone();
    };

    let path = match rule.path {
        InheritPath::Global(path) => path,
        InheritPath::ByHand { left, right } => match hand {
            Some(Hand::Left) => left,
            _ => right,
        },
    };

    document.properties.value_at(path).unwrap_or_else(|| {
        log::warn!("inherit path {} did not resolve, using fallback", path);
        rule.fallback.clone()
    })
}
