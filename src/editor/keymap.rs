//! Key bindings for selection commands

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeyCommand {
    DeleteSelection,
    Copy,
    Cut,
    Paste,
    ClearSelection,
    /// One grid step earlier
    MoveEarlier,
    MoveLater,
    TransposeDown,
    TransposeUp,
    AssignLeftHand,
    AssignRightHand,
}

/// Key name -> command. Key names are lowercase, modifiers joined with `+`
/// (`ctrl+c`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct Keymap {
    bindings: BTreeMap<String, KeyCommand>,
}

impl Default for Keymap {
    fn default() -> Self {
        use KeyCommand::*;

        let bindings = [
            ("delete", DeleteSelection),
            ("backspace", DeleteSelection),
            ("c", Copy),
            ("ctrl+c", Copy),
            ("x", Cut),
            ("ctrl+x", Cut),
            ("v", Paste),
            ("ctrl+v", Paste),
            ("escape", ClearSelection),
            ("up", MoveEarlier),
            ("down", MoveLater),
            ("left", TransposeDown),
            ("right", TransposeUp),
            ("[", AssignLeftHand),
            ("]", AssignRightHand),
        ]
        .into_iter()
        .map(|(key, command)| (key.to_string(), command))
        .collect();

        Self { bindings }
    }
}

impl Keymap {
    pub fn empty() -> Self {
        Self { bindings: BTreeMap::new() }
    }

    pub fn lookup(&self, key: &str) -> Option<KeyCommand> {
        self.bindings.get(&normalize(key)).copied()
    }

    /// Bind `key`, returning the command it replaced
    pub fn bind(&mut self, key: &str, command: KeyCommand) -> Option<KeyCommand> {
        self.bindings.insert(normalize(key), command)
    }

    pub fn unbind(&mut self, key: &str) -> Option<KeyCommand> {
        self.bindings.remove(&normalize(key))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let keymap = Keymap::default();
        assert_eq!(keymap.lookup("Delete"), Some(KeyCommand::DeleteSelection));
        assert_eq!(keymap.lookup("ctrl+v"), Some(KeyCommand::Paste));
        assert_eq!(keymap.lookup("["), Some(KeyCommand::AssignLeftHand));
        assert_eq!(keymap.lookup("up"), Some(KeyCommand::MoveEarlier));
        assert_eq!(keymap.lookup("q"), None);
    }

    #[test]
    fn test_rebind() {
        let mut keymap = Keymap::empty();
        assert_eq!(keymap.bind("D", KeyCommand::DeleteSelection), None);
        assert_eq!(keymap.lookup("d"), Some(KeyCommand::DeleteSelection));
        assert_eq!(keymap.unbind("d"), Some(KeyCommand::DeleteSelection));
        assert!(keymap.is_empty());
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut keymap = Keymap::empty();
        keymap.bind("x", KeyCommand::Cut);
        assert_eq!(serde_json::to_string(&keymap).unwrap(), r#"{"x":"cut"}"#);
    }
}
