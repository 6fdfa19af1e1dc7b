//! Key binding tables.
//!
//! Each keyboard-driven pad reads one [`KeyMap`]. A key maps to at most one
//! action (it is a map), and [`KeyMap::bind`] keeps the reverse true as well:
//! binding a key to an action first unbinds whatever key held that action.
//!
//! Tables serialize as a list of `{ key, action }` records, sorted by key code,
//! because neither TOML nor JSON allow structured map keys:
//! ```toml
//! [[keyset1]]
//! key = { key_code = 123 }
//! action = "PULL_LEFT"
//! ```

use crate::action::BindableAction;
use crate::key::PhysicalKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One persisted binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: PhysicalKey,
    pub action: BindableAction,
}

/// Binding table for a single pad.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<KeyBinding>", into = "Vec<KeyBinding>")]
pub struct KeyMap {
    bindings: HashMap<PhysicalKey, BindableAction>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `action`, removing any other key bound to `action`.
    /// Rebinding the same key code replaces its previous entry.
    pub fn bind(&mut self, key: PhysicalKey, action: BindableAction) {
        self.unbind(action);
        self.bindings.insert(key, action);
    }

    /// Remove every key bound to `action`. Returns how many were removed.
    pub fn unbind(&mut self, action: BindableAction) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|_, bound| *bound != action);
        before - self.bindings.len()
    }

    /// Remove the binding of a single key.
    pub fn unbind_key(&mut self, key: &PhysicalKey) -> Option<BindableAction> {
        self.bindings.remove(key)
    }

    pub fn lookup(&self, key: &PhysicalKey) -> Option<BindableAction> {
        self.bindings.get(key).copied()
    }

    /// Key currently bound to `action`, if any.
    pub fn key_for(&self, action: BindableAction) -> Option<PhysicalKey> {
        self.bindings
            .iter()
            .find(|(_, bound)| **bound == action)
            .map(|(key, _)| *key)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Bindings sorted by key code.
    pub fn bindings(&self) -> Vec<KeyBinding> {
        let mut out: Vec<KeyBinding> = self
            .bindings
            .iter()
            .map(|(key, action)| KeyBinding {
                key: *key,
                action: *action,
            })
            .collect();
        out.sort_by_key(|b| b.key.key_code);
        out
    }

    /// Keyset 1: cursor keys and space.
    pub fn default_keyset1() -> Self {
        Self::from_pairs(&[
            (0x7B, BindableAction::PullLeft),
            (0x7C, BindableAction::PullRight),
            (0x7E, BindableAction::PullUp),
            (0x7D, BindableAction::PullDown),
            (0x31, BindableAction::PressFire),
        ])
    }

    /// Keyset 2: S/D/E/X for directions, C for fire.
    pub fn default_keyset2() -> Self {
        Self::from_pairs(&[
            (0x01, BindableAction::PullLeft),
            (0x02, BindableAction::PullRight),
            (0x0E, BindableAction::PullUp),
            (0x07, BindableAction::PullDown),
            (0x08, BindableAction::PressFire),
        ])
    }

    fn from_pairs(pairs: &[(u16, BindableAction)]) -> Self {
        let mut map = Self::new();
        for &(code, action) in pairs {
            map.bind(PhysicalKey::new(code), action);
        }
        map
    }
}

impl From<Vec<KeyBinding>> for KeyMap {
    /// Later records win, both for duplicate keys and duplicate actions.
    fn from(list: Vec<KeyBinding>) -> Self {
        let mut map = Self::new();
        for b in list {
            map.bind(b.key, b.action);
        }
        map
    }
}

impl From<KeyMap> for Vec<KeyBinding> {
    fn from(map: KeyMap) -> Self {
        map.bindings()
    }
}

/// Which of the three binding tables a pad reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMapId {
    Mouse,
    Keyset1,
    Keyset2,
}

impl KeyMapId {
    pub const ALL: [KeyMapId; 3] = [KeyMapId::Mouse, KeyMapId::Keyset1, KeyMapId::Keyset2];

    pub fn index(self) -> usize {
        match self {
            KeyMapId::Mouse => 0,
            KeyMapId::Keyset1 => 1,
            KeyMapId::Keyset2 => 2,
        }
    }
}

impl fmt::Display for KeyMapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyMapId::Mouse => "mouse",
            KeyMapId::Keyset1 => "keyset1",
            KeyMapId::Keyset2 => "keyset2",
        })
    }
}

/// The binding tables of all keyboard-driven pads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMaps {
    /// Keys emulating mouse buttons.
    pub mouse: KeyMap,
    pub keyset1: KeyMap,
    pub keyset2: KeyMap,
}

impl Default for KeyMaps {
    fn default() -> Self {
        Self {
            mouse: KeyMap::new(),
            keyset1: KeyMap::default_keyset1(),
            keyset2: KeyMap::default_keyset2(),
        }
    }
}

impl KeyMaps {
    pub fn get(&self, id: KeyMapId) -> &KeyMap {
        match id {
            KeyMapId::Mouse => &self.mouse,
            KeyMapId::Keyset1 => &self.keyset1,
            KeyMapId::Keyset2 => &self.keyset2,
        }
    }

    pub fn get_mut(&mut self, id: KeyMapId) -> &mut KeyMap {
        match id {
            KeyMapId::Mouse => &mut self.mouse,
            KeyMapId::Keyset1 => &mut self.keyset1,
            KeyMapId::Keyset2 => &mut self.keyset2,
        }
    }

    /// Restore one table to its factory bindings.
    pub fn reset(&mut self, id: KeyMapId) {
        *self.get_mut(id) = Self::default().get(id).clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_removes_previous_key_for_action() {
        let mut map = KeyMap::new();
        let k1 = PhysicalKey::new(10);
        let k2 = PhysicalKey::new(11);
        map.bind(k1, BindableAction::PressFire);
        map.bind(k2, BindableAction::PressFire);
        assert_eq!(map.len(), 1);
        assert_eq!(map.lookup(&k1), None);
        assert_eq!(map.key_for(BindableAction::PressFire), Some(k2));
    }

    #[test]
    fn rebinding_a_key_replaces_its_action() {
        let mut map = KeyMap::new();
        let k = PhysicalKey::new(3);
        map.bind(k, BindableAction::PullUp);
        map.bind(k, BindableAction::PullDown);
        assert_eq!(map.lookup(&k), Some(BindableAction::PullDown));
        assert_eq!(map.key_for(BindableAction::PullUp), None);
    }

    #[test]
    fn unbind_counts_removed_keys() {
        let mut map = KeyMap::default_keyset1();
        assert_eq!(map.unbind(BindableAction::PullLeft), 1);
        assert_eq!(map.unbind(BindableAction::PullLeft), 0);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn default_tables() {
        let maps = KeyMaps::default();
        assert!(maps.mouse.is_empty());
        assert_eq!(
            maps.keyset1.lookup(&PhysicalKey::new(0x7B)),
            Some(BindableAction::PullLeft)
        );
        assert_eq!(
            maps.keyset2.lookup(&PhysicalKey::new(0x08)),
            Some(BindableAction::PressFire)
        );
    }

    #[test]
    fn reset_restores_factory_table() {
        let mut maps = KeyMaps::default();
        maps.keyset2.clear();
        maps.reset(KeyMapId::Keyset2);
        assert_eq!(maps.keyset2, KeyMap::default_keyset2());
    }

    #[test]
    fn serializes_as_sorted_list() {
        let mut map = KeyMap::new();
        map.bind(PhysicalKey::new(9), BindableAction::PressRight);
        map.bind(PhysicalKey::new(2), BindableAction::PressLeft);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(
            json,
            r#"[{"key":{"key_code":2},"action":"PRESS_LEFT"},{"key":{"key_code":9},"action":"PRESS_RIGHT"}]"#
        );
        let back: KeyMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
