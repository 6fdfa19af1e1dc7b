//! Physical keys.
//!
//! A [`PhysicalKey`] is a platform key code plus the modifier flags that were
//! down when it was captured. Identity is the key code alone: modifiers are
//! informational, so `Shift+Left` and `Left` are the same key for binding
//! purposes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Modifier flags captured with a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub option: bool,
    pub command: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        option: false,
        command: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// A key on the host keyboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PhysicalKey {
    pub key_code: u16,
    #[serde(default, skip_serializing_if = "Modifiers::is_empty")]
    pub modifiers: Modifiers,
}

impl PhysicalKey {
    pub const fn new(key_code: u16) -> Self {
        Self {
            key_code,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key_code: u16, modifiers: Modifiers) -> Self {
        Self { key_code, modifiers }
    }

    /// Same key with modifier flags cleared.
    pub fn plain(self) -> Self {
        Self::new(self.key_code)
    }
}

impl PartialEq for PhysicalKey {
    fn eq(&self, other: &Self) -> bool {
        self.key_code == other.key_code
    }
}

impl Eq for PhysicalKey {}

impl Hash for PhysicalKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_code.hash(state);
    }
}

impl From<u16> for PhysicalKey {
    fn from(key_code: u16) -> Self {
        Self::new(key_code)
    }
}

impl fmt::Display for PhysicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.modifiers;
        for (on, label) in [
            (m.control, "ctrl+"),
            (m.option, "opt+"),
            (m.shift, "shift+"),
            (m.command, "cmd+"),
        ] {
            if on {
                f.write_str(label)?;
            }
        }
        write!(f, "{:#04x}", self.key_code)
    }
}
