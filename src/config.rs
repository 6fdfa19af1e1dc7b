//! Manager configuration.
//!
//! Loaded from TOML; every key is optional and falls back to its default.
//!
//! ```toml
//! slot_limit = 5
//! disconnect_joy_keys = true
//! release_mouse_by_shaking = true
//! database_path = "devices.json"
//! port1 = 1
//! port2 = 3
//!
//! [[keymaps.keyset1]]
//! key = { key_code = 123 }
//! action = "PULL_LEFT"
//! ```
//!
//! A `keymaps` table that is present replaces the factory bindings of the
//! tables it names; tables it omits keep their defaults.

use crate::error::ConfigError;
use crate::keymap::KeyMaps;
use crate::manager::{BUILTIN_SLOTS, DEFAULT_SLOT_LIMIT};
use crate::port::PortId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Total number of slots, built-in pads included.
    pub slot_limit: usize,

    /// A key consumed by a keyboard-emulated pad is not passed on to the
    /// emulated keyboard.
    pub disconnect_joy_keys: bool,

    /// Feed mouse movement into the shake detector.
    pub release_mouse_by_shaking: bool,

    /// JSON file with user device database entries, merged over the built-in list.
    pub database_path: Option<PathBuf>,

    /// Slot initially bound to control port 1.
    pub port1: Option<usize>,

    /// Slot initially bound to control port 2.
    pub port2: Option<usize>,

    pub keymaps: KeyMaps,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slot_limit: DEFAULT_SLOT_LIMIT,
            disconnect_joy_keys: true,
            release_mouse_by_shaking: true,
            database_path: None,
            port1: None,
            port2: None,
            keymaps: KeyMaps::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_toml_string()?).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Slot configured for `port`.
    pub fn port(&self, port: PortId) -> Option<usize> {
        match port {
            PortId::Port1 => self.port1,
            PortId::Port2 => self.port2,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_limit < BUILTIN_SLOTS {
            return Err(ConfigError::Invalid(format!(
                "slot_limit {} is below the {BUILTIN_SLOTS} built-in slots",
                self.slot_limit
            )));
        }
        for port in PortId::ALL {
            if let Some(slot) = self.port(port) {
                if slot >= self.slot_limit {
                    return Err(ConfigError::Invalid(format!(
                        "{port} bound to slot {slot}, limit is {}",
                        self.slot_limit
                    )));
                }
            }
        }
        if self.port1.is_some() && self.port1 == self.port2 {
            return Err(ConfigError::Invalid(
                "port1 and port2 name the same slot".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::BindableAction;
    use crate::key::PhysicalKey;
    use crate::keymap::KeyMap;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn partial_keymaps_keep_other_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            port1 = 1

            [[keymaps.mouse]]
            key = { key_code = 36 }
            action = "PRESS_LEFT"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.port1, Some(1));
        assert_eq!(
            cfg.keymaps.mouse.lookup(&PhysicalKey::new(36)),
            Some(BindableAction::PressLeft)
        );
        assert_eq!(cfg.keymaps.keyset1, KeyMap::default_keyset1());
    }

    #[test]
    fn toml_round_trip() {
        let mut cfg = Config {
            port2: Some(3),
            database_path: Some("devices.json".into()),
            ..Config::default()
        };
        cfg.keymaps.keyset2.bind(PhysicalKey::new(0x20), BindableAction::PressFire);
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_toml_str("slot_limit = 2"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml_str("port1 = 7"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml_str("port1 = 2\nport2 = 2"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml_str("slot_limit = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
