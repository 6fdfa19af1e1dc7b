//! Device database.
//!
//! Resolves a HID device's vendor/product pair to its [`MappingScheme`] and
//! display information. Identifiers are opaque strings exactly as the HID
//! layer reports them (decimal on the platforms we ship for); no numeric
//! normalization is attempted, so `"1356"` and `"0x054C"` are different keys.
//!
//! Unknown devices resolve to the default scheme and `is_known == false`.
//! The database is mutable at runtime (preferences edit it), which is why pads
//! re-resolve on request rather than caching forever.
//!
//! # Persistence
//! Entries round-trip through JSON as a flat list of [`DeviceRecord`]s:
//! ```json
//! [{ "vendor_id": "1356", "product_id": "1476", "name": "Sony DualShock 4",
//!    "scheme": { "left": 0, "right": 0, "hat": 0 }, "known": true }]
//! ```

use crate::error::DatabaseError;
use crate::scheme::{HatScheme, LeftStickScheme, MappingScheme, RightStickScheme};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Vendor/product pair identifying a device model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DeviceKey {
    pub vendor_id: String,
    pub product_id: String,
}

impl DeviceKey {
    pub fn new(vendor_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            product_id: product_id.into(),
        }
    }
}

/// One persisted database entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub vendor_id: String,
    pub product_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub scheme: MappingScheme,
    /// Officially supported model (as opposed to an entry created by the user).
    #[serde(default)]
    pub known: bool,
}

impl DeviceRecord {
    fn key(&self) -> DeviceKey {
        DeviceKey::new(self.vendor_id.clone(), self.product_id.clone())
    }
}

/// Result of a database lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceLookup {
    pub scheme: MappingScheme,
    pub name: Option<String>,
    pub icon: Option<String>,
    pub is_known: bool,
}

/// In-memory device database.
#[derive(Debug, Clone, Default)]
pub struct DeviceDatabase {
    entries: HashMap<DeviceKey, DeviceRecord>,
    revision: u64,
}

impl DeviceDatabase {
    /// Empty database; every lookup yields the default scheme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Database pre-populated with the officially supported devices.
    pub fn with_known_devices() -> Self {
        let mut db = Self::new();
        db.reset();
        db
    }

    /// Drop all entries and re-register the officially supported devices.
    pub fn reset(&mut self) {
        self.entries.clear();
        for record in known_devices() {
            self.entries.insert(record.key(), record);
        }
        self.revision += 1;
    }

    /// Monotonic counter bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, vendor_id: &str, product_id: &str) -> Option<&DeviceRecord> {
        self.entries.get(&DeviceKey::new(vendor_id, product_id))
    }

    /// Resolve schemes and display information for a device.
    pub fn lookup(&self, vendor_id: &str, product_id: &str) -> DeviceLookup {
        match self.get(vendor_id, product_id) {
            Some(record) => DeviceLookup {
                scheme: record.scheme,
                name: record.name.clone(),
                icon: record.icon.clone(),
                is_known: record.known,
            },
            None => DeviceLookup::default(),
        }
    }

    pub fn is_known(&self, vendor_id: &str, product_id: &str) -> bool {
        self.get(vendor_id, product_id).is_some_and(|r| r.known)
    }

    pub fn name(&self, vendor_id: &str, product_id: &str) -> Option<&str> {
        self.get(vendor_id, product_id)
            .and_then(|r| r.name.as_deref())
    }

    pub fn icon(&self, vendor_id: &str, product_id: &str) -> Option<&str> {
        self.get(vendor_id, product_id)
            .and_then(|r| r.icon.as_deref())
    }

    pub fn left(&self, vendor_id: &str, product_id: &str) -> LeftStickScheme {
        self.lookup(vendor_id, product_id).scheme.left
    }

    pub fn right(&self, vendor_id: &str, product_id: &str) -> RightStickScheme {
        self.lookup(vendor_id, product_id).scheme.right
    }

    pub fn hat(&self, vendor_id: &str, product_id: &str) -> HatScheme {
        self.lookup(vendor_id, product_id).scheme.hat
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, record: DeviceRecord) {
        self.entries.insert(record.key(), record);
        self.revision += 1;
    }

    /// Record a user-selected scheme for a device, creating an entry if needed.
    pub fn set_schemes(&mut self, vendor_id: &str, product_id: &str, scheme: MappingScheme) {
        let key = DeviceKey::new(vendor_id, product_id);
        self.entries
            .entry(key)
            .and_modify(|r| r.scheme = scheme)
            .or_insert_with(|| DeviceRecord {
                vendor_id: vendor_id.to_string(),
                product_id: product_id.to_string(),
                name: None,
                icon: None,
                scheme,
                known: false,
            });
        self.revision += 1;
    }

    /// Same as [`set_schemes`](Self::set_schemes) from raw selector integers.
    pub fn set_raw_schemes(
        &mut self,
        vendor_id: &str,
        product_id: &str,
        left: u8,
        right: u8,
        hat: u8,
    ) -> Result<(), DatabaseError> {
        let scheme = MappingScheme::from_raw(left, right, hat)
            .map_err(|(kind, value)| DatabaseError::UnknownScheme { kind, value })?;
        self.set_schemes(vendor_id, product_id, scheme);
        Ok(())
    }

    pub fn remove(&mut self, vendor_id: &str, product_id: &str) -> Option<DeviceRecord> {
        let removed = self.entries.remove(&DeviceKey::new(vendor_id, product_id));
        if removed.is_some() {
            self.revision += 1;
        }
        removed
    }

    /// All records, sorted by vendor then product for stable output.
    pub fn records(&self) -> Vec<&DeviceRecord> {
        let mut out: Vec<_> = self.entries.values().collect();
        out.sort_by(|a, b| {
            (a.vendor_id.as_str(), a.product_id.as_str())
                .cmp(&(b.vendor_id.as_str(), b.product_id.as_str()))
        });
        out
    }

    pub fn to_json(&self) -> Result<String, DatabaseError> {
        Ok(serde_json::to_string_pretty(&self.records())?)
    }

    /// Merge records from JSON; records replace entries with the same key.
    pub fn merge_json(&mut self, json: &str) -> Result<usize, DatabaseError> {
        let records: Vec<DeviceRecord> = serde_json::from_str(json)?;
        let n = records.len();
        for record in records {
            self.entries.insert(record.key(), record);
        }
        self.revision += 1;
        Ok(n)
    }

    /// Merge records from a JSON file.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize, DatabaseError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DatabaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DatabaseError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|source| DatabaseError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn known(vendor_id: &str, product_id: &str, name: &str, icon: &str) -> DeviceRecord {
    DeviceRecord {
        vendor_id: vendor_id.to_string(),
        product_id: product_id.to_string(),
        name: Some(name.to_string()),
        icon: Some(icon.to_string()),
        scheme: MappingScheme::default(),
        known: true,
    }
}

/// Officially supported devices, keyed by the decimal IDs the HID layer reports.
fn known_devices() -> Vec<DeviceRecord> {
    vec![
        // 0x040B / 0x6533
        known("1035", "25907", "Competition Pro SL-6602", "joystick_speedlink"),
        // 0x054C / 0x0268
        known("1356", "616", "Sony DualShock 3", "joystick_sony"),
        // 0x054C / 0x05C4
        known("1356", "1476", "Sony DualShock 4", "joystick_sony"),
        // 0x054C / 0x09CC
        known("1356", "2508", "Sony DualShock 4 (2nd Gen)", "joystick_sony"),
        // 0x0483 / 0x9005
        known("1155", "36869", "RetroFun! Joystick Adapter", "retro_adapter"),
        known("4", "1", "aJoy Retro Adapter", "retro_adapter"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_device_resolves_to_default() {
        let db = DeviceDatabase::new();
        let found = db.lookup("0x054C", "0x05C4");
        assert_eq!(found.scheme, MappingScheme::default());
        assert!(!found.is_known);
        assert_eq!(found.name, None);
    }

    #[test]
    fn identifiers_are_opaque() {
        let db = DeviceDatabase::with_known_devices();
        assert!(db.is_known("1356", "1476"));
        assert!(!db.is_known("0x054C", "0x05C4"));
        assert_eq!(db.name("1035", "25907"), Some("Competition Pro SL-6602"));
    }

    #[test]
    fn user_edits_bump_revision_and_stay_unofficial() {
        let mut db = DeviceDatabase::new();
        let rev = db.revision();
        let scheme = MappingScheme::new(
            LeftStickScheme::A0A1r,
            RightStickScheme::A2A3,
            HatScheme::B11B14,
        );
        db.set_schemes("1", "2", scheme);
        assert!(db.revision() > rev);
        assert_eq!(db.lookup("1", "2").scheme, scheme);
        assert!(!db.is_known("1", "2"));
        assert_eq!(db.hat("1", "2"), HatScheme::B11B14);
    }

    #[test]
    fn raw_schemes_are_validated() {
        let mut db = DeviceDatabase::new();
        let err = db.set_raw_schemes("1", "2", 0, 0, 9).unwrap_err();
        assert!(matches!(err, DatabaseError::UnknownScheme { kind: "hat", value: 9 }));
        assert!(db.is_empty());
    }

    #[test]
    fn json_round_trip() {
        let mut db = DeviceDatabase::with_known_devices();
        db.set_schemes("7", "8", MappingScheme::new(
            LeftStickScheme::A3A4,
            RightStickScheme::A2A5r,
            HatScheme::U90U93,
        ));
        let json = db.to_json().unwrap();

        let mut copy = DeviceDatabase::new();
        assert_eq!(copy.merge_json(&json).unwrap(), db.len());
        assert_eq!(copy.lookup("7", "8"), db.lookup("7", "8"));
        assert!(copy.is_known("1356", "616"));
    }
}
