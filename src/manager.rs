//! Game pad manager.
//!
//! [`GamePadManager`] owns the slot table. Three slots are built in:
//!
//! | slot | pad |
//! |---:|---|
//! | 0 | host mouse (buttons optionally on the `mouse` key map) |
//! | 1 | joystick on key set 1 |
//! | 2 | joystick on key set 2 |
//!
//! HID devices take the lowest free slot below the slot limit when they
//! arrive and give it back when they leave. At most one pad is bound to each
//! control port; binding a pad to an occupied port unbinds the previous one.
//!
//! The manager is single threaded. Platforms that deliver HID callbacks on
//! other threads wrap it in a [`SharedManager`]; every report is routed by
//! `location_id`, so a report that races a removal finds no pad and is dropped.

use crate::action::{BindableAction, GamePadAction};
use crate::backends::HidBackend;
use crate::config::Config;
use crate::database::DeviceDatabase;
use crate::error::{BackendError, ConfigError};
use crate::event::{HidEvent, HidValue};
use crate::eventbus::{ActionBus, PadActivity};
use crate::gamepad::GamePad;
use crate::key::PhysicalKey;
use crate::keymap::{KeyMapId, KeyMaps};
use crate::metadata::DeviceMeta;
use crate::port::{ControlPorts, PortId};
use crate::snapshot::{SlotInfo, Snapshot};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub const MOUSE_SLOT: usize = 0;
pub const KEYSET1_SLOT: usize = 1;
pub const KEYSET2_SLOT: usize = 2;

/// Number of slots occupied by built-in pads.
pub const BUILTIN_SLOTS: usize = 3;

/// Default total number of slots.
pub const DEFAULT_SLOT_LIMIT: usize = 5;

/// Manager shared between the UI thread and HID callback threads.
pub type SharedManager = Arc<Mutex<GamePadManager>>;

#[derive(Debug)]
pub struct GamePadManager {
    pads: BTreeMap<usize, GamePad>,
    slot_limit: usize,
    key_maps: KeyMaps,
    database: DeviceDatabase,
    bus: ActionBus,
    disconnect_joy_keys: bool,
    release_mouse_by_shaking: bool,
    // Slot the user wants on each port; re-applied when devices arrive.
    wanted: [Option<usize>; 2],
}

impl Default for GamePadManager {
    fn default() -> Self {
        Self::new()
    }
}

impl GamePadManager {
    /// Manager with the default configuration and the known-device database.
    pub fn new() -> Self {
        Self::with_database(&Config::default(), DeviceDatabase::with_known_devices())
    }

    /// Build from a configuration, merging the configured device database file.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut database = DeviceDatabase::with_known_devices();
        if let Some(path) = &config.database_path {
            let merged = database.load(path)?;
            info!(path = %path.display(), entries = merged, "device database loaded");
        }
        Ok(Self::with_database(config, database))
    }

    /// Build from a configuration and an explicit database. The configuration
    /// is assumed valid.
    pub fn with_database(config: &Config, database: DeviceDatabase) -> Self {
        let mut pads = BTreeMap::new();
        pads.insert(
            MOUSE_SLOT,
            GamePad::mouse("Mouse", Some(KeyMapId::Mouse)).with_icon("devMouse"),
        );
        pads.insert(
            KEYSET1_SLOT,
            GamePad::keyboard("Joystick Keyset 1", KeyMapId::Keyset1).with_icon("devKeyset1"),
        );
        pads.insert(
            KEYSET2_SLOT,
            GamePad::keyboard("Joystick Keyset 2", KeyMapId::Keyset2).with_icon("devKeyset2"),
        );

        let mut mgr = Self {
            pads,
            slot_limit: config.slot_limit.max(BUILTIN_SLOTS),
            key_maps: config.keymaps.clone(),
            database,
            bus: ActionBus::new(),
            disconnect_joy_keys: config.disconnect_joy_keys,
            release_mouse_by_shaking: config.release_mouse_by_shaking,
            wanted: [None, None],
        };
        for port in PortId::ALL {
            if let Some(slot) = config.port(port) {
                mgr.bind_port(slot, port);
            }
        }
        mgr
    }

    /// Wrap into a [`SharedManager`].
    pub fn shared(self) -> SharedManager {
        Arc::new(Mutex::new(self))
    }

    // ---------------------------------------------------------------------
    // Slots

    pub fn slot_limit(&self) -> usize {
        self.slot_limit
    }

    pub fn is_used(&self, slot: usize) -> bool {
        self.pads.contains_key(&slot)
    }

    pub fn is_empty(&self, slot: usize) -> bool {
        !self.is_used(slot)
    }

    /// Lowest free slot below the slot limit.
    pub fn find_free_slot(&self) -> Option<usize> {
        let free = (0..self.slot_limit).find(|slot| self.is_empty(*slot));
        if free.is_none() {
            warn!(limit = self.slot_limit, "Maximum number of devices reached");
        }
        free
    }

    pub fn pad(&self, slot: usize) -> Option<&GamePad> {
        self.pads.get(&slot)
    }

    pub fn pad_mut(&mut self, slot: usize) -> Option<&mut GamePad> {
        self.pads.get_mut(&slot)
    }

    /// Occupied slots with their pads, in slot order.
    pub fn pads(&self) -> impl Iterator<Item = (usize, &GamePad)> {
        self.pads.iter().map(|(slot, pad)| (*slot, pad))
    }

    /// Slot whose pad is bound to `port`.
    pub fn slot_on(&self, port: PortId) -> Option<usize> {
        self.pads
            .iter()
            .find(|(_, pad)| pad.port() == Some(port))
            .map(|(slot, _)| *slot)
    }

    /// Display name of a slot; empty slots read "External device".
    pub fn name(&self, slot: usize) -> &str {
        self.pads
            .get(&slot)
            .map_or("External device", |pad| pad.name())
    }

    pub fn icon(&self, slot: usize) -> Option<&str> {
        self.pads.get(&slot).and_then(|pad| pad.icon())
    }

    // ---------------------------------------------------------------------
    // Ports

    /// Bind the pad in `slot` to `port`, unbinding whichever pad held it.
    ///
    /// An empty slot leaves the port unbound; the request is remembered and
    /// honoured once a device arrives in that slot.
    pub fn bind_port(&mut self, slot: usize, port: PortId) {
        for pad in self.pads.values_mut() {
            if pad.port() == Some(port) {
                pad.set_port(None);
            }
        }
        let other = Self::other(port);
        if self.wanted[Self::index(other)] == Some(slot) {
            self.wanted[Self::index(other)] = None;
        }
        self.wanted[Self::index(port)] = Some(slot);

        if let Some(pad) = self.pads.get_mut(&slot) {
            pad.set_port(Some(port));
            info!(slot, %port, name = pad.name(), "pad bound");
        } else {
            debug!(slot, %port, "port reserved for empty slot");
        }
    }

    /// Leave `port` without a pad.
    pub fn unbind_port(&mut self, port: PortId) {
        for pad in self.pads.values_mut() {
            if pad.port() == Some(port) {
                pad.set_port(None);
            }
        }
        self.wanted[Self::index(port)] = None;
    }

    fn index(port: PortId) -> usize {
        match port {
            PortId::Port1 => 0,
            PortId::Port2 => 1,
        }
    }

    fn other(port: PortId) -> PortId {
        match port {
            PortId::Port1 => PortId::Port2,
            PortId::Port2 => PortId::Port1,
        }
    }

    // ---------------------------------------------------------------------
    // Device lifecycle

    /// Register an attached HID device.
    ///
    /// Returns the slot it was given, or `None` when the device is internal,
    /// already registered, or all slots are taken.
    pub fn device_arrived(&mut self, meta: DeviceMeta) -> Option<usize> {
        if meta.is_internal() {
            debug!(device = %meta, "ignoring internal device");
            return None;
        }
        if self.slot_of(&meta.location_id).is_some() {
            debug!(device = %meta, "device already registered");
            return None;
        }
        let slot = self.find_free_slot()?;
        let pad = GamePad::hid(meta, &self.database);
        info!(
            slot,
            name = pad.name(),
            kind = ?pad.kind(),
            known = pad.is_known(),
            "device connected"
        );
        if !pad.is_known() && !pad.is_mouse() {
            info!(slot, "device is not officially supported and may not work");
        }
        self.pads.insert(slot, pad);

        for port in PortId::ALL {
            if self.wanted[Self::index(port)] == Some(slot) {
                self.bind_port(slot, port);
            }
        }
        Some(slot)
    }

    /// Drop every pad registered under `location_id`. Returns the freed slots.
    pub fn device_removed(&mut self, location_id: &str) -> Vec<usize> {
        let freed: Vec<usize> = self
            .pads
            .iter()
            .filter(|(_, pad)| pad.location_id() == Some(location_id))
            .map(|(slot, _)| *slot)
            .collect();
        for slot in &freed {
            if let Some(pad) = self.pads.remove(slot) {
                info!(slot, name = pad.name(), "device disconnected");
            }
        }
        freed
    }

    /// Slot of the HID pad registered under `location_id`.
    pub fn slot_of(&self, location_id: &str) -> Option<usize> {
        self.pads
            .iter()
            .find(|(_, pad)| pad.location_id() == Some(location_id))
            .map(|(slot, _)| *slot)
    }

    // ---------------------------------------------------------------------
    // Input

    /// Route a HID element change to the pad registered under `location_id`.
    ///
    /// Returns the dispatched actions. Reports for unknown locations are dropped.
    pub fn process_hid(
        &mut self,
        location_id: &str,
        value: &HidValue,
        ports: &mut dyn ControlPorts,
    ) -> Vec<GamePadAction> {
        let Some(slot) = self.slot_of(location_id) else {
            debug!(location_id, "dropping report for unregistered device");
            return Vec::new();
        };
        let Some(pad) = self.pads.get_mut(&slot) else {
            return Vec::new();
        };
        let actions = pad.process_hid(value, ports);
        if pad.notify() && !actions.is_empty() {
            let activity = PadActivity {
                slot,
                kind: pad.kind(),
                port: pad.port(),
                actions: actions.clone(),
            };
            self.bus.emit(&activity);
        }
        actions
    }

    /// Offer a key press to the pads on port 1 and port 2.
    ///
    /// Returns `true` when the key was consumed and must not reach the
    /// emulated keyboard.
    pub fn key_down(&mut self, key: &PhysicalKey, ports: &mut dyn ControlPorts) -> bool {
        self.route_key(key, ports, true)
    }

    /// Offer a key release to the pads on port 1 and port 2.
    pub fn key_up(&mut self, key: &PhysicalKey, ports: &mut dyn ControlPorts) -> bool {
        self.route_key(key, ports, false)
    }

    fn route_key(&mut self, key: &PhysicalKey, ports: &mut dyn ControlPorts, down: bool) -> bool {
        let key = key.plain();
        for port in PortId::ALL {
            let Some(slot) = self.slot_on(port) else {
                continue;
            };
            let Some(pad) = self.pads.get_mut(&slot) else {
                continue;
            };
            let handled = if down {
                pad.process_key_down(&self.key_maps, &key, ports)
            } else {
                pad.process_key_up(&self.key_maps, &key, ports)
            };
            if handled && self.disconnect_joy_keys {
                return true;
            }
        }
        false
    }

    /// Relative movement of the mouse behind `slot`. Returns whether a shake
    /// was recognized.
    pub fn mouse_moved(
        &mut self,
        slot: usize,
        dx: f64,
        dy: f64,
        ports: &mut dyn ControlPorts,
    ) -> bool {
        let shake = self.release_mouse_by_shaking;
        match self.pads.get_mut(&slot) {
            Some(pad) if pad.is_mouse() => pad.process_mouse_delta(dx, dy, shake, ports),
            _ => false,
        }
    }

    /// Button actions of the mouse behind `slot`.
    pub fn mouse_buttons(
        &mut self,
        slot: usize,
        actions: &[GamePadAction],
        ports: &mut dyn ControlPorts,
    ) -> bool {
        match self.pads.get_mut(&slot) {
            Some(pad) if pad.is_mouse() => pad.process_mouse_events(actions, ports),
            _ => false,
        }
    }

    /// Feed every pending backend event through the manager.
    ///
    /// Returns the number of events handled.
    pub fn pump(
        &mut self,
        backend: &mut dyn HidBackend,
        ports: &mut dyn ControlPorts,
    ) -> Result<usize, BackendError> {
        let events = backend.poll()?;
        let n = events.len();
        for event in events {
            self.handle(event, ports);
        }
        Ok(n)
    }

    pub fn handle(&mut self, event: HidEvent, ports: &mut dyn ControlPorts) {
        match event {
            HidEvent::Arrived(meta) => {
                self.device_arrived(meta);
            }
            HidEvent::Removed { location_id } => {
                self.device_removed(&location_id);
            }
            HidEvent::Value { location_id, value } => {
                self.process_hid(&location_id, &value, ports);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Bindings, database, notifications

    pub fn key_maps(&self) -> &KeyMaps {
        &self.key_maps
    }

    pub fn key_maps_mut(&mut self) -> &mut KeyMaps {
        &mut self.key_maps
    }

    /// Bind `key` to `action` in the key map of `slot`'s pad.
    ///
    /// Returns `false` when the slot has no key map.
    pub fn bind_key(&mut self, slot: usize, key: PhysicalKey, action: BindableAction) -> bool {
        let Some(id) = self.pads.get(&slot).and_then(|pad| pad.key_map()) else {
            return false;
        };
        self.key_maps.get_mut(id).bind(key.plain(), action);
        true
    }

    /// Remove all keys bound to `action` in the key map of `slot`'s pad.
    pub fn unbind_key(&mut self, slot: usize, action: BindableAction) -> bool {
        let Some(id) = self.pads.get(&slot).and_then(|pad| pad.key_map()) else {
            return false;
        };
        self.key_maps.get_mut(id).unbind(action);
        true
    }

    pub fn database(&self) -> &DeviceDatabase {
        &self.database
    }

    /// Mutable database access. Call [`refresh_schemes`](Self::refresh_schemes)
    /// afterwards for connected pads to pick up the changes.
    pub fn database_mut(&mut self) -> &mut DeviceDatabase {
        &mut self.database
    }

    /// Re-resolve the mapping scheme of every HID pad. Returns how many changed.
    pub fn refresh_schemes(&mut self) -> usize {
        let db = &self.database;
        self.pads
            .values_mut()
            .map(|pad| pad.update_mapping_scheme(db))
            .filter(|changed| *changed)
            .count()
    }

    pub fn bus(&mut self) -> &mut ActionBus {
        &mut self.bus
    }

    /// Publish the activity of `slot`'s pad on the bus.
    pub fn set_notify(&mut self, slot: usize, notify: bool) {
        if let Some(pad) = self.pads.get_mut(&slot) {
            pad.set_notify(notify);
        }
    }

    pub fn disconnect_joy_keys(&self) -> bool {
        self.disconnect_joy_keys
    }

    pub fn set_disconnect_joy_keys(&mut self, on: bool) {
        self.disconnect_joy_keys = on;
    }

    pub fn set_release_mouse_by_shaking(&mut self, on: bool) {
        self.release_mouse_by_shaking = on;
    }

    /// Read-only view of the slot table.
    pub fn snapshot(&self) -> Snapshot {
        let map = self
            .pads
            .iter()
            .map(|(slot, pad)| {
                let device = pad.device();
                let info = SlotInfo {
                    slot: *slot,
                    name: pad.name().to_string(),
                    icon: pad.icon().map(str::to_string),
                    kind: pad.kind(),
                    port: pad.port(),
                    key_map: pad.key_map(),
                    vendor_id: device.map(|d| d.vendor_id.clone()),
                    product_id: device.map(|d| d.product_id.clone()),
                    location_id: device.map(|d| d.location_id.clone()),
                    is_known: device.is_none() || pad.is_known(),
                };
                (*slot, info)
            })
            .collect();
        Snapshot(map)
    }

    /// Log the slot table.
    pub fn list_devices(&self) {
        for info in self.snapshot().iter() {
            info!(
                slot = info.slot,
                name = %info.name,
                port = ?info.port.map(|p| p.number()),
                kind = ?info.kind,
                "input device"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joystick(loc: &str) -> DeviceMeta {
        DeviceMeta::new("1356", "1476", loc)
            .with_transport("USB")
            .with_usage(crate::usage::PAGE_GENERIC_DESKTOP, crate::usage::GD_GAMEPAD)
    }

    #[test]
    fn builtin_layout() {
        let mgr = GamePadManager::new();
        assert_eq!(mgr.name(0), "Mouse");
        assert_eq!(mgr.name(1), "Joystick Keyset 1");
        assert_eq!(mgr.name(2), "Joystick Keyset 2");
        assert_eq!(mgr.name(3), "External device");
        assert!(mgr.pad(0).is_some_and(|p| p.is_mouse()));
        assert_eq!(mgr.find_free_slot(), Some(3));
    }

    #[test]
    fn slots_fill_up_and_free() {
        let mut mgr = GamePadManager::new();
        assert_eq!(mgr.device_arrived(joystick("a")), Some(3));
        assert_eq!(mgr.device_arrived(joystick("b")), Some(4));
        assert_eq!(mgr.device_arrived(joystick("c")), None);
        assert_eq!(mgr.device_removed("a"), vec![3]);
        assert_eq!(mgr.device_arrived(joystick("c")), Some(3));
        assert!(mgr.device_removed("zzz").is_empty());
    }

    #[test]
    fn duplicate_and_internal_arrivals_are_ignored() {
        let mut mgr = GamePadManager::new();
        assert_eq!(mgr.device_arrived(joystick("a")), Some(3));
        assert_eq!(mgr.device_arrived(joystick("a")), None);
        let internal = DeviceMeta::new("1452", "1", "spi").with_transport("SPI");
        assert_eq!(mgr.device_arrived(internal), None);
    }

    #[test]
    fn port_binding_is_exclusive() {
        let mut mgr = GamePadManager::new();
        mgr.bind_port(1, PortId::Port1);
        mgr.bind_port(2, PortId::Port1);
        assert_eq!(mgr.pad(1).and_then(|p| p.port()), None);
        assert_eq!(mgr.pad(2).and_then(|p| p.port()), Some(PortId::Port1));
        assert_eq!(mgr.slot_on(PortId::Port1), Some(2));

        // moving a pad to the other port vacates the first one
        mgr.bind_port(2, PortId::Port2);
        assert_eq!(mgr.slot_on(PortId::Port1), None);
        assert_eq!(mgr.slot_on(PortId::Port2), Some(2));
    }

    #[test]
    fn reserved_port_is_applied_on_arrival() {
        let mut mgr = GamePadManager::new();
        mgr.bind_port(3, PortId::Port2);
        assert_eq!(mgr.slot_on(PortId::Port2), None);
        assert_eq!(mgr.device_arrived(joystick("a")), Some(3));
        assert_eq!(mgr.slot_on(PortId::Port2), Some(3));

        // the binding is dropped with the device but comes back with the next one
        mgr.device_removed("a");
        assert_eq!(mgr.slot_on(PortId::Port2), None);
        mgr.device_arrived(joystick("b"));
        assert_eq!(mgr.slot_on(PortId::Port2), Some(3));
    }

    #[test]
    fn config_ports_and_limit() {
        let cfg = Config {
            slot_limit: 3,
            port1: Some(KEYSET2_SLOT),
            ..Config::default()
        };
        let mut mgr = GamePadManager::with_database(&cfg, DeviceDatabase::new());
        assert_eq!(mgr.slot_on(PortId::Port1), Some(KEYSET2_SLOT));
        assert_eq!(mgr.device_arrived(joystick("a")), None);
    }

    #[test]
    fn bind_key_targets_the_slot_key_map() {
        let mut mgr = GamePadManager::new();
        assert!(mgr.bind_key(2, PhysicalKey::new(0x20), BindableAction::PressFire));
        assert_eq!(
            mgr.key_maps().keyset2.key_for(BindableAction::PressFire),
            Some(PhysicalKey::new(0x20))
        );
        assert!(mgr.unbind_key(2, BindableAction::PressFire));
        assert_eq!(mgr.key_maps().keyset2.key_for(BindableAction::PressFire), None);
        mgr.device_arrived(joystick("a"));
        assert!(!mgr.bind_key(3, PhysicalKey::new(1), BindableAction::PullUp));
    }

    #[test]
    fn snapshot_lists_slots() {
        let mut mgr = GamePadManager::new();
        mgr.device_arrived(DeviceMeta::new("0x054C", "0x05C4", "loc").with_product("Pad"));
        mgr.bind_port(3, PortId::Port1);
        let snap = mgr.snapshot();
        assert_eq!(snap.len(), 4);
        let info = snap.get(3).unwrap();
        assert_eq!(info.name, "Pad");
        assert!(!info.is_known);
        assert_eq!(info.port, Some(PortId::Port1));
        assert_eq!(info.location_id.as_deref(), Some("loc"));
        assert!(snap.get(1).unwrap().is_known);
    }
}
