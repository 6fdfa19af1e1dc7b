//! A single input source.
//!
//! A [`GamePad`] is either keyboard driven (it reads one of the key binding
//! tables), a mouse, or a HID device. It owns the decoder state of its source
//! and forwards decoded actions to whichever control port it is bound to.
//! Unbound pads still decode, so held keys and element history stay accurate
//! across a rebind, but nothing reaches the emulator.

use crate::action::GamePadAction;
use crate::database::DeviceDatabase;
use crate::event::HidValue;
use crate::hid_decoder::HidEventDecoder;
use crate::key::PhysicalKey;
use crate::key_decoder::KeyEventDecoder;
use crate::keymap::{KeyMapId, KeyMaps};
use crate::metadata::DeviceMeta;
use crate::port::{ControlPorts, PadKind, PortId};
use crate::scheme::MappingScheme;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct GamePad {
    kind: PadKind,
    port: Option<PortId>,
    name: Option<String>,
    icon: Option<String>,
    key_map: Option<KeyMapId>,
    device: Option<DeviceMeta>,
    is_known: bool,
    notify: bool,
    hid: HidEventDecoder,
    keys: KeyEventDecoder,
}

impl GamePad {
    fn bare(kind: PadKind) -> Self {
        Self {
            kind,
            port: None,
            name: None,
            icon: None,
            key_map: None,
            device: None,
            is_known: false,
            notify: false,
            hid: HidEventDecoder::default(),
            keys: KeyEventDecoder::new(),
        }
    }

    /// Joystick emulated by the keys of `key_map`.
    pub fn keyboard(name: impl Into<String>, key_map: KeyMapId) -> Self {
        Self {
            name: Some(name.into()),
            key_map: Some(key_map),
            ..Self::bare(PadKind::Joystick)
        }
    }

    /// Host mouse; buttons may additionally be emulated by the keys of `key_map`.
    pub fn mouse(name: impl Into<String>, key_map: Option<KeyMapId>) -> Self {
        Self {
            name: Some(name.into()),
            key_map,
            ..Self::bare(PadKind::Mouse)
        }
    }

    /// Pad for an attached HID device. Mouse-class devices become mouse pads.
    pub fn hid(meta: DeviceMeta, db: &DeviceDatabase) -> Self {
        let kind = if meta.is_mouse() {
            PadKind::Mouse
        } else {
            PadKind::Joystick
        };
        let mut pad = Self {
            device: Some(meta),
            ..Self::bare(kind)
        };
        pad.update_mapping_scheme(db);
        pad
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn kind(&self) -> PadKind {
        self.kind
    }

    pub fn is_mouse(&self) -> bool {
        self.kind == PadKind::Mouse
    }

    pub fn port(&self) -> Option<PortId> {
        self.port
    }

    pub(crate) fn set_port(&mut self, port: Option<PortId>) {
        self.port = port;
    }

    /// Display name: database name, then product string, then a generic label.
    pub fn name(&self) -> &str {
        self.name
            .as_deref()
            .or_else(|| self.device.as_ref().and_then(|d| d.product.as_deref()))
            .unwrap_or("External device")
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn key_map(&self) -> Option<KeyMapId> {
        self.key_map
    }

    pub fn device(&self) -> Option<&DeviceMeta> {
        self.device.as_ref()
    }

    pub fn location_id(&self) -> Option<&str> {
        self.device.as_ref().map(|d| d.location_id.as_str())
    }

    /// Whether the device database lists this model as supported.
    pub fn is_known(&self) -> bool {
        self.is_known
    }

    pub fn scheme(&self) -> MappingScheme {
        self.hid.scheme()
    }

    pub fn notify(&self) -> bool {
        self.notify
    }

    pub fn set_notify(&mut self, notify: bool) {
        self.notify = notify;
    }

    /// Re-resolve scheme and display data from the database.
    ///
    /// Returns `true` when the scheme changed. Keyboard and built-in mouse
    /// pads have no database entry and are left alone.
    pub fn update_mapping_scheme(&mut self, db: &DeviceDatabase) -> bool {
        let Some(meta) = &self.device else {
            return false;
        };
        let found = db.lookup(&meta.vendor_id, &meta.product_id);
        let changed = found.scheme != self.hid.scheme();
        if changed {
            debug!(device = %meta, scheme = ?found.scheme, "mapping scheme updated");
        }
        self.hid.set_scheme(found.scheme);
        self.name = found.name;
        self.icon = found.icon;
        self.is_known = found.is_known;
        changed
    }

    /// Decode one HID element change and dispatch the result.
    ///
    /// Returns the dispatched actions; empty when the report produced nothing.
    pub fn process_hid(
        &mut self,
        value: &HidValue,
        ports: &mut dyn ControlPorts,
    ) -> Vec<GamePadAction> {
        if self.kind == PadKind::Mouse {
            return Vec::new();
        }
        match self.hid.decode(value) {
            Some(actions) => {
                self.process_joystick_events(&actions, ports);
                actions
            }
            None => Vec::new(),
        }
    }

    /// Returns `false` when this pad has no binding for `key`.
    pub fn process_key_down(
        &mut self,
        key_maps: &KeyMaps,
        key: &PhysicalKey,
        ports: &mut dyn ControlPorts,
    ) -> bool {
        let Some(id) = self.key_map else {
            return false;
        };
        let actions = self.keys.key_down(key_maps.get(id), key);
        if actions.is_empty() {
            return false;
        }
        debug!(key = %key, ?actions, "key down");
        self.dispatch(&actions, ports);
        true
    }

    /// Returns `false` when this pad has no binding for `key`.
    pub fn process_key_up(
        &mut self,
        key_maps: &KeyMaps,
        key: &PhysicalKey,
        ports: &mut dyn ControlPorts,
    ) -> bool {
        let Some(id) = self.key_map else {
            return false;
        };
        let actions = self.keys.key_up(key_maps.get(id), key);
        if actions.is_empty() {
            return false;
        }
        debug!(key = %key, ?actions, "key up");
        self.dispatch(&actions, ports);
        true
    }

    /// Send actions to the joystick on the bound port.
    pub fn process_joystick_events(
        &mut self,
        actions: &[GamePadAction],
        ports: &mut dyn ControlPorts,
    ) -> bool {
        if let Some(port) = self.port {
            let joystick = ports.joystick(port);
            for &action in actions {
                joystick.trigger(action);
            }
        }
        !actions.is_empty()
    }

    /// Send button actions to the mouse on the bound port.
    pub fn process_mouse_events(
        &mut self,
        actions: &[GamePadAction],
        ports: &mut dyn ControlPorts,
    ) -> bool {
        if let Some(port) = self.port {
            let mouse = ports.mouse(port);
            for &action in actions {
                mouse.trigger(action);
            }
        }
        !actions.is_empty()
    }

    /// Forward a relative pointer movement.
    ///
    /// When `detect_shake` is set the movement is also fed to the shake
    /// detector of the mouse on port 1, whichever port this pad is bound to.
    /// Returns whether a shake was recognized.
    pub fn process_mouse_delta(
        &mut self,
        dx: f64,
        dy: f64,
        detect_shake: bool,
        ports: &mut dyn ControlPorts,
    ) -> bool {
        let shaken = detect_shake && ports.mouse(PortId::Port1).detect_shake(dx, dy);
        if shaken {
            info!("mouse shake detected");
        }
        if let Some(port) = self.port {
            ports.mouse(port).set_delta(dx, dy);
        }
        shaken
    }

    /// Forget held keys and element history.
    pub fn reset(&mut self) {
        self.keys.reset();
        self.hid.reset();
    }

    fn dispatch(&mut self, actions: &[GamePadAction], ports: &mut dyn ControlPorts) {
        match self.kind {
            PadKind::Joystick => self.process_joystick_events(actions, ports),
            PadKind::Mouse => self.process_mouse_events(actions, ports),
        };
    }
}
