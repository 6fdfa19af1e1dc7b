use crate::backends::HidBackend;
use crate::error::BackendError;
use crate::event::{HidEvent, HidValue};
use crate::metadata::DeviceMeta;

/// Scripted HID backend.
///
/// Events are queued by the caller and handed out by the next `poll()`, in
/// order. Values may be queued for locations that are not plugged in; the
/// manager drops those like any stale report.
#[derive(Debug, Default)]
pub struct VirtualHid {
    name: String,
    events: Vec<HidEvent>,
}

impl VirtualHid {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            events: Vec::new(),
        }
    }

    /// Inject a raw event.
    pub fn feed(&mut self, event: HidEvent) {
        self.events.push(event);
    }

    pub fn plug(&mut self, meta: DeviceMeta) {
        self.feed(HidEvent::Arrived(meta));
    }

    pub fn unplug(&mut self, location_id: &str) {
        self.feed(HidEvent::Removed {
            location_id: location_id.to_string(),
        });
    }

    pub fn value(&mut self, location_id: &str, value: HidValue) {
        self.feed(HidEvent::Value {
            location_id: location_id.to_string(),
            value,
        });
    }

    pub fn press_button(&mut self, location_id: &str, button: u16) {
        self.value(location_id, HidValue::button(button, true));
    }

    pub fn release_button(&mut self, location_id: &str, button: u16) {
        self.value(location_id, HidValue::button(button, false));
    }

    /// Generic Desktop axis with an 8-bit `0..=255` range.
    pub fn set_axis(&mut self, location_id: &str, usage: u16, value: i64) {
        self.value(location_id, HidValue::desktop(usage, value, 0, 255));
    }

    pub fn set_hat(&mut self, location_id: &str, position: i64) {
        self.value(location_id, HidValue::hat(position));
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }
}

impl HidBackend for VirtualHid {
    fn name(&self) -> &str {
        &self.name
    }

    fn poll(&mut self) -> Result<Vec<HidEvent>, BackendError> {
        Ok(std::mem::take(&mut self.events))
    }
}
