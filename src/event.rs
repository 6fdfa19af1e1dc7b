//! HID platform events.
//!
//! The HID layer hands us three kinds of events: a device arrived, a device
//! went away, or an input element of a device changed. Element changes are
//! carried as raw integers together with the element's logical range, exactly
//! as the platform describes them; normalization happens in [`crate::axis`].
//!
//! Devices are identified by their `location_id`, an opaque string that is
//! unique per attached device (USB topology path, IOKit location, ...).

use crate::metadata::DeviceMeta;

/// One input element value as reported by the HID layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HidValue {
    /// HID usage page (e.g. `0x01` Generic Desktop, `0x09` Button).
    pub usage_page: u16,
    /// HID usage within the page.
    pub usage: u16,
    /// Raw integer value.
    pub value: i64,
    /// Descriptor-provided logical minimum of the element.
    pub logical_min: i64,
    /// Descriptor-provided logical maximum of the element.
    pub logical_max: i64,
}

impl HidValue {
    pub fn new(
        usage_page: u16,
        usage: u16,
        value: i64,
        logical_min: i64,
        logical_max: i64,
    ) -> Self {
        Self {
            usage_page,
            usage,
            value,
            logical_min,
            logical_max,
        }
    }

    /// Button element (logical range `0..1`).
    pub fn button(usage: u16, pressed: bool) -> Self {
        Self::new(crate::usage::PAGE_BUTTON, usage, pressed as i64, 0, 1)
    }

    /// Generic Desktop element with an explicit logical range.
    pub fn desktop(usage: u16, value: i64, logical_min: i64, logical_max: i64) -> Self {
        Self::new(crate::usage::PAGE_GENERIC_DESKTOP, usage, value, logical_min, logical_max)
    }

    /// Hat switch element reporting 8 positions plus a null state.
    pub fn hat(position: i64) -> Self {
        Self::desktop(crate::usage::GD_HATSWITCH, position, 0, 7)
    }
}

/// Event produced by a HID backend.
#[derive(Clone, Debug)]
pub enum HidEvent {
    /// A matching device was attached.
    Arrived(DeviceMeta),

    /// A device was detached.
    Removed { location_id: String },

    /// An input element of an attached device changed.
    Value { location_id: String, value: HidValue },
}

impl HidEvent {
    /// Location of the device this event belongs to.
    pub fn location_id(&self) -> &str {
        match self {
            HidEvent::Arrived(meta) => &meta.location_id,
            HidEvent::Removed { location_id } | HidEvent::Value { location_id, .. } => location_id,
        }
    }
}
