//! HID device metadata.
//!
//! [`DeviceMeta`] is a lightweight, cloneable description of an attached HID
//! device, filled in by a backend when the device arrives. It carries what the
//! pad layer needs to identify and classify the device; everything else is
//! for display and logging.
//!
//! # Conventions
//! - `vendor_id`/`product_id` are opaque strings exactly as the platform
//!   reports them (decimal for the shipped backends). They key the device database.
//! - `location_id` is unique per attached device and is the identity used to
//!   route reports and removals; treat it as opaque.
//! - `transport` is the platform's transport name (`"USB"`, `"Bluetooth"`,
//!   `"SPI"`, ...), compared case-insensitively.
//!
//! # Example
//! ```
//! use joyport::DeviceMeta;
//!
//! let meta = DeviceMeta::new("1356", "1476", "usb-1-4")
//!     .with_product("Wireless Controller")
//!     .with_transport("Bluetooth");
//! assert!(!meta.is_internal());
//! ```

use crate::usage::{GD_MOUSE, PAGE_GENERIC_DESKTOP};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of metadata describing a single HID device.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMeta {
    pub vendor_id: String,
    pub product_id: String,

    /// Per-attachment identity (OS topology path or location cookie).
    pub location_id: String,

    /// Human-readable product name from the driver/firmware.
    pub product: Option<String>,

    pub manufacturer: Option<String>,

    /// Device serial number supplied by firmware/OS, if present.
    pub serial_number: Option<String>,

    /// Transport name (`"USB"`, `"Bluetooth"`, `"SPI"`, ...).
    pub transport: Option<String>,

    /// Platform "built-in" flag.
    pub built_in: bool,

    /// Primary HID usage page (e.g., `0x01` Generic Desktop).
    pub usage_page: Option<u16>,

    /// Primary HID usage within the page (e.g., `0x04` Joystick, `0x02` Mouse).
    pub usage: Option<u16>,
}

impl DeviceMeta {
    pub fn new(
        vendor_id: impl Into<String>,
        product_id: impl Into<String>,
        location_id: impl Into<String>,
    ) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            product_id: product_id.into(),
            location_id: location_id.into(),
            ..Self::default()
        }
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = Some(transport.into());
        self
    }

    pub fn with_usage(mut self, usage_page: u16, usage: u16) -> Self {
        self.usage_page = Some(usage_page);
        self.usage = Some(usage);
        self
    }

    pub fn built_in(mut self, built_in: bool) -> Self {
        self.built_in = built_in;
        self
    }

    /// Primary usage is Generic Desktop / Mouse.
    pub fn is_mouse(&self) -> bool {
        self.usage_page == Some(PAGE_GENERIC_DESKTOP) && self.usage == Some(GD_MOUSE)
    }

    /// Transport string starts with `prefix`, ignoring ASCII case
    /// ("Bluetooth Low Energy" is Bluetooth).
    fn transport_is(&self, prefix: &str) -> bool {
        self.transport.as_deref().is_some_and(|t| {
            t.as_bytes()
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
        })
    }

    /// Devices that belong to the host machine (keyboard controllers, trackpads, ...).
    ///
    /// SPI devices are always internal. A mouse counts as internal when the
    /// platform flags it built-in or it comes from Apple (Magic Mouse and
    /// trackpads pair over Bluetooth). Other Bluetooth devices are always
    /// external, whatever their built-in flag says.
    pub fn is_internal(&self) -> bool {
        if self.transport_is("SPI") {
            return true;
        }
        if self.is_mouse() {
            let apple = self
                .manufacturer
                .as_deref()
                .is_some_and(|m| m.starts_with("Apple"));
            return self.built_in || apple;
        }
        if self.transport_is("Bluetooth") {
            return false;
        }
        self.built_in
    }
}

impl fmt::Display for DeviceMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}/{}] @ {}",
            self.product.as_deref().unwrap_or("HID device"),
            self.vendor_id,
            self.product_id,
            self.location_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::{GD_GAMEPAD, GD_JOYSTICK};

    #[test]
    fn spi_is_internal() {
        let m = DeviceMeta::new("1452", "1", "spi").with_transport("spi");
        assert!(m.is_internal());
    }

    #[test]
    fn bluetooth_overrides_builtin_flag() {
        let m = DeviceMeta::new("1356", "2508", "bt")
            .with_transport("Bluetooth")
            .with_usage(PAGE_GENERIC_DESKTOP, GD_JOYSTICK)
            .built_in(true);
        assert!(!m.is_internal());
    }

    #[test]
    fn transports_match_by_prefix() {
        let ble = DeviceMeta::new("1118", "2835", "loc-ble")
            .with_transport("Bluetooth Low Energy")
            .with_usage(PAGE_GENERIC_DESKTOP, GD_GAMEPAD)
            .built_in(true);
        assert!(!ble.is_internal());

        let spi = DeviceMeta::new("1452", "834", "spi").with_transport("SPI (Internal)");
        assert!(spi.is_internal());

        // too short to carry the prefix
        let bt = DeviceMeta::new("1", "2", "x").with_transport("Blue").built_in(true);
        assert!(bt.is_internal());
    }

    #[test]
    fn apple_must_lead_the_manufacturer() {
        let mouse = DeviceMeta::new("1133", "1", "usb")
            .with_transport("USB")
            .with_manufacturer("Not Apple")
            .with_usage(PAGE_GENERIC_DESKTOP, GD_MOUSE);
        assert!(!mouse.is_internal());
    }

    #[test]
    fn apple_mice_are_internal() {
        let magic = DeviceMeta::new("76", "617", "bt")
            .with_transport("Bluetooth")
            .with_manufacturer("Apple Inc.")
            .with_usage(PAGE_GENERIC_DESKTOP, GD_MOUSE);
        assert!(magic.is_mouse());
        assert!(magic.is_internal());

        let usb_mouse = DeviceMeta::new("1133", "49271", "usb")
            .with_transport("USB")
            .with_usage(PAGE_GENERIC_DESKTOP, GD_MOUSE);
        assert!(!usb_mouse.is_internal());
    }

    #[test]
    fn builtin_flag_decides_otherwise() {
        let m = DeviceMeta::new("1", "2", "usb").with_transport("USB");
        assert!(!m.is_internal());
        assert!(m.clone().built_in(true).is_internal());
    }
}
