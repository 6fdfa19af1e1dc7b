//! HID platform backends.
//!
//! A backend watches the platform's HID devices and reports arrivals,
//! removals and element value changes as [`HidEvent`]s. The manager drains
//! it with [`GamePadManager::pump`](crate::manager::GamePadManager::pump).
//!
//! # Feature flags
//! - **`hid`**: enables [`hid::HidApiBackend`] (device enumeration through
//!   `hidapi`; on Windows input reports are decoded with the HIDP parser).
//! - **`debug-log`**: per-report `trace!` output from the backends.
//!
//! [`virtual_input::VirtualHid`] is always available and is what tests and
//! demos script devices with.

use crate::error::BackendError;
use crate::event::HidEvent;

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;

pub mod virtual_input;

#[cfg(all(feature = "hid", target_os = "windows"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "hid", target_os = "windows"))))]
pub mod windows;

/// Source of HID device events.
pub trait HidBackend {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Drain pending events. Never blocks.
    fn poll(&mut self) -> Result<Vec<HidEvent>, BackendError>;
}

/// Open the best platform backend compiled into this build.
pub fn open_default() -> Result<Box<dyn HidBackend + Send>, BackendError> {
    #[cfg(feature = "hid")]
    {
        Ok(Box::new(hid::HidApiBackend::new()?))
    }

    #[cfg(not(feature = "hid"))]
    {
        Err(BackendError::Unavailable(
            "built without the `hid` feature".to_string(),
        ))
    }
}
