//! Game pad mapping for an emulated two-port joystick machine.
//!
//! Host input devices (HID game controllers, the host mouse and two keyboard
//! key sets) are kept in numbered slots by a [`GamePadManager`]. Each slot can
//! be bound to one of two emulated control ports, and its raw input is turned
//! into [`GamePadAction`]s that are delivered to the emulated joystick or
//! mouse behind that port.

pub mod action;
pub mod axis;
pub mod backends;
pub mod config;
pub mod database;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod filtered_listener;
pub mod gamepad;
pub mod hid_decoder;
pub mod key;
pub mod key_decoder;
pub mod keymap;
pub mod logger;
pub mod manager;
pub mod metadata;
pub mod port;
pub mod scheme;
pub mod snapshot;
pub mod usage;

pub use action::*;
pub use event::*;
pub use manager::*;
pub use metadata::*;
pub use port::*;

pub use config::Config;
pub use database::DeviceDatabase;
pub use error::{BackendError, ConfigError, DatabaseError};
pub use eventbus::{ActionBus, ActivityFilter, ActivityListener, PadActivity};
pub use gamepad::GamePad;
pub use key::{Modifiers, PhysicalKey};
pub use keymap::{KeyMap, KeyMapId, KeyMaps};
pub use scheme::{HatScheme, LeftStickScheme, MappingScheme, RightStickScheme};
pub use snapshot::Snapshot;
