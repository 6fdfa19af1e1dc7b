//! Emulated control ports.
//!
//! The emulator exposes two control ports, each able to host a joystick or a
//! mouse. Pads talk to them only through these traits; the emulator side is
//! supplied by the host application.

use crate::action::GamePadAction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two emulated control ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PortId {
    Port1,
    Port2,
}

impl PortId {
    pub const ALL: [PortId; 2] = [PortId::Port1, PortId::Port2];

    /// Port number as printed on the case (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            PortId::Port1 => 1,
            PortId::Port2 => 2,
        }
    }
}

impl TryFrom<u8> for PortId {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(PortId::Port1),
            2 => Ok(PortId::Port2),
            other => Err(format!("no control port {other}")),
        }
    }
}

impl From<PortId> for u8 {
    fn from(port: PortId) -> u8 {
        port.number()
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port {}", self.number())
    }
}

/// What a pad emulates on its port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadKind {
    Mouse,
    Joystick,
}

/// Joystick plugged into a control port.
pub trait Joystick {
    fn trigger(&mut self, action: GamePadAction);
}

/// Mouse plugged into a control port.
pub trait Mouse {
    fn trigger(&mut self, action: GamePadAction);

    /// Relative pointer movement.
    fn set_delta(&mut self, dx: f64, dy: f64);

    /// Feed the shake detector. Returns `true` when a shake was recognized.
    fn detect_shake(&mut self, dx: f64, dy: f64) -> bool;
}

/// Access to the emulator's control ports.
pub trait ControlPorts {
    fn joystick(&mut self, port: PortId) -> &mut dyn Joystick;
    fn mouse(&mut self, port: PortId) -> &mut dyn Mouse;
}
