//! Mapping scheme selectors.
//!
//! HID game pads disagree on which physical usages carry the sticks and the
//! directional pad. A [`MappingScheme`] is the per-device answer, made of three
//! independent selectors resolved from the device database:
//!
//! - [`LeftStickScheme`]: where the primary stick lives.
//! - [`RightStickScheme`]: where the secondary stick lives.
//! - [`HatScheme`]: how the directional pad is encoded.
//!
//! Selectors are stored and exchanged as small integers (index `0` is the
//! default for unknown devices); [`TryFrom<u8>`] rejects anything outside the
//! enumeration so the decoder can match exhaustively.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary stick layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LeftStickScheme {
    /// X on usage X, Y on usage Y.
    #[default]
    A0A1,
    /// X on usage X, Y on usage Y with the vertical axis reversed.
    A0A1r,
    /// X on Rx, Y on Ry.
    A3A4,
}

/// Secondary stick layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RightStickScheme {
    /// Horizontal on Z, vertical on Rz.
    #[default]
    A2A5,
    /// Horizontal on Z, vertical on Rx reversed.
    A2A3,
    /// Secondary stick on Rx/Ry; Z and Rz are ignored.
    A3A4,
    /// Horizontal on Z, vertical on Rz reversed.
    A2A5r,
}

/// Directional pad encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HatScheme {
    /// Hat switch reporting positions 0..7.
    #[default]
    H0H7,
    /// Hat switch reporting positions 1..8.
    H1H8,
    /// Buttons 5..8 are up, right, down, left.
    B4B7,
    /// Buttons 12..15 are up, down, left, right.
    B11B14,
    /// Generic Desktop usages 0x90..0x93 are up, down, right, left.
    U90U93,
}

macro_rules! scheme_ints {
    ($ty:ident, $kind:literal, [$($variant:ident = $n:literal),+ $(,)?]) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub const KIND: &'static str = $kind;

            pub fn index(self) -> u8 {
                match self {
                    $($ty::$variant => $n),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($ty::$variant => stringify!($variant)),+
                }
            }
        }

        impl TryFrom<u8> for $ty {
            type Error = u8;

            fn try_from(raw: u8) -> Result<Self, Self::Error> {
                match raw {
                    $($n => Ok($ty::$variant),)+
                    other => Err(other),
                }
            }
        }

        impl From<$ty> for u8 {
            fn from(scheme: $ty) -> u8 {
                scheme.index()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

scheme_ints!(LeftStickScheme, "left", [A0A1 = 0, A0A1r = 1, A3A4 = 2]);
scheme_ints!(RightStickScheme, "right", [A2A5 = 0, A2A3 = 1, A3A4 = 2, A2A5r = 3]);
scheme_ints!(HatScheme, "hat", [H0H7 = 0, H1H8 = 1, B4B7 = 2, B11B14 = 3, U90U93 = 4]);

/// The three selectors resolved for one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MappingScheme {
    #[serde(default)]
    pub left: LeftStickScheme,
    #[serde(default)]
    pub right: RightStickScheme,
    #[serde(default)]
    pub hat: HatScheme,
}

impl MappingScheme {
    pub fn new(left: LeftStickScheme, right: RightStickScheme, hat: HatScheme) -> Self {
        Self { left, right, hat }
    }

    /// Build from raw selector integers, rejecting out-of-range values.
    pub fn from_raw(left: u8, right: u8, hat: u8) -> Result<Self, (&'static str, u8)> {
        Ok(Self {
            left: LeftStickScheme::try_from(left).map_err(|v| (LeftStickScheme::KIND, v))?,
            right: RightStickScheme::try_from(right).map_err(|v| (RightStickScheme::KIND, v))?,
            hat: HatScheme::try_from(hat).map_err(|v| (HatScheme::KIND, v))?,
        })
    }
}
