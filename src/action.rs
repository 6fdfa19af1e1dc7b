//! Action vocabulary.
//!
//! Every input source (HID pad, keyboard-emulated pad, mouse) is reduced to a
//! small, closed set of [`GamePadAction`]s before it reaches an emulated
//! control port. Key bindings are restricted to [`BindableAction`], the
//! subset a physical key can be bound to; release actions are only ever
//! produced by the decoders.
//!
//! ## Raw values
//! Binding tables are persisted with the raw integer of the bound action.
//! The numbering follows the emulator's port interface:
//!
//! | raw | action |
//! |----:|--------|
//! | 0 | `PullUp` |
//! | 1 | `PullDown` |
//! | 2 | `PullLeft` |
//! | 3 | `PullRight` |
//! | 4 | `PressFire` |
//! | 5 | `PressLeft` |
//! | 6 | `PressRight` |
//! | 7 | `ReleaseX` |
//! | 8 | `ReleaseY` |
//! | 9 | `ReleaseXY` |
//! | 10 | `ReleaseFire` |
//! | 11 | `ReleaseLeft` |
//! | 12 | `ReleaseRight` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical input action understood by emulated joysticks and mice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePadAction {
    PullUp,
    PullDown,
    PullLeft,
    PullRight,
    PressFire,
    PressLeft,
    PressRight,
    ReleaseX,
    ReleaseY,
    #[serde(rename = "RELEASE_XY")]
    ReleaseXY,
    ReleaseFire,
    ReleaseLeft,
    ReleaseRight,
}

/// Axis affected by a directional action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl GamePadAction {
    pub const ALL: [GamePadAction; 13] = [
        GamePadAction::PullUp,
        GamePadAction::PullDown,
        GamePadAction::PullLeft,
        GamePadAction::PullRight,
        GamePadAction::PressFire,
        GamePadAction::PressLeft,
        GamePadAction::PressRight,
        GamePadAction::ReleaseX,
        GamePadAction::ReleaseY,
        GamePadAction::ReleaseXY,
        GamePadAction::ReleaseFire,
        GamePadAction::ReleaseLeft,
        GamePadAction::ReleaseRight,
    ];

    /// Raw integer used by persisted binding tables.
    pub fn raw(self) -> u8 {
        match self {
            GamePadAction::PullUp => 0,
            GamePadAction::PullDown => 1,
            GamePadAction::PullLeft => 2,
            GamePadAction::PullRight => 3,
            GamePadAction::PressFire => 4,
            GamePadAction::PressLeft => 5,
            GamePadAction::PressRight => 6,
            GamePadAction::ReleaseX => 7,
            GamePadAction::ReleaseY => 8,
            GamePadAction::ReleaseXY => 9,
            GamePadAction::ReleaseFire => 10,
            GamePadAction::ReleaseLeft => 11,
            GamePadAction::ReleaseRight => 12,
        }
    }

    /// Axis a pull action deflects, `None` for everything else.
    pub fn pull_axis(self) -> Option<Axis> {
        match self {
            GamePadAction::PullUp | GamePadAction::PullDown => Some(Axis::Y),
            GamePadAction::PullLeft | GamePadAction::PullRight => Some(Axis::X),
            _ => None,
        }
    }

    pub fn is_release(self) -> bool {
        matches!(
            self,
            GamePadAction::ReleaseX
                | GamePadAction::ReleaseY
                | GamePadAction::ReleaseXY
                | GamePadAction::ReleaseFire
                | GamePadAction::ReleaseLeft
                | GamePadAction::ReleaseRight
        )
    }

    /// Upper-case name as used by the emulator and in config files.
    pub fn name(self) -> &'static str {
        match self {
            GamePadAction::PullUp => "PULL_UP",
            GamePadAction::PullDown => "PULL_DOWN",
            GamePadAction::PullLeft => "PULL_LEFT",
            GamePadAction::PullRight => "PULL_RIGHT",
            GamePadAction::PressFire => "PRESS_FIRE",
            GamePadAction::PressLeft => "PRESS_LEFT",
            GamePadAction::PressRight => "PRESS_RIGHT",
            GamePadAction::ReleaseX => "RELEASE_X",
            GamePadAction::ReleaseY => "RELEASE_Y",
            GamePadAction::ReleaseXY => "RELEASE_XY",
            GamePadAction::ReleaseFire => "RELEASE_FIRE",
            GamePadAction::ReleaseLeft => "RELEASE_LEFT",
            GamePadAction::ReleaseRight => "RELEASE_RIGHT",
        }
    }
}

impl TryFrom<u8> for GamePadAction {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        GamePadAction::ALL
            .iter()
            .copied()
            .find(|a| a.raw() == raw)
            .ok_or(raw)
    }
}

impl fmt::Display for GamePadAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Actions a physical key can be bound to.
///
/// Pull directions are latched by the key decoder (held state); fire and the
/// mouse buttons are plain edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BindableAction {
    PullUp,
    PullDown,
    PullLeft,
    PullRight,
    PressFire,
    PressLeft,
    PressRight,
}

impl BindableAction {
    pub const ALL: [BindableAction; 7] = [
        BindableAction::PullUp,
        BindableAction::PullDown,
        BindableAction::PullLeft,
        BindableAction::PullRight,
        BindableAction::PressFire,
        BindableAction::PressLeft,
        BindableAction::PressRight,
    ];

    /// Action emitted when the bound key goes down.
    pub fn press(self) -> GamePadAction {
        match self {
            BindableAction::PullUp => GamePadAction::PullUp,
            BindableAction::PullDown => GamePadAction::PullDown,
            BindableAction::PullLeft => GamePadAction::PullLeft,
            BindableAction::PullRight => GamePadAction::PullRight,
            BindableAction::PressFire => GamePadAction::PressFire,
            BindableAction::PressLeft => GamePadAction::PressLeft,
            BindableAction::PressRight => GamePadAction::PressRight,
        }
    }

    pub fn raw(self) -> u8 {
        self.press().raw()
    }
}

impl TryFrom<GamePadAction> for BindableAction {
    type Error = GamePadAction;

    fn try_from(action: GamePadAction) -> Result<Self, Self::Error> {
        match action {
            GamePadAction::PullUp => Ok(BindableAction::PullUp),
            GamePadAction::PullDown => Ok(BindableAction::PullDown),
            GamePadAction::PullLeft => Ok(BindableAction::PullLeft),
            GamePadAction::PullRight => Ok(BindableAction::PullRight),
            GamePadAction::PressFire => Ok(BindableAction::PressFire),
            GamePadAction::PressLeft => Ok(BindableAction::PressLeft),
            GamePadAction::PressRight => Ok(BindableAction::PressRight),
            other => Err(other),
        }
    }
}

impl TryFrom<u8> for BindableAction {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        let action = GamePadAction::try_from(raw)?;
        BindableAction::try_from(action).map_err(|_| raw)
    }
}

impl fmt::Display for BindableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.press().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_are_unique_and_invertible() {
        for action in GamePadAction::ALL {
            assert_eq!(GamePadAction::try_from(action.raw()), Ok(action));
        }
        assert_eq!(GamePadAction::try_from(13), Err(13));
    }

    #[test]
    fn release_actions_are_not_bindable() {
        assert_eq!(
            BindableAction::try_from(GamePadAction::ReleaseX),
            Err(GamePadAction::ReleaseX)
        );
        assert_eq!(BindableAction::try_from(9u8), Err(9));
        assert_eq!(BindableAction::try_from(4u8), Ok(BindableAction::PressFire));
    }

    #[test]
    fn pull_axis_classification() {
        assert_eq!(GamePadAction::PullUp.pull_axis(), Some(Axis::Y));
        assert_eq!(GamePadAction::PullRight.pull_axis(), Some(Axis::X));
        assert_eq!(GamePadAction::PressFire.pull_axis(), None);
        assert!(GamePadAction::ReleaseXY.is_release());
        assert!(!GamePadAction::PressLeft.is_release());
    }

    #[test]
    fn names_match_serde() {
        let json = serde_json::to_string(&GamePadAction::ReleaseXY).unwrap();
        assert_eq!(json, "\"RELEASE_XY\"");
        let json = serde_json::to_string(&BindableAction::PullLeft).unwrap();
        assert_eq!(json, "\"PULL_LEFT\"");
    }
}
