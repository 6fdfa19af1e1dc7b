//! Keyboard-emulated joystick decoding.
//!
//! Keys bound to pull directions are latched: the decoder remembers which
//! direction keys are down, so that letting go of one direction while the
//! opposite key is still held re-asserts the opposite pull instead of
//! centering the stick. Fire and the mouse buttons are plain edges.

use crate::action::{BindableAction, GamePadAction};
use crate::key::PhysicalKey;
use crate::keymap::KeyMap;

/// Direction keys currently held down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, Default)]
pub struct KeyEventDecoder {
    held: HeldKeys,
}

impl KeyEventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> HeldKeys {
        self.held
    }

    /// Forget all held keys (e.g. when the window loses focus).
    pub fn reset(&mut self) {
        self.held = HeldKeys::default();
    }

    /// Events for a key going down. Empty when the key is not bound.
    pub fn key_down(&mut self, map: &KeyMap, key: &PhysicalKey) -> Vec<GamePadAction> {
        match map.lookup(key) {
            Some(action) => vec![self.press(action)],
            None => Vec::new(),
        }
    }

    /// Events for a key going up. Empty when the key is not bound.
    pub fn key_up(&mut self, map: &KeyMap, key: &PhysicalKey) -> Vec<GamePadAction> {
        match map.lookup(key) {
            Some(action) => vec![self.release(action)],
            None => Vec::new(),
        }
    }

    pub fn press(&mut self, action: BindableAction) -> GamePadAction {
        match action {
            BindableAction::PullUp => self.held.up = true,
            BindableAction::PullDown => self.held.down = true,
            BindableAction::PullLeft => self.held.left = true,
            BindableAction::PullRight => self.held.right = true,
            BindableAction::PressFire | BindableAction::PressLeft | BindableAction::PressRight => {}
        }
        action.press()
    }

    pub fn release(&mut self, action: BindableAction) -> GamePadAction {
        use GamePadAction::*;

        let held = &mut self.held;
        match action {
            BindableAction::PullUp => {
                held.up = false;
                if held.down { PullDown } else { ReleaseY }
            }
            BindableAction::PullDown => {
                held.down = false;
                if held.up { PullUp } else { ReleaseY }
            }
            BindableAction::PullLeft => {
                held.left = false;
                if held.right { PullRight } else { ReleaseX }
            }
            BindableAction::PullRight => {
                held.right = false;
                if held.left { PullLeft } else { ReleaseX }
            }
            BindableAction::PressFire => ReleaseFire,
            BindableAction::PressLeft => ReleaseLeft,
            BindableAction::PressRight => ReleaseRight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GamePadAction::*;

    const LEFT: PhysicalKey = PhysicalKey::new(0x7B);
    const RIGHT: PhysicalKey = PhysicalKey::new(0x7C);
    const UP: PhysicalKey = PhysicalKey::new(0x7E);
    const DOWN: PhysicalKey = PhysicalKey::new(0x7D);
    const SPACE: PhysicalKey = PhysicalKey::new(0x31);

    #[test]
    fn releasing_one_direction_reasserts_the_other() {
        let map = KeyMap::default_keyset1();
        let mut dec = KeyEventDecoder::new();
        assert_eq!(dec.key_down(&map, &LEFT), vec![PullLeft]);
        assert_eq!(dec.key_down(&map, &RIGHT), vec![PullRight]);
        assert_eq!(dec.key_up(&map, &LEFT), vec![PullRight]);
        assert_eq!(dec.key_up(&map, &RIGHT), vec![ReleaseX]);
        assert_eq!(dec.held(), HeldKeys::default());
    }

    #[test]
    fn vertical_axis_is_latched_independently() {
        let map = KeyMap::default_keyset1();
        let mut dec = KeyEventDecoder::new();
        dec.key_down(&map, &UP);
        dec.key_down(&map, &LEFT);
        dec.key_down(&map, &DOWN);
        assert_eq!(dec.key_up(&map, &DOWN), vec![PullUp]);
        assert_eq!(dec.key_up(&map, &UP), vec![ReleaseY]);
        assert!(dec.held().left);
    }

    #[test]
    fn fire_is_an_edge() {
        let map = KeyMap::default_keyset1();
        let mut dec = KeyEventDecoder::new();
        assert_eq!(dec.key_down(&map, &SPACE), vec![PressFire]);
        assert_eq!(dec.held(), HeldKeys::default());
        assert_eq!(dec.key_up(&map, &SPACE), vec![ReleaseFire]);
    }

    #[test]
    fn mouse_buttons() {
        let mut map = KeyMap::new();
        map.bind(PhysicalKey::new(1), BindableAction::PressLeft);
        map.bind(PhysicalKey::new(2), BindableAction::PressRight);
        let mut dec = KeyEventDecoder::new();
        assert_eq!(dec.key_down(&map, &PhysicalKey::new(2)), vec![PressRight]);
        assert_eq!(dec.key_up(&map, &PhysicalKey::new(1)), vec![ReleaseLeft]);
    }

    #[test]
    fn unbound_keys_are_not_handled() {
        let map = KeyMap::default_keyset1();
        let mut dec = KeyEventDecoder::new();
        assert!(dec.key_down(&map, &PhysicalKey::new(0x00)).is_empty());
        assert!(dec.key_up(&map, &PhysicalKey::new(0x00)).is_empty());
        assert!(dec.key_down(&KeyMap::new(), &LEFT).is_empty());
    }
}
