//! HID value decoding.
//!
//! [`HidEventDecoder`] turns raw element values into [`GamePadAction`]s
//! according to the device's [`MappingScheme`]:
//!
//! - **Buttons** fire, unless the hat scheme maps some of them to directions.
//! - **Analog axes** (X, Y, Z, Rx, Ry, Rz) go through the hysteresis decision
//!   in [`crate::axis`] and become pull/release events on the horizontal or
//!   vertical axis, depending on the stick schemes.
//! - **Hat switches** map each of the 8 positions to two simultaneous events;
//!   anything else (including the null position) releases both axes.
//!
//! Decoding is edge-triggered per element: a report producing the same events
//! as the previous report of that element is swallowed.

use crate::action::GamePadAction::{self, *};
use crate::axis::{decide_axis, AxisState};
use crate::event::HidValue;
use crate::scheme::{HatScheme, LeftStickScheme, MappingScheme, RightStickScheme};
use crate::usage::*;
use std::collections::HashMap;
use tracing::debug;

#[derive(Clone, Copy)]
enum Direction {
    Horizontal,
    Vertical,
    VerticalReversed,
}

/// Per-device decoder state.
#[derive(Debug, Clone, Default)]
pub struct HidEventDecoder {
    scheme: MappingScheme,
    // (usage_page, usage) -> events emitted by the latest report of that element
    last: HashMap<(u16, u16), Vec<GamePadAction>>,
}

impl HidEventDecoder {
    pub fn new(scheme: MappingScheme) -> Self {
        Self {
            scheme,
            last: HashMap::new(),
        }
    }

    pub fn scheme(&self) -> MappingScheme {
        self.scheme
    }

    /// Switch schemes. Element history is kept; the next differing report wins.
    pub fn set_scheme(&mut self, scheme: MappingScheme) {
        self.scheme = scheme;
    }

    /// Forget element history so the next report of every element is emitted.
    pub fn reset(&mut self) {
        self.last.clear();
    }

    /// Decode a report, suppressing repeats of the previous result for the same element.
    ///
    /// `None` means nothing to emit: the element is unmapped, sits in an axis
    /// dead band, or produced the same events as last time.
    pub fn decode(&mut self, value: &HidValue) -> Option<Vec<GamePadAction>> {
        let events = self.translate(value)?;
        let key = (value.usage_page, value.usage);
        if self.last.get(&key) == Some(&events) {
            return None;
        }
        self.last.insert(key, events.clone());
        Some(events)
    }

    /// Stateless translation of one report.
    pub fn translate(&self, value: &HidValue) -> Option<Vec<GamePadAction>> {
        match value.usage_page {
            PAGE_BUTTON => Some(self.button(value.usage, value.value != 0)),
            PAGE_GENERIC_DESKTOP => self.desktop(value),
            _ => None,
        }
    }

    fn button(&self, usage: u16, pressed: bool) -> Vec<GamePadAction> {
        let pick = |on: GamePadAction, off: GamePadAction| vec![if pressed { on } else { off }];
        match (self.scheme.hat, usage) {
            (HatScheme::B4B7, 5) => pick(PullUp, ReleaseY),
            (HatScheme::B4B7, 6) => pick(PullRight, ReleaseX),
            (HatScheme::B4B7, 7) => pick(PullDown, ReleaseY),
            (HatScheme::B4B7, 8) => pick(PullLeft, ReleaseX),
            (HatScheme::B11B14, 12) => pick(PullUp, ReleaseY),
            (HatScheme::B11B14, 13) => pick(PullDown, ReleaseY),
            (HatScheme::B11B14, 14) => pick(PullLeft, ReleaseX),
            (HatScheme::B11B14, 15) => pick(PullRight, ReleaseX),
            _ => pick(PressFire, ReleaseFire),
        }
    }

    fn desktop(&self, value: &HidValue) -> Option<Vec<GamePadAction>> {
        let MappingScheme { left, right, hat } = self.scheme;
        let pressed = value.value != 0;

        let direction = match value.usage {
            GD_X if matches!(left, LeftStickScheme::A0A1 | LeftStickScheme::A0A1r) => {
                Direction::Horizontal
            }
            GD_Y if left == LeftStickScheme::A0A1 => Direction::Vertical,
            GD_Y if left == LeftStickScheme::A0A1r => Direction::VerticalReversed,
            GD_Z if matches!(
                right,
                RightStickScheme::A2A5 | RightStickScheme::A2A5r | RightStickScheme::A2A3
            ) =>
            {
                Direction::Horizontal
            }
            GD_RX if left == LeftStickScheme::A3A4 => Direction::Horizontal,
            GD_RX if right == RightStickScheme::A2A3 => Direction::VerticalReversed,
            GD_RY if left == LeftStickScheme::A3A4 => Direction::Vertical,
            GD_RZ if right == RightStickScheme::A2A5 => Direction::Vertical,
            GD_RZ if right == RightStickScheme::A2A5r => Direction::VerticalReversed,

            GD_PAD_UP if hat == HatScheme::U90U93 => {
                return Some(vec![if pressed { PullUp } else { ReleaseY }]);
            }
            GD_PAD_DOWN if hat == HatScheme::U90U93 => {
                return Some(vec![if pressed { PullDown } else { ReleaseY }]);
            }
            GD_PAD_RIGHT if hat == HatScheme::U90U93 => {
                return Some(vec![if pressed { PullRight } else { ReleaseX }]);
            }
            GD_PAD_LEFT if hat == HatScheme::U90U93 => {
                return Some(vec![if pressed { PullLeft } else { ReleaseX }]);
            }

            GD_HATSWITCH => return Some(hat_events(hat, value.value)),

            other => {
                debug!(
                    usage = other,
                    name = %usage_name(value.usage_page, other),
                    "unmapped HID usage"
                );
                return None;
            }
        };

        let state = decide_axis(value.value, value.logical_min, value.logical_max)?;
        Some(vec![axis_event(direction, state)])
    }
}

fn axis_event(direction: Direction, state: AxisState) -> GamePadAction {
    match direction {
        Direction::Horizontal => match state {
            AxisState::Negative => PullLeft,
            AxisState::Neutral => ReleaseX,
            AxisState::Positive => PullRight,
        },
        Direction::Vertical => match state {
            AxisState::Negative => PullUp,
            AxisState::Neutral => ReleaseY,
            AxisState::Positive => PullDown,
        },
        Direction::VerticalReversed => axis_event(Direction::Vertical, state.reversed()),
    }
}

/// Events for a hat switch position.
///
/// `H0H7` devices count positions from 0; every other scheme subtracts 1.
pub fn hat_events(scheme: HatScheme, raw: i64) -> Vec<GamePadAction> {
    let shift = if scheme == HatScheme::H0H7 { 0 } else { 1 };
    match raw - shift {
        0 => vec![PullUp, ReleaseX],
        1 => vec![PullUp, PullRight],
        2 => vec![PullRight, ReleaseY],
        3 => vec![PullRight, PullDown],
        4 => vec![PullDown, ReleaseX],
        5 => vec![PullDown, PullLeft],
        6 => vec![PullLeft, ReleaseY],
        7 => vec![PullLeft, PullUp],
        _ => vec![ReleaseXY],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme(left: LeftStickScheme, right: RightStickScheme, hat: HatScheme) -> MappingScheme {
        MappingScheme::new(left, right, hat)
    }

    #[test]
    fn x_at_logical_min_pulls_left() {
        let mut dec = HidEventDecoder::default();
        let v = HidValue::desktop(GD_X, 0, 0, 255);
        assert_eq!(dec.decode(&v), Some(vec![PullLeft]));
    }

    #[test]
    fn repeated_report_is_suppressed() {
        let mut dec = HidEventDecoder::default();
        let v = HidValue::desktop(GD_Y, 255, 0, 255);
        assert_eq!(dec.decode(&v), Some(vec![PullDown]));
        assert_eq!(dec.decode(&v), None);
        // different raw value, same decision
        assert_eq!(dec.decode(&HidValue::desktop(GD_Y, 250, 0, 255)), None);
        assert_eq!(dec.decode(&HidValue::desktop(GD_Y, 128, 0, 255)), Some(vec![ReleaseY]));
    }

    #[test]
    fn dead_band_emits_nothing() {
        let mut dec = HidEventDecoder::default();
        // normalized 0.4 over [0, 1000]
        assert_eq!(dec.decode(&HidValue::desktop(GD_X, 700, 0, 1000)), None);
    }

    #[test]
    fn hysteresis_across_a_sweep() {
        let mut dec = HidEventDecoder::default();
        let sweep = [500, 700, 730, 700, 660, 700, 800, 500];
        let out: Vec<_> = sweep
            .iter()
            .filter_map(|&raw| dec.decode(&HidValue::desktop(GD_X, raw, 0, 1000)))
            .collect();
        assert_eq!(
            out,
            vec![vec![ReleaseX], vec![PullRight], vec![ReleaseX], vec![PullRight], vec![ReleaseX]]
        );
    }

    #[test]
    fn hat_positions_h0h7() {
        let mut dec = HidEventDecoder::default();
        assert_eq!(dec.decode(&HidValue::hat(2)), Some(vec![PullRight, ReleaseY]));
        assert_eq!(dec.decode(&HidValue::hat(7)), Some(vec![PullLeft, PullUp]));
        assert_eq!(dec.decode(&HidValue::hat(8)), Some(vec![ReleaseXY]));
        assert_eq!(dec.decode(&HidValue::hat(8)), None);
        assert_eq!(dec.decode(&HidValue::hat(-1)), None);
    }

    #[test]
    fn hat_positions_are_shifted_for_one_based_schemes() {
        assert_eq!(hat_events(HatScheme::H1H8, 1), vec![PullUp, ReleaseX]);
        assert_eq!(hat_events(HatScheme::H1H8, 0), vec![ReleaseXY]);
        assert_eq!(hat_events(HatScheme::B4B7, 3), vec![PullRight, ReleaseY]);
        assert_eq!(hat_events(HatScheme::H0H7, 1000), vec![ReleaseXY]);
    }

    #[test]
    fn default_buttons_fire() {
        let mut dec = HidEventDecoder::default();
        assert_eq!(dec.decode(&HidValue::button(5, true)), Some(vec![PressFire]));
        assert_eq!(dec.decode(&HidValue::button(5, false)), Some(vec![ReleaseFire]));
        assert_eq!(dec.decode(&HidValue::button(1, true)), Some(vec![PressFire]));
    }

    #[test]
    fn hat_as_buttons() {
        let dec = HidEventDecoder::new(scheme(
            LeftStickScheme::A0A1,
            RightStickScheme::A2A5,
            HatScheme::B4B7,
        ));
        assert_eq!(dec.translate(&HidValue::button(5, true)), Some(vec![PullUp]));
        assert_eq!(dec.translate(&HidValue::button(8, false)), Some(vec![ReleaseX]));
        assert_eq!(dec.translate(&HidValue::button(2, true)), Some(vec![PressFire]));

        let dec = HidEventDecoder::new(scheme(
            LeftStickScheme::A0A1,
            RightStickScheme::A2A5,
            HatScheme::B11B14,
        ));
        assert_eq!(dec.translate(&HidValue::button(13, true)), Some(vec![PullDown]));
        assert_eq!(dec.translate(&HidValue::button(15, true)), Some(vec![PullRight]));
        assert_eq!(dec.translate(&HidValue::button(5, true)), Some(vec![PressFire]));
    }

    #[test]
    fn u90_usages() {
        let dec = HidEventDecoder::new(scheme(
            LeftStickScheme::A0A1,
            RightStickScheme::A2A5,
            HatScheme::U90U93,
        ));
        assert_eq!(dec.translate(&HidValue::desktop(GD_PAD_RIGHT, 1, 0, 1)), Some(vec![PullRight]));
        assert_eq!(dec.translate(&HidValue::desktop(GD_PAD_UP, 0, 0, 1)), Some(vec![ReleaseY]));
        // without the scheme the usages are ignored
        let plain = HidEventDecoder::default();
        assert_eq!(plain.translate(&HidValue::desktop(GD_PAD_UP, 1, 0, 1)), None);
    }

    #[test]
    fn reversed_left_stick_inverts_vertical_only() {
        let dec = HidEventDecoder::new(scheme(
            LeftStickScheme::A0A1r,
            RightStickScheme::A2A5,
            HatScheme::H0H7,
        ));
        assert_eq!(dec.translate(&HidValue::desktop(GD_Y, 0, 0, 255)), Some(vec![PullDown]));
        assert_eq!(dec.translate(&HidValue::desktop(GD_X, 0, 0, 255)), Some(vec![PullLeft]));
    }

    #[test]
    fn rx_follows_the_right_stick_scheme_only() {
        // a reversed left stick does not claim Rx
        let mut dec = HidEventDecoder::new(scheme(
            LeftStickScheme::A0A1r,
            RightStickScheme::A2A5,
            HatScheme::H0H7,
        ));
        assert_eq!(dec.decode(&HidValue::desktop(GD_RX, 0, 0, 255)), None);

        dec.set_scheme(scheme(
            LeftStickScheme::A0A1r,
            RightStickScheme::A2A3,
            HatScheme::H0H7,
        ));
        assert_eq!(dec.decode(&HidValue::desktop(GD_RX, 0, 0, 255)), Some(vec![PullDown]));
    }

    #[test]
    fn right_stick_layouts() {
        let default = HidEventDecoder::default();
        assert_eq!(default.translate(&HidValue::desktop(GD_Z, 255, 0, 255)), Some(vec![PullRight]));
        assert_eq!(default.translate(&HidValue::desktop(GD_RZ, 0, 0, 255)), Some(vec![PullUp]));
        assert_eq!(default.translate(&HidValue::desktop(GD_RX, 0, 0, 255)), None);

        let rev = HidEventDecoder::new(scheme(
            LeftStickScheme::A0A1,
            RightStickScheme::A2A5r,
            HatScheme::H0H7,
        ));
        assert_eq!(rev.translate(&HidValue::desktop(GD_RZ, 0, 0, 255)), Some(vec![PullDown]));

        let a2a3 = HidEventDecoder::new(scheme(
            LeftStickScheme::A0A1,
            RightStickScheme::A2A3,
            HatScheme::H0H7,
        ));
        assert_eq!(a2a3.translate(&HidValue::desktop(GD_RX, 255, 0, 255)), Some(vec![PullUp]));
        assert_eq!(a2a3.translate(&HidValue::desktop(GD_RZ, 255, 0, 255)), None);
    }

    #[test]
    fn left_stick_on_rx_ry() {
        let dec = HidEventDecoder::new(scheme(
            LeftStickScheme::A3A4,
            RightStickScheme::A3A4,
            HatScheme::H0H7,
        ));
        assert_eq!(
            dec.translate(&HidValue::desktop(GD_RX, -32768, -32768, 32767)),
            Some(vec![PullLeft])
        );
        assert_eq!(
            dec.translate(&HidValue::desktop(GD_RY, 32767, -32768, 32767)),
            Some(vec![PullDown])
        );
        assert_eq!(dec.translate(&HidValue::desktop(GD_X, 0, -32768, 32767)), None);
        assert_eq!(dec.translate(&HidValue::desktop(GD_Z, 0, -32768, 32767)), None);
    }

    #[test]
    fn other_pages_are_ignored() {
        let dec = HidEventDecoder::default();
        assert_eq!(dec.translate(&HidValue::new(0x0C, 0xE9, 1, 0, 1)), None);
    }

    #[test]
    fn reset_forgets_history() {
        let mut dec = HidEventDecoder::default();
        let v = HidValue::button(1, true);
        assert!(dec.decode(&v).is_some());
        dec.reset();
        assert!(dec.decode(&v).is_some());
    }
}
