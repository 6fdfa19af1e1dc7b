//! Analog axis decisions with hysteresis.
//!
//! A raw HID axis value is normalized from its logical range into `[-1.0, 1.0]`
//! and classified as negative, neutral or positive. The entry thresholds
//! (`±0.45`) are wider than the exit thresholds (`±0.35`); a value between the
//! two produces no decision at all, so a noisy stick resting near a boundary
//! never chatters.
//!
//! `decide_axis` returning `None` means "keep whatever was decided before",
//! never "release".

/// Normalized magnitude beyond which an axis enters a deflected state.
pub const ENTER_THRESHOLD: f64 = 0.45;

/// Normalized magnitude below which an axis falls back to neutral.
pub const EXIT_THRESHOLD: f64 = 0.35;

/// Tri-state result of an axis decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisState {
    Negative,
    Neutral,
    Positive,
}

impl AxisState {
    /// Mirror the state (used by reversed mapping schemes).
    pub fn reversed(self) -> Self {
        match self {
            AxisState::Negative => AxisState::Positive,
            AxisState::Neutral => AxisState::Neutral,
            AxisState::Positive => AxisState::Negative,
        }
    }
}

/// Normalize an integer from `[min..max]` into `[-1.0, 1.0]`.
///
/// A degenerate range (`min == max`) normalizes to `0.0`. Values outside the
/// logical range are not clamped; they simply land beyond `±1.0`.
pub fn normalize(raw: i64, min: i64, max: i64) -> f64 {
    if max == min {
        return 0.0;
    }
    let t = (raw - min) as f64 / (max - min) as f64;
    t * 2.0 - 1.0
}

/// Decide the state of an axis from a raw value and its logical range.
///
/// Returns `None` for normalized values in `[-0.45, -0.35]` or `[0.35, 0.45]`,
/// where no transition is warranted.
pub fn decide_axis(raw: i64, min: i64, max: i64) -> Option<AxisState> {
    decide_normalized(normalize(raw, min, max))
}

/// Same as [`decide_axis`] for an already normalized value.
pub fn decide_normalized(v: f64) -> Option<AxisState> {
    if v < 0.0 {
        if v < -ENTER_THRESHOLD {
            return Some(AxisState::Negative);
        }
        if v > -EXIT_THRESHOLD {
            return Some(AxisState::Neutral);
        }
    } else {
        if v > ENTER_THRESHOLD {
            return Some(AxisState::Positive);
        }
        if v < EXIT_THRESHOLD {
            return Some(AxisState::Neutral);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_logical_range() {
        assert_eq!(normalize(0, 0, 255), -1.0);
        assert_eq!(normalize(255, 0, 255), 1.0);
        assert_eq!(normalize(-32768, -32768, 32767), -1.0);
        assert_eq!(normalize(5, 5, 5), 0.0);
    }

    #[test]
    fn extremes_are_deflected() {
        assert_eq!(decide_axis(0, 0, 1000), Some(AxisState::Negative));
        assert_eq!(decide_axis(1000, 0, 1000), Some(AxisState::Positive));
        assert_eq!(decide_axis(500, 0, 1000), Some(AxisState::Neutral));
    }

    #[test]
    fn thresholds_are_exact() {
        // v = raw / 500 - 1 over [0, 1000]
        assert_eq!(decide_axis(275, 0, 1000), None); // -0.45
        assert_eq!(decide_axis(274, 0, 1000), Some(AxisState::Negative));
        assert_eq!(decide_axis(325, 0, 1000), None); // -0.35
        assert_eq!(decide_axis(326, 0, 1000), Some(AxisState::Neutral));
        assert_eq!(decide_axis(725, 0, 1000), None); // 0.45
        assert_eq!(decide_axis(726, 0, 1000), Some(AxisState::Positive));
        assert_eq!(decide_axis(675, 0, 1000), None); // 0.35
        assert_eq!(decide_axis(674, 0, 1000), Some(AxisState::Neutral));
    }

    #[test]
    fn dead_band_never_decides() {
        for raw in 276..325 {
            assert_eq!(decide_axis(raw, 0, 1000), None, "raw={raw}");
        }
        for raw in 676..725 {
            assert_eq!(decide_axis(raw, 0, 1000), None, "raw={raw}");
        }
    }

    #[test]
    fn reversal_mirrors() {
        assert_eq!(AxisState::Negative.reversed(), AxisState::Positive);
        assert_eq!(AxisState::Neutral.reversed(), AxisState::Neutral);
    }
}
