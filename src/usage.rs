//! HID usage pages and usages consumed by the decoder.
//!
//! Only the handful of values the action mapping cares about are named here;
//! everything else passes through as a plain integer and is ignored.

/// Generic Desktop usage page.
pub const PAGE_GENERIC_DESKTOP: u16 = 0x01;
/// Simulation Controls usage page.
pub const PAGE_SIMULATION: u16 = 0x02;
/// Button usage page (usage 1 = first button).
pub const PAGE_BUTTON: u16 = 0x09;

pub const GD_POINTER: u16 = 0x01;
pub const GD_MOUSE: u16 = 0x02;
pub const GD_JOYSTICK: u16 = 0x04;
pub const GD_GAMEPAD: u16 = 0x05;
pub const GD_KEYBOARD: u16 = 0x06;
pub const GD_MULTI_AXIS: u16 = 0x08;

pub const GD_X: u16 = 0x30;
pub const GD_Y: u16 = 0x31;
pub const GD_Z: u16 = 0x32;
pub const GD_RX: u16 = 0x33;
pub const GD_RY: u16 = 0x34;
pub const GD_RZ: u16 = 0x35;
pub const GD_HATSWITCH: u16 = 0x39;

// Vendor-specific D-pad usages reported by some adapters on the Generic Desktop page.
pub const GD_PAD_UP: u16 = 0x90;
pub const GD_PAD_DOWN: u16 = 0x91;
pub const GD_PAD_RIGHT: u16 = 0x92;
pub const GD_PAD_LEFT: u16 = 0x93;

/// Device classes accepted as game input (Generic Desktop page).
pub const ACCEPTED_DEVICE_USAGES: [u16; 4] = [GD_JOYSTICK, GD_GAMEPAD, GD_MULTI_AXIS, GD_MOUSE];

/// Friendly name for a `(usage_page, usage)` pair, for logs and UIs.
pub fn usage_name(usage_page: u16, usage: u16) -> String {
    match usage_page {
        PAGE_GENERIC_DESKTOP => {
            let s = match usage {
                GD_X => "X",
                GD_Y => "Y",
                GD_Z => "Z",
                GD_RX => "Rx",
                GD_RY => "Ry",
                GD_RZ => "Rz",
                0x36 => "Slider",
                0x37 => "Dial",
                0x38 => "Wheel",
                GD_HATSWITCH => "Hat",
                GD_PAD_UP => "DPadUp",
                GD_PAD_DOWN => "DPadDown",
                GD_PAD_RIGHT => "DPadRight",
                GD_PAD_LEFT => "DPadLeft",
                _ => return format!("GD_{usage:#04x}"),
            };
            s.to_string()
        }
        PAGE_BUTTON => format!("Button{usage}"),
        PAGE_SIMULATION => "Sim".to_string(),
        up if (up & 0xFF00) == 0xFF00 => "Vendor".to_string(),
        _ => format!("UP_{usage_page:04x}_U_{usage:04x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_common_usages() {
        assert_eq!(usage_name(PAGE_GENERIC_DESKTOP, GD_RZ), "Rz");
        assert_eq!(usage_name(PAGE_GENERIC_DESKTOP, 0x40), "GD_0x40");
        assert_eq!(usage_name(PAGE_BUTTON, 3), "Button3");
        assert_eq!(usage_name(0xFF00, 1), "Vendor");
        assert_eq!(usage_name(0x0C, 0xE9), "UP_000c_U_00e9");
    }
}
