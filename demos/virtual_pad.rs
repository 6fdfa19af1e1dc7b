use joyport::backends::virtual_input::VirtualHid;
use joyport::logger::Logger;
use joyport::usage::{GD_GAMEPAD, GD_X, PAGE_GENERIC_DESKTOP};
use joyport::{
    ActivityFilter, ControlPorts, DeviceMeta, GamePadAction, GamePadManager, Joystick, Mouse,
    PortId,
};

/// Prints whatever reaches the emulated ports.
struct Console;

impl Joystick for Console {
    fn trigger(&mut self, action: GamePadAction) {
        println!("joystick <- {action:?}");
    }
}

impl Mouse for Console {
    fn trigger(&mut self, action: GamePadAction) {
        println!("mouse <- {action:?}");
    }

    fn set_delta(&mut self, dx: f64, dy: f64) {
        println!("mouse moved ({dx}, {dy})");
    }

    fn detect_shake(&mut self, _dx: f64, _dy: f64) -> bool {
        false
    }
}

impl ControlPorts for Console {
    fn joystick(&mut self, _port: PortId) -> &mut dyn Joystick {
        self
    }

    fn mouse(&mut self, _port: PortId) -> &mut dyn Mouse {
        self
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut manager = GamePadManager::new();
    let mut hid = VirtualHid::new("virtual");
    let mut ports = Console;

    // Speedlink Competition Pro
    let pad = DeviceMeta::new("1035", "25907", "virtual:0")
        .with_product("Competition Pro USB")
        .with_transport("USB")
        .with_usage(PAGE_GENERIC_DESKTOP, GD_GAMEPAD);
    hid.plug(pad);
    manager.pump(&mut hid, &mut ports)?;

    manager.bind_port(3, PortId::Port2);
    manager
        .bus()
        .add_listener(Logger::new(), ActivityFilter::All, Some(3));
    manager.set_notify(3, true);
    manager.list_devices();

    hid.set_axis("virtual:0", GD_X, 255);
    hid.set_axis("virtual:0", GD_X, 128);
    hid.press_button("virtual:0", 1);
    hid.release_button("virtual:0", 1);
    hid.set_hat("virtual:0", 2);
    hid.set_hat("virtual:0", 8);
    hid.unplug("virtual:0");
    manager.pump(&mut hid, &mut ports)?;

    println!("{}", serde_json::to_string_pretty(&manager.snapshot())?);
    Ok(())
}
