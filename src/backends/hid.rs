//! `hidapi` backend.
//!
//! Every `poll()` re-enumerates the platform's HID devices and diffs the list
//! against the previous one to produce arrivals and removals. Only game
//! controllers and mice are considered (Generic Desktop joystick, gamepad,
//! multi-axis and mouse collections); `location_id` is the OS device path.
//!
//! Input reports are read in non-blocking mode and turned into raw
//! [`HidValue`]s by a platform [`ReportDecoder`]. Windows uses the HIDP
//! descriptor parser; elsewhere no decoder is available yet and devices only
//! report arrival and removal.

use crate::backends::HidBackend;
use crate::error::BackendError;
use crate::event::{HidEvent, HidValue};
use crate::metadata::DeviceMeta;
use crate::usage::{ACCEPTED_DEVICE_USAGES, PAGE_GENERIC_DESKTOP};
use hidapi::{BusType, DeviceInfo, HidApi, HidDevice};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Safety valve: maximum number of HID reports drained per device and `poll()`.
///
/// Prevents a single device from starving the rest of the system if it is
/// producing data faster than the host is polling.
const MAX_REPORTS_PER_TICK: usize = 32;

/// Turns raw input reports into element values.
pub trait ReportDecoder: Send {
    /// Size of the read buffer, report ID byte included.
    fn input_report_len(&self) -> usize;

    /// Whether the first byte of each read is a report ID.
    fn expects_report_id_prefix(&self) -> bool {
        true
    }

    /// Decode one report body, appending the elements that changed.
    fn decode(&mut self, report_id: u8, payload: &[u8], out: &mut Vec<HidValue>);
}

/// Open device plus its decoder.
struct Reader {
    device: HidDevice,
    buf: Vec<u8>,
    decoder: Box<dyn ReportDecoder>,
}

impl Reader {
    fn open(
        info: &DeviceInfo,
        api: &HidApi,
        decoder: Box<dyn ReportDecoder>,
    ) -> Result<Self, BackendError> {
        let device = info.open_device(api)?;
        // Polled from the host loop; reads must never block.
        device.set_blocking_mode(false)?;
        let buf = vec![0u8; decoder.input_report_len().max(1)];
        Ok(Self {
            device,
            buf,
            decoder,
        })
    }

    fn drain(&mut self, out: &mut Vec<HidValue>) -> Result<(), BackendError> {
        for _ in 0..MAX_REPORTS_PER_TICK {
            let n = self.device.read(&mut self.buf)?;
            if n == 0 {
                break;
            }
            let data = &self.buf[..n];

            #[cfg(feature = "debug-log")]
            tracing::trace!(bytes = ?data, "HID report");

            let (report_id, payload) = if self.decoder.expects_report_id_prefix() {
                (data[0], &data[1..])
            } else {
                (0, data)
            };
            self.decoder.decode(report_id, payload, out);
        }
        Ok(())
    }
}

struct Attached {
    meta: DeviceMeta,
    reader: Option<Reader>,
}

/// Backend over the platform HID stack.
pub struct HidApiBackend {
    api: HidApi,
    attached: HashMap<String, Attached>,
}

impl HidApiBackend {
    pub fn new() -> Result<Self, BackendError> {
        let api = HidApi::new()?;
        info!("HID API initialized");
        Ok(Self {
            api,
            attached: HashMap::new(),
        })
    }

    /// Devices seen by the last `poll()`.
    pub fn attached(&self) -> impl Iterator<Item = &DeviceMeta> {
        self.attached.values().map(|a| &a.meta)
    }
}

impl HidBackend for HidApiBackend {
    fn name(&self) -> &str {
        "hidapi"
    }

    fn poll(&mut self) -> Result<Vec<HidEvent>, BackendError> {
        self.api.refresh_devices()?;

        let mut events = Vec::new();
        let mut seen = HashSet::new();

        for info in self.api.device_list().filter(|i| accept_device(i)) {
            let location = info.path().to_string_lossy().into_owned();
            if !seen.insert(location.clone()) || self.attached.contains_key(&location) {
                continue;
            }
            let meta = device_meta(info);
            let reader = if meta.is_mouse() {
                None
            } else {
                open_reader(info, &self.api)
            };
            debug!(device = %meta, decoding = reader.is_some(), "HID device found");
            events.push(HidEvent::Arrived(meta.clone()));
            self.attached.insert(location, Attached { meta, reader });
        }

        let gone: Vec<String> = self
            .attached
            .keys()
            .filter(|loc| !seen.contains(*loc))
            .cloned()
            .collect();
        for location_id in gone {
            self.attached.remove(&location_id);
            events.push(HidEvent::Removed { location_id });
        }

        let mut values = Vec::new();
        for (location, dev) in self.attached.iter_mut() {
            let Some(reader) = dev.reader.as_mut() else {
                continue;
            };
            if let Err(e) = reader.drain(&mut values) {
                warn!(device = %dev.meta, error = %e, "HID read failed, closing device");
                dev.reader = None;
            }
            events.extend(values.drain(..).map(|value| HidEvent::Value {
                location_id: location.clone(),
                value,
            }));
        }

        Ok(events)
    }
}

/// Game controllers and mice on the Generic Desktop page.
pub fn accept_device(info: &DeviceInfo) -> bool {
    info.usage_page() == PAGE_GENERIC_DESKTOP && ACCEPTED_DEVICE_USAGES.contains(&info.usage())
}

/// Metadata for a `hidapi` device entry.
pub fn device_meta(info: &DeviceInfo) -> DeviceMeta {
    let (transport, built_in) = match info.bus_type() {
        BusType::Usb => (Some("USB"), false),
        BusType::Bluetooth => (Some("Bluetooth"), false),
        BusType::I2c => (Some("I2C"), true),
        BusType::Spi => (Some("SPI"), true),
        _ => (None, false),
    };
    DeviceMeta {
        vendor_id: info.vendor_id().to_string(),
        product_id: info.product_id().to_string(),
        location_id: info.path().to_string_lossy().into_owned(),
        product: info.product_string().map(str::to_string),
        manufacturer: info.manufacturer_string().map(str::to_string),
        serial_number: info.serial_number().map(str::to_string),
        transport: transport.map(str::to_string),
        built_in,
        usage_page: Some(info.usage_page()),
        usage: Some(info.usage()),
    }
}

fn open_reader(info: &DeviceInfo, api: &HidApi) -> Option<Reader> {
    let decoder = platform_decoder(info)?;
    match Reader::open(info, api, decoder) {
        Ok(reader) => Some(reader),
        Err(e) => {
            warn!(
                vid = info.vendor_id(),
                pid = info.product_id(),
                error = %e,
                "cannot open HID device"
            );
            None
        }
    }
}

#[cfg(target_os = "windows")]
fn platform_decoder(info: &DeviceInfo) -> Option<Box<dyn ReportDecoder>> {
    crate::backends::windows::report_decoder(info)
}

#[cfg(not(target_os = "windows"))]
fn platform_decoder(info: &DeviceInfo) -> Option<Box<dyn ReportDecoder>> {
    debug!(
        vid = info.vendor_id(),
        pid = info.product_id(),
        "no report decoder on this platform"
    );
    None
}
