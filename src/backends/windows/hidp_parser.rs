#![cfg(target_os = "windows")]
//! Windows HIDP descriptor-driven report decoder.
//!
//! Builds a per-device field map with the Windows HID Parser (HIDP) APIs and
//! turns input reports into raw [`HidValue`]s:
//! - Buttons via `HidP_GetUsages`, emitted as `1`/`0` edges in range `0..1`
//! - Values via `HidP_GetUsageValue`, emitted when the raw value changes,
//!   sign-extended when the descriptor declares a negative logical minimum
//!
//! ## Hat policy
//! Hats that report 8 positions (`0..7` or `1..8`) are passed through
//! unchanged, so the device database's hat shift applies to them. Hats that
//! report **degrees** are converted to positions `0..7` using 45° sectors and
//! emitted with range `0..7`; neutral is emitted as `8`.

use core::mem::MaybeUninit;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;

use hidapi::DeviceInfo;
use tracing::{debug, trace};

use crate::backends::hid::ReportDecoder;
use crate::event::HidValue;
use crate::usage::{GD_HATSWITCH, PAGE_GENERIC_DESKTOP};

use windows_sys::Win32::Devices::HumanInterfaceDevice::*;
use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, GENERIC_READ, GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE, NTSTATUS,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};

const STATUS_SUCCESS: NTSTATUS = HIDP_STATUS_SUCCESS;
const STATUS_BUFFER_TOO_SMALL: NTSTATUS = HIDP_STATUS_BUFFER_TOO_SMALL;

/// Hat position emitted for a centered degree hat.
const HAT_NEUTRAL: i64 = 8;

#[derive(Clone, Debug)]
struct ButtonField {
    report_id: u8,
    usage_page: u16,
    link_collection: u16,
}

#[derive(Clone, Debug)]
struct ValueField {
    report_id: u8,
    usage_page: u16,
    usage: u16,
    link_collection: u16,
    logical_min: i64,
    logical_max: i64,
    bit_size: u16,
    degree_hat: bool,
}

/// Descriptor-driven HIDP decoder (Windows).
pub struct WinHidpParser {
    handle: HANDLE,
    ppd: PHIDP_PREPARSED_DATA,
    input_report_max_len: u16,

    buttons: Vec<ButtonField>,
    values: Vec<ValueField>,

    /// Buttons currently down, as (usage page, usage).
    pressed: HashSet<(u16, u16)>,
    /// Last raw value per `values` index.
    last_value: HashMap<usize, i64>,

    /// Descriptor uses only report ID 0: reads carry no ID byte.
    only_rid0: bool,
}

impl Drop for WinHidpParser {
    fn drop(&mut self) {
        unsafe {
            if self.ppd != 0 {
                HidD_FreePreparsedData(self.ppd);
                self.ppd = 0;
            }
            if !self.handle.is_null() {
                CloseHandle(self.handle);
                self.handle = std::ptr::null_mut();
            }
        }
    }
}

impl WinHidpParser {
    /// Build the field map for a device.
    ///
    /// Returns `None` if the device cannot be opened, its preparsed data or
    /// global caps cannot be read, or it has neither buttons nor values.
    pub fn new(info: &DeviceInfo) -> Option<Self> {
        let path = info.path().to_string_lossy().to_string();
        let handle = match open_device_handle(&path) {
            Ok(h) => h,
            Err(code) => {
                debug!(%path, code, "CreateFileW failed");
                return None;
            }
        };

        let mut ppd: PHIDP_PREPARSED_DATA = 0;
        let ok = unsafe { HidD_GetPreparsedData(handle, &mut ppd) };
        if ok == 0 || ppd == 0 {
            unsafe { CloseHandle(handle) };
            return None;
        }

        let mut caps = MaybeUninit::<HIDP_CAPS>::uninit();
        let status = unsafe { HidP_GetCaps(ppd, caps.as_mut_ptr()) };
        if status != STATUS_SUCCESS {
            unsafe {
                HidD_FreePreparsedData(ppd);
                CloseHandle(handle);
            }
            return None;
        }
        let caps = unsafe { caps.assume_init() };

        // A device may have only buttons or only values; a failed query counts as none.
        let btn_caps = enumerate_button_caps(ppd, HidP_Input).unwrap_or_default();
        let val_caps = enumerate_value_caps(ppd, HidP_Input).unwrap_or_default();

        if btn_caps.is_empty() && val_caps.is_empty() {
            unsafe {
                HidD_FreePreparsedData(ppd);
                CloseHandle(handle);
            }
            return None;
        }

        let report_ids: BTreeSet<u8> = btn_caps
            .iter()
            .map(|c| c.ReportID)
            .chain(val_caps.iter().map(|c| c.ReportID))
            .collect();
        let only_rid0 = report_ids.len() == 1 && report_ids.contains(&0);

        let buttons = normalize_buttons(&btn_caps);
        let values = normalize_values(&val_caps);

        debug!(
            vid = info.vendor_id(),
            pid = info.product_id(),
            ?report_ids,
            buttons = buttons.len(),
            values = values.len(),
            "HIDP field map built"
        );

        Some(Self {
            handle,
            ppd,
            input_report_max_len: caps.InputReportByteLength,
            buttons,
            values,
            pressed: HashSet::new(),
            last_value: HashMap::new(),
            only_rid0,
        })
    }
}

// The raw OS handles are only touched from the thread that owns the backend.
unsafe impl Send for WinHidpParser {}

impl ReportDecoder for WinHidpParser {
    fn input_report_len(&self) -> usize {
        self.input_report_max_len as usize
    }

    fn expects_report_id_prefix(&self) -> bool {
        !self.only_rid0
    }

    fn decode(&mut self, report_id: u8, payload: &[u8], out: &mut Vec<HidValue>) {
        // HIDP wants [report_id][body...] padded to InputReportByteLength.
        let max = self.input_report_max_len as usize;
        let mut report = vec![0u8; max.max(1)];

        // On a report-ID-0 device a non-zero first byte is data, not an ID.
        let joined: Vec<u8>;
        let (rid, body): (u8, &[u8]) = if self.only_rid0 && report_id != 0 {
            joined = std::iter::once(report_id).chain(payload.iter().copied()).collect();
            (0, joined.as_slice())
        } else {
            (report_id, payload)
        };

        report[0] = rid;
        let copy_len = body.len().min(report.len().saturating_sub(1));
        report[1..1 + copy_len].copy_from_slice(&body[..copy_len]);
        let report_len = report.len() as u32;

        let mut pressed_now: HashSet<(u16, u16)> = HashSet::new();
        for bf in &self.buttons {
            if bf.report_id != 0 && bf.report_id != rid {
                continue;
            }
            let mut usage_buf = [0u16; 128];
            let mut usage_len: u32 = usage_buf.len() as u32;
            let status = unsafe {
                HidP_GetUsages(
                    HidP_Input,
                    bf.usage_page,
                    bf.link_collection,
                    usage_buf.as_mut_ptr(),
                    &mut usage_len,
                    self.ppd,
                    report.as_mut_ptr(),
                    report_len,
                )
            };
            if status != STATUS_SUCCESS {
                trace!(status = status as u32, rid, page = bf.usage_page, "HidP_GetUsages failed");
                continue;
            }
            for &usage in &usage_buf[..usage_len as usize] {
                pressed_now.insert((bf.usage_page, usage));
            }
        }

        let mut down: Vec<_> = pressed_now.difference(&self.pressed).copied().collect();
        let mut up: Vec<_> = self.pressed.difference(&pressed_now).copied().collect();
        down.sort_unstable();
        up.sort_unstable();
        out.extend(up.into_iter().map(|(page, usage)| HidValue::new(page, usage, 0, 0, 1)));
        out.extend(down.into_iter().map(|(page, usage)| HidValue::new(page, usage, 1, 0, 1)));
        self.pressed = pressed_now;

        for (i, vf) in self.values.iter_mut().enumerate() {
            if vf.report_id != 0 && vf.report_id != rid {
                continue;
            }

            let mut raw: u32 = 0;
            let mut status = unsafe {
                HidP_GetUsageValue(
                    HidP_Input,
                    vf.usage_page,
                    vf.link_collection,
                    vf.usage,
                    &mut raw,
                    self.ppd,
                    report.as_mut_ptr(),
                    report_len,
                )
            };
            // Some stacks only answer for link collection 0.
            if status != STATUS_SUCCESS && vf.link_collection != 0 {
                status = unsafe {
                    HidP_GetUsageValue(
                        HidP_Input,
                        vf.usage_page,
                        0,
                        vf.usage,
                        &mut raw,
                        self.ppd,
                        report.as_mut_ptr(),
                        report_len,
                    )
                };
                if status == STATUS_SUCCESS {
                    vf.link_collection = 0;
                }
            }
            if status != STATUS_SUCCESS {
                trace!(
                    status = status as u32,
                    rid,
                    page = vf.usage_page,
                    usage = vf.usage,
                    "HidP_GetUsageValue failed"
                );
                continue;
            }

            let value = if vf.logical_min < 0 {
                sign_extend(raw, vf.bit_size)
            } else {
                raw as i64
            };

            let emitted = if vf.degree_hat {
                HidValue::new(
                    vf.usage_page,
                    vf.usage,
                    degrees_to_position(value, vf.logical_min, vf.logical_max),
                    0,
                    7,
                )
            } else {
                HidValue::new(vf.usage_page, vf.usage, value, vf.logical_min, vf.logical_max)
            };

            if self.last_value.insert(i, emitted.value) != Some(emitted.value) {
                out.push(emitted);
            }
        }
    }
}

fn enumerate_button_caps(
    ppd: PHIDP_PREPARSED_DATA,
    report_type: HIDP_REPORT_TYPE,
) -> Option<Vec<HIDP_BUTTON_CAPS>> {
    let mut len: u16 = 64;
    for _ in 0..2 {
        let mut caps: Vec<HIDP_BUTTON_CAPS> = vec![unsafe { core::mem::zeroed() }; len as usize];
        let mut needed = len;
        let status =
            unsafe { HidP_GetButtonCaps(report_type, caps.as_mut_ptr(), &mut needed, ppd) };
        if status == STATUS_SUCCESS {
            caps.truncate(needed as usize);
            return Some(caps);
        }
        if status != STATUS_BUFFER_TOO_SMALL || needed == 0 {
            break;
        }
        len = needed;
    }
    None
}

fn enumerate_value_caps(
    ppd: PHIDP_PREPARSED_DATA,
    report_type: HIDP_REPORT_TYPE,
) -> Option<Vec<HIDP_VALUE_CAPS>> {
    let mut len: u16 = 64;
    for _ in 0..2 {
        let mut caps: Vec<HIDP_VALUE_CAPS> = vec![unsafe { core::mem::zeroed() }; len as usize];
        let mut needed = len;
        let status = unsafe { HidP_GetValueCaps(report_type, caps.as_mut_ptr(), &mut needed, ppd) };
        if status == STATUS_SUCCESS {
            caps.truncate(needed as usize);
            return Some(caps);
        }
        if status != STATUS_BUFFER_TOO_SMALL || needed == 0 {
            break;
        }
        len = needed;
    }
    None
}

fn normalize_buttons(caps: &[HIDP_BUTTON_CAPS]) -> Vec<ButtonField> {
    let mut out: Vec<ButtonField> = Vec::new();
    for c in caps {
        let field = ButtonField {
            report_id: c.ReportID,
            usage_page: c.UsagePage,
            link_collection: c.LinkCollection,
        };
        // HidP_GetUsages answers per page and collection; one query covers every cap there.
        let duplicate = out.iter().any(|f| {
            f.report_id == field.report_id
                && f.usage_page == field.usage_page
                && f.link_collection == field.link_collection
        });
        if !duplicate {
            out.push(field);
        }
    }
    out
}

fn normalize_values(caps: &[HIDP_VALUE_CAPS]) -> Vec<ValueField> {
    let mut out = Vec::new();
    for c in caps {
        if c.UsagePage == 0 {
            continue;
        }
        let usages = unsafe {
            if c.IsRange != 0 {
                let r = c.Anonymous.Range;
                r.UsageMin..=r.UsageMax
            } else {
                let u = c.Anonymous.NotRange.Usage;
                u..=u
            }
        };
        let logical_min = c.LogicalMin as i64;
        let logical_max = c.LogicalMax as i64;
        for usage in usages {
            out.push(ValueField {
                report_id: c.ReportID,
                usage_page: c.UsagePage,
                usage,
                link_collection: c.LinkCollection,
                logical_min,
                logical_max,
                bit_size: c.BitSize,
                degree_hat: is_degree_hat(c.UsagePage, usage, logical_min, logical_max),
            });
        }
    }
    out
}

/// A hat switch whose range is not one of the 8-position layouts.
fn is_degree_hat(usage_page: u16, usage: u16, logical_min: i64, logical_max: i64) -> bool {
    usage_page == PAGE_GENERIC_DESKTOP
        && usage == GD_HATSWITCH
        && !matches!((logical_min, logical_max), (0, 7) | (1, 8))
}

fn sign_extend(raw: u32, bits: u16) -> i64 {
    let bits = u32::from(bits.clamp(1, 32));
    let shift = 64 - bits;
    ((raw as i64) << shift) >> shift
}

/// Map an angular hat reading to positions `0..7` (up = 0, clockwise).
fn degrees_to_position(raw: i64, lo: i64, hi: i64) -> i64 {
    if raw < lo || raw > hi {
        return HAT_NEUTRAL;
    }
    let span = (hi - lo + 1).max(1) as f64;
    let deg = (raw - lo) as f64 * 360.0 / span;
    (((deg + 22.5) / 45.0).floor() as i64).rem_euclid(8)
}

/// Open a Windows file handle for a HID interface path.
///
/// The returned `HANDLE` must be closed with `CloseHandle`.
fn open_device_handle(path: &str) -> Result<HANDLE, u32> {
    use std::ptr::{null, null_mut};

    let wide: Vec<u16> = OsStr::new(path)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    let try_open = |access: u32| unsafe {
        CreateFileW(
            wide.as_ptr(),
            access,
            FILE_SHARE_READ | FILE_SHARE_WRITE,
            null(),
            OPEN_EXISTING,
            FILE_ATTRIBUTE_NORMAL,
            null_mut(),
        )
    };

    let mut handle = try_open(GENERIC_READ | GENERIC_WRITE);
    if handle == INVALID_HANDLE_VALUE {
        handle = try_open(GENERIC_READ);
    }
    if handle == INVALID_HANDLE_VALUE {
        Err(unsafe { GetLastError() })
    } else {
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_extension_follows_bit_size() {
        assert_eq!(sign_extend(0xFF, 8), -1);
        assert_eq!(sign_extend(0x7F, 8), 127);
        assert_eq!(sign_extend(0x800, 12), -2048);
    }

    #[test]
    fn degree_hats_map_to_positions() {
        assert_eq!(degrees_to_position(0, 0, 359), 0);
        assert_eq!(degrees_to_position(90, 0, 359), 2);
        assert_eq!(degrees_to_position(350, 0, 359), 0);
        assert_eq!(degrees_to_position(-1, 0, 359), HAT_NEUTRAL);
        assert!(!is_degree_hat(PAGE_GENERIC_DESKTOP, GD_HATSWITCH, 0, 7));
        assert!(is_degree_hat(PAGE_GENERIC_DESKTOP, GD_HATSWITCH, 0, 359));
    }
}
