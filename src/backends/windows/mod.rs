#![cfg(target_os = "windows")]

//! Windows report decoding.
//!
//! The `hidapi` backend enumerates and reads devices on every platform; on
//! Windows it hands input reports to the HIDP parser in [`hidp_parser`].

pub mod hidp_parser;

use crate::backends::hid::ReportDecoder;
use hidapi::DeviceInfo;

/// Decoder for `info`, if its descriptor can be parsed.
pub fn report_decoder(info: &DeviceInfo) -> Option<Box<dyn ReportDecoder>> {
    hidp_parser::WinHidpParser::new(info).map(|p| Box::new(p) as Box<dyn ReportDecoder>)
}
