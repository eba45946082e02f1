//! Response documents and their builders.
//!
//! Status, config and wifi replies are compact and framed for the socket.
//! Image documents are pretty-printed and carry the radiometric frame and
//! telemetry block as base64 text borrowed from the scratch region.

use core::fmt::Write as _;

use heapless::String;
use log::debug;
use serde::Serialize;

use super::buffer::ResponseBuffer;
use super::codec::{write_compact, write_pretty};
use super::embed::{EncodePrimitive, EncodedText, ScratchRegion, embed};
use super::ip::{IP_TEXT_LEN, format_ip};
use crate::config::{CAMERA_MODEL_NUM, SSID_MAX_LEN};
use crate::error::Result;
use crate::state::{BinaryCapture, CameraConfig, Timestamp, WifiSettings};

/// Longest firmware version string carried in metadata.
pub const VERSION_TEXT_LEN: usize = 32;
const TIME_TEXT_LEN: usize = 20;
const DATE_TEXT_LEN: usize = 16;

/// Year offset (from 1970) subtracted to print a two-digit year.
const DATE_YEAR_BIAS: i32 = 30;

// ───────────────────────────────────────────────────────────────
// Metadata
// ───────────────────────────────────────────────────────────────

/// Identification block shared by status replies and image documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(rename = "Camera")]
    pub camera: String<SSID_MAX_LEN>,
    #[serde(rename = "Model")]
    pub model: u32,
    #[serde(rename = "Version")]
    pub version: String<VERSION_TEXT_LEN>,
    #[serde(rename = "Time")]
    pub time: String<TIME_TEXT_LEN>,
    #[serde(rename = "Date")]
    pub date: String<DATE_TEXT_LEN>,
}

impl Metadata {
    /// `camera` is the device name (the AP SSID). An over-long version is
    /// truncated.
    pub fn new(camera: &str, version: &str, now: &Timestamp) -> Self {
        Self {
            camera: truncated(camera),
            model: CAMERA_MODEL_NUM,
            version: truncated(version),
            time: format_time(now),
            date: format_date(now),
        }
    }
}

fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// `H:MM:SS.m`: millisecond printed as is, unpadded.
pub fn format_time(t: &Timestamp) -> String<TIME_TEXT_LEN> {
    let mut s = String::new();
    // Widest rendering of the field types fits.
    let _ = write!(s, "{}:{:02}:{:02}.{}", t.hour, t.min, t.sec, t.millis);
    s
}

/// `M/D/YY`.
pub fn format_date(t: &Timestamp) -> String<DATE_TEXT_LEN> {
    let mut s = String::new();
    let _ = write!(s, "{}/{}/{:02}", t.mon, t.day, i32::from(t.year) - DATE_YEAR_BIAS);
    s
}

// ───────────────────────────────────────────────────────────────
// Compact replies
// ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusDoc<'a> {
    status: &'a Metadata,
}

#[derive(Serialize)]
struct ConfigBody {
    agc_enabled: u8,
    emissivity: u8,
    gain_mode: u8,
}

#[derive(Serialize)]
struct ConfigDoc {
    config: ConfigBody,
}

#[derive(Serialize)]
struct WifiBody<'a> {
    ap_ssid: &'a str,
    sta_ssid: &'a str,
    flags: u8,
    ap_ip_addr: String<IP_TEXT_LEN>,
    sta_ip_addr: String<IP_TEXT_LEN>,
    sta_netmask: String<IP_TEXT_LEN>,
    cur_ip_addr: String<IP_TEXT_LEN>,
}

#[derive(Serialize)]
struct WifiDoc<'a> {
    wifi: WifiBody<'a>,
}

/// `{"status": {Camera, Model, Version, Time, Date}}`
pub fn build_status(buf: &mut ResponseBuffer, meta: &Metadata) -> Result<usize> {
    write_compact(buf, &StatusDoc { status: meta })
}

/// `{"config": {agc_enabled, emissivity, gain_mode}}`, all numeric.
pub fn build_config(buf: &mut ResponseBuffer, config: &CameraConfig) -> Result<usize> {
    let doc = ConfigDoc {
        config: ConfigBody {
            agc_enabled: u8::from(config.agc_enabled),
            emissivity: config.emissivity,
            gain_mode: config.gain_mode,
        },
    };
    write_compact(buf, &doc)
}

/// `{"wifi": {...}}`. Passwords are never reported.
pub fn build_wifi(buf: &mut ResponseBuffer, wifi: &WifiSettings) -> Result<usize> {
    let doc = WifiDoc {
        wifi: WifiBody {
            ap_ssid: &wifi.ap_ssid,
            sta_ssid: &wifi.sta_ssid,
            flags: wifi.flags,
            ap_ip_addr: format_ip(wifi.ap_ip_addr),
            sta_ip_addr: format_ip(wifi.sta_ip_addr),
            sta_netmask: format_ip(wifi.sta_netmask),
            cur_ip_addr: format_ip(wifi.cur_ip_addr),
        },
    };
    write_compact(buf, &doc)
}

// ───────────────────────────────────────────────────────────────
// Image document
// ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ImageDoc<'a, 'r> {
    metadata: &'a Metadata,
    radiometric: &'a EncodedText<'r>,
    telemetry: &'a EncodedText<'r>,
}

/// Build the pretty image document for one capture.
///
/// Both encodings live until serialization finishes and are then returned
/// to `region`. If the telemetry encoding fails, the radiometric encoding
/// is released before the error is returned.
pub fn build_image(
    buf: &mut ResponseBuffer,
    capture: &BinaryCapture<'_>,
    meta: &Metadata,
    region: &ScratchRegion,
    codec: &impl EncodePrimitive,
) -> Result<usize> {
    buf.clear();

    let radiometric = embed(region, codec, capture.pixels)?;
    let telemetry = embed(region, codec, capture.telemetry)?;

    let result = write_pretty(
        buf,
        &ImageDoc {
            metadata: meta,
            radiometric: &radiometric,
            telemetry: &telemetry,
        },
    );

    telemetry.release();
    radiometric.release();

    if let Ok(n) = result {
        debug!(
            "image: {} pixels, {} telemetry words -> {} bytes",
            capture.pixel_count(),
            capture.telemetry_words(),
            n
        );
    }
    result
}
