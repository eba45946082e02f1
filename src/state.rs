//! Device-state snapshots exchanged across the port boundary.
//!
//! These are plain values: the command layer reads a snapshot through a
//! port, builds a new one, and hands it back only when a command fully
//! validates. Nothing here is shared or interior-mutable.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::config::{FRAME_HEIGHT, FRAME_WIDTH, GAIN_AUTO, PW_MAX_LEN, SSID_MAX_LEN};

// ---------------------------------------------------------------------------
// Camera configuration
// ---------------------------------------------------------------------------

/// Lepton operating parameters controlled by `set_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Automatic gain control enabled.
    pub agc_enabled: bool,
    /// Scene emissivity in percent (1–100).
    pub emissivity: u8,
    /// Gain mode (`GAIN_HIGH`, `GAIN_LOW` or `GAIN_AUTO`).
    pub gain_mode: u8,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            agc_enabled: false,
            emissivity: 100,
            gain_mode: GAIN_AUTO,
        }
    }
}

// ---------------------------------------------------------------------------
// Wifi settings
// ---------------------------------------------------------------------------

/// Start the wifi interface at boot.
pub const WIFI_FLAG_STARTUP_ENABLE: u8 = 0x01;

/// Wifi setup. Addresses are stored in network order: index 3 holds the
/// first octet of the dotted quad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiSettings {
    pub ap_ssid: String<SSID_MAX_LEN>,
    pub sta_ssid: String<SSID_MAX_LEN>,
    pub ap_pw: String<PW_MAX_LEN>,
    pub sta_pw: String<PW_MAX_LEN>,
    pub flags: u8,
    pub ap_ip_addr: [u8; 4],
    pub sta_ip_addr: [u8; 4],
    pub sta_netmask: [u8; 4],
    /// Address currently in use. Reported, never set by a command.
    pub cur_ip_addr: [u8; 4],
}

impl Default for WifiSettings {
    fn default() -> Self {
        let mut ap_ssid = String::new();
        let _ = ap_ssid.push_str("tCam-Mini");
        Self {
            ap_ssid,
            sta_ssid: String::new(),
            ap_pw: String::new(),
            sta_pw: String::new(),
            flags: WIFI_FLAG_STARTUP_ENABLE,
            ap_ip_addr: [1, 4, 168, 192],
            sta_ip_addr: [0, 0, 0, 0],
            sta_netmask: [0, 255, 255, 255],
            cur_ip_addr: [1, 4, 168, 192],
        }
    }
}

// ---------------------------------------------------------------------------
// Spotmeter
// ---------------------------------------------------------------------------

/// Spotmeter region of interest, inclusive pixel coordinates.
///
/// Invariant: `r1 < r2 <= FRAME_HEIGHT - 1` and `c1 < c2 <= FRAME_WIDTH - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotmeterRegion {
    pub r1: u16,
    pub c1: u16,
    pub r2: u16,
    pub c2: u16,
}

impl SpotmeterRegion {
    /// Whether the region satisfies the frame invariant.
    pub fn is_valid(&self) -> bool {
        self.r1 < self.r2
            && self.r2 < FRAME_HEIGHT
            && self.c1 < self.c2
            && self.c2 < FRAME_WIDTH
    }
}

impl Default for SpotmeterRegion {
    fn default() -> Self {
        Self {
            r1: FRAME_HEIGHT / 2 - 1,
            c1: FRAME_WIDTH / 2 - 1,
            r2: FRAME_HEIGHT / 2,
            c2: FRAME_WIDTH / 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Broken-down wall-clock time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub sec: u8,
    pub min: u8,
    pub hour: u8,
    /// Day of week, 1–7.
    pub dow: u8,
    pub day: u8,
    pub mon: u8,
    /// Years since 1970.
    pub year: u8,
    /// Milliseconds into the current second, as reported by the clock.
    pub millis: u16,
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

/// One radiometric capture, borrowed from the capture pipeline for the
/// duration of a single image response build.
#[derive(Debug, Clone, Copy)]
pub struct BinaryCapture<'a> {
    /// Little-endian 16-bit pixels.
    pub pixels: &'a [u8],
    /// Little-endian 16-bit telemetry words.
    pub telemetry: &'a [u8],
}

impl<'a> BinaryCapture<'a> {
    pub fn new(pixels: &'a [u8], telemetry: &'a [u8]) -> Self {
        Self { pixels, telemetry }
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len() / 2
    }

    pub fn telemetry_words(&self) -> usize {
        self.telemetry.len() / 2
    }
}
