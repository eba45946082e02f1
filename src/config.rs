//! Protocol configuration parameters
//!
//! Compile-time constants shared by the command layer plus the tunable
//! [`ProtocolConfig`] used to size the response buffers and scratch region.

use serde::{Deserialize, Serialize};

// --- Camera ---
/// Numeric model identifier reported in every metadata block.
pub const CAMERA_MODEL_NUM: u32 = 2;
/// Lepton frame width (columns).
pub const FRAME_WIDTH: u16 = 160;
/// Lepton frame height (rows).
pub const FRAME_HEIGHT: u16 = 120;
/// Pixels in one radiometric frame.
pub const FRAME_PIXELS: usize = FRAME_WIDTH as usize * FRAME_HEIGHT as usize;
/// 16-bit words in one telemetry block.
pub const TELEMETRY_WORDS: usize = 240;

// --- Gain modes ---
pub const GAIN_HIGH: u8 = 0;
pub const GAIN_LOW: u8 = 1;
pub const GAIN_AUTO: u8 = 2;

// --- Wifi ---
/// Maximum SSID length in bytes.
pub const SSID_MAX_LEN: usize = 32;
/// Maximum WPA passphrase length in bytes.
pub const PW_MAX_LEN: usize = 63;

// --- Framing ---
/// Marks the start of a delimited command or response (ASCII STX).
pub const FRAME_START: u8 = 0x02;
/// Marks the end of a delimited command or response (ASCII ETX).
pub const FRAME_STOP: u8 = 0x03;
/// Longest inbound command text accepted between the delimiters.
pub const MAX_COMMAND_LEN: usize = 512;
/// TCP port the command server listens on.
pub const CMD_PORT: u16 = 5001;

// --- Buffers ---
/// Ceiling for pretty-printed image documents.
pub const IMAGE_TEXT_CAPACITY: usize = 64 * 1024;
/// Ceiling for framed status/config/wifi responses.
pub const RESPONSE_TEXT_CAPACITY: usize = 512;
/// Scratch region budget for base64 text (PSRAM on the device).
pub const SCRATCH_REGION_BYTES: usize = 256 * 1024;

/// Sizing for the buffers owned by the command service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Capacity of the image-class buffer (bytes).
    pub image_text_capacity: usize,
    /// Capacity of the response-class buffer (bytes).
    pub response_text_capacity: usize,
    /// Byte budget of the base64 scratch region.
    pub scratch_region_bytes: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            image_text_capacity: IMAGE_TEXT_CAPACITY,
            response_text_capacity: RESPONSE_TEXT_CAPACITY,
            scratch_region_bytes: SCRATCH_REGION_BYTES,
        }
    }
}
