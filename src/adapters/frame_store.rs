//! Latest-frame hand-off between the sensor pipeline and the command
//! server.
//!
//! The capture task calls [`FrameStore::publish`] with each finished
//! frame; the server loop takes it through [`CapturePort`]. Only the
//! newest frame is kept, so a slow host skips frames instead of queueing
//! them.

use log::debug;

use crate::app::ports::CapturePort;
use crate::config::FRAME_PIXELS;
use crate::state::BinaryCapture;

pub struct FrameStore {
    pixels: Vec<u8>,
    telemetry: Vec<u8>,
    fresh: bool,
    /// Frames replaced before anyone took them.
    overwritten: u32,
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStore {
    pub fn new() -> Self {
        Self {
            pixels: Vec::with_capacity(FRAME_PIXELS * 2),
            telemetry: Vec::new(),
            fresh: false,
            overwritten: 0,
        }
    }

    /// Replace the held frame with a copy of `pixels` and `telemetry`.
    pub fn publish(&mut self, pixels: &[u8], telemetry: &[u8]) {
        if self.fresh {
            self.overwritten += 1;
            debug!("frames: unsent frame overwritten ({})", self.overwritten);
        }
        self.pixels.clear();
        self.pixels.extend_from_slice(pixels);
        self.telemetry.clear();
        self.telemetry.extend_from_slice(telemetry);
        self.fresh = true;
    }
}

impl CapturePort for FrameStore {
    fn take_capture(&mut self) -> Option<BinaryCapture<'_>> {
        if !self.fresh {
            return None;
        }
        self.fresh = false;
        Some(BinaryCapture::new(&self.pixels, &self.telemetry))
    }
}
