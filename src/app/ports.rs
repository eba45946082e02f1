//! Port traits: the hexagonal boundary between the command layer and the
//! rest of the camera firmware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ CommandService
//! ```
//!
//! Settings storage, the wall clock, the sensor pipeline and firmware
//! version reporting live outside this crate. The [`CommandService`](super::service::CommandService)
//! consumes them via generics, so the protocol logic is testable with
//! in-memory adapters.
//!
//! Writes through a port always carry a fully validated value: the
//! service never commits a partially applied update.

use crate::state::{BinaryCapture, CameraConfig, Timestamp, WifiSettings};

// ───────────────────────────────────────────────────────────────
// Camera configuration
// ───────────────────────────────────────────────────────────────

pub trait ConfigPort {
    /// Snapshot of the current camera configuration.
    fn camera_config(&self) -> CameraConfig;

    /// Replace the configuration with a validated value.
    fn set_camera_config(&mut self, config: CameraConfig);
}

// ───────────────────────────────────────────────────────────────
// Wifi settings
// ───────────────────────────────────────────────────────────────

pub trait WifiPort {
    fn wifi_info(&self) -> &WifiSettings;

    /// Replace the stored settings with a validated, merged value.
    fn set_wifi_info(&mut self, settings: WifiSettings);
}

// ───────────────────────────────────────────────────────────────
// Wall clock
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    fn now(&self) -> Timestamp;

    fn set_time(&mut self, time: Timestamp);
}

// ───────────────────────────────────────────────────────────────
// System info
// ───────────────────────────────────────────────────────────────

pub trait SystemInfoPort {
    /// Firmware version string.
    fn version(&self) -> &str;
}

// ───────────────────────────────────────────────────────────────
// Sensor captures
// ───────────────────────────────────────────────────────────────

pub trait CapturePort {
    /// The newest capture not yet taken, if any. Each capture is handed
    /// out once.
    fn take_capture(&mut self) -> Option<BinaryCapture<'_>>;
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: domain → logging / camera tasks)
// ───────────────────────────────────────────────────────────────

/// The service emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, the
/// Lepton task's notification queue, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
