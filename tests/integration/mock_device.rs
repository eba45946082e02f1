//! Mock device adapters for integration tests.
//!
//! Records every port write and emitted event so tests can assert on the
//! full history without a camera, a clock or a socket.

use std::cell::Cell;
use std::collections::VecDeque;

use tcam::app::events::AppEvent;
use tcam::app::ports::{ClockPort, ConfigPort, EventSink, SystemInfoPort, WifiPort};
use tcam::error::EncodeError;
use tcam::rpc::embed::{EncodePrimitive, StandardBase64};
use tcam::rpc::transport::Transport;
use tcam::state::{CameraConfig, Timestamp, WifiSettings};

// ── MockDevice ────────────────────────────────────────────────

pub struct MockDevice {
    pub config: CameraConfig,
    pub wifi: WifiSettings,
    pub time: Timestamp,
    pub config_writes: usize,
    pub wifi_writes: usize,
    pub time_writes: usize,
}

#[allow(dead_code)]
impl MockDevice {
    pub fn new() -> Self {
        Self {
            config: CameraConfig::default(),
            wifi: WifiSettings::default(),
            time: Timestamp { sec: 9, min: 30, hour: 14, dow: 2, day: 15, mon: 7, year: 54, millis: 42 },
            config_writes: 0,
            wifi_writes: 0,
            time_writes: 0,
        }
    }
}

impl ConfigPort for MockDevice {
    fn camera_config(&self) -> CameraConfig {
        self.config
    }

    fn set_camera_config(&mut self, config: CameraConfig) {
        self.config = config;
        self.config_writes += 1;
    }
}

impl WifiPort for MockDevice {
    fn wifi_info(&self) -> &WifiSettings {
        &self.wifi
    }

    fn set_wifi_info(&mut self, settings: WifiSettings) {
        self.wifi = settings;
        self.wifi_writes += 1;
    }
}

impl ClockPort for MockDevice {
    fn now(&self) -> Timestamp {
        self.time
    }

    fn set_time(&mut self, time: Timestamp) {
        self.time = time;
        self.time_writes += 1;
    }
}

impl SystemInfoPort for MockDevice {
    fn version(&self) -> &str {
        "3.0-test"
    }
}

// ── Event recorder ────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn last(&self) -> Option<&AppEvent> {
        self.events.last()
    }

    pub fn count(&self, event: &AppEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Socket stand-in ───────────────────────────────────────────

/// Serves queued inbound chunks one per `read`, records writes.
pub struct MockTransport {
    pub inbound: VecDeque<Vec<u8>>,
    pub written: Vec<Vec<u8>>,
    /// Reject every write, as a socket with a dead peer would.
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self { inbound: VecDeque::new(), written: Vec::new(), fail_writes: false }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.inbound.push_back(bytes.to_vec());
    }

    /// Frame `text` with START/STOP and queue it.
    pub fn push_command(&mut self, text: &str) {
        let mut framed = vec![0x02];
        framed.extend_from_slice(text.as_bytes());
        framed.push(0x03);
        self.inbound.push_back(framed);
    }
}

impl Transport for MockTransport {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let Some(mut chunk) = self.inbound.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.inbound.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        if self.fail_writes {
            return Err(());
        }
        self.written.push(data.to_vec());
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}

// ── Encoders ──────────────────────────────────────────────────

/// Standard base64 that fails the `n`th encode (1-based), counting only
/// calls that write output.
pub struct FailNthEncode {
    pub fail_at: u32,
    calls: Cell<u32>,
}

#[allow(dead_code)]
impl FailNthEncode {
    pub fn new(fail_at: u32) -> Self {
        Self { fail_at, calls: Cell::new(0) }
    }
}

impl EncodePrimitive for FailNthEncode {
    fn encode(&self, input: &[u8], out: &mut [u8]) -> Result<usize, EncodeError> {
        // Size queries pass through uncounted.
        if out.is_empty() && !input.is_empty() {
            return StandardBase64.encode(input, out);
        }
        let n = self.calls.get() + 1;
        self.calls.set(n);
        if n == self.fail_at {
            return Err(EncodeError::Failed);
        }
        StandardBase64.encode(input, out)
    }
}
