//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (which goes to UART / USB-CDC in production). The camera task
//! bridge implements the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ImageRequested => info!("IMAGE | requested"),
            AppEvent::ConfigChanged(c) => {
                info!(
                    "CONFIG | agc={} emissivity={} gain_mode={}",
                    c.agc_enabled, c.emissivity, c.gain_mode
                );
            }
            AppEvent::SpotmeterChanged(r) => {
                info!("SPOT | ({},{}) - ({},{})", r.r1, r.c1, r.r2, r.c2);
            }
            AppEvent::TimeSet(t) => {
                info!(
                    "TIME | {}:{:02}:{:02} {}/{} year+{}",
                    t.hour, t.min, t.sec, t.mon, t.day, t.year
                );
            }
            AppEvent::WifiChanged => info!("WIFI | settings updated, restart to apply"),
            AppEvent::StreamStarted(req) => {
                info!("STREAM | on, delay={}ms frames={}", req.delay_ms, req.num_frames);
            }
            AppEvent::StreamStopped => info!("STREAM | off"),
            AppEvent::RecordStart => info!("RECORD | start"),
            AppEvent::RecordStop => info!("RECORD | stop"),
            AppEvent::PowerOff => info!("POWER | off requested"),
            AppEvent::UnknownCommand => warn!("CMD | unknown"),
            AppEvent::CommandRejected(e) => warn!("CMD | rejected: {}", e),
        }
    }
}
