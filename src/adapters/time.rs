//! ESP32 wall-clock adapter.
//!
//! Implements [`ClockPort`] for the camera.
//!
//! - **`feature = "espidf"`**: reads and sets the system clock with
//!   `gettimeofday()` / `settimeofday()`.
//! - **host**: keeps an offset against
//!   `std::time::Instant` for host-side testing and simulation.
//!
//! `Timestamp` is a broken-down calendar time with the year counted from
//! 1970. Conversion to and from epoch milliseconds goes through `chrono`
//! in UTC.

use chrono::{DateTime, Datelike, NaiveDate, Timelike};
use log::warn;

use crate::app::ports::ClockPort;
use crate::state::Timestamp;

/// Clock adapter for the ESP32 platform.
pub struct Esp32Clock {
    #[cfg(not(feature = "espidf"))]
    base_ms: i64,
    #[cfg(not(feature = "espidf"))]
    set_at: std::time::Instant,
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32Clock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(feature = "espidf"))]
            base_ms: 0,
            #[cfg(not(feature = "espidf"))]
            set_at: std::time::Instant::now(),
        }
    }

    /// Milliseconds since the Unix epoch.
    #[cfg(feature = "espidf")]
    pub fn epoch_ms(&self) -> i64 {
        let mut tv = esp_idf_svc::sys::timeval { tv_sec: 0, tv_usec: 0 };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return 0;
        }
        i64::from(tv.tv_sec) * 1000 + i64::from(tv.tv_usec) / 1000
    }

    /// Milliseconds since the Unix epoch.
    #[cfg(not(feature = "espidf"))]
    pub fn epoch_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.set_at.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.base_ms.saturating_add(elapsed)
    }

    #[cfg(feature = "espidf")]
    fn set_epoch_ms(&mut self, ms: i64) {
        let tv = esp_idf_svc::sys::timeval {
            tv_sec: (ms / 1000) as _,
            tv_usec: ((ms % 1000) * 1000) as _,
        };
        if unsafe { esp_idf_svc::sys::settimeofday(&tv, core::ptr::null()) } != 0 {
            warn!("clock: settimeofday failed");
        }
    }

    #[cfg(not(feature = "espidf"))]
    fn set_epoch_ms(&mut self, ms: i64) {
        self.base_ms = ms;
        self.set_at = std::time::Instant::now();
    }
}

impl ClockPort for Esp32Clock {
    fn now(&self) -> Timestamp {
        from_epoch_ms(self.epoch_ms())
    }

    fn set_time(&mut self, time: Timestamp) {
        match to_epoch_ms(&time) {
            Some(ms) => self.set_epoch_ms(ms),
            None => warn!(
                "clock: rejected calendar time {}/{}/{} {}:{}:{}, clock unchanged",
                time.mon,
                time.day,
                u16::from(time.year) + 1970,
                time.hour,
                time.min,
                time.sec
            ),
        }
    }
}

// ── Calendar conversion ──────────────────────────────────────

/// Epoch milliseconds for a timestamp, or `None` when the fields do not
/// name a real calendar time.
pub fn to_epoch_ms(t: &Timestamp) -> Option<i64> {
    let year = 1970 + i32::from(t.year);
    let dt = NaiveDate::from_ymd_opt(year, u32::from(t.mon), u32::from(t.day))?.and_hms_milli_opt(
        u32::from(t.hour),
        u32::from(t.min),
        u32::from(t.sec),
        u32::from(t.millis),
    )?;
    Some(dt.and_utc().timestamp_millis())
}

/// Broken-down time for epoch milliseconds. `dow` is 1 for Sunday.
/// Times before 1970 clamp to the epoch.
pub fn from_epoch_ms(ms: i64) -> Timestamp {
    let dt = DateTime::from_timestamp_millis(ms.max(0)).unwrap_or(DateTime::UNIX_EPOCH);

    Timestamp {
        sec: dt.second() as u8,
        min: dt.minute() as u8,
        hour: dt.hour() as u8,
        dow: dt.weekday().number_from_sunday() as u8,
        day: dt.day() as u8,
        mon: dt.month() as u8,
        year: (dt.year() - 1970).clamp(0, 255) as u8,
        millis: dt.timestamp_subsec_millis().min(999) as u16,
    }
}
