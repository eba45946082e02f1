//! In-memory device state adapter.
//!
//! Holds the live camera configuration and wifi settings and implements
//! the state ports for them. Persistence to flash belongs to the settings
//! subsystem, which loads this adapter at boot and saves it on change.

use crate::app::ports::{ClockPort, ConfigPort, SystemInfoPort, WifiPort};
use crate::state::{CameraConfig, Timestamp, WifiSettings};

use super::time::Esp32Clock;

/// Firmware version reported in metadata.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct DeviceState<C: ClockPort = Esp32Clock> {
    config: CameraConfig,
    wifi: WifiSettings,
    clock: C,
}

impl DeviceState<Esp32Clock> {
    pub fn new(config: CameraConfig, wifi: WifiSettings) -> Self {
        Self::with_clock(config, wifi, Esp32Clock::new())
    }
}

impl Default for DeviceState<Esp32Clock> {
    fn default() -> Self {
        Self::new(CameraConfig::default(), WifiSettings::default())
    }
}

impl<C: ClockPort> DeviceState<C> {
    pub fn with_clock(config: CameraConfig, wifi: WifiSettings, clock: C) -> Self {
        Self { config, wifi, clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: ClockPort> ConfigPort for DeviceState<C> {
    fn camera_config(&self) -> CameraConfig {
        self.config
    }

    fn set_camera_config(&mut self, config: CameraConfig) {
        self.config = config;
    }
}

impl<C: ClockPort> WifiPort for DeviceState<C> {
    fn wifi_info(&self) -> &WifiSettings {
        &self.wifi
    }

    fn set_wifi_info(&mut self, settings: WifiSettings) {
        self.wifi = settings;
    }
}

impl<C: ClockPort> ClockPort for DeviceState<C> {
    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn set_time(&mut self, time: Timestamp) {
        self.clock.set_time(time);
    }
}

impl<C: ClockPort> SystemInfoPort for DeviceState<C> {
    fn version(&self) -> &str {
        FIRMWARE_VERSION
    }
}
