//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `device_state` | ConfigPort         | Live camera settings     |
//! |                | WifiPort           |                          |
//! |                | SystemInfoPort     | Build version            |
//! | `frame_store`  | CapturePort        | Sensor capture pipeline  |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `time`         | ClockPort          | ESP32 system clock       |

pub mod device_state;
pub mod frame_store;
pub mod log_sink;
pub mod time;
