//! Application core: command execution, zero I/O.
//!
//! The rules for turning protocol requests into device state changes and
//! replies. All interaction with the rest of the camera happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! on the host.

pub mod events;
pub mod ports;
pub mod service;
