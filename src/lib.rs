//! tCam command layer library.
//!
//! Exposes the protocol modules for integration testing and for the
//! firmware binary. ESP-IDF-specific code is guarded by the `espidf`
//! feature within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod rpc;
pub mod state;

pub use error::{Error, Result};
