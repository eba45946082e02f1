//! Command/response protocol layer.
//!
//! JSON commands in, bounded JSON responses out.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Protocol Stack                          │
//! │                                                            │
//! │  ┌───────────┐   ┌──────────┐   ┌──────────┐   ┌────────┐ │
//! │  │ Transport │──▶│  Codec   │──▶│ Command  │──▶│  Args  │ │
//! │  │ (trait)   │   │ (STX/ETX)│   │ (parser) │   │(valid.)│ │
//! │  └───────────┘   └──────────┘   └──────────┘   └────────┘ │
//! │       ▲                                             │      │
//! │       │     ┌──────────┐   ┌──────────┐             ▼      │
//! │       └─────│  Buffer  │◀──│ Response │◀──── CommandService│
//! │             │ (fixed)  │   │ + Embed  │                    │
//! │             └──────────┘   └──────────┘                    │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod args;
pub mod buffer;
pub mod channels;
pub mod codec;
pub mod command;
pub mod embed;
pub mod ip;
pub mod response;
pub mod stream;
pub mod transport;
