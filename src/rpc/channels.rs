//! Inbound command queue.
//!
//! Uses an `embassy-sync` bounded channel to hand decoded command frames
//! from the socket task to the command service, the single consumer that
//! executes them in order. The channel is static and heap-free.
//!
//! ```text
//! ┌──────────────┐ CommandFrame ┌────────────────┐
//! │ Socket task  │─────────────▶│ CommandService │
//! │ (decoder)    │   depth 8    │ (single thread)│
//! └──────────────┘              └────────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use log::warn;

use super::codec::FrameDecoder;
use crate::config::MAX_COMMAND_LEN;

/// One command's text, delimiters already stripped.
#[derive(Debug, Clone)]
pub struct CommandFrame {
    pub text: Vec<u8, MAX_COMMAND_LEN>,
}

impl CommandFrame {
    /// Copy decoded text into a frame. `None` if it exceeds
    /// `MAX_COMMAND_LEN`.
    pub fn from_text(text: &[u8]) -> Option<Self> {
        Vec::from_slice(text).ok().map(|text| Self { text })
    }
}

/// Channel depth for inbound commands.
pub const CMD_DEPTH: usize = 8;

pub type CommandChannel = Channel<CriticalSectionRawMutex, CommandFrame, CMD_DEPTH>;

/// Inbound command channel: socket task → command service.
pub static CMD_CHANNEL: CommandChannel = Channel::new();

/// Decode every complete frame in `data` and queue it.
///
/// Returns the number of frames queued. Frames that arrive while the
/// channel is full are dropped.
pub fn enqueue_frames(decoder: &mut FrameDecoder, mut data: &[u8], channel: &CommandChannel) -> usize {
    let mut queued = 0;
    while !data.is_empty() {
        let (used, text) = decoder.feed(data);
        data = &data[used..];
        let Some(text) = text else { continue };

        let Some(frame) = CommandFrame::from_text(text) else {
            warn!("channels: frame too large for command buffer");
            continue;
        };
        if channel.try_send(frame).is_err() {
            warn!("channels: command channel full, dropping frame");
            continue;
        }
        queued += 1;
    }
    queued
}
