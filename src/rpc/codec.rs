//! Delimited frame codec.
//!
//! Wire format, both directions:
//! ```text
//! ┌──────┬──────────────────────┬──────┬──────────────┐
//! │ 0x02 │ JSON text (N B)      │ 0x03 │ 0x00 (reply) │
//! │ STX  │                      │ ETX  │              │
//! └──────┴──────────────────────┴──────┴──────────────┘
//! ```
//!
//! Inbound, [`FrameDecoder`] accumulates socket bytes and yields the text
//! between the delimiters. A single `Transport::read` may carry part of a
//! command, or several commands back to back.
//!
//! Outbound, [`write_compact`] and [`write_pretty`] serialize a response
//! document straight into a [`ResponseBuffer`] through [`FixedWriter`],
//! which refuses to grow past the buffer's capacity.

use std::io;

use log::warn;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::buffer::ResponseBuffer;
use crate::config::{FRAME_START, FRAME_STOP, MAX_COMMAND_LEN};
use crate::error::{EncodeError, Error, Result};

// ───────────────────────────────────────────────────────────────
// Inbound
// ───────────────────────────────────────────────────────────────

enum DecoderState {
    /// Discarding bytes until a START marker.
    Idle,
    /// Inside a frame, `len` text bytes collected.
    Collecting { len: usize },
}

/// Streaming STX/ETX frame decoder.
pub struct FrameDecoder {
    state: DecoderState,
    text_buf: [u8; MAX_COMMAND_LEN],
    /// Frames abandoned for exceeding `MAX_COMMAND_LEN`.
    oversize_count: u32,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::Idle,
            text_buf: [0; MAX_COMMAND_LEN],
            oversize_count: 0,
        }
    }

    /// Feed bytes into the decoder.
    ///
    /// Returns how many bytes of `data` were consumed and, when a frame
    /// completed, its text. Call again with the unconsumed tail to pick up
    /// any further frames. The text is valid until the next call.
    pub fn feed(&mut self, data: &[u8]) -> (usize, Option<&[u8]>) {
        let mut offset = 0;

        while offset < data.len() {
            let byte = data[offset];
            offset += 1;

            match &mut self.state {
                DecoderState::Idle => {
                    if byte == FRAME_START {
                        self.state = DecoderState::Collecting { len: 0 };
                    }
                }

                DecoderState::Collecting { len } => match byte {
                    // A fresh START abandons the partial frame.
                    FRAME_START => *len = 0,
                    FRAME_STOP => {
                        let n = *len;
                        self.state = DecoderState::Idle;
                        if n > 0 {
                            return (offset, Some(&self.text_buf[..n]));
                        }
                    }
                    _ if *len == MAX_COMMAND_LEN => {
                        warn!("codec: command exceeds {} bytes, dropped", MAX_COMMAND_LEN);
                        self.oversize_count += 1;
                        self.state = DecoderState::Idle;
                    }
                    _ => {
                        self.text_buf[*len] = byte;
                        *len += 1;
                    }
                },
            }
        }

        (offset, None)
    }

    /// Reset decoder state (e.g. after a client reconnects).
    pub fn reset(&mut self) {
        self.state = DecoderState::Idle;
    }

    pub fn oversize_count(&self) -> u32 {
        self.oversize_count
    }
}

/// Wrap command text in START/STOP markers.
///
/// Returns the number of bytes written, or `None` if `out_buf` is too small
/// or the text is longer than a command may be.
pub fn encode_frame(text: &[u8], out_buf: &mut [u8]) -> Option<usize> {
    let total = text.len() + 2;
    if total > out_buf.len() || text.len() > MAX_COMMAND_LEN {
        return None;
    }

    out_buf[0] = FRAME_START;
    out_buf[1..=text.len()].copy_from_slice(text);
    out_buf[total - 1] = FRAME_STOP;
    Some(total)
}

// ───────────────────────────────────────────────────────────────
// Outbound
// ───────────────────────────────────────────────────────────────

/// `io::Write` over a fixed slice. A write that does not fit fails whole.
pub struct FixedWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FixedWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn written(&self) -> usize {
        self.pos
    }
}

impl io::Write for FixedWriter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let end = self.pos + data.len();
        if end > self.buf.len() {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "response buffer full"));
        }
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn serialize_error(e: &serde_json::Error, capacity: usize) -> Error {
    if e.is_io() {
        warn!("codec: response exceeds {} byte buffer", capacity);
        Error::Overflow { capacity }
    } else {
        warn!("codec: serialization failed: {}", e);
        Error::Encode(EncodeError::Failed)
    }
}

/// Serialize `doc` as tab-indented JSON at offset 0.
///
/// Returns the text length. On failure the buffer's valid length is 0.
pub fn write_pretty<T: Serialize>(buf: &mut ResponseBuffer, doc: &T) -> Result<usize> {
    buf.clear();
    let capacity = buf.capacity();

    let mut writer = FixedWriter::new(buf.storage_mut());
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"\t"));
    doc.serialize(&mut ser)
        .map_err(|e| serialize_error(&e, capacity))?;

    let n = writer.written();
    buf.set_len(n);
    Ok(n)
}

/// Serialize `doc` as compact JSON framed `START json STOP NUL`.
///
/// Returns the framed length (START + text + STOP); the trailing NUL is
/// written but not counted. On failure the buffer's valid length is 0.
pub fn write_compact<T: Serialize>(buf: &mut ResponseBuffer, doc: &T) -> Result<usize> {
    buf.clear();
    let capacity = buf.capacity();
    if capacity < 3 {
        return Err(Error::Overflow { capacity });
    }

    let storage = buf.storage_mut();
    storage[0] = FRAME_START;

    // Leave room for STOP and NUL after the text.
    let mut writer = FixedWriter::new(&mut storage[1..capacity - 2]);
    serde_json::to_writer(&mut writer, doc).map_err(|e| serialize_error(&e, capacity))?;
    let n = writer.written();

    storage[n + 1] = FRAME_STOP;
    storage[n + 2] = 0;
    buf.set_len(n + 2);
    Ok(n + 2)
}
