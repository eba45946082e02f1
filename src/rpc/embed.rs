//! Base64 embedding of binary capture buffers.
//!
//! Radiometric frames are too large to duplicate, so each encoding is
//! produced in two phases and handed to the response tree by reference:
//!
//! ```text
//!  query ──▶ allocate (ScratchRegion) ──▶ encode ──▶ EncodedText
//!    │             │                        │            │
//!    │             └── Error::Allocation    │            └── borrowed by
//!    └── required length                    └── Error::Encode   the response
//! ```
//!
//! A [`ScratchBuf`] returns its bytes to the region when dropped, so every
//! exit path (including an encode failure, or a telemetry failure after
//! the image succeeded) releases each allocation exactly once.

use core::cell::Cell;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::{debug, error};
use serde::{Serialize, Serializer};

use crate::error::{EncodeError, Error, Result};

// ───────────────────────────────────────────────────────────────
// Encode primitive
// ───────────────────────────────────────────────────────────────

/// A base64 encoder with the size-query calling convention: called with
/// an output slice that is too small (typically empty), it reports the
/// required length in [`EncodeError::BufferTooSmall`].
pub trait EncodePrimitive {
    /// Encode `input` into `out`, returning the number of bytes written.
    fn encode(&self, input: &[u8], out: &mut [u8]) -> core::result::Result<usize, EncodeError>;
}

/// Standard padded base64 backed by the `base64` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardBase64;

impl EncodePrimitive for StandardBase64 {
    fn encode(&self, input: &[u8], out: &mut [u8]) -> core::result::Result<usize, EncodeError> {
        let required = base64::encoded_len(input.len(), true).ok_or(EncodeError::InputTooLarge)?;
        if out.len() < required {
            return Err(EncodeError::BufferTooSmall { required });
        }
        STANDARD
            .encode_slice(input, out)
            .map_err(|_| EncodeError::Failed)
    }
}

// ───────────────────────────────────────────────────────────────
// Scratch region
// ───────────────────────────────────────────────────────────────

/// Byte-budgeted region for encoded text (PSRAM on the device).
///
/// Single-threaded: allocations and releases are tracked with `Cell`s so
/// the exactly-once release contract can be observed.
#[derive(Debug)]
pub struct ScratchRegion {
    capacity: usize,
    in_use: Cell<usize>,
    live: Cell<usize>,
    releases: Cell<usize>,
}

impl ScratchRegion {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            in_use: Cell::new(0),
            live: Cell::new(0),
            releases: Cell::new(0),
        }
    }

    /// Allocate exactly `len` bytes.
    pub fn allocate(&self, len: usize) -> Result<ScratchBuf<'_>> {
        let in_use = self.in_use.get();
        if len > self.capacity - in_use {
            error!("scratch: {} bytes requested, {} free", len, self.capacity - in_use);
            return Err(Error::Allocation { requested: len });
        }

        let mut data = Vec::new();
        if data.try_reserve_exact(len).is_err() {
            error!("scratch: allocator refused {} bytes", len);
            return Err(Error::Allocation { requested: len });
        }
        data.resize(len, 0);

        self.in_use.set(in_use + len);
        self.live.set(self.live.get() + 1);
        Ok(ScratchBuf { region: self, data })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently allocated.
    pub fn in_use(&self) -> usize {
        self.in_use.get()
    }

    /// Allocations not yet released.
    pub fn live(&self) -> usize {
        self.live.get()
    }

    /// Releases since the region was created.
    pub fn releases(&self) -> usize {
        self.releases.get()
    }

    fn release(&self, len: usize) {
        self.in_use.set(self.in_use.get() - len);
        self.live.set(self.live.get() - 1);
        self.releases.set(self.releases.get() + 1);
    }
}

/// One allocation from a [`ScratchRegion`], released on drop.
#[derive(Debug)]
pub struct ScratchBuf<'r> {
    region: &'r ScratchRegion,
    data: Vec<u8>,
}

impl ScratchBuf<'_> {
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Release now instead of at end of scope.
    pub fn release(self) {}
}

impl Drop for ScratchBuf<'_> {
    fn drop(&mut self) {
        self.region.release(self.data.len());
    }
}

// ───────────────────────────────────────────────────────────────
// Embedding
// ───────────────────────────────────────────────────────────────

/// Base64 text held in scratch memory. Serializes as a JSON string
/// without copying.
#[derive(Debug)]
pub struct EncodedText<'r> {
    buf: ScratchBuf<'r>,
    len: usize,
}

impl EncodedText<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.as_slice()[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return the scratch allocation to its region.
    pub fn release(self) {}
}

impl Serialize for EncodedText<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let text = core::str::from_utf8(self.as_bytes()).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(text)
    }
}

/// Encode `input` into a fresh scratch allocation of exactly the size the
/// primitive asks for.
pub fn embed<'r>(
    region: &'r ScratchRegion,
    codec: &impl EncodePrimitive,
    input: &[u8],
) -> Result<EncodedText<'r>> {
    let required = match codec.encode(input, &mut []) {
        Ok(n) => n,
        Err(EncodeError::BufferTooSmall { required }) => required,
        Err(e) => {
            error!("base64: size query failed: {}", e);
            return Err(e.into());
        }
    };

    let mut buf = region.allocate(required)?;
    let len = match codec.encode(input, buf.as_mut_slice()) {
        Ok(len) => len,
        Err(e) => {
            // `buf` drops here, before anything can reference it.
            error!("base64: failed to encode {} bytes: {}", input.len(), e);
            return Err(e.into());
        }
    };

    debug!("base64: {} bytes -> {} chars", input.len(), len);
    Ok(EncodedText { buf, len: len.min(required) })
}
