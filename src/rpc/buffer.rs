//! Fixed-capacity response buffers.
//!
//! The command service owns one image-class and one response-class buffer.
//! Builders take `&mut ResponseBuffer`, so at most one build per buffer is
//! in flight. `len` marks the bytes that may be sent; a failed build leaves
//! it at 0.

use crate::config::{IMAGE_TEXT_CAPACITY, RESPONSE_TEXT_CAPACITY};

pub struct ResponseBuffer {
    data: Box<[u8]>,
    len: usize,
}

impl ResponseBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Buffer for pretty-printed image documents.
    pub fn image() -> Self {
        Self::with_capacity(IMAGE_TEXT_CAPACITY)
    }

    /// Buffer for framed status/config/wifi responses.
    pub fn response() -> Self {
        Self::with_capacity(RESPONSE_TEXT_CAPACITY)
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid bytes of the last successful build.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Whole backing store, including bytes past `len`.
    pub(crate) fn storage(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn storage_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub(crate) fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.data.len());
        self.len = len.min(self.data.len());
    }
}

impl core::fmt::Debug for ResponseBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResponseBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .finish()
    }
}
