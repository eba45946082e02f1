//! Transport abstraction: any byte-oriented channel.
//!
//! Concrete implementations:
//! - TCP socket to the host application (over WiFi)
//! - File on the SD card (image documents only)
//!
//! The command service is generic over `Transport`, so the protocol layer
//! never touches sockets or files directly.

use std::io;

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write all of `data`.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Adapts any `std::io` stream (a `TcpStream`, a `File`).
///
/// `WouldBlock` on a non-blocking stream reads as "no data"; a zero-length
/// read means the peer closed and reports `UnexpectedEof`.
pub struct IoTransport<S> {
    stream: S,
}

impl<S> IoTransport<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: io::Read + io::Write> Transport for IoTransport<S> {
    type Error = io::ErrorKind;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::ErrorKind> {
        match self.stream.read(buf) {
            Ok(0) if !buf.is_empty() => Err(io::ErrorKind::UnexpectedEof),
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e.kind()),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, io::ErrorKind> {
        self.stream.write_all(data).map_err(|e| e.kind())?;
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), io::ErrorKind> {
        self.stream.flush().map_err(|e| e.kind())
    }
}
