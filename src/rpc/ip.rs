//! Dotted-quad address codec.
//!
//! Addresses travel as `"a.b.c.d"` text on the wire and are stored as
//! `[d, c, b, a]`: the first octet scanned lands in index 3, matching the
//! network-order layout of the wifi settings.

use core::fmt::{self, Write as _};

use heapless::String;

use crate::error::AddressError;

/// Longest rendering: `"255.255.255.255"`.
pub const IP_TEXT_LEN: usize = 15;

/// Parse `"a.b.c.d"` into the stored layout.
pub fn parse_ip(text: &str) -> Result<[u8; 4], AddressError> {
    let mut octets = [0u8; 4];
    let mut index = 3usize;
    let mut acc: u16 = 0;
    let mut digits = 0usize;

    for c in text.bytes() {
        match c {
            b'.' => {
                if digits == 0 {
                    return Err(AddressError::EmptySegment);
                }
                if index == 0 {
                    return Err(AddressError::TooManySeparators);
                }
                octets[index] = acc as u8;
                index -= 1;
                acc = 0;
                digits = 0;
            }
            b'0'..=b'9' => {
                acc = acc * 10 + u16::from(c - b'0');
                if acc > 255 {
                    return Err(AddressError::OctetOverflow);
                }
                digits += 1;
            }
            _ => return Err(AddressError::InvalidCharacter),
        }
    }

    if index != 0 {
        return Err(AddressError::TooFewSeparators);
    }
    if digits == 0 {
        return Err(AddressError::EmptySegment);
    }
    octets[0] = acc as u8;
    Ok(octets)
}

/// Render a stored address as dotted-quad text.
pub fn format_ip(addr: [u8; 4]) -> String<IP_TEXT_LEN> {
    let mut s = String::new();
    // Capacity covers the longest possible rendering.
    let _ = write!(s, "{}", DottedQuad(addr));
    s
}

/// `Display` adapter for a stored address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DottedQuad(pub [u8; 4]);

impl fmt::Display for DottedQuad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.0;
        write!(f, "{}.{}.{}.{}", a[3], a[2], a[1], a[0])
    }
}
