//! Content addressing
//!
//! Derives a nested storage path from an identifier. The 16 raw bytes are
//! encoded with the RFC 4648 base-32 alphabet, padding is dropped, and the
//! resulting characters are split into 4-character path segments. The mapping
//! needs no lookup table: the identifier alone locates its content.

use crate::types::Id;

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Characters per path segment.
pub const SEGMENT_LEN: usize = 4;

/// Unpadded RFC 4648 base-32 encoding.
fn base32_unpadded(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u16 = 0;
    let mut bits = 0u32;
    for &byte in bytes {
        buffer = (buffer << 8) | u16::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

/// Storage path for an identifier, e.g. `/NOT3/QEE5/VUI5/DAFU/ADAE/7VBQ/ZA`.
pub fn path_for(id: &Id) -> String {
    let encoded = base32_unpadded(id.as_bytes());
    let mut path = String::with_capacity(encoded.len() + encoded.len() / SEGMENT_LEN + 1);
    for (i, c) in encoded.chars().enumerate() {
        if i % SEGMENT_LEN == 0 {
            path.push('/');
        }
        path.push(c);
    }
    path
}
