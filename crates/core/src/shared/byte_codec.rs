//! Fixed-width integer encoding for container header fields.
//!
//! Values are composed most-significant byte first and then byte-swapped
//! before emission, so every multi-byte field lands on disk little-endian.

/// Reverses the byte order of a 32-bit value.
pub fn swap_u32(value: u32) -> u32 {
    value.swap_bytes()
}

/// Reverses the byte order of a 16-bit value.
pub fn swap_u16(value: u16) -> u16 {
    value.swap_bytes()
}

/// Appends a 32-bit field in container byte order.
pub fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&swap_u32(value).to_be_bytes());
}

/// Appends a signed 32-bit field (e.g. a quality of `-1`) in container byte order.
pub fn put_i32(buf: &mut Vec<u8>, value: i32) {
    put_u32(buf, value as u32);
}

/// Appends a 16-bit field in container byte order.
pub fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&swap_u16(value).to_be_bytes());
}

/// Reads a 32-bit field written by [`put_u32`] back out of `bytes` at `offset`.
///
/// Returns `None` if fewer than four bytes remain.
pub fn get_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(offset..offset + 4)?.try_into().ok()?;
    Some(swap_u32(u32::from_be_bytes(raw)))
}

/// Reads a 16-bit field written by [`put_u16`] back out of `bytes` at `offset`.
pub fn get_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let raw: [u8; 2] = bytes.get(offset..offset + 2)?.try_into().ok()?;
    Some(swap_u16(u16::from_be_bytes(raw)))
}
