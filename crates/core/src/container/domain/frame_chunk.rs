use super::fourcc::VIDEO_CHUNK;
use super::header_records::CHUNK_HEADER_LEN;
use crate::shared::byte_codec::swap_u32;

/// Layout of one `00db` frame chunk written at a given stream position.
///
/// The padding is `(payload_len + position) % 4` zero bytes, computed from
/// the position *before* the chunk header. The declared chunk length covers
/// payload plus padding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameChunk {
    pub position: u32,
    pub payload_len: u32,
    pub padding: u32,
}

impl FrameChunk {
    pub fn new(payload_len: u32, position: u32) -> Self {
        let padding = ((payload_len as u64 + position as u64) % 4) as u32;
        Self {
            position,
            payload_len,
            padding,
        }
    }

    /// Length declared in the chunk header.
    pub fn padded_len(&self) -> u64 {
        self.payload_len as u64 + self.padding as u64
    }

    /// Bytes the chunk occupies in the stream, header included.
    pub fn total_len(&self) -> u64 {
        CHUNK_HEADER_LEN as u64 + self.padded_len()
    }

    /// `00db` followed by the declared length, or `None` if the padded
    /// length does not fit the 32-bit field.
    pub fn header_bytes(&self) -> Option<[u8; 8]> {
        let padded_len = u32::try_from(self.padded_len()).ok()?;
        let mut out = [0u8; 8];
        out[..4].copy_from_slice(VIDEO_CHUNK.as_bytes());
        out[4..].copy_from_slice(&swap_u32(padded_len).to_be_bytes());
        Some(out)
    }
}
