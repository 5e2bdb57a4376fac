use super::fourcc::{IDX1, VIDEO_CHUNK};
use super::header_records::CHUNK_HEADER_LEN;
use crate::container::error::AviError;
use crate::shared::byte_codec::put_u32;

/// Bytes per `idx1` entry: FourCC, flags, offset, size.
pub const INDEX_ENTRY_LEN: u32 = 16;

/// AVIIF_KEYFRAME. Every MJPG frame decodes on its own.
pub const INDEX_FLAGS: u32 = 0x10;

fn index_payload_len(entries: usize) -> Option<u32> {
    u32::try_from(entries)
        .ok()
        .and_then(|n| n.checked_mul(INDEX_ENTRY_LEN))
}

/// One `idx1` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// Stream position of the chunk's `00db` tag.
    pub offset: u32,
    /// Payload length without padding.
    pub size: u32,
}

/// Accumulates frame chunk locations in write order for the trailing index.
#[derive(Clone, Debug, Default)]
pub struct IndexBuilder {
    entries: Vec<IndexEntry>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, offset: u32, size: u32) {
        self.entries.push(IndexEntry { offset, size });
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the `idx1` length field, or `None` once it no longer fits
    /// in 32 bits.
    pub fn payload_len(&self) -> Option<u32> {
        index_payload_len(self.entries.len())
    }

    /// Bytes the serialized block occupies, header included.
    pub fn block_len(&self) -> u64 {
        CHUNK_HEADER_LEN as u64 + INDEX_ENTRY_LEN as u64 * self.entries.len() as u64
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, AviError> {
        let payload_len = self.payload_len().ok_or(AviError::SizeOverflow {
            field: "index size",
            value: self.block_len() - CHUNK_HEADER_LEN as u64,
        })?;
        let mut buf = Vec::with_capacity(self.block_len() as usize);
        buf.extend_from_slice(IDX1.as_bytes());
        put_u32(&mut buf, payload_len);
        for entry in &self.entries {
            buf.extend_from_slice(VIDEO_CHUNK.as_bytes());
            put_u32(&mut buf, INDEX_FLAGS);
            put_u32(&mut buf, entry.offset);
            put_u32(&mut buf, entry.size);
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::byte_codec::get_u32;

    #[test]
    fn test_empty_index_is_header_only() {
        let index = IndexBuilder::new();
        let bytes = index.to_bytes().unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], b"idx1");
        assert_eq!(get_u32(&bytes, 4), Some(0));
        assert!(index.is_empty());
    }

    #[test]
    fn test_entries_serialized_in_insertion_order() {
        let mut index = IndexBuilder::new();
        index.append(2048, 500);
        index.append(2560, 37);
        index.append(2606, 1000);

        let bytes = index.to_bytes().unwrap();
        assert_eq!(bytes.len() as u64, index.block_len());
        assert_eq!(get_u32(&bytes, 4), Some(48));

        let expected = [(2048, 500), (2560, 37), (2606, 1000)];
        for (i, (offset, size)) in expected.iter().enumerate() {
            let at = 8 + i * INDEX_ENTRY_LEN as usize;
            assert_eq!(&bytes[at..at + 4], b"00db");
            assert_eq!(get_u32(&bytes, at + 4), Some(INDEX_FLAGS));
            assert_eq!(get_u32(&bytes, at + 8), Some(*offset));
            assert_eq!(get_u32(&bytes, at + 12), Some(*size));
        }
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let mut a = IndexBuilder::new();
        let mut b = IndexBuilder::new();
        for (offset, size) in [(10, 1), (30, 2)] {
            a.append(offset, size);
            b.append(offset, size);
        }
        assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
        assert_eq!(a.to_bytes().unwrap(), a.to_bytes().unwrap());
    }

    #[test]
    fn test_payload_len_limits() {
        assert_eq!(index_payload_len(0), Some(0));
        assert_eq!(index_payload_len(3), Some(48));
        assert_eq!(index_payload_len(268_435_455), Some(u32::MAX - 15));
        assert_eq!(index_payload_len(268_435_456), None);
        assert_eq!(index_payload_len(usize::MAX), None);
    }

    #[test]
    fn test_len_tracks_appends() {
        let mut index = IndexBuilder::new();
        index.append(0, 0);
        index.append(16, 0);
        assert_eq!(index.len(), 2);
        assert_eq!(index.entries()[1], IndexEntry { offset: 16, size: 0 });
    }
}
