use std::fmt;

/// A four-character chunk identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const fn new(tag: &[u8; 4]) -> Self {
        Self(*tag)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc({self})")
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

pub const RIFF: FourCc = FourCc::new(b"RIFF");
pub const AVI: FourCc = FourCc::new(b"AVI ");
pub const LIST: FourCc = FourCc::new(b"LIST");
pub const HDRL: FourCc = FourCc::new(b"hdrl");
pub const AVIH: FourCc = FourCc::new(b"avih");
pub const STRL: FourCc = FourCc::new(b"strl");
pub const STRH: FourCc = FourCc::new(b"strh");
pub const STRF: FourCc = FourCc::new(b"strf");
pub const VIDS: FourCc = FourCc::new(b"vids");
pub const MJPG: FourCc = FourCc::new(b"MJPG");
pub const JUNK: FourCc = FourCc::new(b"JUNK");
pub const MOVI: FourCc = FourCc::new(b"movi");
pub const IDX1: FourCc = FourCc::new(b"idx1");
/// Compressed video data for stream 0.
pub const VIDEO_CHUNK: FourCc = FourCc::new(b"00db");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_ascii() {
        assert_eq!(AVI.to_string(), "AVI ");
        assert_eq!(VIDEO_CHUNK.to_string(), "00db");
    }

    #[test]
    fn test_display_escapes_non_printable() {
        let tag = FourCc([b'a', 0, b'b', 0xFF]);
        assert_eq!(tag.to_string(), "a\\x00b\\xff");
    }

    #[test]
    fn test_debug_wraps_display() {
        assert_eq!(format!("{:?}", MOVI), "FourCc(movi)");
    }
}
