//! Fixed-layout AVI header records.
//!
//! Each record is plain data plus a `to_bytes` that emits its exact on-disk
//! layout. Records with fields derived from the session (frame count, sizes,
//! frame timing) are rebuilt through [`HeaderBlock::refresh`], so the
//! provisional and final header writes share one layout and differ only in
//! those values.

use super::fourcc::{
    FourCc, AVI, AVIH, HDRL, JUNK, LIST, MJPG, MOVI, RIFF, STRF, STRH, STRL, VIDS,
};
use crate::shared::byte_codec::{put_i32, put_u16, put_u32};

/// Bytes reserved by the `JUNK` filler so the header area has a fixed size.
pub const JUNK_SIZE: u32 = 1808;

/// Size of a chunk preamble: FourCC plus 32-bit length.
pub const CHUNK_HEADER_LEN: u32 = 8;

/// `hdrl` list payload: list type + `avih` chunk + `strl` list.
pub const HEADER_LIST_SIZE: u32 =
    4 + (CHUNK_HEADER_LEN + MAIN_HEADER_BODY_LEN) + CHUNK_HEADER_LEN + STREAM_LIST_SIZE;

/// `strl` list payload: list type + `strh` chunk + `strf` chunk.
pub const STREAM_LIST_SIZE: u32 =
    4 + (CHUNK_HEADER_LEN + STREAM_HEADER_BODY_LEN) + (CHUNK_HEADER_LEN + STREAM_FORMAT_BODY_LEN);

pub const MAIN_HEADER_BODY_LEN: u32 = 56;
pub const STREAM_HEADER_BODY_LEN: u32 = 64;
pub const STREAM_FORMAT_BODY_LEN: u32 = 40;

/// Length of everything written before the `movi` list marker.
pub const HEADER_BLOCK_LEN: u32 =
    12 + CHUNK_HEADER_LEN + HEADER_LIST_SIZE + CHUNK_HEADER_LEN + JUNK_SIZE;

/// Length of the `LIST <size> movi` marker.
pub const MOVIE_LIST_HEADER_LEN: u32 = 12;

const MAX_BYTES_PER_SEC: u32 = 10_000_000;
/// AVIF_HASINDEX | AVIF_ISINTERLEAVED
const MAIN_HEADER_FLAGS: u32 = 0x0001_0010;
const STREAM_RATE: u32 = 1_000_000;
const BITS_PER_PIXEL: u16 = 24;

/// Microseconds between frames, rounded to the nearest microsecond.
///
/// Callers validate the rate with [`checked_micros_per_frame`] first; out of
/// range rates saturate here.
pub fn micros_per_frame(fps: f64) -> u32 {
    (1_000_000.0 / fps).round() as u32
}

/// `None` unless the rounded interval is a nonzero value that fits the
/// 32-bit `avih`/`strh` fields.
pub fn checked_micros_per_frame(fps: f64) -> Option<u32> {
    let micros = (1_000_000.0 / fps).round();
    (1.0..=u32::MAX as f64)
        .contains(&micros)
        .then_some(micros as u32)
}

/// Session values that header records derive their fields from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeaderFields {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: u32,
    /// RIFF payload size (file length minus the 8-byte RIFF preamble).
    pub riff_size: u32,
    pub movie_list_size: u32,
}

/// `RIFF <size> AVI `
#[derive(Clone, Debug, PartialEq)]
pub struct RiffHeader {
    pub riff_size: u32,
}

impl RiffHeader {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(12);
        buf.extend_from_slice(RIFF.as_bytes());
        put_u32(&mut buf, self.riff_size);
        buf.extend_from_slice(AVI.as_bytes());
        buf
    }
}

/// A `LIST <size> <type>` marker. The list's children follow it in the stream.
#[derive(Clone, Debug, PartialEq)]
pub struct ListHeader {
    pub list_type: FourCc,
    pub size: u32,
}

impl ListHeader {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(12);
        buf.extend_from_slice(LIST.as_bytes());
        put_u32(&mut buf, self.size);
        buf.extend_from_slice(self.list_type.as_bytes());
        buf
    }
}

/// `avih`: global movie parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct MainHeader {
    pub micro_sec_per_frame: u32,
    pub total_frames: u32,
    pub width: u32,
    pub height: u32,
}

impl MainHeader {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity((CHUNK_HEADER_LEN + MAIN_HEADER_BODY_LEN) as usize);
        buf.extend_from_slice(AVIH.as_bytes());
        put_u32(&mut buf, MAIN_HEADER_BODY_LEN);
        put_u32(&mut buf, self.micro_sec_per_frame);
        put_u32(&mut buf, MAX_BYTES_PER_SEC);
        put_u32(&mut buf, 0); // padding granularity
        put_u32(&mut buf, MAIN_HEADER_FLAGS);
        put_u32(&mut buf, self.total_frames);
        put_u32(&mut buf, 0); // initial frames
        put_u32(&mut buf, 1); // streams
        put_u32(&mut buf, 0); // suggested buffer size
        put_u32(&mut buf, self.width);
        put_u32(&mut buf, self.height);
        for _ in 0..4 {
            put_u32(&mut buf, 0);
        }
        buf
    }
}

/// `strh`: the single video stream, timed as `rate / scale` frames per second.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamHeader {
    pub scale: u32,
    pub length: u32,
}

impl StreamHeader {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity((CHUNK_HEADER_LEN + STREAM_HEADER_BODY_LEN) as usize);
        buf.extend_from_slice(STRH.as_bytes());
        put_u32(&mut buf, STREAM_HEADER_BODY_LEN);
        buf.extend_from_slice(VIDS.as_bytes());
        buf.extend_from_slice(MJPG.as_bytes());
        put_u32(&mut buf, 0); // flags
        put_u16(&mut buf, 0); // priority
        put_u16(&mut buf, 0); // language
        put_u32(&mut buf, 0); // initial frames
        put_u32(&mut buf, self.scale);
        put_u32(&mut buf, STREAM_RATE);
        put_u32(&mut buf, 0); // start
        put_u32(&mut buf, self.length);
        put_u32(&mut buf, 0); // suggested buffer size
        put_i32(&mut buf, -1); // quality: driver default
        put_u32(&mut buf, 0); // sample size
        // rcFrame left, top, right, bottom
        for _ in 0..4 {
            put_u32(&mut buf, 0);
        }
        buf
    }
}

/// `strf`: a BITMAPINFOHEADER describing MJPG frames.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamFormat {
    pub width: u32,
    pub height: u32,
}

impl StreamFormat {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity((CHUNK_HEADER_LEN + STREAM_FORMAT_BODY_LEN) as usize);
        buf.extend_from_slice(STRF.as_bytes());
        put_u32(&mut buf, STREAM_FORMAT_BODY_LEN);
        put_u32(&mut buf, STREAM_FORMAT_BODY_LEN); // biSize
        put_u32(&mut buf, self.width);
        put_u32(&mut buf, self.height);
        put_u16(&mut buf, 1); // planes
        put_u16(&mut buf, BITS_PER_PIXEL);
        buf.extend_from_slice(MJPG.as_bytes());
        put_u32(&mut buf, self.width.wrapping_mul(self.height));
        put_u32(&mut buf, 0); // x pixels per meter
        put_u32(&mut buf, 0); // y pixels per meter
        put_u32(&mut buf, 0); // colors used
        put_u32(&mut buf, 0); // colors important
        buf
    }
}

/// `JUNK`: zero filler reserving the rest of the header area.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Junk;

impl Junk {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity((CHUNK_HEADER_LEN + JUNK_SIZE) as usize);
        buf.extend_from_slice(JUNK.as_bytes());
        put_u32(&mut buf, JUNK_SIZE);
        buf.resize(buf.len() + JUNK_SIZE as usize, 0);
        buf
    }
}

/// Every record written ahead of the frame data, in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderBlock {
    pub riff: RiffHeader,
    pub header_list: ListHeader,
    pub main: MainHeader,
    pub stream_list: ListHeader,
    pub stream: StreamHeader,
    pub format: StreamFormat,
    pub junk: Junk,
    pub movie_list: ListHeader,
}

impl HeaderBlock {
    pub fn new(fields: &HeaderFields) -> Self {
        let mut block = Self {
            riff: RiffHeader { riff_size: 0 },
            header_list: ListHeader {
                list_type: HDRL,
                size: HEADER_LIST_SIZE,
            },
            main: MainHeader {
                micro_sec_per_frame: 0,
                total_frames: 0,
                width: 0,
                height: 0,
            },
            stream_list: ListHeader {
                list_type: STRL,
                size: STREAM_LIST_SIZE,
            },
            stream: StreamHeader {
                scale: 0,
                length: 0,
            },
            format: StreamFormat {
                width: 0,
                height: 0,
            },
            junk: Junk,
            movie_list: ListHeader {
                list_type: MOVI,
                size: 0,
            },
        };
        block.refresh(fields);
        block
    }

    /// Recomputes every derived field from the current session values.
    pub fn refresh(&mut self, fields: &HeaderFields) {
        let micros = micros_per_frame(fields.fps);
        self.riff.riff_size = fields.riff_size;
        self.main.micro_sec_per_frame = micros;
        self.main.total_frames = fields.frame_count;
        self.main.width = fields.width;
        self.main.height = fields.height;
        self.stream.scale = micros;
        self.stream.length = fields.frame_count;
        self.format.width = fields.width;
        self.format.height = fields.height;
        self.movie_list.size = fields.movie_list_size;
    }

    /// Records up to and including the `JUNK` filler.
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_BLOCK_LEN as usize);
        buf.extend(self.riff.to_bytes());
        buf.extend(self.header_list.to_bytes());
        buf.extend(self.main.to_bytes());
        buf.extend(self.stream_list.to_bytes());
        buf.extend(self.stream.to_bytes());
        buf.extend(self.format.to_bytes());
        buf.extend(self.junk.to_bytes());
        buf
    }

    /// Header records followed by the `movi` list marker.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.header_bytes();
        buf.extend(self.movie_list.to_bytes());
        buf
    }
}
