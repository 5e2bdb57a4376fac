use std::path::PathBuf;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// One item produced by a [`VideoReader`].
#[derive(Clone, Debug)]
pub enum SourceFrame {
    Decoded(Frame),
    /// A compressed image taken from the source without decoding.
    Encoded { data: Vec<u8>, index: usize },
}

impl SourceFrame {
    pub fn index(&self) -> usize {
        match self {
            SourceFrame::Decoded(frame) => frame.index(),
            SourceFrame::Encoded { index, .. } => *index,
        }
    }
}

/// Reads frames from a sequence of image sources.
///
/// The returned metadata carries the frame dimensions and count; sources
/// have no intrinsic frame rate, so `fps` is `0.0`.
pub trait VideoReader: Send {
    fn open(&mut self, inputs: &[PathBuf]) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in input order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<SourceFrame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the reader.
    fn close(&mut self);
}
