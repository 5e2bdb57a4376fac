use std::path::Path;

use crate::container::domain::summary::AviSummary;
use crate::container::error::AviError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// A frame on its way into the container: either pixels still to be
/// compressed or an already-compressed image.
#[derive(Clone, Copy, Debug)]
pub enum FramePayload<'a> {
    Pixels { frame: &'a Frame, quality: f32 },
    Encoded(&'a [u8]),
}

/// Abstracts the video output so the pipeline does not depend on a
/// specific container implementation.
pub trait VideoWriter: Send {
    fn open(&mut self, path: &Path, metadata: &VideoMetadata) -> Result<(), AviError>;

    /// Appends one frame and returns the payload length stored for it.
    fn write_payload(&mut self, payload: FramePayload<'_>) -> Result<usize, AviError>;

    /// Compresses `frame` at the writer's default quality.
    fn write(&mut self, frame: &Frame) -> Result<usize, AviError>;

    fn write_encoded(&mut self, data: &[u8]) -> Result<usize, AviError> {
        self.write_payload(FramePayload::Encoded(data))
    }

    /// Finalizes the output. The writer accepts no frames afterwards.
    fn close(&mut self) -> Result<AviSummary, AviError>;
}
