use crate::container::error::BoxError;
use crate::shared::frame::Frame;

/// Compresses a decoded frame into a standalone still image.
///
/// The AVI writer treats the output as an opaque payload; it must already
/// match the session's dimensions.
pub trait FrameEncoder: Send {
    /// `quality` is in `(0.0, 1.0]`, 1.0 being best.
    fn encode(&self, frame: &Frame, quality: f32) -> Result<Vec<u8>, BoxError>;
}
