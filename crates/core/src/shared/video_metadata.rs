use crate::container::domain::header_records::checked_micros_per_frame;
use crate::container::error::AviError;

/// Parameters fixed for the lifetime of one AVI session.
///
/// `total_frames` is only a hint for the provisional header; the finished
/// file always declares the number of frames actually written.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
}

impl VideoMetadata {
    pub fn new(width: u32, height: u32, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            total_frames: 0,
        }
    }

    pub fn with_total_frames(mut self, total_frames: usize) -> Self {
        self.total_frames = total_frames;
        self
    }

    pub fn validate(&self) -> Result<(), AviError> {
        if self.width == 0 || self.height == 0 {
            return Err(AviError::InvalidParameter {
                name: "dimensions",
                reason: format!("{}x{} has a zero side", self.width, self.height),
            });
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(AviError::InvalidParameter {
                name: "frame rate",
                reason: format!("must be a positive number, got {}", self.fps),
            });
        }
        if checked_micros_per_frame(self.fps).is_none() {
            return Err(AviError::InvalidParameter {
                name: "frame rate",
                reason: format!(
                    "{} fps gives a frame interval outside 1..=4294967295 microseconds",
                    self.fps
                ),
            });
        }
        Ok(())
    }
}
