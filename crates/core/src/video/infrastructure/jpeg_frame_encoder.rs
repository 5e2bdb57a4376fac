use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::container::error::BoxError;
use crate::shared::frame::Frame;
use crate::video::domain::frame_encoder::FrameEncoder;

/// Baseline JPEG compression using the `image` crate.
pub struct JpegFrameEncoder;

impl JpegFrameEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JpegFrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps `(0.0, 1.0]` onto the encoder's 1-100 scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

impl FrameEncoder for JpegFrameEncoder {
    fn encode(&self, frame: &Frame, quality: f32) -> Result<Vec<u8>, BoxError> {
        let color = match frame.channels() {
            1 => ExtendedColorType::L8,
            3 => ExtendedColorType::Rgb8,
            n => return Err(format!("unsupported channel count for JPEG: {n}").into()),
        };

        let mut buf = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality));
            encoder.encode(frame.data(), frame.width(), frame.height(), color)?;
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn make_frame(width: u32, height: u32, r: u8, g: u8, b: u8) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..(width * height) {
            data.extend_from_slice(&[r, g, b]);
        }
        Frame::new(data, width, height, 3, 0)
    }

    #[test]
    fn test_output_is_jpeg() {
        let bytes = JpegFrameEncoder::new()
            .encode(&make_frame(64, 64, 50, 100, 200), 0.8)
            .unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_decodes_to_same_dimensions() {
        let bytes = JpegFrameEncoder::new()
            .encode(&make_frame(48, 32, 128, 128, 128), 0.9)
            .unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.width(), 48);
        assert_eq!(img.height(), 32);
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        // Noisy content so quality actually matters.
        let data: Vec<u8> = (0..64 * 64 * 3).map(|i| (i * 37 % 251) as u8).collect();
        let frame = Frame::new(data, 64, 64, 3, 0);
        let encoder = JpegFrameEncoder::new();
        let low = encoder.encode(&frame, 0.1).unwrap();
        let high = encoder.encode(&frame, 1.0).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_grayscale_frame() {
        let frame = Frame::new(vec![90u8; 16 * 16], 16, 16, 1, 0);
        let bytes = JpegFrameEncoder::new().encode(&frame, 0.8).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_unsupported_channels_returns_error() {
        let frame = Frame::new(vec![0u8; 4 * 4 * 4], 4, 4, 4, 0);
        assert!(JpegFrameEncoder::new().encode(&frame, 0.8).is_err());
    }

    #[rstest]
    #[case::default(0.8, 80)]
    #[case::best(1.0, 100)]
    #[case::tiny(0.001, 1)]
    #[case::rounds_down(0.554, 55)]
    #[case::rounds_up(0.456, 46)]
    fn test_jpeg_quality_mapping(#[case] quality: f32, #[case] expected: u8) {
        assert_eq!(jpeg_quality(quality), expected);
    }
}
