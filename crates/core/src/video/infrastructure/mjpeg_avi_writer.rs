use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::container::domain::summary::AviSummary;
use crate::container::error::AviError;
use crate::container::infrastructure::avi_writer::AviWriter;
use crate::shared::constants::DEFAULT_JPEG_QUALITY;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_encoder::FrameEncoder;
use crate::video::domain::video_writer::{FramePayload, VideoWriter};

/// Writes Motion-JPEG AVI files from pixel frames or ready-made JPEGs.
///
/// Pixel frames go through the injected [`FrameEncoder`]; compressed
/// payloads are forwarded untouched. Frames are never resized, so a frame
/// whose dimensions differ from the session's ends up as a malformed
/// picture in the stream.
pub struct MjpegAviWriter {
    encoder: Box<dyn FrameEncoder>,
    default_quality: f32,
    session: Option<AviWriter<BufWriter<File>>>,
}

impl MjpegAviWriter {
    pub fn new(encoder: Box<dyn FrameEncoder>) -> Self {
        Self {
            encoder,
            default_quality: DEFAULT_JPEG_QUALITY,
            session: None,
        }
    }

    pub fn with_quality(mut self, quality: f32) -> Result<Self, AviError> {
        validate_quality(quality)?;
        self.default_quality = quality;
        Ok(self)
    }

    pub fn default_quality(&self) -> f32 {
        self.default_quality
    }

    /// Frames written in the current (or last) session.
    pub fn frame_count(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.frame_count())
    }

    fn compress(
        &self,
        frame: &Frame,
        quality: f32,
        session: &VideoMetadata,
    ) -> Result<Vec<u8>, AviError> {
        validate_quality(quality)?;
        if frame.dimensions() != (session.width, session.height) {
            log::warn!(
                "frame {} is {}x{} but the stream is {}x{}",
                frame.index(),
                frame.width(),
                frame.height(),
                session.width,
                session.height
            );
        }
        let data = self
            .encoder
            .encode(frame, quality)
            .map_err(AviError::Encode)?;
        if data.is_empty() {
            return Err(AviError::EmptyFrame);
        }
        Ok(data)
    }
}

fn validate_quality(quality: f32) -> Result<(), AviError> {
    if quality > 0.0 && quality <= 1.0 {
        Ok(())
    } else {
        Err(AviError::InvalidParameter {
            name: "quality",
            reason: format!("must be in (0.0, 1.0], got {quality}"),
        })
    }
}

impl VideoWriter for MjpegAviWriter {
    fn open(&mut self, path: &Path, metadata: &VideoMetadata) -> Result<(), AviError> {
        if let Some(previous) = self.session.take() {
            if !previous.is_finalized() {
                log::warn!("reopening MjpegAviWriter discards an unfinished session");
            }
        }
        self.session = Some(AviWriter::create(path, metadata)?);
        Ok(())
    }

    fn write_payload(&mut self, payload: FramePayload<'_>) -> Result<usize, AviError> {
        let session = self.session.as_ref().ok_or(AviError::NotOpen)?;
        session.ensure_streaming()?;

        let compressed;
        let bytes = match payload {
            FramePayload::Encoded(data) => data,
            FramePayload::Pixels { frame, quality } => {
                compressed = self.compress(frame, quality, session.metadata())?;
                compressed.as_slice()
            }
        };

        self.session
            .as_mut()
            .ok_or(AviError::NotOpen)?
            .write_frame(bytes)?;
        Ok(bytes.len())
    }

    fn write(&mut self, frame: &Frame) -> Result<usize, AviError> {
        let quality = self.default_quality;
        self.write_payload(FramePayload::Pixels { frame, quality })
    }

    fn close(&mut self) -> Result<AviSummary, AviError> {
        self.session.as_mut().ok_or(AviError::NotOpen)?.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::error::BoxError;
    use crate::shared::byte_codec::get_u32;
    use crate::video::infrastructure::jpeg_frame_encoder::JpegFrameEncoder;
    use std::sync::{Arc, Mutex};

    fn metadata(w: u32, h: u32, fps: f64) -> VideoMetadata {
        VideoMetadata::new(w, h, fps)
    }

    fn solid_frame(index: usize, w: u32, h: u32, value: u8) -> Frame {
        let data = vec![value; (w * h * 3) as usize];
        Frame::new(data, w, h, 3, index)
    }

    /// Records requested qualities and returns a fixed payload.
    struct StubEncoder {
        output: Vec<u8>,
        qualities: Arc<Mutex<Vec<f32>>>,
    }

    impl FrameEncoder for StubEncoder {
        fn encode(&self, _frame: &Frame, quality: f32) -> Result<Vec<u8>, BoxError> {
            self.qualities.lock().unwrap().push(quality);
            Ok(self.output.clone())
        }
    }

    struct FailingEncoder;

    impl FrameEncoder for FailingEncoder {
        fn encode(&self, _frame: &Frame, _quality: f32) -> Result<Vec<u8>, BoxError> {
            Err("compressor crashed".into())
        }
    }

    fn stub_writer(output: Vec<u8>) -> (MjpegAviWriter, Arc<Mutex<Vec<f32>>>) {
        let qualities = Arc::new(Mutex::new(Vec::new()));
        let encoder = StubEncoder {
            output,
            qualities: qualities.clone(),
        };
        (MjpegAviWriter::new(Box::new(encoder)), qualities)
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");

        let mut writer = MjpegAviWriter::new(Box::new(JpegFrameEncoder::new()));
        writer.open(&path, &metadata(64, 64, 10.0)).unwrap();
        for i in 0..3 {
            writer.write(&solid_frame(i, 64, 64, 128)).unwrap();
        }
        let summary = writer.close().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(summary.frame_count, 3);
        assert_eq!(bytes.len() as u64, summary.file_size);
        assert_eq!(get_u32(&bytes, 48), Some(3));
    }

    #[test]
    fn test_frames_decode_from_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");

        let mut writer = MjpegAviWriter::new(Box::new(JpegFrameEncoder::new()));
        writer.open(&path, &metadata(32, 24, 25.0)).unwrap();
        writer.write(&solid_frame(0, 32, 24, 200)).unwrap();
        let summary = writer.close().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let idx_at = bytes.len() - summary.index_size as usize;
        let offset = get_u32(&bytes, idx_at + 16).unwrap() as usize;
        let size = get_u32(&bytes, idx_at + 20).unwrap() as usize;
        let jpeg = &bytes[offset + 8..offset + 8 + size];
        let img = image::load_from_memory(jpeg).unwrap();
        assert_eq!((img.width(), img.height()), (32, 24));
    }

    #[test]
    fn test_encoded_payload_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");
        let (mut writer, qualities) = stub_writer(vec![1, 2, 3]);

        writer.open(&path, &metadata(16, 16, 10.0)).unwrap();
        let written = writer.write_encoded(&[0xFF, 0xD8, 0xFF, 0xD9]).unwrap();
        writer.close().unwrap();

        assert_eq!(written, 4);

        assert!(qualities.lock().unwrap().is_empty());
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[2056..2060], &[0xFF, 0xD8, 0xFF, 0xD9]);
    }

    #[test]
    fn test_default_and_explicit_quality_reach_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, qualities) = stub_writer(vec![0xFF, 0xD8]);
        let mut writer = writer.with_quality(0.6).unwrap();

        writer
            .open(&dir.path().join("out.avi"), &metadata(8, 8, 10.0))
            .unwrap();
        let frame = solid_frame(0, 8, 8, 0);
        writer.write(&frame).unwrap();
        writer
            .write_payload(FramePayload::Pixels {
                frame: &frame,
                quality: 0.25,
            })
            .unwrap();

        assert_eq!(*qualities.lock().unwrap(), vec![0.6, 0.25]);
        assert_eq!(writer.frame_count(), 2);
    }

    #[test]
    fn test_default_quality() {
        let (writer, _) = stub_writer(vec![1]);
        assert_eq!(writer.default_quality(), DEFAULT_JPEG_QUALITY);
    }

    #[test]
    fn test_invalid_quality_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (mut writer, qualities) = stub_writer(vec![1]);
        writer
            .open(&dir.path().join("out.avi"), &metadata(8, 8, 10.0))
            .unwrap();

        for quality in [0.0, -0.5, 1.5, f32::NAN] {
            let frame = solid_frame(0, 8, 8, 0);
            let err = writer
                .write_payload(FramePayload::Pixels {
                    frame: &frame,
                    quality,
                })
                .unwrap_err();
            assert!(matches!(err, AviError::InvalidParameter { .. }));
        }
        assert!(qualities.lock().unwrap().is_empty());
        assert!(MjpegAviWriter::new(Box::new(FailingEncoder))
            .with_quality(0.0)
            .is_err());
    }

    #[test]
    fn test_encoder_failure_leaves_session_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");
        let mut writer = MjpegAviWriter::new(Box::new(FailingEncoder));
        writer.open(&path, &metadata(8, 8, 10.0)).unwrap();

        let err = writer.write(&solid_frame(0, 8, 8, 0)).unwrap_err();
        assert!(matches!(err, AviError::Encode(_)));
        assert_eq!(writer.frame_count(), 0);

        // The session is still usable for pre-compressed frames.
        writer.write_encoded(&[0xFF, 0xD8]).unwrap();
        let summary = writer.close().unwrap();
        assert_eq!(summary.frame_count, 1);
    }

    #[test]
    fn test_empty_encoder_output_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (mut writer, _) = stub_writer(Vec::new());
        writer
            .open(&dir.path().join("out.avi"), &metadata(8, 8, 10.0))
            .unwrap();

        let err = writer.write(&solid_frame(0, 8, 8, 0)).unwrap_err();
        assert!(matches!(err, AviError::EmptyFrame));
        assert_eq!(writer.frame_count(), 0);
    }

    #[test]
    fn test_write_without_open_returns_error() {
        let (mut writer, _) = stub_writer(vec![1]);
        let err = writer.write(&solid_frame(0, 8, 8, 0)).unwrap_err();
        assert!(matches!(err, AviError::NotOpen));
        assert!(matches!(writer.close(), Err(AviError::NotOpen)));
    }

    #[test]
    fn test_write_after_close_is_state_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut writer, qualities) = stub_writer(vec![1]);
        writer
            .open(&dir.path().join("out.avi"), &metadata(8, 8, 10.0))
            .unwrap();
        writer.close().unwrap();

        let err = writer.write(&solid_frame(0, 8, 8, 0)).unwrap_err();
        assert!(err.is_state_error());
        assert!(qualities.lock().unwrap().is_empty());
        assert!(matches!(writer.close(), Err(AviError::Finalized)));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_aborted_session_skips_encoding() {
        let device = Path::new("/dev/full");
        if !device.exists() {
            return;
        }
        let (mut writer, qualities) = stub_writer(vec![0xFF, 0xD8]);
        writer.open(device, &metadata(8, 8, 10.0)).unwrap();

        // Larger than the write buffer, so the header is flushed and fails.
        let err = writer.write_encoded(&vec![0xAB; 64 * 1024]).unwrap_err();
        assert!(matches!(err, AviError::Io { .. }));

        let err = writer.write(&solid_frame(0, 8, 8, 0)).unwrap_err();
        assert!(matches!(err, AviError::Aborted));
        assert!(qualities.lock().unwrap().is_empty());
        assert!(matches!(writer.close(), Err(AviError::Aborted)));
    }

    #[test]
    fn test_mismatched_frame_is_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let (mut writer, _) = stub_writer(vec![0xFF, 0xD8]);
        writer
            .open(&dir.path().join("out.avi"), &metadata(8, 8, 10.0))
            .unwrap();
        writer.write(&solid_frame(0, 16, 4, 0)).unwrap();
        assert_eq!(writer.frame_count(), 1);
    }

    #[test]
    fn test_reopen_starts_new_session() {
        let dir = tempfile::tempdir().unwrap();
        let (mut writer, _) = stub_writer(vec![0xFF, 0xD8]);
        writer
            .open(&dir.path().join("a.avi"), &metadata(8, 8, 10.0))
            .unwrap();
        writer.write_encoded(&[1, 2]).unwrap();
        writer.close().unwrap();

        writer
            .open(&dir.path().join("b.avi"), &metadata(8, 8, 10.0))
            .unwrap();
        assert_eq!(writer.frame_count(), 0);
        writer.write_encoded(&[1, 2]).unwrap();
        assert_eq!(writer.close().unwrap().frame_count, 1);
    }
}
