use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::container::domain::summary::AviSummary;
use crate::shared::encode_settings::EncodeSettings;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::{SourceFrame, VideoReader};
use crate::video::domain::video_writer::{FramePayload, VideoWriter};

use super::pipeline_logger::PipelineLogger;

/// Image sequence to Motion-JPEG AVI: read → encode → write → finalize.
///
/// On error the output file is left unfinished and must be discarded by the
/// caller.
pub struct EncodeSequenceUseCase {
    reader: Box<dyn VideoReader>,
    writer: Box<dyn VideoWriter>,
    logger: Box<dyn PipelineLogger>,
}

impl EncodeSequenceUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            writer,
            logger,
        }
    }

    pub fn execute(
        &mut self,
        inputs: &[PathBuf],
        output_path: &Path,
        settings: &EncodeSettings,
    ) -> Result<AviSummary, Box<dyn std::error::Error>> {
        let source = self.reader.open(inputs)?;
        let (width, height) = settings
            .dimensions()
            .unwrap_or((source.width, source.height));
        let metadata =
            VideoMetadata::new(width, height, settings.fps).with_total_frames(source.total_frames);

        self.logger.info(&format!(
            "Encoding {} frames at {}x{}, {} fps into {}",
            source.total_frames,
            width,
            height,
            settings.fps,
            output_path.display()
        ));

        if let Err(e) = self.writer.open(output_path, &metadata) {
            self.reader.close();
            return Err(e.into());
        }

        let result = self.stream_frames(source.total_frames, settings.quality);
        self.reader.close();
        result?;

        let summary = self.writer.close()?;
        self.logger.info(&format!(
            "Wrote {} frames ({} bytes) to {}",
            summary.frame_count,
            summary.file_size,
            output_path.display()
        ));
        self.logger.summary();
        Ok(summary)
    }

    fn stream_frames(
        &mut self,
        total: usize,
        quality: f32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut frames = self.reader.frames();
        let mut written = 0;
        loop {
            let t0 = Instant::now();
            let Some(item) = frames.next() else {
                break;
            };
            let source = item?;
            self.logger
                .timing("decode", t0.elapsed().as_secs_f64() * 1000.0);

            let t1 = Instant::now();
            let (stage, bytes) = match &source {
                SourceFrame::Decoded(frame) => (
                    "encode",
                    self.writer
                        .write_payload(FramePayload::Pixels { frame, quality })?,
                ),
                SourceFrame::Encoded { data, .. } => (
                    "write",
                    self.writer.write_payload(FramePayload::Encoded(data))?,
                ),
            };
            self.logger
                .timing(stage, t1.elapsed().as_secs_f64() * 1000.0);
            self.logger.frame_bytes(bytes);

            written += 1;
            self.logger.progress(written, total.max(written));
        }
        Ok(())
    }
}
