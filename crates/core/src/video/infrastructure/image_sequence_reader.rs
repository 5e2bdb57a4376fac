use std::path::{Path, PathBuf};

use image::imageops::FilterType;

use crate::shared::constants::JPEG_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::{SourceFrame, VideoReader};

/// Adapts an ordered list of image files to the [`VideoReader`] interface.
///
/// Dimensions come from the first image unless a target size is set; images
/// of any other size are resized to match. With passthrough enabled, JPEG
/// files already at the target size are handed over as raw bytes.
pub struct ImageSequenceReader {
    passthrough_jpeg: bool,
    target_size: Option<(u32, u32)>,
    inputs: Vec<PathBuf>,
    size: Option<(u32, u32)>,
}

impl ImageSequenceReader {
    pub fn new() -> Self {
        Self {
            passthrough_jpeg: false,
            target_size: None,
            inputs: Vec::new(),
            size: None,
        }
    }

    pub fn with_passthrough(mut self, passthrough_jpeg: bool) -> Self {
        self.passthrough_jpeg = passthrough_jpeg;
        self
    }

    pub fn with_target_size(mut self, size: Option<(u32, u32)>) -> Self {
        self.target_size = size;
        self
    }

    fn read_frame(
        &self,
        path: &Path,
        index: usize,
        size: (u32, u32),
    ) -> Result<SourceFrame, Box<dyn std::error::Error>> {
        if self.passthrough_jpeg && is_jpeg(path) && image::image_dimensions(path)? == size {
            let data = std::fs::read(path)?;
            return Ok(SourceFrame::Encoded { data, index });
        }

        let img = image::open(path)
            .map_err(|e| format!("failed to decode {}: {e}", path.display()))?
            .to_rgb8();
        let img = if img.dimensions() != size {
            log::debug!(
                "resizing {} from {:?} to {:?}",
                path.display(),
                img.dimensions(),
                size
            );
            image::imageops::resize(&img, size.0, size.1, FilterType::Triangle)
        } else {
            img
        };
        Ok(SourceFrame::Decoded(Frame::from_rgb_image(img, index)))
    }
}

impl Default for ImageSequenceReader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| JPEG_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

impl VideoReader for ImageSequenceReader {
    fn open(&mut self, inputs: &[PathBuf]) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        let first = inputs.first().ok_or("No input images given")?;
        let size = match self.target_size {
            Some(size) => size,
            None => image::image_dimensions(first)
                .map_err(|e| format!("failed to read {}: {e}", first.display()))?,
        };

        self.inputs = inputs.to_vec();
        self.size = Some(size);

        Ok(VideoMetadata {
            width: size.0,
            height: size.1,
            fps: 0.0,
            total_frames: inputs.len(),
        })
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<SourceFrame, Box<dyn std::error::Error>>> + '_> {
        let Some(size) = self.size else {
            let err: Box<dyn std::error::Error> = "ImageSequenceReader: not opened".into();
            return Box::new(std::iter::once(Err::<SourceFrame, _>(err)));
        };
        let this = &*self;
        Box::new(
            this.inputs
                .iter()
                .enumerate()
                .map(move |(index, path)| this.read_frame(path, index, size)),
        )
    }

    fn close(&mut self) {
        self.inputs.clear();
        self.size = None;
    }
}
