use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crate::container::domain::frame_chunk::FrameChunk;
use crate::container::domain::header_records::{HeaderBlock, HeaderFields, CHUNK_HEADER_LEN};
use crate::container::domain::index_builder::IndexBuilder;
use crate::container::domain::summary::AviSummary;
use crate::container::error::AviError;
use crate::shared::video_metadata::VideoMetadata;

enum State<W> {
    Streaming(W),
    Finalized(W),
    Aborted,
}

/// Streams `00db` frame chunks into a RIFF/AVI container.
///
/// Construction writes a provisional header (zero sizes, hinted frame count)
/// and the `movi` list marker. Each [`write_frame`](Self::write_frame)
/// appends one chunk and records it for the `idx1` index. [`finish`](Self::finish)
/// appends the index, then seeks back to offset 0 and rewrites the header
/// with the final sizes. The header block has the same length in both
/// passes, so the rewrite never touches frame data.
///
/// Any I/O failure aborts the session; later calls return
/// [`AviError::Aborted`]. A session dropped before `finish` leaves an
/// unplayable file behind.
pub struct AviWriter<W: Write + Seek> {
    state: State<W>,
    metadata: VideoMetadata,
    header: HeaderBlock,
    index: IndexBuilder,
    frame_count: u32,
    /// Stream position where the next chunk's tag will land.
    position: u64,
    /// Length of the header block preceding the `movi` marker.
    movie_origin: u64,
}

impl AviWriter<BufWriter<File>> {
    /// Creates (or truncates) `path` and starts a session on it.
    pub fn create(path: &Path, metadata: &VideoMetadata) -> Result<Self, AviError> {
        metadata.validate()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(AviError::io("creating output directory"))?;
        }
        let file = File::create(path).map_err(AviError::io("creating output file"))?;
        log::info!("Writing MJPEG AVI to {}", path.display());
        Self::new(BufWriter::new(file), metadata)
    }
}

impl<W: Write + Seek> AviWriter<W> {
    pub fn new(mut sink: W, metadata: &VideoMetadata) -> Result<Self, AviError> {
        metadata.validate()?;
        let hinted_frames = to_u32(metadata.total_frames as u64, "frame count")?;

        let header = HeaderBlock::new(&HeaderFields {
            width: metadata.width,
            height: metadata.height,
            fps: metadata.fps,
            frame_count: hinted_frames,
            riff_size: 0,
            movie_list_size: 0,
        });

        let header_bytes = header.header_bytes();
        let movie_list = header.movie_list.to_bytes();
        sink.write_all(&header_bytes)
            .and_then(|_| sink.write_all(&movie_list))
            .map_err(AviError::io("writing provisional header"))?;

        let movie_origin = header_bytes.len() as u64;
        log::debug!(
            "AVI session opened: {}x{} @ {} fps, frames start at {}",
            metadata.width,
            metadata.height,
            metadata.fps,
            movie_origin + movie_list.len() as u64
        );

        Ok(Self {
            state: State::Streaming(sink),
            metadata: metadata.clone(),
            header,
            index: IndexBuilder::new(),
            frame_count: 0,
            position: movie_origin + movie_list.len() as u64,
            movie_origin,
        })
    }

    /// Appends one compressed frame as a `00db` chunk.
    pub fn write_frame(&mut self, payload: &[u8]) -> Result<(), AviError> {
        self.streaming_sink()?;
        let position = to_u32(self.position, "chunk offset")?;
        let payload_len = to_u32(payload.len() as u64, "frame size")?;
        let frame_count = self
            .frame_count
            .checked_add(1)
            .ok_or(AviError::SizeOverflow {
                field: "frame count",
                value: self.frame_count as u64 + 1,
            })?;
        let chunk = FrameChunk::new(payload_len, position);
        let header = chunk.header_bytes().ok_or(AviError::SizeOverflow {
            field: "chunk length",
            value: chunk.padded_len(),
        })?;

        let sink = self.streaming_sink()?;
        let written = write_chunk(sink, &header, payload, chunk.padding as usize);
        if let Err(e) = written {
            self.state = State::Aborted;
            return Err(AviError::io("writing frame chunk")(e));
        }

        self.index.append(position, payload_len);
        self.position += chunk.total_len();
        self.frame_count = frame_count;
        log::debug!(
            "frame {} at offset {position}: {payload_len} bytes + {} padding",
            self.frame_count,
            chunk.padding
        );
        Ok(())
    }

    /// Writes the index and patches the header with the final totals.
    ///
    /// Valid once. A failure here leaves a half-finalized file and the
    /// session aborted.
    pub fn finish(&mut self) -> Result<AviSummary, AviError> {
        let sink = match std::mem::replace(&mut self.state, State::Aborted) {
            State::Streaming(sink) => sink,
            State::Finalized(sink) => {
                self.state = State::Finalized(sink);
                return Err(AviError::Finalized);
            }
            State::Aborted => return Err(AviError::Aborted),
        };

        let (sink, summary) = self.finalize(sink)?;
        self.state = State::Finalized(sink);
        log::info!(
            "AVI finalized: {} frames, {} bytes",
            summary.frame_count,
            summary.file_size
        );
        Ok(summary)
    }

    fn finalize(&mut self, mut sink: W) -> Result<(W, AviSummary), AviError> {
        let index_bytes = self.index.to_bytes()?;
        sink.write_all(&index_bytes)
            .and_then(|_| sink.flush())
            .map_err(AviError::io("writing index"))?;

        let file_size = sink
            .seek(SeekFrom::End(0))
            .map_err(AviError::io("measuring output length"))?;
        let riff_size = to_u32(file_size - CHUNK_HEADER_LEN as u64, "file size")?;
        let movie_list_size = to_u32(
            file_size - CHUNK_HEADER_LEN as u64 - self.movie_origin - index_bytes.len() as u64,
            "movie list size",
        )?;

        self.header.refresh(&HeaderFields {
            width: self.metadata.width,
            height: self.metadata.height,
            fps: self.metadata.fps,
            frame_count: self.frame_count,
            riff_size,
            movie_list_size,
        });
        let patch = self.header.to_bytes();

        sink.seek(SeekFrom::Start(0))
            .map_err(AviError::io("seeking to header"))?;
        sink.write_all(&patch)
            .and_then(|_| sink.flush())
            .map_err(AviError::io("rewriting header"))?;

        Ok((
            sink,
            AviSummary {
                frame_count: self.frame_count,
                file_size,
                movie_list_size,
                index_size: index_bytes.len() as u64,
            },
        ))
    }

    /// `Ok` while frames can still be written, otherwise the state error a
    /// write would return.
    pub fn ensure_streaming(&self) -> Result<(), AviError> {
        match &self.state {
            State::Streaming(_) => Ok(()),
            State::Finalized(_) => Err(AviError::Finalized),
            State::Aborted => Err(AviError::Aborted),
        }
    }

    fn streaming_sink(&mut self) -> Result<&mut W, AviError> {
        match &mut self.state {
            State::Streaming(sink) => Ok(sink),
            State::Finalized(_) => Err(AviError::Finalized),
            State::Aborted => Err(AviError::Aborted),
        }
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Stream position where the next chunk will start.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn index(&self) -> &IndexBuilder {
        &self.index
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, State::Finalized(_))
    }

    #[cfg(test)]
    fn get_ref(&self) -> Option<&W> {
        match &self.state {
            State::Streaming(sink) | State::Finalized(sink) => Some(sink),
            State::Aborted => None,
        }
    }

    /// Returns the sink of a finalized session.
    pub fn into_inner(mut self) -> Option<W> {
        match std::mem::replace(&mut self.state, State::Aborted) {
            State::Finalized(sink) => Some(sink),
            other => {
                self.state = other;
                None
            }
        }
    }
}

impl<W: Write + Seek> Drop for AviWriter<W> {
    fn drop(&mut self) {
        if matches!(self.state, State::Streaming(_)) {
            log::warn!(
                "AVI writer dropped after {} frames without finish(); output is not playable",
                self.frame_count
            );
        }
    }
}

fn write_chunk<W: Write>(
    sink: &mut W,
    header: &[u8],
    payload: &[u8],
    padding: usize,
) -> std::io::Result<()> {
    sink.write_all(header)?;
    sink.write_all(payload)?;
    sink.write_all(&[0u8; 3][..padding])
}

fn to_u32(value: u64, field: &'static str) -> Result<u32, AviError> {
    u32::try_from(value).map_err(|_| AviError::SizeOverflow { field, value })
}
