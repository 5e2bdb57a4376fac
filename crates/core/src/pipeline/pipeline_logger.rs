use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for encode pipeline events.
///
/// Use cases report through this trait so the CLI can print progress while
/// tests stay silent.
pub trait PipelineLogger: Send {
    /// Report frame-level progress.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage (`decode`, `encode`, `write`) took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record the number of bytes a frame occupies in the container.
    fn frame_bytes(&mut self, bytes: usize);

    fn info(&mut self, message: &str);

    /// Emit an end-of-pipeline summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn frame_bytes(&mut self, _bytes: usize) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger for the command line. Progress goes through `log::info!` every
/// `throttle_frames` frames; per-stage timings and frame sizes are kept for
/// the closing summary.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: BTreeMap<String, Vec<f64>>,
    frame_sizes: Vec<usize>,
    start_time: Instant,
    frames_seen: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: BTreeMap::new(),
            frame_sizes: Vec::new(),
            start_time: Instant::now(),
            frames_seen: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.frame_sizes.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames_seen;
        let mut lines = vec![format!(
            "Encode summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        for (stage, durations) in &self.timings {
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        if !self.frame_sizes.is_empty() {
            let total: usize = self.frame_sizes.iter().sum();
            let avg = total as f64 / self.frame_sizes.len() as f64;
            let max = self.frame_sizes.iter().copied().max().unwrap_or(0);
            lines.push(format!(
                "  frames  : avg {avg:.0} bytes  max {max} bytes  total {total} bytes"
            ));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn frame_sizes(&self) -> &[usize] {
        &self.frame_sizes
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(25)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = current;
        if total > 0 && (current % self.throttle_frames == 0 || current == total) {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Encoding: {current}/{total} frames ({pct:.1}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn frame_bytes(&mut self, bytes: usize) {
        self.frame_sizes.push(bytes);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}
