use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use mjpeg_avi_core::pipeline::encode_sequence_use_case::EncodeSequenceUseCase;
use mjpeg_avi_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use mjpeg_avi_core::shared::constants::IMAGE_EXTENSIONS;
use mjpeg_avi_core::shared::encode_settings::EncodeSettings;
use mjpeg_avi_core::video::infrastructure::image_sequence_reader::ImageSequenceReader;
use mjpeg_avi_core::video::infrastructure::jpeg_frame_encoder::JpegFrameEncoder;
use mjpeg_avi_core::video::infrastructure::mjpeg_avi_writer::MjpegAviWriter;

/// Assemble an image sequence into a Motion-JPEG AVI file.
#[derive(Parser, Debug)]
#[command(name = "mjpeg-avi")]
struct Cli {
    /// Input images in frame order. A directory contributes its images sorted by name.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output AVI file.
    #[arg(short, long)]
    output: PathBuf,

    /// Frames per second.
    #[arg(long)]
    fps: Option<f64>,

    /// JPEG quality (0.0-1.0] for frames that need encoding.
    #[arg(long)]
    quality: Option<f32>,

    /// Copy JPEG inputs into the AVI without re-encoding.
    #[arg(long)]
    passthrough: bool,

    /// Output width; requires --height.
    #[arg(long)]
    width: Option<u32>,

    /// Output height; requires --width.
    #[arg(long)]
    height: Option<u32>,

    /// JSON settings file; command-line flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings to this JSON file.
    #[arg(long)]
    save_config: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = merge_settings(&cli)?;
    validate(&cli, &settings)?;

    if let Some(path) = &cli.save_config {
        settings.save(path)?;
        log::info!("Settings saved to {}", path.display());
    }

    let inputs = expand_inputs(&cli.inputs)?;
    let reader = ImageSequenceReader::new()
        .with_passthrough(settings.passthrough_jpeg)
        .with_target_size(settings.dimensions());
    let writer = MjpegAviWriter::new(Box::new(JpegFrameEncoder::new()))
        .with_quality(settings.quality)?;

    let mut use_case = EncodeSequenceUseCase::new(
        Box::new(reader),
        Box::new(writer),
        Box::new(StdoutPipelineLogger::default()),
    );

    match use_case.execute(&inputs, &cli.output, &settings) {
        Ok(summary) => {
            log::info!(
                "Output written to {} ({} frames)",
                cli.output.display(),
                summary.frame_count
            );
            Ok(())
        }
        Err(e) => {
            discard_partial_output(&cli.output);
            Err(e)
        }
    }
}

/// Settings file first, then any flags given on the command line.
fn merge_settings(cli: &Cli) -> Result<EncodeSettings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.config {
        Some(path) => EncodeSettings::load(path)?,
        None => EncodeSettings::default(),
    };
    if let Some(fps) = cli.fps {
        settings.fps = fps;
    }
    if let Some(quality) = cli.quality {
        settings.quality = quality;
    }
    if cli.passthrough {
        settings.passthrough_jpeg = true;
    }
    if cli.width.is_some() || cli.height.is_some() {
        settings.width = cli.width;
        settings.height = cli.height;
    }
    Ok(settings)
}

fn validate(cli: &Cli, settings: &EncodeSettings) -> Result<(), Box<dyn std::error::Error>> {
    for input in &cli.inputs {
        if !input.exists() {
            return Err(format!("Input not found: {}", input.display()).into());
        }
    }
    if !settings.fps.is_finite() || settings.fps <= 0.0 {
        return Err(format!("FPS must be a positive number, got {}", settings.fps).into());
    }
    if !(settings.quality > 0.0 && settings.quality <= 1.0) {
        return Err(format!(
            "Quality must be in (0.0, 1.0], got {}",
            settings.quality
        )
        .into());
    }
    if settings.width.is_some() != settings.height.is_some() {
        return Err("--width and --height must be given together".into());
    }
    if settings.width == Some(0) || settings.height == Some(0) {
        return Err("Width and height must be positive".into());
    }
    Ok(())
}

fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| is_image(path))
                .collect();
            entries.sort();
            if entries.is_empty() {
                log::warn!("No images found in {}", input.display());
            }
            files.extend(entries);
        } else {
            files.push(input.clone());
        }
    }
    if files.is_empty() {
        return Err("No input images to encode".into());
    }
    Ok(files)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn discard_partial_output(output: &Path) {
    if output.exists() {
        match fs::remove_file(output) {
            Ok(()) => log::warn!("Removed incomplete output {}", output.display()),
            Err(e) => log::warn!(
                "Could not remove incomplete output {}: {e}",
                output.display()
            ),
        }
    }
}
