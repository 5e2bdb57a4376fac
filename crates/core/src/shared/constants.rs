/// JPEG quality used when a pixel frame is submitted without one.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.8;

pub const DEFAULT_FPS: f64 = 30.0;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Inputs with these extensions can be copied into the AVI without re-encoding.
pub const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
