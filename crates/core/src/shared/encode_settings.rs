use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{DEFAULT_FPS, DEFAULT_JPEG_QUALITY};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Job-level options for turning an image sequence into an AVI.
///
/// Missing keys in a settings file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeSettings {
    pub fps: f64,
    /// JPEG quality in `(0.0, 1.0]` for frames that need encoding.
    pub quality: f32,
    /// Copy JPEG inputs into the container as-is.
    pub passthrough_jpeg: bool,
    /// Output dimensions; `None` takes them from the first frame.
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            quality: DEFAULT_JPEG_QUALITY,
            passthrough_jpeg: false,
            width: None,
            height: None,
        }
    }
}

impl EncodeSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |e| SettingsError::Write {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(write_err)
    }

    /// Explicit dimensions, if both were given.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }
}
