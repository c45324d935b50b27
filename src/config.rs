use crate::constants::{
    ACCEPT_ALL, DEFAULT_MAX_FILES, DEFAULT_THUMBNAIL_SIZE, DEFAULT_VIEWER_MAX_DIMENSION,
};
use crate::error::{GalleryError, Result};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// User-tunable settings, read from `config.json` in the platform config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Files beyond this count in a single pick or drop are ignored.
    pub max_files: usize,
    /// Comma-separated accept filter, e.g. `"image/*,video/*,.pdf"`.
    pub accept: String,
    pub thumbnail_size: u32,
    pub viewer_max_dimension: u32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            accept: ACCEPT_ALL.to_string(),
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            viewer_max_dimension: DEFAULT_VIEWER_MAX_DIMENSION,
        }
    }
}

impl GalleryConfig {
    /// Loads the config from the platform config directory, falling back to
    /// defaults when it is missing or malformed.
    pub fn load_or_default() -> Self {
        let Some(paths) = AppPaths::from_project_dirs() else {
            log::warn!("no config directory available, using defaults");
            return Self::default();
        };

        let path = paths.config_file();
        match Self::from_path(&path) {
            Ok(Some(config)) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Ok(None) => Self::default(),
            Err(err) => {
                log::error!("{err}; using defaults");
                Self::default()
            }
        }
    }

    /// Reads a config file. A missing file is `Ok(None)`.
    pub fn from_path(path: &Path) -> Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(GalleryError::io(path, err)),
        };
        Self::from_json(&text)
            .map(Some)
            .map_err(|source| GalleryError::Config {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.sanitized())
    }

    fn sanitized(mut self) -> Self {
        self.max_files = self.max_files.max(1);
        self.thumbnail_size = self.thumbnail_size.max(16);
        self.viewer_max_dimension = self.viewer_max_dimension.max(self.thumbnail_size);
        if self.accept.trim().is_empty() {
            self.accept = ACCEPT_ALL.to_string();
        }
        self
    }
}
