//! Camera settings sources.
//!
//! The loaders in [`crate::import`] never parse config files themselves; they
//! go through the [`CameraSettings`] capability trait (`get_str`, `get_f64`,
//! `get_u32`). [`YamlCameraSettings`] is the concrete collaborator backing it
//! with a flat YAML document.

use std::fs;
use std::path::Path;
use yaml_rust::{Yaml, YamlLoader};

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load settings from '{path}': {reason}")]
    Load { path: String, reason: String },
    #[error("Settings field '{0}' is missing or has the wrong type")]
    Field(String),
}

/// Key/value access to a camera configuration source.
///
/// The import layer depends only on this trait, so any config backend that can
/// answer string, floating-point and integer lookups can feed the camera
/// loader.
pub trait CameraSettings {
    fn get_str(&self, key: &str) -> Result<String, SettingsError>;
    fn get_f64(&self, key: &str) -> Result<f64, SettingsError>;
    fn get_u32(&self, key: &str) -> Result<u32, SettingsError>;
}

/// Camera settings backed by a flat YAML mapping, e.g.
///
/// ```yaml
/// type: pinhole
/// fx: 461.629
/// width: 752
/// ```
#[derive(Debug, Clone)]
pub struct YamlCameraSettings {
    doc: Yaml,
}

impl YamlCameraSettings {
    /// Reads and parses the YAML document at `path`.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|e| SettingsError::Load {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        let mut docs = YamlLoader::load_from_str(&contents).map_err(|e| SettingsError::Load {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        if docs.is_empty() {
            return Err(SettingsError::Load {
                path: display,
                reason: "empty YAML document".to_string(),
            });
        }
        Ok(YamlCameraSettings {
            doc: docs.remove(0),
        })
    }
}

impl CameraSettings for YamlCameraSettings {
    fn get_str(&self, key: &str) -> Result<String, SettingsError> {
        self.doc[key]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SettingsError::Field(key.to_string()))
    }

    fn get_f64(&self, key: &str) -> Result<f64, SettingsError> {
        // YAML scalars without a decimal point parse as integers; a config
        // writing `fx: 500` is still a valid double field.
        let value = &self.doc[key];
        value
            .as_f64()
            .or_else(|| value.as_i64().map(|v| v as f64))
            .ok_or_else(|| SettingsError::Field(key.to_string()))
    }

    fn get_u32(&self, key: &str) -> Result<u32, SettingsError> {
        self.doc[key]
            .as_i64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| SettingsError::Field(key.to_string()))
    }
}
