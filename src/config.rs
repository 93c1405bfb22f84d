//! Graphics configuration, stored as JSON

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::pixel::Pixel;

/// Settings for a [`Graphics`](crate::Graphics) context. Missing fields take
/// their defaults when loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub width: u32,
    pub height: u32,
    /// Directory of sprite sheets loaded at creation
    pub asset_path: Option<PathBuf>,
    /// Pixels count as solid for collision when alpha is above this
    pub collision_alpha_threshold: u8,
    pub clear_colour: Pixel,
}

impl GraphicsConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_asset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.asset_path = Some(path.into());
        self
    }

    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing config {}", path.display()))
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing config {}", path.display()))
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            asset_path: None,
            collision_alpha_threshold: 16,
            clear_colour: Pixel::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graphics.json");
        let config = GraphicsConfig {
            clear_colour: Pixel::rgb(10, 20, 30),
            collision_alpha_threshold: 100,
            ..GraphicsConfig::new(320, 200).with_asset_path("data/sprites")
        };
        config.save(&path).unwrap();
        assert_eq!(GraphicsConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: GraphicsConfig = serde_json::from_str(r#"{ "width": 800 }"#).unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 360);
        assert_eq!(config.collision_alpha_threshold, 16);
        assert_eq!(config.asset_path, None);
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = GraphicsConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.json"));

        fs::write(&path, "{ not json").unwrap();
        let err = GraphicsConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing config"));
    }
}
