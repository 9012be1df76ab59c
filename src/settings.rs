//! TOML settings file.
//!
//! ```toml
//! log_level = "debug"
//!
//! [sample]
//! amount = 96
//! sensitivity = 150.0
//!
//! [ribbon]
//! fill_depth = 2.0
//! color = [1.0, 0.2, 0.6, 1.0]
//!
//! [camera]
//! mode = "orbit"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::params::{
    AnalyzerConfig, CameraPreset, FixedCamera, OrbitCamera, PillarLayout, RenderConfig,
    RibbonStyle, SampleConfig,
};

/// Which camera preset to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    #[default]
    Fixed,
    Orbit,
}

/// Camera section: preset choice plus parameters for both presets
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub mode: CameraMode,
    pub fixed: FixedCamera,
    pub orbit: OrbitCamera,
}

impl CameraSettings {
    pub fn preset(&self) -> CameraPreset {
        match self.mode {
            CameraMode::Fixed => CameraPreset::Fixed(self.fixed.clone()),
            CameraMode::Orbit => CameraPreset::Orbit(self.orbit.clone()),
        }
    }
}

/// Everything configurable about a run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default tracing level (`RUST_LOG` overrides it)
    pub log_level: String,
    pub sample: SampleConfig,
    pub ribbon: RibbonStyle,
    pub pillars: PillarLayout,
    pub audio: AnalyzerConfig,
    pub render: RenderConfig,
    pub camera: CameraSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            sample: SampleConfig::default(),
            ribbon: RibbonStyle::default(),
            pillars: PillarLayout::default(),
            audio: AnalyzerConfig::default(),
            render: RenderConfig::default(),
            camera: CameraSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// tried and a missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Default settings location: `<config dir>/audioribbon/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("audioribbon")
            .join("config.toml")
    }

    /// Correct every group; never fails
    pub fn sanitized(self) -> Self {
        let audio = self.audio.sanitized();
        Self {
            sample: self.sample.sanitized_for(audio.spectrum_size),
            ribbon: self.ribbon.sanitized(),
            pillars: self.pillars.sanitized(),
            audio,
            ..self
        }
    }
}
