//! Command-line argument parsing.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::params::AudioSource;
use crate::settings::{CameraMode, Settings};

/// Which visualizer drives the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum VisualMode {
    /// Line graph with mirrored extruded fill
    #[default]
    Ribbon,
    /// Bank of smoothed pillars
    Pillars,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Synth,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CameraArg {
    Fixed,
    Orbit,
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "audioribbon")]
#[command(about = "Audio spectrum ribbon and pillar visualizer", long_about = None)]
pub struct Args {
    /// Settings file (defaults to <config dir>/audioribbon/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Visualizer to run
    #[arg(long, value_enum, default_value_t = VisualMode::Ribbon)]
    pub mode: VisualMode,

    /// Audio origin, overrides the settings file
    #[arg(long, value_enum)]
    pub source: Option<SourceArg>,

    /// Camera preset, overrides the settings file
    #[arg(long, value_enum)]
    pub camera: Option<CameraArg>,

    /// Number of sampled points or pillars
    #[arg(long, value_name = "N")]
    pub amount: Option<usize>,

    /// Magnitude-to-height multiplier
    #[arg(long, value_name = "GAIN")]
    pub sensitivity: Option<f32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Args {
    /// Overlay command-line values onto loaded settings
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(source) = self.source {
            settings.audio.source = match source {
                SourceArg::Synth => AudioSource::Synth,
                SourceArg::Input => AudioSource::Input,
            };
        }
        if let Some(camera) = self.camera {
            settings.camera.mode = match camera {
                CameraArg::Fixed => CameraMode::Fixed,
                CameraArg::Orbit => CameraMode::Orbit,
            };
        }
        if let Some(amount) = self.amount {
            settings.sample.amount = amount;
        }
        if let Some(sensitivity) = self.sensitivity {
            settings.sample.sensitivity = sensitivity;
        }
        if let Some(level) = &self.log_level {
            settings.log_level = level.clone();
        }
    }
}
