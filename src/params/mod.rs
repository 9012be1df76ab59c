//! Parameter definitions with units and documented defaults.
//!
//! Every group deserializes from a partial TOML table; missing keys keep
//! their defaults.

mod audio;
mod camera;
mod pillar;
mod render;
mod ribbon;
mod sample;

// Re-export all types
pub use audio::{
    audio_constants, AnalyzerConfig, AudioSource, FftWindow, MAX_SPECTRUM_SIZE,
};
pub use camera::{CameraPreset, FixedCamera, OrbitCamera};
pub use pillar::PillarLayout;
pub use render::RenderConfig;
pub use ribbon::{RibbonStyle, DEFAULT_COLOR};
pub use sample::{SampleConfig, SPECTRUM_SIZE};
