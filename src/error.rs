//! Error types for the visualizer.

use thiserror::Error;

/// Visualizer errors
#[derive(Error, Debug)]
pub enum VisualizerError {
    /// Geometry needs at least two points to lay out one quad
    #[error("need at least 2 graph points, got {0}")]
    TooFewPoints(usize),

    /// Audio device, stream or analysis failure
    #[error("Audio error: {0}")]
    Audio(String),

    /// GPU setup or frame submission failure
    #[error("Render error: {0}")]
    Render(String),

    /// Settings file could not be parsed
    #[error("Settings error: {0}")]
    Settings(#[from] toml::de::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration value that cannot be corrected automatically
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for visualizer operations
pub type Result<T> = std::result::Result<T, VisualizerError>;
