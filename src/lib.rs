//! Audioribbon - audio spectrum visualizer
//!
//! Samples a magnitude spectrum into heights and turns them into either a
//! mirrored, extruded ribbon under a line graph or a bank of smoothed pillars.

pub mod audio;
pub mod camera;
pub mod cli;
pub mod error;
pub mod logging;
pub mod params;
pub mod pillars;
pub mod rendering;
pub mod ribbon;
pub mod settings;
pub mod sink;
pub mod spectrum;
pub mod visualizer;
