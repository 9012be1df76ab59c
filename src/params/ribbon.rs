//! Ribbon (line graph + extruded fill) appearance.

use serde::Deserialize;

/// Cyan line and fill
pub const DEFAULT_COLOR: [f32; 4] = [0.0, 1.0, 1.0, 1.0];

/// Ribbon geometry and styling parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RibbonStyle {
    /// Thickness of the extruded fill along +Z (world units)
    pub fill_depth: f32,

    /// Width of the outline stroke (world units)
    pub line_width: f32,

    /// Shared colour of line and fill (linear RGBA)
    pub color: [f32; 4],
}

impl Default for RibbonStyle {
    fn default() -> Self {
        Self {
            fill_depth: 1.0,
            line_width: 0.1,
            color: DEFAULT_COLOR,
        }
    }
}

impl RibbonStyle {
    /// Replace non-positive thickness values with defaults
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut style = self;

        if style.fill_depth.is_nan() || style.fill_depth <= 0.0 {
            tracing::warn!(
                "fill_depth {} must be positive, using {}",
                style.fill_depth,
                defaults.fill_depth
            );
            style.fill_depth = defaults.fill_depth;
        }
        if style.line_width.is_nan() || style.line_width <= 0.0 {
            tracing::warn!(
                "line_width {} must be positive, using {}",
                style.line_width,
                defaults.line_width
            );
            style.line_width = defaults.line_width;
        }
        style.color = clamp_color(style.color);
        style
    }
}

/// Clamp each channel into [0, 1]
pub(crate) fn clamp_color(color: [f32; 4]) -> [f32; 4] {
    color.map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) })
}
