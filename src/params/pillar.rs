//! Pillar bank layout and smoothing.

use serde::Deserialize;

use super::ribbon::{clamp_color, DEFAULT_COLOR};

/// Pillar bank parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PillarLayout {
    /// Pillar footprint along X and Z (world units)
    pub pillar_width: f32,

    /// Gap between pillars as a fraction of pillar width
    pub pillar_interval: f32,

    /// Base colour; the pillar material is a translucent version of it
    pub pillar_color: [f32; 4],

    /// Smoothing speed (lerp fraction per second)
    pub speed: f32,
}

impl Default for PillarLayout {
    fn default() -> Self {
        Self {
            pillar_width: 0.4,
            pillar_interval: 0.25,
            pillar_color: DEFAULT_COLOR,
            speed: 8.0,
        }
    }
}

impl PillarLayout {
    /// Replace values that would collapse or freeze the pillars
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut layout = self;

        if layout.pillar_width.is_nan() || layout.pillar_width <= 0.0 {
            tracing::warn!(
                "pillar_width {} must be positive, using {}",
                layout.pillar_width,
                defaults.pillar_width
            );
            layout.pillar_width = defaults.pillar_width;
        }
        if layout.pillar_interval.is_nan() || layout.pillar_interval < 0.0 {
            tracing::warn!(
                "pillar_interval {} must not be negative, using 0",
                layout.pillar_interval
            );
            layout.pillar_interval = 0.0;
        }
        if layout.speed.is_nan() || layout.speed <= 0.0 {
            tracing::warn!(
                "speed {} must be positive, using {}",
                layout.speed,
                defaults.speed
            );
            layout.speed = defaults.speed;
        }
        layout.pillar_color = clamp_color(layout.pillar_color);
        layout
    }

    /// Distance between neighbouring pillar centres
    pub fn pitch(&self) -> f32 {
        self.pillar_width * (1.0 + self.pillar_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_includes_interval() {
        let layout = PillarLayout {
            pillar_width: 2.0,
            pillar_interval: 0.5,
            ..PillarLayout::default()
        };
        assert_eq!(layout.pitch(), 3.0);
    }

    #[test]
    fn test_sanitize_speed_and_width() {
        let layout = PillarLayout {
            pillar_width: 0.0,
            pillar_interval: -1.0,
            speed: -2.0,
            pillar_color: [2.0, -1.0, 0.5, 1.0],
        }
        .sanitized();
        assert_eq!(layout.pillar_width, 0.4);
        assert_eq!(layout.pillar_interval, 0.0);
        assert_eq!(layout.speed, 8.0);
        assert_eq!(layout.pillar_color, [1.0, 0.0, 0.5, 1.0]);
    }
}
