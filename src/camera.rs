//! Camera presets turned into view-projection matrices.

use glam::{Mat4, Vec3};

use crate::params::{CameraPreset, FixedCamera, OrbitCamera, RenderConfig};

/// Camera system driven by a preset
pub struct CameraSystem {
    preset: CameraPreset,
}

impl CameraSystem {
    /// Create new camera system with specified preset
    pub fn new(preset: CameraPreset) -> Self {
        Self { preset }
    }

    /// Compute camera position and look-at target for given time
    ///
    /// # Returns
    /// Tuple of (eye_position, target_position)
    pub fn compute_position_and_target(&self, time_s: f32) -> (Vec3, Vec3) {
        match &self.preset {
            CameraPreset::Fixed(params) => Self::compute_fixed(params),
            CameraPreset::Orbit(params) => Self::compute_orbit(params, time_s),
        }
    }

    fn compute_fixed(p: &FixedCamera) -> (Vec3, Vec3) {
        (Vec3::from_array(p.position), Vec3::from_array(p.target))
    }

    /// Circle the origin, starting in front of the ribbon (-Z side)
    fn compute_orbit(p: &OrbitCamera, time_s: f32) -> (Vec3, Vec3) {
        let angle = time_s * p.angular_speed;
        let eye = Vec3::new(angle.sin() * p.radius, p.height, -angle.cos() * p.radius);
        (eye, Vec3::ZERO)
    }

    /// Create view-projection matrix for rendering
    ///
    /// # Returns
    /// Tuple of (view_proj_matrix, camera_position)
    pub fn create_view_proj_matrix(
        &self,
        time_s: f32,
        render_config: &RenderConfig,
    ) -> (Mat4, Vec3) {
        let (eye, target) = self.compute_position_and_target(time_s);

        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            render_config.aspect_ratio(),
            render_config.near_plane,
            render_config.far_plane,
        );

        (proj * view, eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_camera_is_static() {
        let params = FixedCamera::default();
        let camera = CameraSystem::new(CameraPreset::Fixed(params.clone()));

        let (eye0, target0) = camera.compute_position_and_target(0.0);
        let (eye1, target1) = camera.compute_position_and_target(10.0);

        assert_eq!(eye0, Vec3::from_array(params.position));
        assert_eq!(eye0, eye1);
        assert_eq!(target0, target1);
        // Looks at the front (-Z) face
        assert!(eye0.z < 0.0);
    }

    #[test]
    fn test_orbit_keeps_radius_and_height() {
        let params = OrbitCamera::default();
        let camera = CameraSystem::new(CameraPreset::Orbit(params.clone()));

        let (start, _) = camera.compute_position_and_target(0.0);
        assert!((start - Vec3::new(0.0, params.height, -params.radius)).length() < 1e-4);

        for t in 0..50 {
            let (eye, target) = camera.compute_position_and_target(t as f32 * 0.7);
            let horizontal = Vec3::new(eye.x, 0.0, eye.z).length();
            assert!((horizontal - params.radius).abs() < 1e-3);
            assert_eq!(eye.y, params.height);
            assert_eq!(target, Vec3::ZERO);
        }
    }

    #[test]
    fn test_view_proj_matrix_generation() {
        let camera = CameraSystem::new(CameraPreset::default());
        let render_config = RenderConfig::default();

        let (view_proj, eye_pos) = camera.create_view_proj_matrix(0.0, &render_config);

        // Matrix should not be identity or zero
        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert!(view_proj.is_finite());
        assert!(eye_pos.is_finite());

        // The origin lands inside the clip volume
        let clip = view_proj * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
