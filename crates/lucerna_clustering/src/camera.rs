//! Perspective camera producing the matrices the clustering pass consumes.

use crate::grid::ClusterGridConfig;
use crate::math::{self, Mat4, Vec3};

/// A right-handed perspective camera.
///
/// The near/far planes come from the grid config so the camera frustum and
/// the depth slicing always agree.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// World-space eye position.
    pub eye: Vec3,
    /// World-space look-at target.
    pub target: Vec3,
    /// Up reference vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Viewport width / height.
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: [0.0, 2.0, 5.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    /// View matrix (world to view space).
    #[must_use]
    pub fn view(&self) -> Mat4 {
        math::look_at(self.eye, self.target, self.up)
    }

    /// Projection matrix using the grid's depth range.
    #[must_use]
    pub fn projection(&self, grid: &ClusterGridConfig) -> Mat4 {
        math::perspective(self.fov_y, self.aspect, grid.near_plane, grid.far_plane)
    }

    /// Analytic inverse of [`Camera::projection`].
    #[must_use]
    pub fn projection_inverse(&self, grid: &ClusterGridConfig) -> Mat4 {
        math::perspective_inverse(self.fov_y, self.aspect, grid.near_plane, grid.far_plane)
    }

    /// Combined view-projection matrix.
    #[must_use]
    pub fn view_projection(&self, grid: &ClusterGridConfig) -> Mat4 {
        math::multiply(self.projection(grid), self.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::project_point;

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = Camera {
            eye: [0.0, 0.0, 10.0],
            target: [0.0, 0.0, 0.0],
            ..Camera::default()
        };
        let grid = ClusterGridConfig::default();
        let vp = camera.view_projection(&grid);

        let ndc = project_point(&vp, camera.target);
        assert!(ndc[0].abs() < 1e-5);
        assert!(ndc[1].abs() < 1e-5);
        assert!(ndc[2] > 0.0 && ndc[2] < 1.0);
    }

    #[test]
    fn test_inverse_projection_recovers_view_point() {
        let camera = Camera::default();
        let grid = ClusterGridConfig::default();
        let proj = camera.projection(&grid);
        let inv = camera.projection_inverse(&grid);

        let view_pt = [0.4, -1.1, -25.0];
        let ndc = project_point(&proj, view_pt);
        let back = project_point(&inv, ndc);
        for i in 0..3 {
            assert!((back[i] - view_pt[i]).abs() < 1e-3);
        }
    }
}
