//! GPU-visible uniform structs.
//!
//! Everything here is `bytemuck::Pod` with explicit padding so the byte
//! image matches the WGSL struct layout exactly. Matrices are column-major
//! and upload unchanged.

use bytemuck::{Pod, Zeroable};

use crate::camera::Camera;
use crate::grid::ClusterGridConfig;
use crate::math::Mat4;

/// Per-frame camera uniforms for the vertex stages.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniforms {
    /// Combined view-projection matrix.
    pub view_proj: Mat4,
}

impl CameraUniforms {
    /// Snapshots the camera for upload.
    #[must_use]
    pub fn new(camera: &Camera, grid: &ClusterGridConfig) -> Self {
        Self {
            view_proj: camera.view_projection(grid),
        }
    }
}

/// Parameters driving cluster assignment and cluster lookup.
///
/// Shared by the clustering compute shader and both shading fragment
/// shaders, so cluster coordinates are computed from one source of truth.
///
/// WGSL mirror:
/// ```wgsl
/// struct ClusterParams {
///     view: mat4x4f,
///     proj: mat4x4f,
///     inv_proj: mat4x4f,
///     screen: vec4f,   // width, height, near, far
///     grid: vec4u,     // clusters_x, clusters_y, clusters_z, capacity
/// }
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ClusterParams {
    /// World-to-view matrix.
    pub view: Mat4,
    /// View-to-clip matrix.
    pub proj: Mat4,
    /// Clip-to-view matrix (analytic inverse of `proj`).
    pub inv_proj: Mat4,
    /// `[width, height, near, far]`.
    pub screen: [f32; 4],
    /// `[clusters_x, clusters_y, clusters_z, max_lights_per_cluster]`.
    pub grid: [u32; 4],
}

impl ClusterParams {
    /// Assembles the uniform image for one frame.
    #[must_use]
    pub fn new(camera: &Camera, grid: &ClusterGridConfig, width: u32, height: u32) -> Self {
        Self {
            view: camera.view(),
            proj: camera.projection(grid),
            inv_proj: camera.projection_inverse(grid),
            screen: [width as f32, height as f32, grid.near_plane, grid.far_plane],
            grid: [
                grid.clusters_x,
                grid.clusters_y,
                grid.clusters_z,
                grid.max_lights_per_cluster,
            ],
        }
    }

    /// Grid config reconstructed from the uniform image.
    #[must_use]
    pub fn grid_config(&self) -> ClusterGridConfig {
        ClusterGridConfig {
            clusters_x: self.grid[0],
            clusters_y: self.grid[1],
            clusters_z: self.grid[2],
            max_lights_per_cluster: self.grid[3],
            near_plane: self.screen[2],
            far_plane: self.screen[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Struct sizes must match the WGSL declarations byte for byte.
    #[test]
    fn test_uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 64);
        assert_eq!(std::mem::size_of::<ClusterParams>(), 3 * 64 + 16 + 16);
    }

    #[test]
    fn test_cluster_params_roundtrips_grid() {
        let grid = ClusterGridConfig::new(16, 9, 24).with_capacity(64);
        let params = ClusterParams::new(&Camera::default(), &grid, 1920, 1080);
        assert_eq!(params.grid_config(), grid);
        assert_eq!(params.screen[0], 1920.0);
        assert_eq!(params.screen[1], 1080.0);
    }
}
