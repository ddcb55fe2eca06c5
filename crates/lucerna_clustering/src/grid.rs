//! Cluster grid definition.
//!
//! The view frustum is sliced into `clusters_x × clusters_y × clusters_z`
//! cells: uniform in NDC X/Y, logarithmic in depth. Depth slice `i` spans
//! `near · (far/near)^(i/Nz)` to `near · (far/near)^((i+1)/Nz)`, which keeps
//! cluster screen footprints roughly constant under perspective.

use thiserror::Error;

/// Errors from an invalid grid or frustum configuration.
///
/// These are programming/config defects: they abort pipeline construction
/// and are never produced at frame time.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    /// One of the grid dimensions is zero.
    #[error("cluster grid dimension is zero: {0}x{1}x{2}")]
    ZeroDimension(u32, u32, u32),
    /// The per-cluster light capacity is zero.
    #[error("max_lights_per_cluster must be at least 1")]
    ZeroCapacity,
    /// The near plane is not strictly positive.
    #[error("near plane must be > 0 (got {0})")]
    NonPositiveNear(f32),
    /// The depth range is empty or inverted.
    #[error("near plane {near} must be < far plane {far}")]
    EmptyDepthRange {
        /// Configured near plane.
        near: f32,
        /// Configured far plane.
        far: f32,
    },
}

/// Immutable description of the cluster grid.
///
/// Fixed for the lifetime of a renderer: the cluster count sizes the GPU
/// count/index buffers, and those are never re-tiled (screen resizes only
/// recreate screen-sized attachments).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterGridConfig {
    /// Cluster count along screen-space X.
    pub clusters_x: u32,
    /// Cluster count along screen-space Y.
    pub clusters_y: u32,
    /// Number of logarithmic depth slices.
    pub clusters_z: u32,
    /// Hard cap on light indices stored per cluster.
    pub max_lights_per_cluster: u32,
    /// View-space near plane distance.
    pub near_plane: f32,
    /// View-space far plane distance.
    pub far_plane: f32,
}

impl Default for ClusterGridConfig {
    fn default() -> Self {
        Self {
            clusters_x: 10,
            clusters_y: 10,
            clusters_z: 32,
            max_lights_per_cluster: 512,
            near_plane: 0.1,
            far_plane: 1000.0,
        }
    }
}

impl ClusterGridConfig {
    /// Creates a grid config with the default depth range and capacity.
    #[must_use]
    pub fn new(clusters_x: u32, clusters_y: u32, clusters_z: u32) -> Self {
        Self {
            clusters_x,
            clusters_y,
            clusters_z,
            ..Self::default()
        }
    }

    /// Overrides the per-cluster light capacity.
    #[must_use]
    pub fn with_capacity(mut self, max_lights_per_cluster: u32) -> Self {
        self.max_lights_per_cluster = max_lights_per_cluster;
        self
    }

    /// Overrides the depth range.
    #[must_use]
    pub fn with_depth_range(mut self, near: f32, far: f32) -> Self {
        self.near_plane = near;
        self.far_plane = far;
        self
    }

    /// Validates the configuration, failing fast on defects.
    ///
    /// # Errors
    ///
    /// Returns a [`GridError`] for zero dimensions, zero capacity, a
    /// non-positive near plane or an empty depth range.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.clusters_x == 0 || self.clusters_y == 0 || self.clusters_z == 0 {
            return Err(GridError::ZeroDimension(
                self.clusters_x,
                self.clusters_y,
                self.clusters_z,
            ));
        }
        if self.max_lights_per_cluster == 0 {
            return Err(GridError::ZeroCapacity);
        }
        if self.near_plane <= 0.0 {
            return Err(GridError::NonPositiveNear(self.near_plane));
        }
        if self.near_plane >= self.far_plane {
            return Err(GridError::EmptyDepthRange {
                near: self.near_plane,
                far: self.far_plane,
            });
        }
        Ok(())
    }

    /// Total number of clusters in the grid.
    #[must_use]
    pub const fn total_clusters(&self) -> u32 {
        self.clusters_x * self.clusters_y * self.clusters_z
    }

    /// Total number of index slots across all clusters.
    #[must_use]
    pub const fn total_index_slots(&self) -> u32 {
        self.total_clusters() * self.max_lights_per_cluster
    }

    /// Linear cluster index for a grid coordinate.
    #[must_use]
    pub const fn cluster_index(&self, x: u32, y: u32, z: u32) -> u32 {
        x + self.clusters_x * (y + self.clusters_y * z)
    }

    /// View-space depth bounds `[begin, end]` of slice `z` (positive distances).
    #[must_use]
    pub fn slice_bounds(&self, z: u32) -> [f32; 2] {
        let ratio = self.far_plane / self.near_plane;
        let nz = self.clusters_z as f32;
        [
            self.near_plane * ratio.powf(z as f32 / nz),
            self.near_plane * ratio.powf((z as f32 + 1.0) / nz),
        ]
    }

    /// Depth slice containing the positive view-space depth `d`.
    ///
    /// Clamped into range, so depths at or beyond the far plane land in the
    /// last slice and depths before the near plane in slice 0.
    #[must_use]
    pub fn slice_for_depth(&self, d: f32) -> u32 {
        let ratio = self.far_plane / self.near_plane;
        let slice = (d / self.near_plane).ln() / ratio.ln() * self.clusters_z as f32;
        if slice <= 0.0 {
            0
        } else {
            (slice as u32).min(self.clusters_z - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_reference_scene() {
        let grid = ClusterGridConfig::default();
        assert_eq!(grid.total_clusters(), 10 * 10 * 32);
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_defects() {
        let zero_dim = ClusterGridConfig::new(0, 4, 4);
        assert_eq!(zero_dim.validate(), Err(GridError::ZeroDimension(0, 4, 4)));

        let zero_cap = ClusterGridConfig::new(2, 2, 2).with_capacity(0);
        assert_eq!(zero_cap.validate(), Err(GridError::ZeroCapacity));

        let bad_near = ClusterGridConfig::new(2, 2, 2).with_depth_range(0.0, 10.0);
        assert!(bad_near.validate().is_err());

        let inverted = ClusterGridConfig::new(2, 2, 2).with_depth_range(10.0, 1.0);
        assert_eq!(
            inverted.validate(),
            Err(GridError::EmptyDepthRange {
                near: 10.0,
                far: 1.0
            })
        );
    }

    #[test]
    fn test_slice_bounds_cover_depth_range() {
        let grid = ClusterGridConfig::new(1, 1, 8).with_depth_range(0.1, 100.0);

        let first = grid.slice_bounds(0);
        let last = grid.slice_bounds(7);
        assert!((first[0] - 0.1).abs() < 1e-6);
        assert!((last[1] - 100.0).abs() < 1e-3);

        // Slices are contiguous and monotonic.
        for z in 0..7 {
            let a = grid.slice_bounds(z);
            let b = grid.slice_bounds(z + 1);
            assert!(a[0] < a[1]);
            assert!((a[1] - b[0]).abs() < 1e-3);
        }
    }

    #[test]
    fn test_slice_for_depth_inverts_bounds() {
        let grid = ClusterGridConfig::new(1, 1, 16).with_depth_range(0.5, 250.0);
        for z in 0..16 {
            let [begin, end] = grid.slice_bounds(z);
            let mid = (begin + end) * 0.5;
            assert_eq!(grid.slice_for_depth(mid), z);
        }
        assert_eq!(grid.slice_for_depth(0.01), 0);
        assert_eq!(grid.slice_for_depth(1e6), 15);
    }

    #[test]
    fn test_cluster_index_layout() {
        let grid = ClusterGridConfig::new(4, 3, 2);
        assert_eq!(grid.cluster_index(0, 0, 0), 0);
        assert_eq!(grid.cluster_index(3, 0, 0), 3);
        assert_eq!(grid.cluster_index(0, 1, 0), 4);
        assert_eq!(grid.cluster_index(0, 0, 1), 12);
        assert_eq!(grid.cluster_index(3, 2, 1), 23);
    }
}
