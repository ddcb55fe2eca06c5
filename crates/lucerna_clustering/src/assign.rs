//! Reference cluster assignment engine.
//!
//! This is the exact algorithm the clustering compute shader runs, executed
//! on the CPU over the same [`ClusterParams`] uniform image. One pass per
//! frame: every cluster's count and index list is rewritten from scratch,
//! so no clearing step exists and stale data cannot leak between frames.
//!
//! Binning policy:
//! - a light lands in every cluster whose view-space AABB its sphere touches
//! - lights are visited in index order; once a cluster reaches
//!   `max_lights_per_cluster`, later lights are dropped for that cluster
//!   (first-index-wins truncation)

use crate::grid::ClusterGridConfig;
use crate::lights::LightSet;
use crate::math::{self, Vec3};
use crate::uniforms::ClusterParams;

/// Per-cluster light lists produced by one assignment pass.
///
/// Layout matches the GPU buffers: `counts[c]` is the number of lights in
/// cluster `c`, and its indices occupy `indices[c * capacity .. c * capacity
/// + counts[c]]`. Slots past the count are unspecified.
#[derive(Debug, Clone)]
pub struct ClusterAssignments {
    grid: ClusterGridConfig,
    counts: Vec<u32>,
    indices: Vec<u32>,
}

impl ClusterAssignments {
    /// Runs the assignment pass for one frame.
    #[must_use]
    pub fn compute(params: &ClusterParams, lights: &LightSet) -> Self {
        let grid = params.grid_config();
        let capacity = grid.max_lights_per_cluster as usize;
        let mut counts = vec![0_u32; grid.total_clusters() as usize];
        let mut indices = vec![0_u32; grid.total_index_slots() as usize];

        // Light spheres are tested in view space; positions are stored in
        // world space, so transform once up front.
        let view_positions: Vec<Vec3> = lights
            .lights()
            .iter()
            .map(|l| math::transform_point(&params.view, l.position))
            .collect();

        for z in 0..grid.clusters_z {
            for y in 0..grid.clusters_y {
                for x in 0..grid.clusters_x {
                    let cluster = grid.cluster_index(x, y, z) as usize;
                    let (aabb_min, aabb_max) = cluster_aabb(params, &grid, x, y, z);

                    let mut count = 0_u32;
                    for (index, light) in lights.lights().iter().enumerate() {
                        if count as usize == capacity {
                            break;
                        }
                        let center = view_positions[index];
                        if sphere_intersects_aabb(center, light.radius, aabb_min, aabb_max) {
                            indices[cluster * capacity + count as usize] = index as u32;
                            count += 1;
                        }
                    }
                    counts[cluster] = count;
                }
            }
        }

        Self {
            grid,
            counts,
            indices,
        }
    }

    /// Per-cluster light counts, indexed by linear cluster index.
    #[must_use]
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Flat index buffer, `capacity` slots per cluster.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The grid the assignment was computed against.
    #[must_use]
    pub fn grid(&self) -> &ClusterGridConfig {
        &self.grid
    }

    /// The live light indices of one cluster.
    #[must_use]
    pub fn cluster_lights(&self, x: u32, y: u32, z: u32) -> &[u32] {
        let cluster = self.grid.cluster_index(x, y, z) as usize;
        let capacity = self.grid.max_lights_per_cluster as usize;
        let count = self.counts[cluster] as usize;
        &self.indices[cluster * capacity..cluster * capacity + count]
    }
}

/// View-space AABB of one cluster.
///
/// The cluster's NDC X/Y rectangle is unprojected as four corner rays
/// through the inverse projection, each ray is scaled to the slice's near
/// and far depths, and the eight points are min/maxed. Conservative for
/// the sub-frustum it bounds.
fn cluster_aabb(
    params: &ClusterParams,
    grid: &ClusterGridConfig,
    x: u32,
    y: u32,
    z: u32,
) -> (Vec3, Vec3) {
    let ndc_x0 = -1.0 + 2.0 * x as f32 / grid.clusters_x as f32;
    let ndc_x1 = -1.0 + 2.0 * (x + 1) as f32 / grid.clusters_x as f32;
    let ndc_y0 = -1.0 + 2.0 * y as f32 / grid.clusters_y as f32;
    let ndc_y1 = -1.0 + 2.0 * (y + 1) as f32 / grid.clusters_y as f32;
    let [depth_near, depth_far] = grid.slice_bounds(z);

    let mut aabb_min = [f32::MAX; 3];
    let mut aabb_max = [f32::MIN; 3];
    for ndc in [
        [ndc_x0, ndc_y0],
        [ndc_x1, ndc_y0],
        [ndc_x0, ndc_y1],
        [ndc_x1, ndc_y1],
    ] {
        let ray = unproject_ray(params, ndc);
        for depth in [depth_near, depth_far] {
            // View space looks down -Z, so depth d sits at ray.z * t = -d.
            let t = depth / -ray[2];
            let p = [ray[0] * t, ray[1] * t, ray[2] * t];
            for axis in 0..3 {
                aabb_min[axis] = aabb_min[axis].min(p[axis]);
                aabb_max[axis] = aabb_max[axis].max(p[axis]);
            }
        }
    }
    (aabb_min, aabb_max)
}

/// View-space direction through an NDC point on the image plane.
fn unproject_ray(params: &ClusterParams, ndc: [f32; 2]) -> Vec3 {
    // Any NDC depth works; 0.5 stays clear of both projective extremes.
    let clip = [ndc[0], ndc[1], 0.5, 1.0];
    let v = math::transform(&params.inv_proj, clip);
    [v[0] / v[3], v[1] / v[3], v[2] / v[3]]
}

/// Sphere vs AABB via the clamped closest point.
fn sphere_intersects_aabb(center: Vec3, radius: f32, aabb_min: Vec3, aabb_max: Vec3) -> bool {
    let mut dist_sq = 0.0;
    for axis in 0..3 {
        let clamped = center[axis].clamp(aabb_min[axis], aabb_max[axis]);
        let d = center[axis] - clamped;
        dist_sq += d * d;
    }
    dist_sq <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::lights::PointLight;

    // Camera at the origin looking down -Z with fov 90 / aspect 1, so view
    // space equals world space and NDC extents are easy to reason about.
    fn test_params(grid: &ClusterGridConfig) -> ClusterParams {
        let camera = Camera {
            eye: [0.0, 0.0, 0.0],
            target: [0.0, 0.0, -1.0],
            up: [0.0, 1.0, 0.0],
            fov_y: std::f32::consts::FRAC_PI_2,
            aspect: 1.0,
        };
        ClusterParams::new(&camera, grid, 800, 800)
    }

    #[test]
    fn test_huge_light_reaches_every_cluster() {
        let grid = ClusterGridConfig::new(2, 2, 2).with_capacity(4);
        let params = test_params(&grid);
        let lights = LightSet::from_lights(vec![PointLight::new(
            [0.0, 0.0, 0.0],
            10_000.0,
            [1.0; 3],
        )]);

        let assignments = ClusterAssignments::compute(&params, &lights);
        for cluster in 0..grid.total_clusters() as usize {
            assert_eq!(assignments.counts()[cluster], 1);
            assert_eq!(assignments.indices()[cluster * 4], 0);
        }
    }

    #[test]
    fn test_capacity_truncates_keeping_lowest_indices() {
        let grid = ClusterGridConfig::new(2, 2, 2)
            .with_capacity(4)
            .with_depth_range(0.1, 1000.0);
        let params = test_params(&grid);

        // Ten tiny lights, all inside cluster (0, 0, 0) and nowhere else.
        let lights = LightSet::from_lights(
            (0..10)
                .map(|i| {
                    PointLight::new([-0.5, -0.5, -1.0 - 0.01 * i as f32], 0.001, [1.0; 3])
                })
                .collect(),
        );

        let assignments = ClusterAssignments::compute(&params, &lights);
        assert_eq!(assignments.cluster_lights(0, 0, 0), &[0, 1, 2, 3]);
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..2 {
                    if (x, y, z) != (0, 0, 0) {
                        assert!(assignments.cluster_lights(x, y, z).is_empty());
                    }
                }
            }
        }
    }

    #[test]
    fn test_no_lights_yields_all_zero_counts() {
        let grid = ClusterGridConfig::new(3, 3, 4);
        let params = test_params(&grid);
        let assignments = ClusterAssignments::compute(&params, &LightSet::new());
        assert!(assignments.counts().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_light_behind_camera_is_excluded() {
        let grid = ClusterGridConfig::new(4, 4, 8);
        let params = test_params(&grid);
        let lights = LightSet::from_lights(vec![PointLight::new(
            [0.0, 0.0, 5.0],
            1.0,
            [1.0; 3],
        )]);

        let assignments = ClusterAssignments::compute(&params, &lights);
        assert!(assignments.counts().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_all_lights_kept_below_capacity() {
        let grid = ClusterGridConfig::new(2, 2, 2)
            .with_capacity(8)
            .with_depth_range(0.1, 1000.0);
        let params = test_params(&grid);
        let lights = LightSet::from_lights(
            (0..3)
                .map(|i| PointLight::new([0.5, 0.5, -2.0 - 0.1 * i as f32], 0.001, [1.0; 3]))
                .collect(),
        );

        let assignments = ClusterAssignments::compute(&params, &lights);
        assert_eq!(assignments.cluster_lights(1, 1, 0), &[0, 1, 2]);
    }

    #[test]
    fn test_stored_indices_are_valid_and_counts_bounded() {
        let grid = ClusterGridConfig::new(4, 4, 8).with_capacity(3);
        let params = test_params(&grid);
        let lights = crate::lights::LightSet::scatter(
            100,
            &crate::lights::LightBounds {
                min: [-30.0, -30.0, -90.0],
                max: [30.0, 30.0, -1.0],
            },
            5.0,
            1234,
        );

        let assignments = ClusterAssignments::compute(&params, &lights);
        for (cluster, &count) in assignments.counts().iter().enumerate() {
            assert!(count <= grid.max_lights_per_cluster);
            let base = cluster * grid.max_lights_per_cluster as usize;
            for slot in 0..count as usize {
                assert!(assignments.indices()[base + slot] < lights.len());
            }
        }
    }

    #[test]
    fn test_assignment_is_idempotent() {
        let grid = ClusterGridConfig::new(3, 3, 6).with_capacity(16);
        let params = test_params(&grid);
        let lights = crate::lights::LightSet::scatter(
            50,
            &crate::lights::LightBounds {
                min: [-10.0, -10.0, -50.0],
                max: [10.0, 10.0, -1.0],
            },
            3.0,
            99,
        );

        let a = ClusterAssignments::compute(&params, &lights);
        let b = ClusterAssignments::compute(&params, &lights);
        assert_eq!(a.counts(), b.counts());
        assert_eq!(a.indices(), b.indices());
    }
}
