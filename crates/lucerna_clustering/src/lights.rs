//! Point light storage and deterministic scene population.

use bytemuck::{Pod, Zeroable};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One point light, 32 bytes, matching the WGSL `PointLight` struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLight {
    /// World-space position.
    pub position: [f32; 3],
    /// Influence radius; contribution is zero at and beyond this distance.
    pub radius: f32,
    /// Linear RGB intensity.
    pub color: [f32; 3],
    /// Explicit padding to a 16-byte multiple.
    pub _pad: f32,
}

impl PointLight {
    /// Creates a light with zeroed padding.
    #[must_use]
    pub const fn new(position: [f32; 3], radius: f32, color: [f32; 3]) -> Self {
        Self {
            position,
            radius,
            color,
            _pad: 0.0,
        }
    }
}

/// Axis-aligned world-space box lights are scattered in and wrapped to.
#[derive(Debug, Clone, Copy)]
pub struct LightBounds {
    /// Minimum corner.
    pub min: [f32; 3],
    /// Maximum corner.
    pub max: [f32; 3],
}

impl Default for LightBounds {
    fn default() -> Self {
        Self {
            min: [-20.0, 0.0, -20.0],
            max: [20.0, 10.0, 20.0],
        }
    }
}

/// Uniforms for the light animation compute pass.
///
/// WGSL mirror:
/// ```wgsl
/// struct MoveLightsUniforms {
///     bounds_min: vec3f,
///     time: f32,
///     bounds_max: vec3f,
///     light_count: u32,
/// }
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MoveLightsUniforms {
    /// Minimum corner of the wrap box.
    pub bounds_min: [f32; 3],
    /// Frame delta time in seconds.
    pub time: f32,
    /// Maximum corner of the wrap box.
    pub bounds_max: [f32; 3],
    /// Number of live lights.
    pub light_count: u32,
}

impl MoveLightsUniforms {
    /// Snapshots the animation state for upload.
    #[must_use]
    pub const fn new(bounds: &LightBounds, time: f32, light_count: u32) -> Self {
        Self {
            bounds_min: bounds.min,
            time,
            bounds_max: bounds.max,
            light_count,
        }
    }
}

/// CPU-side set of point lights.
///
/// The GPU image is a 16-byte header (`count` plus padding) followed by the
/// packed lights, so the storage buffer carries its own length.
#[derive(Debug, Clone, Default)]
pub struct LightSet {
    lights: Vec<PointLight>,
}

impl LightSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { lights: Vec::new() }
    }

    /// Wraps an existing light list.
    #[must_use]
    pub fn from_lights(lights: Vec<PointLight>) -> Self {
        Self { lights }
    }

    /// Scatters `count` lights uniformly inside `bounds`.
    ///
    /// Deterministic: the same seed always yields the same scene.
    #[must_use]
    pub fn scatter(count: u32, bounds: &LightBounds, radius: f32, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let lights = (0..count)
            .map(|_| {
                let position = [
                    rng.gen_range(bounds.min[0]..=bounds.max[0]),
                    rng.gen_range(bounds.min[1]..=bounds.max[1]),
                    rng.gen_range(bounds.min[2]..=bounds.max[2]),
                ];
                // Saturated hues read well against an unlit backdrop.
                let color = [
                    rng.gen_range(0.3..=1.0),
                    rng.gen_range(0.3..=1.0),
                    rng.gen_range(0.3..=1.0),
                ];
                PointLight::new(position, radius, color)
            })
            .collect();
        Self { lights }
    }

    /// Number of lights in the set.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.lights.len() as u32
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// The lights, in index order.
    #[must_use]
    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    /// Mutable access, used by the CPU reference animator in tests.
    pub fn lights_mut(&mut self) -> &mut [PointLight] {
        &mut self.lights
    }

    /// Byte image for the GPU storage buffer: count header, then lights.
    #[must_use]
    pub fn gpu_bytes(&self) -> Vec<u8> {
        let header: [u32; 4] = [self.len(), 0, 0, 0];
        let mut bytes = Vec::with_capacity(16 + self.lights.len() * 32);
        bytes.extend_from_slice(bytemuck::bytes_of(&header));
        bytes.extend_from_slice(bytemuck::cast_slice(&self.lights));
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_light_is_32_bytes() {
        assert_eq!(std::mem::size_of::<PointLight>(), 32);
        assert_eq!(std::mem::size_of::<MoveLightsUniforms>(), 32);
    }

    #[test]
    fn test_scatter_is_deterministic() {
        let bounds = LightBounds::default();
        let a = LightSet::scatter(64, &bounds, 2.0, 7);
        let b = LightSet::scatter(64, &bounds, 2.0, 7);
        assert_eq!(a.lights(), b.lights());

        let c = LightSet::scatter(64, &bounds, 2.0, 8);
        assert_ne!(a.lights(), c.lights());
    }

    #[test]
    fn test_scatter_respects_bounds() {
        let bounds = LightBounds {
            min: [-1.0, 0.0, -2.0],
            max: [1.0, 3.0, 2.0],
        };
        let set = LightSet::scatter(128, &bounds, 1.0, 42);
        assert_eq!(set.len(), 128);
        for light in set.lights() {
            for axis in 0..3 {
                assert!(light.position[axis] >= bounds.min[axis]);
                assert!(light.position[axis] <= bounds.max[axis]);
            }
        }
    }

    #[test]
    fn test_gpu_bytes_layout() {
        let set = LightSet::from_lights(vec![
            PointLight::new([1.0, 2.0, 3.0], 4.0, [0.5, 0.6, 0.7]),
            PointLight::new([-1.0, 0.0, 0.0], 1.0, [1.0, 1.0, 1.0]),
        ]);
        let bytes = set.gpu_bytes();
        assert_eq!(bytes.len(), 16 + 2 * 32);

        let count: u32 = *bytemuck::from_bytes(&bytes[0..4]);
        assert_eq!(count, 2);

        let first: PointLight = *bytemuck::from_bytes(&bytes[16..48]);
        assert_eq!(first.position, [1.0, 2.0, 3.0]);
        assert_eq!(first.radius, 4.0);
    }

    #[test]
    fn test_empty_set_still_carries_header() {
        let set = LightSet::new();
        assert!(set.is_empty());
        assert_eq!(set.gpu_bytes().len(), 16);
    }
}
