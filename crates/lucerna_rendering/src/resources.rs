//! GPU buffers and bind groups backing the clustering pipeline.
//!
//! Ownership rule: the cluster count/index buffers are written only by the
//! clustering compute pass and read-only everywhere else, so the scene
//! layout exposes them as read-only storage and the compute layout as
//! read-write. Buffer sizes are fixed by the grid config at construction;
//! a screen resize never touches them.

use lucerna_clustering::{
    CameraUniforms, ClusterGridConfig, ClusterParams, LightSet, MoveLightsUniforms,
};
use thiserror::Error;

/// Resource-level failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceError {
    /// A light upload exceeded the buffer's fixed capacity.
    #[error("light set holds {count} lights but the buffer fits {capacity}")]
    TooManyLights {
        /// Lights in the rejected set.
        count: u32,
        /// Lights the buffer was sized for.
        capacity: u32,
    },
}

/// The shared buffers plus the bind groups of every pass that touches them.
pub struct ClusterResources {
    grid: ClusterGridConfig,
    light_capacity: u32,

    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    counts_buffer: wgpu::Buffer,
    indices_buffer: wgpu::Buffer,
    move_uniforms_buffer: wgpu::Buffer,

    scene_layout: wgpu::BindGroupLayout,
    scene_bind_group: wgpu::BindGroup,
    clustering_layout: wgpu::BindGroupLayout,
    clustering_bind_group: wgpu::BindGroup,
    move_lights_layout: wgpu::BindGroupLayout,
    move_lights_bind_group: wgpu::BindGroup,
}

impl ClusterResources {
    /// Allocates all buffers and bind groups for `grid` and up to
    /// `light_capacity` lights.
    #[must_use]
    pub fn new(device: &wgpu::Device, grid: &ClusterGridConfig, light_capacity: u32) -> Self {
        let light_buffer_size = 16 + u64::from(light_capacity) * 32;
        let counts_size = u64::from(grid.total_clusters()) * 4;
        let indices_size = u64::from(grid.total_index_slots()) * 4;
        tracing::info!(
            clusters_x = grid.clusters_x,
            clusters_y = grid.clusters_y,
            clusters_z = grid.clusters_z,
            capacity = grid.max_lights_per_cluster,
            light_capacity,
            indices_bytes = indices_size,
            "allocating cluster resources"
        );

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Set"),
            size: light_buffer_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cluster Params"),
            size: std::mem::size_of::<ClusterParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let counts_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cluster Counts"),
            size: counts_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let indices_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cluster Indices"),
            size: indices_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let move_uniforms_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Move Lights Uniforms"),
            size: std::mem::size_of::<MoveLightsUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_layout = Self::create_scene_layout(device);
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: counts_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: indices_buffer.as_entire_binding(),
                },
            ],
        });

        let clustering_layout = Self::create_clustering_layout(device);
        let clustering_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Clustering Bind Group"),
            layout: &clustering_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: counts_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: indices_buffer.as_entire_binding(),
                },
            ],
        });

        let move_lights_layout = Self::create_move_lights_layout(device);
        let move_lights_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Move Lights Bind Group"),
            layout: &move_lights_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: move_uniforms_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            grid: *grid,
            light_capacity,
            camera_buffer,
            light_buffer,
            params_buffer,
            counts_buffer,
            indices_buffer,
            move_uniforms_buffer,
            scene_layout,
            scene_bind_group,
            clustering_layout,
            clustering_bind_group,
            move_lights_layout,
            move_lights_bind_group,
        }
    }

    /// Group 0 layout shared by the Forward+ and deferred shading pipelines.
    fn create_scene_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let uniform = wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        };
        let read_storage = wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        };
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: uniform,
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: read_storage,
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: uniform,
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: read_storage,
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: read_storage,
                    count: None,
                },
            ],
        })
    }

    fn create_clustering_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let storage = |read_only| wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        };
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Clustering Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: storage(true),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: storage(false),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: storage(false),
                    count: None,
                },
            ],
        })
    }

    fn create_move_lights_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Move Lights Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        })
    }

    /// The grid the buffers were sized for.
    #[must_use]
    pub const fn grid(&self) -> &ClusterGridConfig {
        &self.grid
    }

    /// Maximum number of lights the light buffer holds.
    #[must_use]
    pub const fn light_capacity(&self) -> u32 {
        self.light_capacity
    }

    /// Group 0 layout for render pipelines.
    #[must_use]
    pub const fn scene_layout(&self) -> &wgpu::BindGroupLayout {
        &self.scene_layout
    }

    /// Group 0 bind group for render passes.
    #[must_use]
    pub const fn scene_bind_group(&self) -> &wgpu::BindGroup {
        &self.scene_bind_group
    }

    /// Layout of the clustering compute bind group.
    #[must_use]
    pub const fn clustering_layout(&self) -> &wgpu::BindGroupLayout {
        &self.clustering_layout
    }

    /// Bind group for the clustering compute pass.
    #[must_use]
    pub const fn clustering_bind_group(&self) -> &wgpu::BindGroup {
        &self.clustering_bind_group
    }

    /// Layout of the light animation bind group.
    #[must_use]
    pub const fn move_lights_layout(&self) -> &wgpu::BindGroupLayout {
        &self.move_lights_layout
    }

    /// Bind group for the light animation compute pass.
    #[must_use]
    pub const fn move_lights_bind_group(&self) -> &wgpu::BindGroup {
        &self.move_lights_bind_group
    }

    /// Cluster count buffer, for readback in integration tests.
    #[must_use]
    pub const fn counts_buffer(&self) -> &wgpu::Buffer {
        &self.counts_buffer
    }

    /// Cluster index buffer, for readback in integration tests.
    #[must_use]
    pub const fn indices_buffer(&self) -> &wgpu::Buffer {
        &self.indices_buffer
    }

    /// Uploads per-frame camera uniforms.
    pub fn write_camera(&self, queue: &wgpu::Queue, uniforms: &CameraUniforms) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Uploads per-frame clustering parameters.
    pub fn write_params(&self, queue: &wgpu::Queue, params: &ClusterParams) {
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));
    }

    /// Uploads per-frame light animation uniforms.
    pub fn write_move_uniforms(&self, queue: &wgpu::Queue, uniforms: &MoveLightsUniforms) {
        queue.write_buffer(&self.move_uniforms_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Uploads a full light set, header included.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TooManyLights`] if the set exceeds the
    /// capacity the buffer was allocated for.
    pub fn upload_lights(&self, queue: &wgpu::Queue, lights: &LightSet) -> Result<(), ResourceError> {
        if lights.len() > self.light_capacity {
            return Err(ResourceError::TooManyLights {
                count: lights.len(),
                capacity: self.light_capacity,
            });
        }
        queue.write_buffer(&self.light_buffer, 0, &lights.gpu_bytes());
        Ok(())
    }
}
