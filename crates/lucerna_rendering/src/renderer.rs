//! Renderer facade tying the passes into one per-frame sequence.

use lucerna_clustering::{
    Camera, CameraUniforms, ClusterGridConfig, ClusterParams, GridError, LightBounds, LightSet,
    MoveLightsUniforms,
};
use thiserror::Error;

use crate::deferred::{ClusteredDeferredPipeline, GBuffer};
use crate::forward::ForwardPlusPipeline;
use crate::passes::{ClusterAssignmentPass, LightAnimator};
use crate::resources::{ClusterResources, ResourceError};
use crate::scene::{self, DrawScene};
use crate::shaders::{ShaderError, ShaderSet};

/// Which consumer shades the frames, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingPath {
    /// Single-pass shading with per-cluster light lists.
    #[default]
    ForwardPlus,
    /// G-buffer geometry pass plus a fullscreen lighting resolve.
    ClusteredDeferred,
}

/// Renderer construction and per-frame failures.
#[derive(Debug, Error)]
pub enum RendererError {
    /// The grid configuration failed validation.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Shader preprocessing failed.
    #[error(transparent)]
    Shader(#[from] ShaderError),
    /// A GPU resource operation failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Counters for the last rendered frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStats {
    /// Geometry draw calls recorded.
    pub draw_calls: u32,
    /// Lights animated and binned this frame.
    pub lights: u32,
    /// Clusters assigned by the compute pass.
    pub clusters: u32,
    /// Path that shaded the frame.
    pub shading_path: ShadingPath,
}

/// The clustered renderer.
///
/// Owns the cluster resources, both compute passes and both shading paths.
/// Frame sequence: upload uniforms, animate lights, rebuild cluster lists,
/// shade with the active path, submit. Cluster buffers are produced and
/// consumed inside a single submission, so consumers never observe a
/// partially written frame.
pub struct Renderer {
    grid: ClusterGridConfig,
    resources: ClusterResources,
    animator: LightAnimator,
    clustering: ClusterAssignmentPass,
    forward: ForwardPlusPipeline,
    deferred: ClusteredDeferredPipeline,
    gbuffer: GBuffer,
    model_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    shading_path: ShadingPath,
    light_count: u32,
    width: u32,
    height: u32,
}

impl Renderer {
    /// Builds the full pipeline for a validated grid.
    ///
    /// # Errors
    ///
    /// Returns a [`RendererError`] if the grid is invalid or a shader fails
    /// preprocessing.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        grid: &ClusterGridConfig,
        shading_path: ShadingPath,
        light_capacity: u32,
        width: u32,
        height: u32,
    ) -> Result<Self, RendererError> {
        grid.validate()?;
        let shaders = ShaderSet::preprocess()?;

        let resources = ClusterResources::new(device, grid, light_capacity);
        let model_layout = scene::model_bind_group_layout(device);
        let material_layout = scene::material_bind_group_layout(device);

        let animator = LightAnimator::new(device, &resources, &shaders);
        let clustering = ClusterAssignmentPass::new(device, &resources, &shaders);
        let forward = ForwardPlusPipeline::new(
            device,
            &resources,
            &shaders,
            &model_layout,
            &material_layout,
            surface_format,
        );
        let deferred = ClusteredDeferredPipeline::new(
            device,
            &resources,
            &shaders,
            &model_layout,
            &material_layout,
            surface_format,
        );
        let gbuffer = GBuffer::new(device, deferred.gbuffer_layout(), width, height);

        tracing::info!(
            ?surface_format,
            ?shading_path,
            width,
            height,
            clusters = grid.total_clusters(),
            "renderer ready"
        );
        Ok(Self {
            grid: *grid,
            resources,
            animator,
            clustering,
            forward,
            deferred,
            gbuffer,
            model_layout,
            material_layout,
            shading_path,
            light_count: 0,
            width,
            height,
        })
    }

    /// Layout for per-object model bind groups (group 1).
    #[must_use]
    pub const fn model_layout(&self) -> &wgpu::BindGroupLayout {
        &self.model_layout
    }

    /// Layout for material bind groups (group 2).
    #[must_use]
    pub const fn material_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_layout
    }

    /// The grid the renderer was built for.
    #[must_use]
    pub const fn grid(&self) -> &ClusterGridConfig {
        &self.grid
    }

    /// The shading path the renderer was built with.
    #[must_use]
    pub const fn shading_path(&self) -> ShadingPath {
        self.shading_path
    }

    /// Replaces the light population.
    ///
    /// # Errors
    ///
    /// Returns a [`RendererError`] if the set exceeds the buffer capacity.
    pub fn set_lights(&mut self, queue: &wgpu::Queue, lights: &LightSet) -> Result<(), RendererError> {
        self.resources.upload_lights(queue, lights)?;
        self.light_count = lights.len();
        Ok(())
    }

    /// Recreates the screen-sized attachments after a surface resize.
    ///
    /// Cluster buffers are untouched: the grid tiling is resolution
    /// independent, only the attachments track the surface.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.gbuffer = GBuffer::new(device, self.deferred.gbuffer_layout(), width, height);
        tracing::debug!(width, height, "attachments recreated");
    }

    /// Renders one frame into `target` and submits it.
    pub fn render_frame(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        camera: &Camera,
        scene: &dyn DrawScene,
        light_bounds: &LightBounds,
        delta_time: f32,
    ) -> RenderStats {
        self.resources
            .write_camera(queue, &CameraUniforms::new(camera, &self.grid));
        self.resources.write_params(
            queue,
            &ClusterParams::new(camera, &self.grid, self.width, self.height),
        );
        self.resources.write_move_uniforms(
            queue,
            &MoveLightsUniforms::new(light_bounds, delta_time, self.light_count),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        self.animator
            .record(&mut encoder, &self.resources, self.light_count);
        self.clustering.record(&mut encoder, &self.resources);

        let draw_calls = match self.shading_path {
            ShadingPath::ForwardPlus => self.forward.record(
                &mut encoder,
                target,
                self.gbuffer.depth_view(),
                &self.resources,
                scene,
            ),
            ShadingPath::ClusteredDeferred => {
                self.deferred
                    .record(&mut encoder, target, &self.gbuffer, &self.resources, scene)
            }
        };
        queue.submit(std::iter::once(encoder.finish()));

        RenderStats {
            draw_calls,
            lights: self.light_count,
            clusters: self.grid.total_clusters(),
            shading_path: self.shading_path,
        }
    }
}
