//! Compute passes: light animation and cluster assignment.
//!
//! Both record into the frame's command encoder ahead of the shading pass,
//! so the cluster buffers a consumer reads were always produced earlier in
//! the same submission.

use crate::resources::ClusterResources;
use crate::shaders::{self, ShaderSet};

/// Moves the light population on the GPU each frame.
pub struct LightAnimator {
    pipeline: wgpu::ComputePipeline,
}

impl LightAnimator {
    /// Builds the animation compute pipeline.
    #[must_use]
    pub fn new(device: &wgpu::Device, resources: &ClusterResources, shaders: &ShaderSet) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Move Lights Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders.move_lights.as_str().into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Move Lights Pipeline Layout"),
            bind_group_layouts: &[resources.move_lights_layout()],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Move Lights Pipeline"),
            layout: Some(&layout),
            module: &module,
            entry_point: "main",
        });
        Self { pipeline }
    }

    /// Records one animation dispatch; a no-op for an empty light set.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        resources: &ClusterResources,
        light_count: u32,
    ) {
        if light_count == 0 {
            return;
        }
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Move Lights Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, resources.move_lights_bind_group(), &[]);
        pass.dispatch_workgroups(
            light_count.div_ceil(shaders::MOVE_LIGHTS_WORKGROUP_SIZE),
            1,
            1,
        );
    }
}

/// Rebuilds the per-cluster light lists each frame.
pub struct ClusterAssignmentPass {
    pipeline: wgpu::ComputePipeline,
}

impl ClusterAssignmentPass {
    /// Builds the clustering compute pipeline.
    #[must_use]
    pub fn new(device: &wgpu::Device, resources: &ClusterResources, shaders: &ShaderSet) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Clustering Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders.clustering.as_str().into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Clustering Pipeline Layout"),
            bind_group_layouts: &[resources.clustering_layout()],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Clustering Pipeline"),
            layout: Some(&layout),
            module: &module,
            entry_point: "main",
        });
        Self { pipeline }
    }

    /// Records one full-grid assignment dispatch.
    ///
    /// Runs even with zero lights: the pass is what resets every cluster
    /// count, so skipping it would leave last frame's lists visible.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, resources: &ClusterResources) {
        let grid = resources.grid();
        let [wx, wy, wz] = shaders::CLUSTERING_WORKGROUP;
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Clustering Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, resources.clustering_bind_group(), &[]);
        pass.dispatch_workgroups(
            grid.clusters_x.div_ceil(wx),
            grid.clusters_y.div_ceil(wy),
            grid.clusters_z.div_ceil(wz),
        );
    }
}
