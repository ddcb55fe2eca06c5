//! Forward+ shading path.
//!
//! A single render pass draws the scene and shades each fragment from its
//! cluster's light list. Depth format matches the deferred path so the two
//! consumers stay swappable at runtime.

use crate::resources::ClusterResources;
use crate::scene::{DrawCommand, DrawScene, Vertex};
use crate::shaders::{ShaderSet, GROUP_MATERIAL, GROUP_MODEL, GROUP_SCENE};

/// Depth format shared by both shading paths.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The Forward+ render pipeline.
pub struct ForwardPlusPipeline {
    pipeline: wgpu::RenderPipeline,
}

impl ForwardPlusPipeline {
    /// Builds the pipeline against the shared scene layout.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        resources: &ClusterResources,
        shaders: &ShaderSet,
        model_layout: &wgpu::BindGroupLayout,
        material_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Forward+ Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders.scene.as_str().into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Forward+ Pipeline Layout"),
            bind_group_layouts: &[resources.scene_layout(), model_layout, material_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Forward+ Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: "vs_main",
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: "fs_forward",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });
        Self { pipeline }
    }

    /// Records the shading pass, returning the number of draw calls.
    pub fn record<'a>(
        &'a self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        depth_view: &'a wgpu::TextureView,
        resources: &'a ClusterResources,
        scene: &'a dyn DrawScene,
    ) -> u32 {
        let mut draw_calls = 0;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Forward+ Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(GROUP_SCENE, resources.scene_bind_group(), &[]);
        scene.draw(&mut |command| match command {
            DrawCommand::BindModel(group) => pass.set_bind_group(GROUP_MODEL, group, &[]),
            DrawCommand::BindMaterial(group) => pass.set_bind_group(GROUP_MATERIAL, group, &[]),
            DrawCommand::Draw {
                vertex_buffer,
                index_buffer,
                index_count,
            } => {
                pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..index_count, 0, 0..1);
                draw_calls += 1;
            }
        });
        draw_calls
    }
}
