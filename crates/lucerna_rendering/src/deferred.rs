//! Clustered Deferred shading path.
//!
//! Two passes: geometry rasterizes world position, normal and albedo into
//! the G-buffer, then a fullscreen triangle resolves lighting with the same
//! cluster lookup the Forward+ shader uses. Light cost becomes independent
//! of scene overdraw.

use crate::forward::DEPTH_FORMAT;
use crate::resources::ClusterResources;
use crate::scene::{DrawCommand, DrawScene, Vertex};
use crate::shaders::{ShaderSet, GROUP_GBUFFER, GROUP_MATERIAL, GROUP_MODEL, GROUP_SCENE};

/// World-space position attachment format (w flags shaded texels).
pub const POSITION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Normal attachment format.
pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Albedo attachment format.
pub const ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

fn create_attachment(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Screen-sized geometry attachments for the deferred path.
///
/// Recreated wholesale on resize; nothing else in the pipeline depends on
/// the screen size.
pub struct GBuffer {
    position: wgpu::TextureView,
    normal: wgpu::TextureView,
    albedo: wgpu::TextureView,
    depth: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

impl GBuffer {
    /// Allocates the attachments and their fragment-stage bind group.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        width: u32,
        height: u32,
    ) -> Self {
        let position = create_attachment(device, "GBuffer Position", POSITION_FORMAT, width, height);
        let normal = create_attachment(device, "GBuffer Normal", NORMAL_FORMAT, width, height);
        let albedo = create_attachment(device, "GBuffer Albedo", ALBEDO_FORMAT, width, height);
        let depth = {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("GBuffer Depth"),
                size: wgpu::Extent3d {
                    width: width.max(1),
                    height: height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            texture.create_view(&wgpu::TextureViewDescriptor::default())
        };

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("GBuffer Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&position),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&normal),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&albedo),
                },
            ],
        });

        Self {
            position,
            normal,
            albedo,
            depth,
            bind_group,
        }
    }

    /// Depth view, shared with the forward path's attachment needs.
    #[must_use]
    pub const fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth
    }
}

/// The two-pass Clustered Deferred pipeline pair.
pub struct ClusteredDeferredPipeline {
    geometry_pipeline: wgpu::RenderPipeline,
    shading_pipeline: wgpu::RenderPipeline,
    gbuffer_layout: wgpu::BindGroupLayout,
}

impl ClusteredDeferredPipeline {
    /// Builds both pipelines against the shared scene layout.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        resources: &ClusterResources,
        shaders: &ShaderSet,
        model_layout: &wgpu::BindGroupLayout,
        material_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let scene_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("GBuffer Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders.scene.as_str().into()),
        });
        let shading_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Deferred Shading Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders.deferred_shading.as_str().into()),
        });

        let geometry_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("GBuffer Pipeline Layout"),
            bind_group_layouts: &[resources.scene_layout(), model_layout, material_layout],
            push_constant_ranges: &[],
        });
        let color_target = |format| {
            Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })
        };
        let geometry_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("GBuffer Pipeline"),
            layout: Some(&geometry_layout),
            vertex: wgpu::VertexState {
                module: &scene_module,
                entry_point: "vs_main",
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_module,
                entry_point: "fs_gbuffer",
                targets: &[
                    color_target(POSITION_FORMAT),
                    color_target(NORMAL_FORMAT),
                    color_target(ALBEDO_FORMAT),
                ],
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

        // G-buffer attachments are fetched with textureLoad, so the sample
        // type is unfilterable and no sampler is bound.
        let gbuffer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("GBuffer Layout"),
            entries: &[
                Self::texture_entry(0),
                Self::texture_entry(1),
                Self::texture_entry(2),
            ],
        });
        let shading_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Deferred Shading Pipeline Layout"),
            bind_group_layouts: &[resources.scene_layout(), &gbuffer_layout],
            push_constant_ranges: &[],
        });
        let shading_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Deferred Shading Pipeline"),
            layout: Some(&shading_layout),
            vertex: wgpu::VertexState {
                module: &shading_module,
                entry_point: "vs_fullscreen",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shading_module,
                entry_point: "fs_shade",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            geometry_pipeline,
            shading_pipeline,
            gbuffer_layout,
        }
    }

    const fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }
    }

    /// Layout the renderer uses to build [`GBuffer`] bind groups.
    #[must_use]
    pub const fn gbuffer_layout(&self) -> &wgpu::BindGroupLayout {
        &self.gbuffer_layout
    }

    /// Records both passes, returning the number of geometry draw calls.
    pub fn record<'a>(
        &'a self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        gbuffer: &'a GBuffer,
        resources: &'a ClusterResources,
        scene: &'a dyn DrawScene,
    ) -> u32 {
        let clear = wgpu::Operations {
            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            store: wgpu::StoreOp::Store,
        };
        let mut draw_calls = 0;
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("GBuffer Pass"),
                color_attachments: &[
                    Some(wgpu::RenderPassColorAttachment {
                        view: &gbuffer.position,
                        resolve_target: None,
                        ops: clear,
                    }),
                    Some(wgpu::RenderPassColorAttachment {
                        view: &gbuffer.normal,
                        resolve_target: None,
                        ops: clear,
                    }),
                    Some(wgpu::RenderPassColorAttachment {
                        view: &gbuffer.albedo,
                        resolve_target: None,
                        ops: clear,
                    }),
                ],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &gbuffer.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.geometry_pipeline);
            pass.set_bind_group(GROUP_SCENE, resources.scene_bind_group(), &[]);
            scene.draw(&mut |command| match command {
                DrawCommand::BindModel(group) => pass.set_bind_group(GROUP_MODEL, group, &[]),
                DrawCommand::BindMaterial(group) => {
                    pass.set_bind_group(GROUP_MATERIAL, group, &[]);
                }
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
        }
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Deferred Shading Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.shading_pipeline);
            pass.set_bind_group(GROUP_SCENE, resources.scene_bind_group(), &[]);
            pass.set_bind_group(GROUP_GBUFFER, &gbuffer.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        draw_calls
    }
}
