//! Scene geometry interface shared by both shading paths.
//!
//! Renderables are decoupled from the passes through [`DrawScene`]: the
//! scene walks its objects and emits [`DrawCommand`]s, and the active pass
//! translates them onto its render pass. A single callback carries all
//! three command kinds because the render pass encoder can only be mutably
//! borrowed once.

use bytemuck::{Pod, Zeroable};
use lucerna_clustering::math::Mat4;

/// Interleaved scene vertex, 32 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

impl Vertex {
    /// Vertex buffer layout matching the `VertexInput` WGSL struct.
    #[must_use]
    pub const fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Per-object uniforms, bound at group 1.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ModelUniforms {
    /// Object-to-world matrix.
    pub model: Mat4,
}

/// One step of a scene walk.
pub enum DrawCommand<'a> {
    /// Bind an object's model uniform group (group 1).
    BindModel(&'a wgpu::BindGroup),
    /// Bind a material's texture/sampler group (group 2).
    BindMaterial(&'a wgpu::BindGroup),
    /// Draw indexed geometry with the currently bound groups.
    Draw {
        /// Interleaved [`Vertex`] buffer.
        vertex_buffer: &'a wgpu::Buffer,
        /// `u32` index buffer.
        index_buffer: &'a wgpu::Buffer,
        /// Number of indices to draw.
        index_count: u32,
    },
}

/// Anything that can feed geometry to the shading passes.
///
/// The lifetime ties emitted resources to the scene borrow, which is what
/// lets a pass hand them straight to its render pass encoder.
pub trait DrawScene {
    /// Walks the scene in draw order, emitting one command per step.
    fn draw<'scene>(&'scene self, emit: &mut dyn FnMut(DrawCommand<'scene>));
}

/// Bind group layout for per-object model uniforms (group 1).
#[must_use]
pub fn model_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Model Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Bind group layout for material texture and sampler (group 2).
#[must_use]
pub fn material_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Material Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_32_bytes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn test_vertex_attribute_offsets() {
        let desc = Vertex::desc();
        assert_eq!(desc.array_stride, 32);
        assert_eq!(desc.attributes[0].offset, 0);
        assert_eq!(desc.attributes[1].offset, 12);
        assert_eq!(desc.attributes[2].offset, 24);
    }
}
