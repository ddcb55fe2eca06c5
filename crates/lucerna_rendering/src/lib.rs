//! # LUCERNA Rendering
//!
//! GPU half of the clustered light-culling pipeline. Each frame runs:
//!
//! 1. light animation compute (one invocation per light)
//! 2. cluster assignment compute (one invocation per cluster, rewriting
//!    counts and packed index lists from scratch)
//! 3. one of two shading consumers reading the same cluster buffers:
//!    Forward+ or Clustered Deferred
//!
//! All three stages record into a single command encoder, so cluster data
//! is always produced and consumed within one submission. Applications
//! supply geometry through [`scene::DrawScene`] and drive frames through
//! [`renderer::Renderer`].

pub mod deferred;
pub mod forward;
pub mod passes;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod shaders;

pub use deferred::{ClusteredDeferredPipeline, GBuffer};
pub use forward::{ForwardPlusPipeline, DEPTH_FORMAT};
pub use renderer::{Renderer, RendererError, RenderStats, ShadingPath};
pub use resources::{ClusterResources, ResourceError};
pub use scene::{DrawCommand, DrawScene, ModelUniforms, Vertex};
pub use shaders::{ShaderError, ShaderSet};
