//! # LUCERNA Clustering Core
//!
//! CPU side of the clustered light-culling pipeline:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     PER-FRAME DATA FLOW                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Camera ──► ClusterParams ──► Cluster Assignment (GPU/CPU)   │
//! │                    ▲                    │                    │
//! │  LightSet ─────────┘                    ▼                    │
//! │              cluster counts + packed light index lists       │
//! │                         │                                    │
//! │                         ▼                                    │
//! │        Forward+  /  Clustered Deferred shading               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The camera frustum is partitioned into `clusters_x × clusters_y ×
//! clusters_z` sub-frusta: uniform in screen-space X/Y, logarithmic in
//! depth so clusters keep a roughly constant screen footprint. Every frame
//! the assignment engine bins each point light into the clusters its sphere
//! touches, bounded by a fixed per-cluster capacity.
//!
//! This crate is GPU-free. [`assign::ClusterAssignments`] is a reference
//! implementation of the exact algorithm the compute shader runs, which is
//! what makes the binning properties testable headless.

pub mod assign;
pub mod camera;
pub mod grid;
pub mod lights;
pub mod math;
pub mod uniforms;

pub use assign::ClusterAssignments;
pub use camera::Camera;
pub use grid::{ClusterGridConfig, GridError};
pub use lights::{LightBounds, LightSet, MoveLightsUniforms, PointLight};
pub use uniforms::{CameraUniforms, ClusterParams};
