//! Rubble Core - Deformable fracturing surfaces
//!
//! This crate erodes triangle meshes under contact, breaks vertices that
//! move too far into physical debris and keeps the collision shape roughly in
//! step with the rendered one. Rendering, physics and timers stay with the
//! host and are reached through small traits.
//!
//! # Architecture
//!
//! - [`Surface`] - One deformable body and its per-tick pipeline
//! - [`ContactSampler`] - World to local contact conversion
//! - [`DisplacementField`] - Falloff and noise weighted erosion
//! - [`FractureTracker`] - Threshold test, spawn cap and collapse detection
//! - [`DebrisEmitter`] - Fragment spawning and cleanup scheduling
//! - [`ColliderSync`] - Throttled collision shape rebuilds
//! - [`SurfaceHost`] - Everything the engine needs from its host

pub mod collider;
pub mod config;
pub mod contact;
pub mod debris;
pub mod deferred;
pub mod displacement;
pub mod drill;
pub mod error;
pub mod fracture;
pub mod host;
pub mod mesh;
pub mod noise;
pub mod random;
pub mod surface;
#[cfg(test)]
pub mod test_utils;

// Re-export the engine surface
pub use collider::ColliderSync;
pub use config::{
    ColliderConfig, DebrisConfig, DeformConfig, FractureConfig, FracturePolicy, Preset,
    SurfaceConfig,
};
pub use contact::{ContactPoint, ContactSampler, LocalContact};
pub use debris::{DebrisEmitter, DebrisSpawn, FragmentId};
pub use deferred::{DeferredQueue, DeferredTask, Scheduler};
pub use displacement::{DisplacementField, falloff};
pub use drill::{BurrSpin, BurrSpinConfig, DrillProbe};
pub use error::{ConfigError, MeshError, SurfaceError};
pub use fracture::FractureTracker;
pub use host::{ColliderSink, FragmentFactory, MeshSink, SurfaceHost};
pub use mesh::{Aabb, SurfaceMesh};
pub use noise::{CoherentNoise, ConstantNoise, PerlinNoise};
pub use random::RandomSource;
pub use surface::{DeformReport, Surface, SurfaceId, SurfaceState};

// Re-export glam so hosts agree on vector types
pub use glam;
