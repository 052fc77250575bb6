//! Capabilities the engine needs from its host
//!
//! Rendering, rigid-body physics and timers belong to the host. A surface only
//! talks to them through these traits, so the same engine runs inside a game,
//! a headless simulator or a test harness.

use glam::Vec3;

use crate::debris::{DebrisSpawn, FragmentId};
use crate::mesh::Aabb;
use crate::surface::SurfaceId;

pub use crate::deferred::Scheduler;

/// Physical body factory for debris
pub trait FragmentFactory {
    /// Create a fragment body with a collision shape and apply its impulse
    fn spawn_fragment(&mut self, spawn: &DebrisSpawn) -> FragmentId;
}

/// Render-side mesh representation
pub trait MeshSink {
    /// Displaced vertices, current normals and recomputed bounds
    fn commit_vertices(&mut self, surface: SurfaceId, positions: &[Vec3], normals: &[Vec3], bounds: Aabb);

    /// Retained triangles after pruning
    fn commit_triangles(&mut self, surface: SurfaceId, triangles: &[[u32; 3]], bounds: Aabb);
}

/// Physics-side collision representation
pub trait ColliderSink {
    /// Rebuild the surface's collision shape from live buffers
    fn rebuild_collider(&mut self, surface: SurfaceId, positions: &[Vec3], triangles: &[[u32; 3]]);
}

/// Everything a surface needs from its host
pub trait SurfaceHost: FragmentFactory + MeshSink + ColliderSink + Scheduler {}

impl<T> SurfaceHost for T where T: FragmentFactory + MeshSink + ColliderSink + Scheduler {}
