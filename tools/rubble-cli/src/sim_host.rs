//! In-process host for headless simulation
//!
//! Stands in for a game engine: keeps a registry of debris fragments, runs the
//! deferred queue on the simulation clock and counts what the surface asked
//! of the render and physics sides.

use glam::Vec3;
use hashbrown::HashMap;
use rubble_core::deferred::{DeferredQueue, DeferredTask, Scheduler};
use rubble_core::host::{ColliderSink, FragmentFactory, MeshSink};
use rubble_core::{Aabb, DebrisSpawn, FragmentId, SurfaceId};

/// A live debris fragment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub spawn: DebrisSpawn,
    /// Whether the fragment can still collide
    pub collider: bool,
}

/// Simulated engine host
#[derive(Debug, Default)]
pub struct SimHost {
    queue: DeferredQueue,
    fragments: HashMap<FragmentId, Fragment>,
    next_fragment: u64,
    pub fragments_spawned: u64,
    pub fragments_destroyed: u64,
    pub vertex_commits: u64,
    pub triangle_commits: u64,
    pub collider_rebuilds: u64,
}

impl SimHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulation clock in seconds
    pub fn now(&self) -> f64 {
        self.queue.now()
    }

    /// Fragments currently alive
    pub fn live_fragments(&self) -> usize {
        self.fragments.len()
    }

    /// Live fragments that still carry a collision shape
    pub fn colliding_fragments(&self) -> usize {
        self.fragments.values().filter(|f| f.collider).count()
    }

    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    /// Advance the clock, apply due fragment tasks and hand back surface tasks
    pub fn advance(&mut self, dt: f32) -> Vec<DeferredTask> {
        let mut surface_tasks = Vec::new();
        for task in self.queue.advance(dt) {
            match task {
                DeferredTask::RemoveFragmentCollider(id) => {
                    if let Some(fragment) = self.fragments.get_mut(&id) {
                        fragment.collider = false;
                    }
                }
                DeferredTask::DestroyFragment(id) => {
                    if let Some(fragment) = self.fragments.remove(&id) {
                        self.fragments_destroyed += 1;
                        tracing::trace!(fragment = id.0, vertex = fragment.spawn.vertex, "fragment destroyed");
                    }
                }
                DeferredTask::DestroySurface(_) => surface_tasks.push(task),
            }
        }
        surface_tasks
    }
}

impl FragmentFactory for SimHost {
    fn spawn_fragment(&mut self, spawn: &DebrisSpawn) -> FragmentId {
        self.next_fragment += 1;
        let id = FragmentId(self.next_fragment);
        self.fragments.insert(
            id,
            Fragment {
                spawn: *spawn,
                collider: true,
            },
        );
        self.fragments_spawned += 1;
        tracing::trace!(fragment = id.0, vertex = spawn.vertex, "fragment spawned");
        id
    }
}

impl Scheduler for SimHost {
    fn schedule(&mut self, delay: f32, task: DeferredTask) {
        self.queue.schedule(delay, task);
    }
}

impl MeshSink for SimHost {
    fn commit_vertices(&mut self, _surface: SurfaceId, _positions: &[Vec3], _normals: &[Vec3], _bounds: Aabb) {
        self.vertex_commits += 1;
    }

    fn commit_triangles(&mut self, surface: SurfaceId, triangles: &[[u32; 3]], _bounds: Aabb) {
        self.triangle_commits += 1;
        tracing::trace!(surface = surface.0, triangles = triangles.len(), "triangles committed");
    }
}

impl ColliderSink for SimHost {
    fn rebuild_collider(&mut self, surface: SurfaceId, _positions: &[Vec3], triangles: &[[u32; 3]]) {
        self.collider_rebuilds += 1;
        tracing::trace!(surface = surface.0, triangles = triangles.len(), "collider rebuilt");
    }
}
