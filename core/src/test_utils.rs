//! Shared test utilities for unit tests

use glam::Vec3;

use crate::debris::{DebrisSpawn, FragmentId};
use crate::deferred::{DeferredTask, Scheduler};
use crate::host::{ColliderSink, FragmentFactory, MeshSink};
use crate::mesh::Aabb;
use crate::random::RandomSource;
use crate::surface::SurfaceId;

// ============================================================================
// Recording Host
// ============================================================================

/// Host that records every call made to it
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub spawned: Vec<DebrisSpawn>,
    pub scheduled: Vec<(f32, DeferredTask)>,
    pub vertex_commits: u32,
    pub triangle_commits: u32,
    pub collider_rebuilds: u32,
    pub last_positions: Vec<Vec3>,
    pub last_normals: Vec<Vec3>,
    pub last_triangles: Vec<[u32; 3]>,
    pub last_bounds: Option<Aabb>,
    next_fragment: u64,
}

impl RecordingHost {
    /// Deferred tasks scheduled so far, without their delays
    pub fn tasks(&self) -> Vec<DeferredTask> {
        self.scheduled.iter().map(|(_, task)| *task).collect()
    }
}

impl FragmentFactory for RecordingHost {
    fn spawn_fragment(&mut self, spawn: &DebrisSpawn) -> FragmentId {
        self.spawned.push(*spawn);
        self.next_fragment += 1;
        FragmentId(self.next_fragment)
    }
}

impl Scheduler for RecordingHost {
    fn schedule(&mut self, delay: f32, task: DeferredTask) {
        self.scheduled.push((delay, task));
    }
}

impl MeshSink for RecordingHost {
    fn commit_vertices(&mut self, _surface: SurfaceId, positions: &[Vec3], normals: &[Vec3], bounds: Aabb) {
        self.vertex_commits += 1;
        self.last_positions = positions.to_vec();
        self.last_normals = normals.to_vec();
        self.last_bounds = Some(bounds);
    }

    fn commit_triangles(&mut self, _surface: SurfaceId, triangles: &[[u32; 3]], bounds: Aabb) {
        self.triangle_commits += 1;
        self.last_triangles = triangles.to_vec();
        self.last_bounds = Some(bounds);
    }
}

impl ColliderSink for RecordingHost {
    fn rebuild_collider(&mut self, _surface: SurfaceId, _positions: &[Vec3], _triangles: &[[u32; 3]]) {
        self.collider_rebuilds += 1;
    }
}

// ============================================================================
// Scripted Random Source
// ============================================================================

/// Random source replaying a fixed list of unit values in a loop
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Number of values drawn so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }

    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.unit() * len as f32) as usize).min(len - 1)
    }
}
