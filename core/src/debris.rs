//! Debris emission
//!
//! Turns a fractured vertex into a short-lived physical fragment. Fragments
//! are fire-and-forget: once spawned they only exist in the host and in two
//! scheduled cleanup tasks.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::DebrisConfig;
use crate::contact::ContactSampler;
use crate::deferred::{DeferredTask, Scheduler};
use crate::host::FragmentFactory;
use crate::random::RandomSource;

/// Host-assigned handle of a spawned fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FragmentId(pub u64);

/// Everything the host needs to create one fragment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebrisSpawn {
    /// Vertex the fragment broke off from
    pub vertex: usize,
    /// World-space spawn position
    pub position: Vec3,
    /// Uniform scale
    pub scale: f32,
    /// One-shot impulse in world space
    pub impulse: Vec3,
}

/// Builds and spawns debris fragments
#[derive(Debug, Clone, PartialEq)]
pub struct DebrisEmitter {
    config: DebrisConfig,
}

impl DebrisEmitter {
    pub fn new(config: DebrisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DebrisConfig {
        &self.config
    }

    /// Describe the fragment for a vertex at `local_position`
    ///
    /// The impulse points along the vertex's direction from the surface
    /// origin plus the contact normal, with magnitude `chunk_force`.
    pub fn plan(
        &self,
        vertex: usize,
        local_position: Vec3,
        sampler: &ContactSampler,
        contact_normal: Vec3,
    ) -> DebrisSpawn {
        let outward = sampler.to_world_vector(local_position).normalize_or_zero();
        let normal = contact_normal.normalize_or_zero();
        let mut direction = (outward + normal).normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = if normal == Vec3::ZERO { Vec3::Y } else { normal };
        }

        DebrisSpawn {
            vertex,
            position: sampler.to_world_point(local_position),
            scale: self.config.chunk_size,
            impulse: direction * self.config.chunk_force,
        }
    }

    /// Roll the spawn chance and, on success, spawn the fragment and schedule
    /// its collider removal and destruction
    pub fn emit<H, R>(&self, spawn: &DebrisSpawn, host: &mut H, rng: &mut R) -> Option<FragmentId>
    where
        H: FragmentFactory + Scheduler + ?Sized,
        R: RandomSource + ?Sized,
    {
        if !rng.chance(self.config.spawn_chance) {
            tracing::trace!(vertex = spawn.vertex, "debris spawn skipped");
            return None;
        }

        let id = host.spawn_fragment(spawn);
        host.schedule(self.config.collider_lifetime, DeferredTask::RemoveFragmentCollider(id));
        host.schedule(self.config.lifetime, DeferredTask::DestroyFragment(id));
        tracing::trace!(vertex = spawn.vertex, fragment = id.0, "debris spawned");
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{RecordingHost, ScriptedRandom};
    use glam::Affine3A;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_plan_position_and_scale() {
        let emitter = DebrisEmitter::new(DebrisConfig {
            chunk_size: 0.25,
            chunk_force: 2.0,
            ..DebrisConfig::default()
        });
        let sampler = ContactSampler::new(Affine3A::from_translation(Vec3::new(0.0, 10.0, 0.0)));

        let spawn = emitter.plan(4, Vec3::X, &sampler, Vec3::Y);

        assert_eq!(spawn.vertex, 4);
        assert!((spawn.position - Vec3::new(1.0, 10.0, 0.0)).length() < EPSILON);
        assert!((spawn.scale - 0.25).abs() < EPSILON);
        assert!((spawn.impulse.length() - 2.0).abs() < EPSILON);
        let expected = (Vec3::X + Vec3::Y).normalize() * 2.0;
        assert!((spawn.impulse - expected).length() < EPSILON);
    }

    #[test]
    fn test_plan_degenerate_direction_uses_normal() {
        let emitter = DebrisEmitter::new(DebrisConfig::default());
        let sampler = ContactSampler::default();

        // Vertex at the origin has no outward direction
        let spawn = emitter.plan(0, Vec3::ZERO, &sampler, Vec3::Z);
        assert!((spawn.impulse.normalize() - Vec3::Z).length() < EPSILON);

        // Opposing directions cancel out
        let spawn = emitter.plan(0, Vec3::X, &sampler, Vec3::NEG_X);
        assert!((spawn.impulse.normalize() - Vec3::NEG_X).length() < EPSILON);
    }

    #[test]
    fn test_emit_schedules_cleanup() {
        let emitter = DebrisEmitter::new(DebrisConfig::default());
        let mut host = RecordingHost::default();
        let mut rng = ScriptedRandom::new(vec![0.5]);
        let spawn = emitter.plan(0, Vec3::X, &ContactSampler::default(), Vec3::Y);

        let id = emitter.emit(&spawn, &mut host, &mut rng).unwrap();

        assert_eq!(host.spawned.len(), 1);
        assert_eq!(
            host.scheduled,
            vec![
                (5.0, DeferredTask::RemoveFragmentCollider(id)),
                (10.0, DeferredTask::DestroyFragment(id)),
            ]
        );
    }

    #[test]
    fn test_emit_respects_spawn_chance() {
        let emitter = DebrisEmitter::new(DebrisConfig {
            spawn_chance: 0.1,
            ..DebrisConfig::default()
        });
        let mut host = RecordingHost::default();
        let spawn = emitter.plan(0, Vec3::X, &ContactSampler::default(), Vec3::Y);

        let mut miss = ScriptedRandom::new(vec![0.5]);
        assert!(emitter.emit(&spawn, &mut host, &mut miss).is_none());
        assert!(host.spawned.is_empty());
        assert!(host.scheduled.is_empty());

        let mut hit = ScriptedRandom::new(vec![0.05]);
        assert!(emitter.emit(&spawn, &mut host, &mut hit).is_some());
        assert_eq!(host.spawned.len(), 1);
    }
}
