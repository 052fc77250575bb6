//! Deformable fracturing surface
//!
//! A [`Surface`] owns the vertex and triangle buffers of one body and runs the
//! whole per-tick pipeline: contacts are sampled into local space, the
//! displacement field erodes nearby vertices, the fracture tracker breaks the
//! ones that moved too far, the debris emitter turns them into fragments and
//! the collider sync decides when the physics shape catches up.

use glam::{Affine3A, Vec3};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::collider::ColliderSync;
use crate::config::SurfaceConfig;
use crate::contact::{ContactPoint, ContactSampler, LocalContact};
use crate::debris::DebrisEmitter;
use crate::deferred::DeferredTask;
use crate::displacement::DisplacementField;
use crate::error::SurfaceError;
use crate::fracture::{FractureTracker, prune_triangles};
use crate::host::SurfaceHost;
use crate::mesh::{Aabb, SurfaceMesh, smooth_normals};
use crate::noise::{CoherentNoise, PerlinNoise};
use crate::random::{self, RandomSource};


/// Host-assigned handle of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

/// Lifecycle of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SurfaceState {
    /// Accepting contacts
    #[default]
    Intact,
    /// Collapsed, waiting for its scheduled removal
    Collapsing,
    /// Removed by the host
    Destroyed,
}

/// What one deformation call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeformReport {
    /// Vertices displaced
    pub displaced: usize,
    /// Vertices newly fractured
    pub fractured: usize,
    /// Debris emitter calls made for fractures
    pub emitter_calls: usize,
    /// Fragments the host actually spawned for fractures
    pub fragments_spawned: usize,
    /// Triangles pruned
    pub triangles_removed: usize,
    /// Collision shape rebuilt
    pub collider_synced: bool,
    /// Surface started collapsing
    pub collapsed: bool,
    /// Fragments spawned by the collapse burst
    pub collapse_fragments: usize,
}

impl DeformReport {
    /// Fold another report into this one
    pub fn absorb(&mut self, other: DeformReport) {
        self.displaced += other.displaced;
        self.fractured += other.fractured;
        self.emitter_calls += other.emitter_calls;
        self.fragments_spawned += other.fragments_spawned;
        self.triangles_removed += other.triangles_removed;
        self.collider_synced |= other.collider_synced;
        self.collapsed |= other.collapsed;
        self.collapse_fragments += other.collapse_fragments;
    }

    /// True if the call changed nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One deformable, fracturable body
///
/// `N` is the coherent noise used to modulate displacement and `R` the random
/// source behind spawn rolls, jitter, collider gating and collapse bursts.
/// Both are injected so runs are reproducible.
#[derive(Debug)]
pub struct Surface<N: CoherentNoise = PerlinNoise, R: RandomSource = Pcg32> {
    id: SurfaceId,
    config: SurfaceConfig,
    state: SurfaceState,
    sampler: ContactSampler,

    original: Vec<Vec3>,
    current: Vec<Vec3>,
    reference_normals: Vec<Vec3>,
    normals: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    bounds: Aabb,

    field: DisplacementField,
    tracker: FractureTracker,
    emitter: DebrisEmitter,
    collider: ColliderSync,

    noise: N,
    rng: R,
    displaced: Vec<usize>,
}

impl Surface {
    /// Create a surface with Perlin noise and a PCG generator seeded from the config
    pub fn new(id: SurfaceId, mesh: SurfaceMesh, config: SurfaceConfig) -> Result<Self, SurfaceError> {
        let noise = PerlinNoise::new(config.seed as u32);
        let rng = random::seeded(config.seed);
        Self::with_sources(id, mesh, config, noise, rng)
    }
}

impl<N: CoherentNoise, R: RandomSource> Surface<N, R> {
    /// Create a surface with explicit noise and random sources
    pub fn with_sources(
        id: SurfaceId,
        mesh: SurfaceMesh,
        config: SurfaceConfig,
        noise: N,
        rng: R,
    ) -> Result<Self, SurfaceError> {
        config.validate()?;
        mesh.validate()?;

        let bounds = mesh.bounds();
        let SurfaceMesh {
            positions,
            normals,
            triangles,
        } = mesh;

        tracing::debug!(
            surface = id.0,
            vertices = positions.len(),
            triangles = triangles.len(),
            "surface created"
        );

        Ok(Self {
            id,
            field: DisplacementField::new(config.deform.clone()),
            tracker: FractureTracker::new(config.fracture.clone()),
            emitter: DebrisEmitter::new(config.debris.clone()),
            collider: ColliderSync::new(config.collider.clone(), config.policy.throttle_collider_sync),
            config,
            state: SurfaceState::Intact,
            sampler: ContactSampler::default(),
            original: positions.clone(),
            current: positions,
            reference_normals: normals.clone(),
            normals,
            triangles,
            bounds,
            noise,
            rng,
            displaced: Vec::new(),
        })
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn is_intact(&self) -> bool {
        self.state == SurfaceState::Intact
    }

    /// Current (displaced) vertex positions in local space
    pub fn positions(&self) -> &[Vec3] {
        &self.current
    }

    /// Reference pose captured at construction
    pub fn original_positions(&self) -> &[Vec3] {
        &self.original
    }

    /// Render normals, recomputed after deformation when configured
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Reference-pose normals used as displacement directions
    pub fn reference_normals(&self) -> &[Vec3] {
        &self.reference_normals
    }

    /// Retained triangles
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.current.len()
    }

    pub fn is_fractured(&self, vertex: usize) -> bool {
        self.tracker.contains(vertex)
    }

    pub fn fractured_count(&self) -> usize {
        self.tracker.len()
    }

    /// Fractured vertex indices in ascending order
    pub fn fractured_vertices(&self) -> Vec<usize> {
        self.tracker.sorted()
    }

    /// Share of vertices that have fractured
    pub fn fractured_fraction(&self) -> f32 {
        self.tracker.fraction(self.current.len())
    }

    pub fn collider(&self) -> &ColliderSync {
        &self.collider
    }

    pub fn transform(&self) -> Affine3A {
        self.sampler.transform()
    }

    /// Update the surface's world transform (singular transforms are ignored)
    pub fn set_transform(&mut self, world_from_local: Affine3A) {
        self.sampler.set_transform(world_from_local);
    }

    /// Copy of the live buffers
    pub fn mesh_snapshot(&self) -> SurfaceMesh {
        SurfaceMesh {
            positions: self.current.clone(),
            normals: self.normals.clone(),
            triangles: self.triangles.clone(),
        }
    }

    /// Process every contact delivered for one tick, in delivery order
    ///
    /// Each contact deforms independently; overlapping contacts accumulate.
    /// The collider sync advances once per call by `dt`.
    pub fn process_contacts<H: SurfaceHost + ?Sized>(
        &mut self,
        contacts: &[ContactPoint],
        dt: f32,
        host: &mut H,
    ) -> DeformReport {
        let mut report = DeformReport::default();
        if !self.is_intact() {
            tracing::trace!(surface = self.id.0, state = ?self.state, "contacts ignored");
            return report;
        }

        let locals: SmallVec<[LocalContact; 4]> = self.sampler.sample(contacts).collect();
        for local in &locals {
            report.absorb(self.deform(local, host));
            if !self.is_intact() {
                break;
            }
        }

        if self.is_intact() && self.collider.tick(dt, &mut self.rng) {
            host.rebuild_collider(self.id, &self.current, &self.triangles);
            report.collider_synced = true;
            tracing::trace!(surface = self.id.0, "collider rebuilt");
        }

        report
    }

    /// Deform around a tracked tool position instead of collision contacts
    ///
    /// With no probe the tick is a no-op. The contact normal is the surface's
    /// up axis in world space.
    pub fn process_probe<H: SurfaceHost + ?Sized>(
        &mut self,
        probe: Option<Vec3>,
        dt: f32,
        host: &mut H,
    ) -> DeformReport {
        let Some(position) = probe else {
            tracing::trace!(surface = self.id.0, "no probe, skipping deformation");
            return DeformReport::default();
        };
        let up = self.sampler.to_world_vector(Vec3::Y).normalize_or_zero();
        self.process_contacts(&[ContactPoint::new(position, up)], dt, host)
    }

    /// Apply one local-space contact
    ///
    /// Displaces eligible vertices, fractures the ones past the threshold (at
    /// most `max_chunks_per_hit` emitter calls), prunes triangles and commits
    /// the buffers. A contact out of reach of every vertex changes
    /// nothing and commits nothing.
    pub fn deform<H: SurfaceHost + ?Sized>(&mut self, contact: &LocalContact, host: &mut H) -> DeformReport {
        let mut report = DeformReport::default();
        if !self.is_intact() {
            return report;
        }
        tracing::trace!(surface = self.id.0, point = ?contact.point, normal = ?contact.normal, "contact");

        let jitter = if self.config.policy.jitter_noise {
            let deform = &self.config.deform;
            self.rng.range(deform.jitter_min, deform.jitter_max)
        } else {
            1.0
        };

        let mut displaced = std::mem::take(&mut self.displaced);
        displaced.clear();
        let freeze = self.config.policy.freeze_on_fracture;
        let tracker = &self.tracker;
        self.field.apply(
            contact.point,
            jitter,
            &mut self.current,
            &self.reference_normals,
            &self.noise,
            |i| freeze && tracker.contains(i),
            &mut displaced,
        );

        if displaced.is_empty() {
            self.displaced = displaced;
            return report;
        }
        report.displaced = displaced.len();

        let fractures = self.tracker.evaluate(&displaced, &self.current, &self.original);
        self.displaced = displaced;

        for &vertex in &fractures {
            tracing::debug!(surface = self.id.0, vertex, "vertex fractured");
            let spawn = self
                .emitter
                .plan(vertex, self.current[vertex], &self.sampler, contact.world_normal);
            report.emitter_calls += 1;
            if self.emitter.emit(&spawn, host, &mut self.rng).is_some() {
                report.fragments_spawned += 1;
            }
        }
        report.fractured = fractures.len();

        // Prune before committing so recomputed normals only see live faces
        let removed = if !fractures.is_empty() && self.config.policy.remove_triangles {
            prune_triangles(&mut self.triangles, self.tracker.set())
        } else {
            0
        };

        self.commit_vertices(host);
        self.collider.mark_dirty();

        if removed > 0 {
            report.triangles_removed = removed;
            host.commit_triangles(self.id, &self.triangles, self.bounds);
            tracing::trace!(surface = self.id.0, removed, remaining = self.triangles.len(), "triangles pruned");
        }

        if fractures.is_empty() {
            return report;
        }

        if self.triangles.is_empty() {
            tracing::info!(surface = self.id.0, "no triangles left, tearing down");
            self.begin_collapse(host);
            report.collapsed = true;
            return report;
        }

        if self.tracker.should_collapse(self.current.len()) {
            tracing::info!(
                surface = self.id.0,
                fraction = self.tracker.fraction(self.current.len()),
                "destruction threshold reached"
            );
            report.collapse_fragments = self.collapse_burst(host);
            self.begin_collapse(host);
            report.collapsed = true;
        }

        report
    }

    /// Mark the surface as removed
    ///
    /// Called by the host when the scheduled [`DeferredTask::DestroySurface`]
    /// fires, or directly to drop the surface early.
    pub fn destroy(&mut self) {
        if self.state != SurfaceState::Destroyed {
            tracing::debug!(surface = self.id.0, "surface destroyed");
        }
        self.state = SurfaceState::Destroyed;
    }

    fn commit_vertices<H: SurfaceHost + ?Sized>(&mut self, host: &mut H) {
        if self.config.deform.recalculate_normals {
            self.normals = smooth_normals(&self.current, &self.triangles, &self.reference_normals);
        }
        self.bounds = Aabb::from_points(&self.current);
        host.commit_vertices(self.id, &self.current, &self.normals, self.bounds);
    }

    /// Spawn debris at random intact vertices; returns fragments spawned
    fn collapse_burst<H: SurfaceHost + ?Sized>(&mut self, host: &mut H) -> usize {
        let up = Vec3::Y;
        let mut spawned = 0;
        for _ in 0..self.config.fracture.destroy_burst {
            let vertex = self.rng.index(self.current.len());
            if self.tracker.contains(vertex) {
                continue;
            }
            let spawn = self.emitter.plan(vertex, self.current[vertex], &self.sampler, up);
            if self.emitter.emit(&spawn, host, &mut self.rng).is_some() {
                spawned += 1;
            }
        }
        spawned
    }

    fn begin_collapse<H: SurfaceHost + ?Sized>(&mut self, host: &mut H) {
        self.state = SurfaceState::Collapsing;
        host.schedule(self.config.fracture.destroy_delay, DeferredTask::DestroySurface(self.id));
    }
}
