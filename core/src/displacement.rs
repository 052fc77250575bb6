//! Displacement field
//!
//! Erodes the surface around a contact: every vertex within the deform radius
//! is pushed along its inverted reference normal, weighted by a smoothstep
//! falloff and a position-based noise multiplier.

use glam::Vec3;

use crate::config::DeformConfig;
use crate::mesh::Aabb;
use crate::noise::CoherentNoise;

/// Smooth falloff weight for a normalized distance `t` in [0, 1]
///
/// 1 at the centre, 0 at the radius, C¹-continuous and non-increasing.
/// Values outside [0, 1] are clamped.
pub fn falloff(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - t * t * (3.0 - 2.0 * t)
}

/// Computes and applies contact displacement for one surface
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementField {
    config: DeformConfig,
    radius_sq: f32,
}

impl DisplacementField {
    pub fn new(config: DeformConfig) -> Self {
        let radius_sq = config.radius * config.radius;
        Self { config, radius_sq }
    }

    pub fn config(&self) -> &DeformConfig {
        &self.config
    }

    pub fn radius(&self) -> f32 {
        self.config.radius
    }

    /// Falloff weight of a vertex at `distance` from the contact
    pub fn influence(&self, distance: f32) -> f32 {
        falloff(distance / self.config.radius)
    }

    /// Noise multiplier in [0, 1] sampled at the vertex's x/y position
    ///
    /// A zero noise scale disables modulation and yields 1.
    pub fn noise_factor<N: CoherentNoise + ?Sized>(&self, noise: &N, vertex: Vec3) -> f32 {
        let scale = self.config.noise_scale;
        if scale <= 0.0 {
            return 1.0;
        }
        let floor = self.config.noise_floor;
        floor + (1.0 - floor) * noise.sample(vertex.x * scale, vertex.y * scale)
    }

    /// Displacement vector for one vertex, or `None` if it is out of reach
    ///
    /// The result is always a non-negative multiple of `-normal`.
    pub fn offset<N: CoherentNoise + ?Sized>(
        &self,
        point: Vec3,
        vertex: Vec3,
        normal: Vec3,
        jitter: f32,
        noise: &N,
    ) -> Option<Vec3> {
        let dist_sq = vertex.distance_squared(point);
        if dist_sq > self.radius_sq {
            return None;
        }
        let influence = self.influence(dist_sq.sqrt());
        let noise = self.noise_factor(noise, vertex);
        let magnitude = (self.config.strength * influence * noise * jitter).max(0.0);
        Some(-normal * magnitude)
    }

    /// Displace every eligible vertex around `point` in place
    ///
    /// Vertices for which `skip` returns true are left untouched. Indices of
    /// displaced vertices are appended to `displaced` in buffer order. A vertex
    /// exactly on the radius is eligible but receives a zero offset.
    #[allow(clippy::too_many_arguments)]
    pub fn apply<N, F>(
        &self,
        point: Vec3,
        jitter: f32,
        positions: &mut [Vec3],
        reference_normals: &[Vec3],
        noise: &N,
        skip: F,
        displaced: &mut Vec<usize>,
    ) where
        N: CoherentNoise + ?Sized,
        F: Fn(usize) -> bool,
    {
        let prefilter = self
            .config
            .bounds_prefilter
            .then(|| Aabb::from_center(point, self.config.radius));

        for (i, vertex) in positions.iter_mut().enumerate() {
            if skip(i) {
                continue;
            }
            if prefilter.is_some_and(|bounds| !bounds.contains(*vertex)) {
                continue;
            }
            if let Some(offset) = self.offset(point, *vertex, reference_normals[i], jitter, noise) {
                *vertex += offset;
                displaced.push(i);
            }
        }
    }
}
