//! Contact sampling
//!
//! Converts world-space contacts delivered by the collision system into the
//! surface's local frame, where all displacement math happens.

use glam::{Affine3A, Vec3};
use serde::{Deserialize, Serialize};

/// One world-space touch between the surface and another body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    pub position: Vec3,
    pub normal: Vec3,
}

impl ContactPoint {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

/// A contact expressed in both frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalContact {
    /// Contact position in the surface's local space
    pub point: Vec3,
    /// Contact normal in local space (unit length, or zero if degenerate)
    pub normal: Vec3,
    /// Original world position
    pub world_point: Vec3,
    /// Original world normal
    pub world_normal: Vec3,
}

/// Local/world conversion for one surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactSampler {
    world_from_local: Affine3A,
    local_from_world: Affine3A,
}

impl Default for ContactSampler {
    fn default() -> Self {
        Self::new(Affine3A::IDENTITY)
    }
}

impl ContactSampler {
    pub fn new(world_from_local: Affine3A) -> Self {
        let mut sampler = Self {
            world_from_local: Affine3A::IDENTITY,
            local_from_world: Affine3A::IDENTITY,
        };
        sampler.set_transform(world_from_local);
        sampler
    }

    /// Replace the surface's world transform
    ///
    /// A singular transform is rejected and the previous one kept. Tiny but
    /// invertible scales are accepted.
    pub fn set_transform(&mut self, world_from_local: Affine3A) {
        let det = world_from_local.matrix3.determinant();
        if det == 0.0 || !det.is_finite() {
            tracing::warn!(det, "ignoring non-invertible surface transform");
            return;
        }
        let local_from_world = world_from_local.inverse();
        if !local_from_world.matrix3.is_finite() || !local_from_world.translation.is_finite() {
            tracing::warn!(det, "ignoring surface transform with a non-finite inverse");
            return;
        }
        self.world_from_local = world_from_local;
        self.local_from_world = local_from_world;
    }

    pub fn transform(&self) -> Affine3A {
        self.world_from_local
    }

    /// Convert a world contact into local space
    pub fn to_local(&self, contact: &ContactPoint) -> LocalContact {
        // Normals transform by the inverse-transpose of the point transform
        let normal = self.world_from_local.matrix3.transpose().mul_vec3(contact.normal);
        LocalContact {
            point: self.local_from_world.transform_point3(contact.position),
            normal: normal.normalize_or_zero(),
            world_point: contact.position,
            world_normal: contact.normal,
        }
    }

    /// Convert every contact of a tick, preserving delivery order
    pub fn sample<'a>(
        &'a self,
        contacts: &'a [ContactPoint],
    ) -> impl Iterator<Item = LocalContact> + 'a {
        contacts.iter().map(|c| self.to_local(c))
    }

    pub fn to_world_point(&self, local: Vec3) -> Vec3 {
        self.world_from_local.transform_point3(local)
    }

    pub fn to_world_vector(&self, local: Vec3) -> Vec3 {
        self.world_from_local.transform_vector3(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_identity_passthrough() {
        let sampler = ContactSampler::default();
        let local = sampler.to_local(&ContactPoint::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y));
        assert_eq!(local.point, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(local.normal, Vec3::Y);
    }

    #[test]
    fn test_translated_surface() {
        let sampler = ContactSampler::new(Affine3A::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        let local = sampler.to_local(&ContactPoint::new(Vec3::new(11.0, 1.0, 0.0), Vec3::Y));
        assert!((local.point - Vec3::new(1.0, 1.0, 0.0)).length() < EPSILON);
        assert_eq!(local.world_point, Vec3::new(11.0, 1.0, 0.0));
    }

    #[test]
    fn test_rotated_normal() {
        let rotation = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let sampler = ContactSampler::new(Affine3A::from_quat(rotation));
        // Local -Y is rotated onto world +X
        let local = sampler.to_local(&ContactPoint::new(Vec3::X, Vec3::X));
        assert!((local.normal - Vec3::NEG_Y).length() < EPSILON);
        assert!((local.point - Vec3::NEG_Y).length() < EPSILON);
    }

    #[test]
    fn test_roundtrip_points() {
        let transform = Affine3A::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::from_rotation_y(0.3),
            Vec3::new(1.0, -2.0, 0.5),
        );
        let sampler = ContactSampler::new(transform);
        let world = Vec3::new(0.2, 0.4, -1.0);
        let local = sampler.to_local(&ContactPoint::new(world, Vec3::Y));
        assert!((sampler.to_world_point(local.point) - world).length() < 1e-4);
    }

    #[test]
    fn test_singular_transform_ignored() {
        let mut sampler = ContactSampler::new(Affine3A::from_translation(Vec3::X));
        sampler.set_transform(Affine3A::from_scale(Vec3::ZERO));
        assert_eq!(sampler.transform(), Affine3A::from_translation(Vec3::X));
    }

    #[test]
    fn test_small_scale_transform_accepted() {
        // Millimetre-scaled model: det is 1e-9, well under f32::EPSILON
        let transform = Affine3A::from_scale_rotation_translation(
            Vec3::splat(0.001),
            Quat::IDENTITY,
            Vec3::new(10.0, 0.0, 0.0),
        );
        let mut sampler = ContactSampler::default();
        sampler.set_transform(transform);
        assert_eq!(sampler.transform(), transform);

        let local = sampler.to_local(&ContactPoint::new(Vec3::new(10.001, 0.002, 0.0), Vec3::Z));
        assert!((local.point - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-2);
        assert!((local.normal - Vec3::Z).length() < EPSILON);
    }
}
