//! Drill-side helpers
//!
//! A [`DrillProbe`] tracks the tool tip that deforms a surface without going
//! through collision contacts. [`BurrSpin`] drives the burr's spin speed from
//! how close it is to the surface it cuts.

use glam::{Affine3A, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::non_negative;
use crate::error::ConfigError;
use crate::mesh::{SurfaceMesh, smooth_normals};

/// Tracked tool tip in world space
///
/// A detached probe drives no deformation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrillProbe {
    position: Option<Vec3>,
}

impl DrillProbe {
    pub fn attached(position: Vec3) -> Self {
        Self {
            position: Some(position),
        }
    }

    pub fn position(&self) -> Option<Vec3> {
        self.position
    }

    pub fn is_attached(&self) -> bool {
        self.position.is_some()
    }

    /// Move the tip (attaching the probe if needed)
    pub fn move_to(&mut self, position: Vec3) {
        self.position = Some(position);
    }

    pub fn detach(&mut self) {
        self.position = None;
    }
}

/// Burr spin tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurrSpinConfig {
    /// Angular speed around Y at full spin, in radians per second (default: 5.0)
    #[serde(default = "default_spin_strength")]
    pub spin_strength: f32,
    /// Seconds to spin up from rest to full speed (default: 1.0)
    #[serde(default = "default_time_to_full_speed")]
    pub time_to_full_speed: f32,
    /// World distance at which a nearby surface vertex starts the spin (default: 2.0)
    #[serde(default = "default_trigger_distance")]
    pub trigger_distance: f32,
    /// Surface vertices nearest to the burr that are watched (default: 1000)
    #[serde(default = "default_nearest_vertices")]
    pub nearest_vertices: usize,
}

fn default_spin_strength() -> f32 {
    5.0
}

fn default_time_to_full_speed() -> f32 {
    1.0
}

fn default_trigger_distance() -> f32 {
    2.0
}

fn default_nearest_vertices() -> usize {
    1000
}

impl Default for BurrSpinConfig {
    fn default() -> Self {
        Self {
            spin_strength: default_spin_strength(),
            time_to_full_speed: default_time_to_full_speed(),
            trigger_distance: default_trigger_distance(),
            nearest_vertices: default_nearest_vertices(),
        }
    }
}

impl BurrSpinConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("burr.spin_strength", self.spin_strength)?;
        non_negative("burr.time_to_full_speed", self.time_to_full_speed)?;
        non_negative("burr.trigger_distance", self.trigger_distance)
    }
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + delta.signum() * max_delta
    }
}

/// Spin controller for a drill burr
#[derive(Debug, Clone, PartialEq)]
pub struct BurrSpin {
    config: BurrSpinConfig,
    targets: Vec<Vec3>,
    speed: f32,
    spinning: bool,
}

impl BurrSpin {
    /// Watch the `nearest_vertices` reference vertices closest to the burr
    ///
    /// `positions` are in the surface's local space; distances are measured
    /// in world space through `world_from_local`.
    pub fn new(
        config: BurrSpinConfig,
        burr: Vec3,
        positions: &[Vec3],
        world_from_local: Affine3A,
    ) -> Self {
        let mut ranked: Vec<(f32, Vec3)> = positions
            .iter()
            .map(|&p| (world_from_local.transform_point3(p).distance_squared(burr), p))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranked.truncate(config.nearest_vertices);

        tracing::debug!(targets = ranked.len(), "burr targets selected");
        Self {
            config,
            targets: ranked.into_iter().map(|(_, p)| p).collect(),
            speed: 0.0,
            spinning: false,
        }
    }

    pub fn config(&self) -> &BurrSpinConfig {
        &self.config
    }

    /// Watched vertices in surface-local space, nearest first
    pub fn targets(&self) -> &[Vec3] {
        &self.targets
    }

    /// Current angular speed around Y
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    pub fn angular_velocity(&self) -> Vec3 {
        Vec3::new(0.0, self.speed, 0.0)
    }

    /// Advance one fixed step and return the new speed
    pub fn update(&mut self, burr: Vec3, world_from_local: Affine3A, dt: f32) -> f32 {
        let trigger = self.config.trigger_distance;
        self.spinning = self
            .targets
            .iter()
            .any(|&p| world_from_local.transform_point3(p).distance(burr) <= trigger);

        let target = if self.spinning { self.config.spin_strength } else { 0.0 };
        let max_delta = if self.config.time_to_full_speed > 0.0 {
            self.config.spin_strength / self.config.time_to_full_speed * dt.max(0.0)
        } else {
            f32::INFINITY
        };
        self.speed = move_towards(self.speed, target, max_delta);
        self.speed
    }

    /// Fan mesh over the watched vertices, usable as a cheap collision proxy
    ///
    /// Returns `None` with fewer than three targets.
    pub fn proxy_collider(&self) -> Option<SurfaceMesh> {
        if self.targets.len() < 3 {
            return None;
        }
        let triangles: Vec<[u32; 3]> = (0..self.targets.len() as u32 - 2)
            .map(|i| [0, i + 1, i + 2])
            .collect();
        let normals = smooth_normals(&self.targets, &triangles, &[]);
        Some(SurfaceMesh {
            positions: self.targets.clone(),
            normals,
            triangles,
        })
    }
}
