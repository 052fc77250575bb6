//! Surface tuning and policy configuration
//!
//! All settings live in one serde-friendly [`SurfaceConfig`] so a surface can be
//! described in TOML. Every field has a default, so partial files are valid.
//!
//! The [`FracturePolicy`] flags select between the behaviours the engine
//! supports (freezing fractured vertices, pruning triangles, throttling
//! collider rebuilds, jittering noise) instead of keeping one code path per
//! variant. [`Preset`] bundles the known-good combinations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete configuration for one deformable surface
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Displacement field settings
    #[serde(default)]
    pub deform: DeformConfig,
    /// Fracture tracking settings
    #[serde(default)]
    pub fracture: FractureConfig,
    /// Debris emission settings
    #[serde(default)]
    pub debris: DebrisConfig,
    /// Collision mesh resync settings
    #[serde(default)]
    pub collider: ColliderConfig,
    /// Behaviour switches
    #[serde(default)]
    pub policy: FracturePolicy,
    /// Seed for the surface's random source (spawn rolls, jitter, sync gating)
    #[serde(default)]
    pub seed: u64,
}

/// Displacement field settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeformConfig {
    /// Radius of influence around a contact, in local units (default: 1.0)
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Displacement applied at the centre of a contact per call (default: 0.1)
    #[serde(default = "default_strength")]
    pub strength: f32,
    /// Scale applied to vertex x/y before sampling noise; 0 disables noise (default: 10.0)
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f32,
    /// Lower bound the noise sample is remapped onto (default: 0.0)
    ///
    /// A floor of 0.5 maps raw noise `n` to `0.5 + 0.5 * n`.
    #[serde(default)]
    pub noise_floor: f32,
    /// Lower bound of the per-call jitter multiplier (default: 0.75)
    #[serde(default = "default_jitter_min")]
    pub jitter_min: f32,
    /// Upper bound of the per-call jitter multiplier (default: 1.25)
    #[serde(default = "default_jitter_max")]
    pub jitter_max: f32,
    /// Reject vertices outside the contact's bounding cube before the distance test (default: true)
    #[serde(default = "default_true")]
    pub bounds_prefilter: bool,
    /// Recompute render normals after each deformation (default: true)
    #[serde(default = "default_true")]
    pub recalculate_normals: bool,
}

/// Fracture tracking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractureConfig {
    /// Displacement from the reference pose beyond which a vertex breaks (default: 0.4)
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// Most debris emitter calls a single contact may trigger (default: 3)
    #[serde(default = "default_max_chunks_per_hit")]
    pub max_chunks_per_hit: u32,
    /// Fraction of fractured vertices that collapses the whole surface (default: disabled)
    #[serde(default)]
    pub destroy_percent: Option<f32>,
    /// Random vertices tried for the final debris burst on collapse (default: 10)
    #[serde(default = "default_destroy_burst")]
    pub destroy_burst: u32,
    /// Delay before a collapsing surface is removed, in seconds (default: 0.1)
    #[serde(default = "default_destroy_delay")]
    pub destroy_delay: f32,
}

/// Debris emission settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebrisConfig {
    /// Uniform scale of a spawned fragment (default: 0.04)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: f32,
    /// Impulse magnitude applied to a fragment (default: 6.0)
    #[serde(default = "default_chunk_force")]
    pub chunk_force: f32,
    /// Probability that an emitter call actually spawns a fragment (default: 1.0)
    #[serde(default = "default_one")]
    pub spawn_chance: f32,
    /// Seconds until a fragment's collision shape is removed (default: 5.0)
    #[serde(default = "default_collider_lifetime")]
    pub collider_lifetime: f32,
    /// Seconds until a fragment is destroyed (default: 10.0)
    #[serde(default = "default_lifetime")]
    pub lifetime: f32,
}

/// Collision mesh resync settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColliderConfig {
    /// Whether the collision shape follows the deformed mesh at all (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minimum accumulated seconds between rebuilds when throttled (default: 0.5)
    #[serde(default = "default_update_delay")]
    pub update_delay: f32,
    /// Probability that a due rebuild actually runs (default: 1.0)
    #[serde(default = "default_one")]
    pub sync_chance: f32,
}

/// Behaviour switches replacing the per-variant code paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FracturePolicy {
    /// Fractured vertices are excluded from further displacement (default: true)
    #[serde(default = "default_true")]
    pub freeze_on_fracture: bool,
    /// Triangles touching a fractured vertex are dropped (default: true)
    #[serde(default = "default_true")]
    pub remove_triangles: bool,
    /// Collider rebuilds wait for `collider.update_delay` (default: true)
    #[serde(default = "default_true")]
    pub throttle_collider_sync: bool,
    /// Each contact scales its displacement by a random jitter (default: false)
    #[serde(default)]
    pub jitter_noise: bool,
}

fn default_radius() -> f32 {
    1.0
}
fn default_strength() -> f32 {
    0.1
}
fn default_noise_scale() -> f32 {
    10.0
}
fn default_jitter_min() -> f32 {
    0.75
}
fn default_jitter_max() -> f32 {
    1.25
}
fn default_threshold() -> f32 {
    0.4
}
fn default_max_chunks_per_hit() -> u32 {
    3
}
fn default_destroy_burst() -> u32 {
    10
}
fn default_destroy_delay() -> f32 {
    0.1
}
fn default_chunk_size() -> f32 {
    0.04
}
fn default_chunk_force() -> f32 {
    6.0
}
fn default_collider_lifetime() -> f32 {
    5.0
}
fn default_lifetime() -> f32 {
    10.0
}
fn default_update_delay() -> f32 {
    0.5
}
fn default_one() -> f32 {
    1.0
}
fn default_true() -> bool {
    true
}

impl Default for DeformConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            strength: default_strength(),
            noise_scale: default_noise_scale(),
            noise_floor: 0.0,
            jitter_min: default_jitter_min(),
            jitter_max: default_jitter_max(),
            bounds_prefilter: default_true(),
            recalculate_normals: default_true(),
        }
    }
}

impl Default for FractureConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max_chunks_per_hit: default_max_chunks_per_hit(),
            destroy_percent: None,
            destroy_burst: default_destroy_burst(),
            destroy_delay: default_destroy_delay(),
        }
    }
}

impl Default for DebrisConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_force: default_chunk_force(),
            spawn_chance: default_one(),
            collider_lifetime: default_collider_lifetime(),
            lifetime: default_lifetime(),
        }
    }
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            update_delay: default_update_delay(),
            sync_chance: default_one(),
        }
    }
}

impl Default for FracturePolicy {
    fn default() -> Self {
        Self {
            freeze_on_fracture: true,
            remove_triangles: true,
            throttle_collider_sync: true,
            jitter_noise: false,
        }
    }
}

impl SurfaceConfig {
    /// Heavy erosion with noise remapped to [0.5, 1], unlimited debris per
    /// contact, a collider rebuild on every modified tick and no freezing.
    pub fn classic() -> Self {
        Self {
            deform: DeformConfig {
                radius: 1.0,
                strength: 10.0,
                noise_scale: 10.0,
                noise_floor: 0.5,
                ..DeformConfig::default()
            },
            fracture: FractureConfig {
                threshold: 1.5,
                max_chunks_per_hit: u32::MAX,
                ..FractureConfig::default()
            },
            debris: DebrisConfig {
                chunk_size: 0.05,
                chunk_force: 5.0,
                ..DebrisConfig::default()
            },
            collider: ColliderConfig::default(),
            policy: FracturePolicy {
                freeze_on_fracture: false,
                remove_triangles: false,
                throttle_collider_sync: false,
                jitter_noise: false,
            },
            seed: 0,
        }
    }

    /// Cheap erosion for many simultaneous contacts: jittered noise and a
    /// randomly gated, throttled collider rebuild.
    pub fn fast() -> Self {
        Self {
            deform: DeformConfig {
                radius: 1.5,
                strength: 0.2,
                noise_scale: 5.0,
                recalculate_normals: false,
                ..DeformConfig::default()
            },
            fracture: FractureConfig {
                threshold: 0.5,
                max_chunks_per_hit: 2,
                ..FractureConfig::default()
            },
            debris: DebrisConfig::default(),
            collider: ColliderConfig {
                enabled: true,
                update_delay: 0.25,
                sync_chance: 0.5,
            },
            policy: FracturePolicy {
                freeze_on_fracture: true,
                remove_triangles: false,
                throttle_collider_sync: true,
                jitter_noise: true,
            },
            seed: 0,
        }
    }

    /// Wide, shallow erosion that removes broken triangles, spawns sparse
    /// debris and collapses the surface once 80% of it has fractured.
    pub fn destroy_fixed() -> Self {
        Self {
            deform: DeformConfig {
                radius: 2.5,
                strength: 0.1,
                noise_scale: 0.0,
                ..DeformConfig::default()
            },
            fracture: FractureConfig {
                threshold: 0.4,
                max_chunks_per_hit: 3,
                destroy_percent: Some(0.8),
                ..FractureConfig::default()
            },
            debris: DebrisConfig {
                chunk_size: 0.04,
                chunk_force: 6.0,
                spawn_chance: 0.1,
                ..DebrisConfig::default()
            },
            collider: ColliderConfig {
                enabled: false,
                ..ColliderConfig::default()
            },
            policy: FracturePolicy::default(),
            seed: 0,
        }
    }

    /// Check every tuning value for a usable range
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("deform.radius", self.deform.radius)?;
        non_negative("deform.strength", self.deform.strength)?;
        non_negative("deform.noise_scale", self.deform.noise_scale)?;
        unit("deform.noise_floor", self.deform.noise_floor)?;
        non_negative("deform.jitter_min", self.deform.jitter_min)?;
        if self.deform.jitter_min > self.deform.jitter_max {
            return Err(ConfigError::InvertedJitter {
                min: self.deform.jitter_min,
                max: self.deform.jitter_max,
            });
        }

        positive("fracture.threshold", self.fracture.threshold)?;
        if let Some(percent) = self.fracture.destroy_percent {
            unit("fracture.destroy_percent", percent)?;
        }
        non_negative("fracture.destroy_delay", self.fracture.destroy_delay)?;

        positive("debris.chunk_size", self.debris.chunk_size)?;
        non_negative("debris.chunk_force", self.debris.chunk_force)?;
        unit("debris.spawn_chance", self.debris.spawn_chance)?;
        non_negative("debris.collider_lifetime", self.debris.collider_lifetime)?;
        non_negative("debris.lifetime", self.debris.lifetime)?;

        non_negative("collider.update_delay", self.collider.update_delay)?;
        unit("collider.sync_chance", self.collider.sync_chance)?;
        Ok(())
    }

    /// Parse a configuration from TOML, filling omitted fields with defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize this configuration as pretty TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

/// Named configuration bundles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// See [`SurfaceConfig::classic`]
    Classic,
    /// See [`SurfaceConfig::fast`]
    Fast,
    /// See [`SurfaceConfig::destroy_fixed`]
    #[default]
    DestroyFixed,
}

impl Preset {
    /// Every preset, in display order
    pub const ALL: [Preset; 3] = [Preset::Classic, Preset::Fast, Preset::DestroyFixed];

    /// Kebab-case name used in files and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::Fast => "fast",
            Preset::DestroyFixed => "destroy-fixed",
        }
    }

    /// Build the configuration this preset stands for
    pub fn config(self) -> SurfaceConfig {
        match self {
            Preset::Classic => SurfaceConfig::classic(),
            Preset::Fast => SurfaceConfig::fast(),
            Preset::DestroyFixed => SurfaceConfig::destroy_fixed(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown preset '{s}'"))
    }
}
