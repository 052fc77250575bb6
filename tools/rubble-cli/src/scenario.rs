//! rubble.toml scenario parsing
//!
//! A scenario bundles everything `rubble simulate` needs: the surface
//! configuration, the mesh to erode, where that mesh sits in the world and the
//! path the drill follows.

use anyhow::{Context, Result};
use glam::{Affine3A, Quat, Vec3};
use rubble_core::config::{Preset, SurfaceConfig};
use rubble_core::drill::BurrSpinConfig;
use rubble_core::mesh::{self, SurfaceMesh};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default scenario file name
pub const SCENARIO_FILE: &str = "rubble.toml";

/// rubble.toml structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub mesh: MeshSection,
    #[serde(default)]
    pub transform: TransformSection,
    #[serde(default)]
    pub drill: DrillSection,
    /// Optional burr spin controller following the drill
    #[serde(default)]
    pub burr: Option<BurrSpinConfig>,
    #[serde(default)]
    pub surface: SurfaceConfig,
}

/// Fixed-step simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSection {
    /// Number of fixed ticks to run (default: 120)
    #[serde(default = "default_ticks")]
    pub ticks: u32,
    /// Tick rate in Hz (default: 60)
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
}

fn default_ticks() -> u32 {
    120
}

fn default_tick_rate() -> u32 {
    60
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            tick_rate: default_tick_rate(),
        }
    }
}

impl SimulationSection {
    /// Seconds per tick
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

/// Procedural mesh to erode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "primitive", rename_all = "kebab-case")]
pub enum MeshSection {
    Plane {
        size_x: f32,
        size_z: f32,
        subdivisions_x: u32,
        subdivisions_z: u32,
    },
    Sphere {
        radius: f32,
        segments: u32,
        rings: u32,
    },
}

impl Default for MeshSection {
    fn default() -> Self {
        MeshSection::Plane {
            size_x: 4.0,
            size_z: 4.0,
            subdivisions_x: 32,
            subdivisions_z: 32,
        }
    }
}

impl MeshSection {
    pub fn build(&self) -> SurfaceMesh {
        match *self {
            MeshSection::Plane {
                size_x,
                size_z,
                subdivisions_x,
                subdivisions_z,
            } => mesh::plane(size_x, size_z, subdivisions_x, subdivisions_z),
            MeshSection::Sphere {
                radius,
                segments,
                rings,
            } => mesh::sphere(radius, segments, rings),
        }
    }
}

/// World placement of the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSection {
    #[serde(default)]
    pub translation: Vec3,
    /// Rotation around Y in degrees
    #[serde(default)]
    pub yaw_degrees: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

impl Default for TransformSection {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            yaw_degrees: 0.0,
            scale: default_scale(),
        }
    }
}

impl TransformSection {
    pub fn affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_y(self.yaw_degrees.to_radians()),
            self.translation,
        )
    }
}

/// How the drill touches the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrillMode {
    /// Drill tip is reported as a collision contact each tick
    #[default]
    Contact,
    /// Drill tip is tracked as a probe
    Probe,
}

/// Straight drill path in world space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillSection {
    #[serde(default)]
    pub mode: DrillMode,
    /// Tip position on the first tick
    #[serde(default = "default_drill_start")]
    pub start: Vec3,
    /// Tip position on the last tick
    #[serde(default = "default_drill_end")]
    pub end: Vec3,
    /// Contact normal reported in contact mode
    #[serde(default = "default_drill_normal")]
    pub normal: Vec3,
}

fn default_drill_start() -> Vec3 {
    Vec3::new(-1.0, 0.0, 0.0)
}

fn default_drill_end() -> Vec3 {
    Vec3::new(1.0, 0.0, 0.0)
}

fn default_drill_normal() -> Vec3 {
    Vec3::Y
}

impl Default for DrillSection {
    fn default() -> Self {
        Self {
            mode: DrillMode::default(),
            start: default_drill_start(),
            end: default_drill_end(),
            normal: default_drill_normal(),
        }
    }
}

impl DrillSection {
    /// Tip position at `tick` of `ticks`
    pub fn position(&self, tick: u32, ticks: u32) -> Vec3 {
        if ticks <= 1 {
            return self.start;
        }
        let t = tick as f32 / (ticks - 1) as f32;
        self.start.lerp(self.end, t.clamp(0.0, 1.0))
    }
}

impl Scenario {
    /// Scenario with the default mesh and drill path and a preset surface
    pub fn with_preset(preset: Preset) -> Self {
        Self {
            simulation: SimulationSection::default(),
            mesh: MeshSection::default(),
            transform: TransformSection::default(),
            drill: DrillSection::default(),
            burr: None,
            surface: preset.config(),
        }
    }

    /// Load scenario from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid scenario: {}", path.display()))
    }

    /// Parse scenario from string
    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(content).context("Failed to parse rubble.toml")?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Serialize as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize scenario")
    }

    /// Validate scenario fields
    pub fn validate(&self) -> Result<()> {
        self.surface.validate()?;
        if let Some(burr) = &self.burr {
            burr.validate()?;
        }
        if self.simulation.tick_rate == 0 {
            anyhow::bail!("Invalid tick_rate 0 in rubble.toml (must be at least 1)");
        }
        if self.transform.scale <= 0.0 || !self.transform.scale.is_finite() {
            anyhow::bail!(
                "Invalid transform.scale {} in rubble.toml (must be > 0)",
                self.transform.scale
            );
        }
        Ok(())
    }
}

/// Scenario file in the platform config directory
pub fn config_dir_scenario() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "rubble", "rubble")
        .map(|dirs| dirs.config_dir().join(SCENARIO_FILE))
}

/// Pick the scenario file to use
///
/// An explicit path wins. Otherwise `rubble.toml` in the working directory,
/// then the platform config directory. `None` means built-in defaults.
pub fn resolve(explicit: Option<&Path>, working_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = working_dir.join(SCENARIO_FILE);
    if local.is_file() {
        return Some(local);
    }
    config_dir_scenario().filter(|path| path.is_file())
}
