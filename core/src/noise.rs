//! Coherent noise used to modulate displacement
//!
//! Displacement samples noise at the vertex's own position, so repeated hits
//! on the same spot follow a stable spatial pattern instead of re-rolling.

use std::fmt;

use ::noise::{NoiseFn, Perlin, Seedable};

/// Deterministic, continuous 2D noise returning values in [0, 1]
pub trait CoherentNoise {
    fn sample(&self, x: f32, y: f32) -> f32;
}

/// Gradient noise backed by [`Perlin`], remapped from [-1, 1] to [0, 1]
#[derive(Clone)]
pub struct PerlinNoise {
    perlin: Perlin,
}

impl PerlinNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.perlin.seed()
    }
}

impl fmt::Debug for PerlinNoise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerlinNoise").field("seed", &self.seed()).finish()
    }
}

impl Default for PerlinNoise {
    fn default() -> Self {
        Self::new(Perlin::DEFAULT_SEED)
    }
}

impl CoherentNoise for PerlinNoise {
    fn sample(&self, x: f32, y: f32) -> f32 {
        let raw = self.perlin.get([x as f64, y as f64]) as f32;
        (raw * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

/// Noise that always returns the same value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantNoise(pub f32);

impl CoherentNoise for ConstantNoise {
    fn sample(&self, _x: f32, _y: f32) -> f32 {
        self.0.clamp(0.0, 1.0)
    }
}
