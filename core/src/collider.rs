//! Collision mesh synchronization
//!
//! Rebuilding a collision shape from the live buffers is expensive. Between
//! rebuilds the physical boundary stays stale while the rendered mesh keeps
//! eroding; the gate below bounds how stale it can get.

use crate::config::ColliderConfig;
use crate::random::RandomSource;

/// Decides when the collision shape should be rebuilt
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderSync {
    config: ColliderConfig,
    throttle: bool,
    timer: f32,
    pending: bool,
    rebuilds: u64,
}

impl ColliderSync {
    pub fn new(config: ColliderConfig, throttle: bool) -> Self {
        Self {
            config,
            throttle,
            timer: 0.0,
            pending: false,
            rebuilds: 0,
        }
    }

    /// Seconds accumulated since the last resync window
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// True when the mesh changed since the last rebuild
    pub fn is_stale(&self) -> bool {
        self.pending
    }

    /// Rebuilds granted so far
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Record that the mesh changed
    pub fn mark_dirty(&mut self) {
        self.pending = true;
    }

    /// Advance by one tick and report whether to rebuild now
    ///
    /// Unthrottled, any pending change rebuilds immediately. Throttled, the
    /// timer must reach `update_delay`; the window then resets whether or not
    /// the `sync_chance` roll lets the rebuild through.
    pub fn tick<R: RandomSource + ?Sized>(&mut self, dt: f32, rng: &mut R) -> bool {
        if !self.config.enabled {
            return false;
        }

        if !self.throttle {
            return self.pending && self.grant(rng);
        }

        if dt.is_finite() && dt > 0.0 {
            self.timer += dt;
        }
        if self.timer < self.config.update_delay {
            return false;
        }
        self.timer = 0.0;
        self.pending && self.grant(rng)
    }

    fn grant<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !rng.chance(self.config.sync_chance) {
            tracing::trace!("collider resync skipped by roll");
            return false;
        }
        self.pending = false;
        self.rebuilds += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedRandom;

    fn throttled(delay: f32, chance: f32) -> ColliderSync {
        ColliderSync::new(
            ColliderConfig {
                enabled: true,
                update_delay: delay,
                sync_chance: chance,
            },
            true,
        )
    }

    #[test]
    fn test_disabled_never_syncs() {
        let mut sync = ColliderSync::new(
            ColliderConfig {
                enabled: false,
                ..ColliderConfig::default()
            },
            false,
        );
        let mut rng = ScriptedRandom::new(vec![0.0]);
        sync.mark_dirty();
        assert!(!sync.tick(1.0, &mut rng));
    }

    #[test]
    fn test_unthrottled_syncs_when_dirty() {
        let mut sync = ColliderSync::new(ColliderConfig::default(), false);
        let mut rng = ScriptedRandom::new(vec![0.0]);
        assert!(!sync.tick(0.016, &mut rng));
        sync.mark_dirty();
        assert!(sync.tick(0.016, &mut rng));
        assert!(!sync.is_stale());
        assert!(!sync.tick(0.016, &mut rng));
        assert_eq!(sync.rebuilds(), 1);
    }

    #[test]
    fn test_throttle_waits_for_delay() {
        let mut sync = throttled(0.5, 1.0);
        let mut rng = ScriptedRandom::new(vec![0.0]);
        sync.mark_dirty();

        assert!(!sync.tick(0.2, &mut rng));
        assert!(!sync.tick(0.2, &mut rng));
        assert!(sync.tick(0.2, &mut rng));
        assert_eq!(sync.timer(), 0.0);
    }

    #[test]
    fn test_throttle_idle_window_resets() {
        let mut sync = throttled(0.5, 1.0);
        let mut rng = ScriptedRandom::new(vec![0.0]);

        assert!(!sync.tick(0.6, &mut rng));
        assert_eq!(sync.timer(), 0.0);
        sync.mark_dirty();
        assert!(!sync.tick(0.1, &mut rng));
    }

    #[test]
    fn test_random_gate_keeps_pending() {
        let mut sync = throttled(0.5, 0.5);
        let mut rng = ScriptedRandom::new(vec![0.9, 0.1]);
        sync.mark_dirty();

        assert!(!sync.tick(0.5, &mut rng));
        assert!(sync.is_stale());
        assert!(sync.tick(0.5, &mut rng));
        assert!(!sync.is_stale());
    }
}
