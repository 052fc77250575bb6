//! Fracture tracking
//!
//! Decides which displaced vertices break, keeps the monotonic set of broken
//! vertices, prunes triangles that reference them and detects when enough of
//! the surface is gone to collapse it.

use glam::Vec3;
use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::config::FractureConfig;

/// Vertices newly broken by one contact
pub type Fractures = SmallVec<[usize; 8]>;

/// Monotonic set of fractured vertices plus the threshold logic around it
#[derive(Debug, Clone)]
pub struct FractureTracker {
    config: FractureConfig,
    threshold_sq: f32,
    fractured: HashSet<usize>,
}

impl FractureTracker {
    pub fn new(config: FractureConfig) -> Self {
        let threshold_sq = config.threshold * config.threshold;
        Self {
            config,
            threshold_sq,
            fractured: HashSet::new(),
        }
    }

    pub fn config(&self) -> &FractureConfig {
        &self.config
    }

    pub fn contains(&self, vertex: usize) -> bool {
        self.fractured.contains(&vertex)
    }

    pub fn len(&self) -> usize {
        self.fractured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractured.is_empty()
    }

    /// Fractured vertex indices in ascending order
    pub fn sorted(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.fractured.iter().copied().collect();
        indices.sort_unstable();
        indices
    }

    pub(crate) fn set(&self) -> &HashSet<usize> {
        &self.fractured
    }

    /// True when the vertex has moved strictly further than the threshold
    pub fn exceeds_threshold(&self, current: Vec3, original: Vec3) -> bool {
        current.distance_squared(original) > self.threshold_sq
    }

    /// Mark a vertex as fractured; returns false if it already was
    pub fn mark(&mut self, vertex: usize) -> bool {
        self.fractured.insert(vertex)
    }

    /// Test the vertices displaced by one contact
    ///
    /// Walks `displaced` in order and fractures every vertex past the
    /// threshold that is not already broken, stopping once
    /// `max_chunks_per_hit` vertices have broken in this call. Vertices past
    /// the cap stay intact and may break on a later contact.
    pub fn evaluate(&mut self, displaced: &[usize], current: &[Vec3], original: &[Vec3]) -> Fractures {
        let cap = self.config.max_chunks_per_hit as usize;
        let mut broken = Fractures::new();

        for &i in displaced {
            if broken.len() >= cap {
                break;
            }
            if self.fractured.contains(&i) || !self.exceeds_threshold(current[i], original[i]) {
                continue;
            }
            self.fractured.insert(i);
            broken.push(i);
        }

        broken
    }

    /// Share of the surface's vertices that have fractured
    pub fn fraction(&self, vertex_count: usize) -> f32 {
        if vertex_count == 0 {
            return 0.0;
        }
        self.fractured.len() as f32 / vertex_count as f32
    }

    /// True once the fractured share strictly exceeds `destroy_percent`
    pub fn should_collapse(&self, vertex_count: usize) -> bool {
        self.config
            .destroy_percent
            .is_some_and(|percent| self.fraction(vertex_count) > percent)
    }
}

/// Drop every triangle that references a fractured vertex
///
/// Returns how many triangles were removed. Order of retained triangles is
/// preserved.
pub fn prune_triangles(triangles: &mut Vec<[u32; 3]>, fractured: &HashSet<usize>) -> usize {
    let before = triangles.len();
    triangles.retain(|tri| !tri.iter().any(|&i| fractured.contains(&(i as usize))));
    before - triangles.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(threshold: f32, cap: u32) -> FractureTracker {
        FractureTracker::new(FractureConfig {
            threshold,
            max_chunks_per_hit: cap,
            ..FractureConfig::default()
        })
    }

    #[test]
    fn test_threshold_is_strict() {
        let tracker = tracker(0.5, 3);
        assert!(!tracker.exceeds_threshold(Vec3::new(0.0, 0.0, -0.5), Vec3::ZERO));
        assert!(tracker.exceeds_threshold(Vec3::new(0.0, 0.0, -0.51), Vec3::ZERO));
    }

    #[test]
    fn test_evaluate_marks_broken() {
        let mut tracker = tracker(0.5, 3);
        let original = vec![Vec3::ZERO; 3];
        let current = vec![Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -0.2), Vec3::new(0.0, 0.0, -0.6)];

        let broken = tracker.evaluate(&[0, 1, 2], &current, &original);

        assert_eq!(broken.as_slice(), &[0, 2]);
        assert!(tracker.contains(0));
        assert!(!tracker.contains(1));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_evaluate_respects_cap() {
        let mut tracker = tracker(0.1, 2);
        let original = vec![Vec3::ZERO; 5];
        let current = vec![Vec3::NEG_Z; 5];

        let broken = tracker.evaluate(&[0, 1, 2, 3, 4], &current, &original);
        assert_eq!(broken.len(), 2);

        // Remaining vertices break on the next contact
        let broken = tracker.evaluate(&[0, 1, 2, 3, 4], &current, &original);
        assert_eq!(broken.as_slice(), &[2, 3]);
    }

    #[test]
    fn test_evaluate_never_refractures() {
        let mut tracker = tracker(0.1, 10);
        let original = vec![Vec3::ZERO; 2];
        let current = vec![Vec3::NEG_Z; 2];

        assert_eq!(tracker.evaluate(&[0, 1], &current, &original).len(), 2);
        assert!(tracker.evaluate(&[0, 1], &current, &original).is_empty());
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_zero_cap_breaks_nothing() {
        let mut tracker = tracker(0.1, 0);
        let broken = tracker.evaluate(&[0], &[Vec3::NEG_Z], &[Vec3::ZERO]);
        assert!(broken.is_empty());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_collapse_is_strict() {
        let mut tracker = FractureTracker::new(FractureConfig {
            destroy_percent: Some(0.8),
            ..FractureConfig::default()
        });
        for i in 0..8 {
            tracker.mark(i);
        }
        assert!(!tracker.should_collapse(10));
        tracker.mark(8);
        assert!(tracker.should_collapse(10));
    }

    #[test]
    fn test_collapse_disabled() {
        let mut tracker = tracker(0.1, 1);
        tracker.mark(0);
        assert!(!tracker.should_collapse(1));
    }

    #[test]
    fn test_prune_triangles() {
        let mut triangles = vec![[0, 1, 2], [1, 2, 3], [2, 3, 4]];
        let fractured: HashSet<usize> = [0].into_iter().collect();

        assert_eq!(prune_triangles(&mut triangles, &fractured), 1);
        assert_eq!(triangles, vec![[1, 2, 3], [2, 3, 4]]);

        let fractured: HashSet<usize> = [0, 4].into_iter().collect();
        assert_eq!(prune_triangles(&mut triangles, &fractured), 1);
        assert_eq!(triangles, vec![[1, 2, 3]]);
    }

    #[test]
    fn test_sorted() {
        let mut tracker = tracker(0.1, 1);
        for i in [9, 2, 5] {
            tracker.mark(i);
        }
        assert_eq!(tracker.sorted(), vec![2, 5, 9]);
    }
}
