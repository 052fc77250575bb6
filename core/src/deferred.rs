//! Deadline-based deferred execution
//!
//! Fragments and collapsing surfaces are cleaned up by independent scheduled
//! tasks that fire at a sim-clock deadline. Nothing here keeps a reference to
//! the surface that scheduled a task.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::debris::FragmentId;
use crate::surface::SurfaceId;

/// Work to run once its deadline passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredTask {
    /// Remove a fragment's collision shape so it stops colliding
    RemoveFragmentCollider(FragmentId),
    /// Destroy a fragment entirely
    DestroyFragment(FragmentId),
    /// Remove a collapsing surface
    DestroySurface(SurfaceId),
}

/// Host facility for scheduling delayed work
pub trait Scheduler {
    /// Run `task` after `delay` seconds of simulation time
    fn schedule(&mut self, delay: f32, task: DeferredTask);
}

#[derive(Debug)]
struct Entry {
    deadline: f64,
    seq: u64,
    task: DeferredTask,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deadline
            .total_cmp(&other.deadline)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Sim-clock task queue
///
/// Tasks come out in deadline order; tasks sharing a deadline come out in the
/// order they were scheduled.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    now: f64,
    seq: u64,
    heap: BinaryHeap<Reverse<Entry>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(entry)| entry.deadline)
    }

    /// Move the clock forward and return every task now due
    pub fn advance(&mut self, dt: f32) -> Vec<DeferredTask> {
        if dt.is_finite() && dt > 0.0 {
            self.now += dt as f64;
        }

        let mut due = Vec::new();
        while let Some(Reverse(entry)) = self.heap.peek() {
            if entry.deadline > self.now {
                break;
            }
            if let Some(Reverse(entry)) = self.heap.pop() {
                due.push(entry.task);
            }
        }
        due
    }

    /// Drop all pending tasks without running them
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl Scheduler for DeferredQueue {
    fn schedule(&mut self, delay: f32, task: DeferredTask) {
        let delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        self.heap.push(Reverse(Entry {
            deadline: self.now + delay as f64,
            seq: self.seq,
            task,
        }));
        self.seq += 1;
    }
}
