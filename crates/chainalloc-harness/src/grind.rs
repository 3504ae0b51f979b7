//! Timing workloads.
//!
//! Six allocation patterns, from single-byte ping-pong up to whole-arena
//! fragmentation churn. Each workload function runs one iteration against
//! a caller-supplied arena and leaves it empty, so the CLI and the
//! criterion benches drive the same code. [`run_all`] times a batch of
//! iterations per workload and reports the average in microseconds.

use std::time::Instant;

use chainalloc_core::global::MEM_SIZE;
use chainalloc_core::{Arena, Site};
use serde::Serialize;

use crate::MAX_REQUEST;

/// Iterations per workload in the stock run.
pub const ITERATIONS: usize = 50;

/// Allocations per iteration in the burst-style workloads.
const BURST: usize = 120;

/// Average latency of one workload.
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadResult {
    pub name: &'static str,
    pub average_micros: f64,
}

/// Results of a full grind run.
#[derive(Debug, Clone, Serialize)]
pub struct GrindReport {
    pub iterations: usize,
    pub workloads: Vec<WorkloadResult>,
    /// Leak state of the shared arena after all workloads finished.
    pub leaking: bool,
}

type Workload = fn(&mut Arena<MEM_SIZE>, &mut u64);

/// Allocate and immediately free a single byte, `BURST` times.
pub fn burst_pairs(arena: &mut Arena<MEM_SIZE>) {
    for _ in 0..BURST {
        if let Some(ptr) = arena.alloc(1, Site::here()) {
            arena.dealloc(ptr, Site::here());
        }
    }
}

/// Allocate `BURST` single bytes, then free them all.
pub fn batch_then_drain(arena: &mut Arena<MEM_SIZE>) {
    let ptrs: Vec<usize> = (0..BURST)
        .filter_map(|_| arena.alloc(1, Site::here()))
        .collect();
    for ptr in ptrs {
        arena.dealloc(ptr, Site::here());
    }
}

/// Randomly push allocations onto a stack or pop-and-free, until `BURST`
/// allocations have been attempted, then drain the stack.
pub fn random_walk(arena: &mut Arena<MEM_SIZE>, rng: &mut u64) {
    let mut stack: Vec<Option<usize>> = Vec::new();
    let mut attempts = 0;
    while attempts < BURST {
        if next(rng) % 2 == 0 {
            stack.push(arena.alloc(1, Site::here()));
            attempts += 1;
        } else if let Some(top) = stack.pop() {
            release(arena, top);
        }
    }
    while let Some(top) = stack.pop() {
        release(arena, top);
    }
}

/// [`burst_pairs`] with request sizes drawn from `0..=MAX_REQUEST`.
pub fn sized_pairs(arena: &mut Arena<MEM_SIZE>, rng: &mut u64) {
    for _ in 0..BURST {
        if let Some(ptr) = arena.alloc(next(rng) % (MAX_REQUEST + 1), Site::here()) {
            arena.dealloc(ptr, Site::here());
        }
    }
}

/// [`batch_then_drain`] with request sizes drawn from `0..=MAX_REQUEST`.
pub fn sized_batch(arena: &mut Arena<MEM_SIZE>, rng: &mut u64) {
    let ptrs: Vec<usize> = (0..BURST)
        .filter_map(|_| arena.alloc(next(rng) % (MAX_REQUEST + 1), Site::here()))
        .collect();
    for ptr in ptrs {
        arena.dealloc(ptr, Site::here());
    }
}

/// Fill the arena until allocation fails, free every third chunk, refill
/// those slots, then drain everything.
pub fn fragmentation_churn(arena: &mut Arena<MEM_SIZE>, rng: &mut u64) {
    let mut slots: Vec<Option<usize>> = Vec::new();
    while let Some(ptr) = arena.alloc(next(rng) % (MAX_REQUEST + 1), Site::here()) {
        slots.push(Some(ptr));
    }
    for slot in slots.iter_mut().step_by(3) {
        release(arena, slot.take());
    }
    for slot in slots.iter_mut().step_by(3) {
        *slot = arena.alloc(next(rng) % (MAX_REQUEST + 1), Site::here());
    }
    for ptr in slots.drain(..).flatten() {
        arena.dealloc(ptr, Site::here());
    }
}

/// Runs all six workloads over one arena, averaging `iterations` runs each.
#[must_use]
pub fn run_all(iterations: usize) -> GrindReport {
    let specs: [(&'static str, Workload); 6] = [
        ("burst_pairs", |arena, _| burst_pairs(arena)),
        ("batch_then_drain", |arena, _| batch_then_drain(arena)),
        ("random_walk", random_walk),
        ("sized_pairs", sized_pairs),
        ("sized_batch", sized_batch),
        ("fragmentation_churn", fragmentation_churn),
    ];

    let mut arena: Arena<MEM_SIZE> = Arena::new();
    let mut rng = 0x00C0_FFEE_D15E_A5E5u64;
    let iterations = iterations.max(1);

    let workloads = specs
        .into_iter()
        .map(|(name, workload)| {
            let start = Instant::now();
            for _ in 0..iterations {
                workload(&mut arena, &mut rng);
            }
            WorkloadResult {
                name,
                average_micros: start.elapsed().as_secs_f64() * 1e6 / iterations as f64,
            }
        })
        .collect();

    GrindReport {
        iterations,
        workloads,
        leaking: arena.leaks(),
    }
}

fn release(arena: &mut Arena<MEM_SIZE>, slot: Option<usize>) {
    if let Some(ptr) = slot {
        arena.dealloc(ptr, Site::here());
    }
}

fn next(rng: &mut u64) -> usize {
    *rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
    (*rng >> 33) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_workload_leaves_the_arena_empty() {
        let mut arena: Arena<MEM_SIZE> = Arena::new();
        let mut rng = 7u64;

        burst_pairs(&mut arena);
        assert!(!arena.leaks());
        batch_then_drain(&mut arena);
        assert!(!arena.leaks());
        random_walk(&mut arena, &mut rng);
        assert!(!arena.leaks());
        sized_pairs(&mut arena, &mut rng);
        assert!(!arena.leaks());
        sized_batch(&mut arena, &mut rng);
        assert!(!arena.leaks());
        fragmentation_churn(&mut arena, &mut rng);
        assert!(!arena.leaks());
        assert!(arena.faults().is_empty());
    }

    #[test]
    fn run_all_reports_every_workload() {
        let report = run_all(2);
        assert_eq!(report.iterations, 2);
        assert_eq!(report.workloads.len(), 6);
        assert!(!report.leaking);
        assert!(report.workloads.iter().all(|w| w.average_micros >= 0.0));
    }
}
