//! The six correctness scenarios.
//!
//! Each scenario drives a fresh arena through one adversarial call
//! sequence and records what it observed as named checks. A failed check
//! is report data, never a panic, so a broken allocator still produces a
//! complete run.

use chainalloc_core::chunk::{CHUNK_HEADER_SIZE, RESERVED_SIZE};
use chainalloc_core::global::MEM_SIZE;
use chainalloc_core::{Arena, Fault, FaultRecord, Site};
use serde::Serialize;

use crate::MAX_REQUEST;

/// One observed behavior within a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
}

/// Result of one scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub name: &'static str,
    pub title: &'static str,
    pub checks: Vec<Check>,
    /// Rendered fault records the scenario drained, in emission order.
    pub faults: Vec<String>,
    pub passed: bool,
}

/// Runs all six scenarios in their canonical order.
#[must_use]
pub fn run_all() -> Vec<ScenarioOutcome> {
    vec![
        free_returns_memory(),
        faults_are_reported(),
        leak_detection(),
        coalescing(),
        alignment(),
        data_isolation(),
    ]
}

/// Free returns memory to the arena, and a second free of the same target
/// is caught.
#[must_use]
pub fn free_returns_memory() -> ScenarioOutcome {
    let mut arena = fresh();
    let mut checks = Vec::new();
    let mut faults = Vec::new();

    let ptr = arena.alloc(MAX_REQUEST, Site::here());
    checks.push(check("allocation succeeds", ptr.is_some()));
    if let Some(ptr) = ptr {
        arena.dealloc(ptr, Site::here());
        checks.push(check("first free is silent", arena.faults().is_empty()));

        arena.dealloc(ptr, Site::here());
        let records = drain(&mut arena, &mut faults);
        checks.push(check(
            "second free reports already-freed",
            records.len() == 1 && records[0].fault == Fault::AlreadyFreed { ptr },
        ));
    }
    checks.push(check("no leak remains", !arena.leaks()));

    outcome("free_returns_memory", "free() returns memory to the arena", checks, faults)
}

/// Every fault class is reported: foreign target, interior target, double
/// free.
#[must_use]
pub fn faults_are_reported() -> ScenarioOutcome {
    let mut arena = fresh();
    let mut checks = Vec::new();
    let mut faults = Vec::new();

    // The original frees a stack variable's address here; any offset
    // outside the arena's data range plays that role.
    arena.dealloc(MEM_SIZE + 40, Site::here());

    let ptr = arena.alloc(MAX_REQUEST, Site::here());
    checks.push(check("allocation succeeds", ptr.is_some()));
    if let Some(ptr) = ptr {
        arena.dealloc(ptr + 1, Site::here());
        arena.dealloc(ptr, Site::here());
        arena.dealloc(ptr, Site::here());
    }

    let records = drain(&mut arena, &mut faults);
    let kinds: Vec<Fault> = records.iter().map(|record| record.fault).collect();
    checks.push(check(
        "foreign target is rejected",
        matches!(kinds.first(), Some(Fault::NotFromAllocator { .. })),
    ));
    checks.push(check(
        "interior target is rejected",
        matches!(kinds.get(1), Some(Fault::NotChunkStart { .. })),
    ));
    checks.push(check(
        "double free is detected",
        matches!(kinds.get(2), Some(Fault::AlreadyFreed { .. })),
    ));
    checks.push(check("no spurious faults", kinds.len() == 3));
    checks.push(check("no leak remains", !arena.leaks()));

    outcome("faults_are_reported", "invalid frees are reported", checks, faults)
}

/// The leak query flips with the chain.
#[must_use]
pub fn leak_detection() -> ScenarioOutcome {
    let mut arena = fresh();
    let mut checks = Vec::new();
    let mut faults = Vec::new();

    let ptr = arena.alloc(MAX_REQUEST, Site::here());
    checks.push(check("allocation succeeds", ptr.is_some()));
    checks.push(check("live chunk is a leak", arena.leaks()));
    if let Some(ptr) = ptr {
        arena.dealloc(ptr, Site::here());
    }
    checks.push(check("leak clears after free", !arena.leaks()));
    let records = drain(&mut arena, &mut faults);
    checks.push(check("no faults", records.is_empty()));

    outcome("leak_detection", "memory leaks are detected", checks, faults)
}

/// Adjacent free chunks present as one reusable gap.
#[must_use]
pub fn coalescing() -> ScenarioOutcome {
    let mut arena = fresh();
    let mut checks = Vec::new();
    let mut faults = Vec::new();

    let size = quarter(arena.capacity());
    let ptrs: Vec<usize> = (0..4)
        .filter_map(|_| arena.alloc(size, Site::here()))
        .collect();
    checks.push(check("four equal allocations fill the arena", ptrs.len() == 4));
    checks.push(check("a fifth allocation fails", arena.alloc(8, Site::here()).is_none()));

    if let [p1, p2, p3, p4] = ptrs[..] {
        arena.dealloc(p2, Site::here());
        arena.dealloc(p3, Site::here());

        // The merged gap spans both freed chunks plus the inner header.
        let merged = arena.alloc(2 * size + CHUNK_HEADER_SIZE, Site::here());
        checks.push(check(
            "refill lands at the first freed chunk",
            merged == Some(p2),
        ));

        arena.dealloc(p1, Site::here());
        arena.dealloc(p4, Site::here());
        if let Some(merged) = merged {
            arena.dealloc(merged, Site::here());
        }
    }

    checks.push(check("no leak remains", !arena.leaks()));
    let records = drain(&mut arena, &mut faults);
    checks.push(check("no faults", records.is_empty()));

    outcome("coalescing", "adjacent free chunks coalesce", checks, faults)
}

/// Every successful allocation is 8-byte aligned.
#[must_use]
pub fn alignment() -> ScenarioOutcome {
    let mut arena = fresh();
    let mut checks = Vec::new();
    let mut faults = Vec::new();

    let mut rng = 0x0DD5_EED5_1234_5678u64;
    let mut live = Vec::new();
    let mut aligned = true;
    for _ in 0..121 {
        let size = next(&mut rng) % 10;
        if let Some(ptr) = arena.alloc(size, Site::here()) {
            aligned &= ptr % 8 == 0;
            live.push(ptr);
        }
    }
    checks.push(check("every allocation is 8-byte aligned", aligned));
    checks.push(check("small allocations succeed", !live.is_empty()));

    for ptr in live {
        arena.dealloc(ptr, Site::here());
    }
    checks.push(check("no leak remains", !arena.leaks()));
    let records = drain(&mut arena, &mut faults);
    checks.push(check("no faults", records.is_empty()));

    outcome("alignment", "allocations are 8-byte aligned", checks, faults)
}

/// Writes through one allocation never bleed into another, across the
/// coalescing refill as well.
#[must_use]
pub fn data_isolation() -> ScenarioOutcome {
    let mut arena = fresh();
    let mut checks = Vec::new();
    let mut faults = Vec::new();

    let size = quarter(arena.capacity());
    let ptrs: Vec<usize> = (0..4)
        .filter_map(|_| arena.alloc(size, Site::here()))
        .collect();
    checks.push(check("four equal allocations fill the arena", ptrs.len() == 4));

    if let [p1, p2, p3, p4] = ptrs[..] {
        for (i, ptr) in [p1, p2, p3, p4].into_iter().enumerate() {
            fill(&mut arena, ptr, b'a' + i as u8);
        }
        let intact = [p1, p2, p3, p4]
            .into_iter()
            .enumerate()
            .all(|(i, ptr)| holds(&arena, ptr, b'a' + i as u8));
        checks.push(check("full chunks keep their patterns", intact));

        arena.dealloc(p2, Site::here());
        arena.dealloc(p3, Site::here());
        let merged = arena.alloc(2 * size + CHUNK_HEADER_SIZE, Site::here());
        checks.push(check("coalesced refill succeeds", merged.is_some()));
        if let Some(merged) = merged {
            fill(&mut arena, merged, b'e');
            checks.push(check(
                "survivors are untouched by the refill",
                holds(&arena, p1, b'a') && holds(&arena, p4, b'd') && holds(&arena, merged, b'e'),
            ));
            arena.dealloc(merged, Site::here());
        }
        arena.dealloc(p1, Site::here());
        arena.dealloc(p4, Site::here());
    }

    checks.push(check("no leak remains", !arena.leaks()));
    let records = drain(&mut arena, &mut faults);
    checks.push(check("no faults", records.is_empty()));

    outcome("data_isolation", "allocations do not overlap", checks, faults)
}

fn fresh() -> Arena<MEM_SIZE> {
    Arena::new()
}

/// Data size that packs the arena with exactly four equal chunks.
fn quarter(cap: usize) -> usize {
    ((cap - RESERVED_SIZE - 4 * CHUNK_HEADER_SIZE) / 4) & !7
}

fn check(name: &'static str, passed: bool) -> Check {
    Check { name, passed }
}

fn outcome(
    name: &'static str,
    title: &'static str,
    checks: Vec<Check>,
    faults: Vec<String>,
) -> ScenarioOutcome {
    let passed = checks.iter().all(|check| check.passed);
    ScenarioOutcome {
        name,
        title,
        checks,
        faults,
        passed,
    }
}

fn drain(arena: &mut Arena<MEM_SIZE>, rendered: &mut Vec<String>) -> Vec<FaultRecord> {
    let records = arena.drain_faults();
    rendered.extend(records.iter().map(ToString::to_string));
    records
}

fn fill(arena: &mut Arena<MEM_SIZE>, ptr: usize, byte: u8) {
    if let Some(data) = arena.data_mut(ptr) {
        data.fill(byte);
    }
}

fn holds(arena: &Arena<MEM_SIZE>, ptr: usize, byte: u8) -> bool {
    arena
        .data(ptr)
        .is_some_and(|data| data.iter().all(|&b| b == byte))
}

fn next(rng: &mut u64) -> usize {
    *rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
    (*rng >> 33) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_matches_the_canonical_arena() {
        assert_eq!(quarter(4104), 1008);
    }

    #[test]
    fn every_scenario_passes() {
        for scenario in run_all() {
            assert!(
                scenario.passed,
                "{} failed: {:?}",
                scenario.name, scenario.checks
            );
        }
    }

    #[test]
    fn fault_scenario_renders_three_records() {
        let scenario = faults_are_reported();
        assert_eq!(scenario.faults.len(), 3);
        assert!(scenario.faults[0].contains("not obtained"));
        assert!(scenario.faults[1].contains("not at the start"));
        assert!(scenario.faults[2].contains("already been freed"));
    }
}
