//! The process-wide arena.
//!
//! [`Arena`] itself is single-threaded state; this module is the documented
//! singleton for callers that want the classic `malloc`/`free` shape. Every
//! entry point takes the one lock, which is the external mutual exclusion
//! the chain-splice and unlink steps require when shared across threads.
//!
//! The arena is constructed lazily on first use and lives for the rest of
//! the process; there is no teardown.

use std::sync::LazyLock;

use parking_lot::Mutex;

use crate::arena::Arena;
use crate::fault::{FaultRecord, Site};

/// Capacity of the process-wide arena in bytes.
pub const MEM_SIZE: usize = 4104;

static ARENA: LazyLock<Mutex<Arena<MEM_SIZE>>> = LazyLock::new(|| Mutex::new(Arena::new()));

/// Allocates `size` bytes from the process-wide arena.
///
/// The caller's location is captured for diagnostics.
#[track_caller]
pub fn malloc(size: usize) -> Option<usize> {
    ARENA.lock().alloc(size, Site::here())
}

/// Frees an offset previously returned by [`malloc`].
#[track_caller]
pub fn free(ptr: usize) {
    ARENA.lock().dealloc(ptr, Site::here());
}

/// Whether the process-wide arena still holds live chunks.
#[must_use]
pub fn leaking() -> bool {
    ARENA.lock().leaks()
}

/// Drains the fault records accumulated by the process-wide arena.
pub fn drain_faults() -> Vec<FaultRecord> {
    ARENA.lock().drain_faults()
}

/// Runs `f` with the process-wide arena locked, for callers that need the
/// full [`Arena`] API (data views, observers).
pub fn with<R>(f: impl FnOnce(&mut Arena<MEM_SIZE>) -> R) -> R {
    f(&mut ARENA.lock())
}
