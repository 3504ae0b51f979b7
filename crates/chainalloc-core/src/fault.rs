//! Deallocation fault taxonomy and call-site capture.
//!
//! Faults are advisory diagnostics, not errors: nothing here propagates or
//! aborts. The arena pushes a [`FaultRecord`] for each structural fault it
//! detects and the operation returns as a no-op; callers inspect return
//! values to detect failure and drain the records when they want the story.

use std::fmt;
use std::panic::Location;

use thiserror::Error;

/// Caller location attached to every fault record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub file: &'static str,
    pub line: u32,
}

impl Site {
    /// Captures the location of the caller.
    ///
    /// Propagates through other `#[track_caller]` frames, so convenience
    /// wrappers report their own caller rather than themselves.
    #[must_use]
    #[track_caller]
    pub fn here() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A structural fault detected while classifying a deallocation target.
///
/// Size rejections and out-of-memory are deliberately absent: those are
/// ordinary capacity outcomes, signalled only through a `None` return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    /// The target lies outside the arena's valid data range, or the arena
    /// has never handed out anything.
    #[error("pointer {ptr:#x} was not obtained from this allocator")]
    NotFromAllocator { ptr: usize },
    /// The target lands in known-free space, or the chain is empty.
    #[error("pointer {ptr:#x} has already been freed")]
    AlreadyFreed { ptr: usize },
    /// The target is inside a live chunk's data but not at its start.
    #[error("pointer {ptr:#x} is not at the start of a chunk")]
    NotChunkStart { ptr: usize },
}

impl Fault {
    /// The offending offset.
    #[must_use]
    pub fn ptr(&self) -> usize {
        match *self {
            Self::NotFromAllocator { ptr } | Self::AlreadyFreed { ptr } | Self::NotChunkStart { ptr } => ptr,
        }
    }
}

/// One entry in the arena's drainable fault channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultRecord {
    /// Operation that detected the fault (`"dealloc"`).
    pub op: &'static str,
    pub fault: Fault,
    pub site: Site,
}

impl fmt::Display for FaultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error in {} at {}: {}", self.op, self.site, self.fault)
    }
}

/// Arena capacity constants that cannot back a working allocator.
///
/// Checked once at construction; operations on a constructed arena assume a
/// valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("arena capacity {cap} is below the {min}-byte minimum")]
    BelowMinimum { cap: usize, min: usize },
    #[error("arena capacity {cap} is not a multiple of 8")]
    Misaligned { cap: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_captures_this_file() {
        let site = Site::here();
        assert!(site.file.ends_with("fault.rs"));
        assert!(site.line > 0);
    }

    #[test]
    fn fault_messages_name_the_offset() {
        let fault = Fault::AlreadyFreed { ptr: 0x18 };
        assert_eq!(fault.to_string(), "pointer 0x18 has already been freed");
        assert_eq!(fault.ptr(), 0x18);
    }

    #[test]
    fn record_display_includes_site_and_operation() {
        let record = FaultRecord {
            op: "dealloc",
            fault: Fault::NotChunkStart { ptr: 0x19 },
            site: Site {
                file: "demo.rs",
                line: 7,
            },
        };
        assert_eq!(
            record.to_string(),
            "error in dealloc at demo.rs:7: pointer 0x19 is not at the start of a chunk"
        );
    }
}
