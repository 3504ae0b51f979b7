//! The arena and its three operations: allocate, deallocate, leak query.
//!
//! Layout of the buffer, from offset 0:
//!
//! ```text
//! [reserved header][chunk header][data][chunk header][data]...
//! ```
//!
//! The reserved header holds the offset of the first live chunk. Chunk
//! `next` links strictly increase and terminate at the end-of-arena
//! sentinel (`CAP`). The space between chain-adjacent entities is unowned
//! free space: allocation derives every candidate gap from the surviving
//! chunks' offsets, so freeing two neighbours automatically presents their
//! combined span as one gap. That emergent coalescing is the point of the
//! design and must not be replaced by eager merge bookkeeping.

use crate::chunk::{
    ALIGN, CHUNK_HEADER_SIZE, ChunkHeader, MIN_CAPACITY, RESERVED_SIZE, UNINITIALIZED, align_up,
    read_word, write_word,
};
use crate::fault::{ConfigError, Fault, FaultRecord, Site};

/// A fixed-capacity allocation arena.
///
/// `CAP` is the total byte capacity, fixed at compile time. The buffer is
/// zero-filled on construction, which realizes the "never initialized"
/// state of the reserved header for free. The arena is an ordinary owned
/// value: callers that need one per process can use [`crate::global`],
/// callers that need isolation (tests, the harness) construct their own.
///
/// Not synchronized; share across threads only behind external locking.
pub struct Arena<const CAP: usize> {
    mem: Box<[u8]>,
    faults: Vec<FaultRecord>,
}

impl<const CAP: usize> Arena<CAP> {
    /// Creates a zeroed arena, or reports why `CAP` cannot back one.
    pub fn try_new() -> Result<Self, ConfigError> {
        if CAP < MIN_CAPACITY {
            return Err(ConfigError::BelowMinimum {
                cap: CAP,
                min: MIN_CAPACITY,
            });
        }
        if CAP % ALIGN != 0 {
            return Err(ConfigError::Misaligned { cap: CAP });
        }
        Ok(Self {
            mem: vec![0u8; CAP].into_boxed_slice(),
            faults: Vec::new(),
        })
    }

    /// Creates a zeroed arena.
    ///
    /// # Panics
    ///
    /// Panics when `CAP` violates the capacity constraints. A bad `CAP` is
    /// a build misconfiguration, not a runtime condition, so it fails loud
    /// and once instead of being re-checked on every call.
    #[must_use]
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(arena) => arena,
            Err(err) => panic!("invalid arena configuration: {err}"),
        }
    }

    /// Total capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        CAP
    }

    /// Largest single allocation this arena could ever satisfy.
    #[must_use]
    pub fn max_alloc(&self) -> usize {
        CAP - RESERVED_SIZE - CHUNK_HEADER_SIZE
    }

    /// Allocates `size` bytes, first-fit over the address-ordered gaps.
    ///
    /// Returns the offset of the data region, always 8-byte aligned and
    /// immediately following the new chunk's header. Returns `None` when
    /// `size` rounds to zero, exceeds [`Self::max_alloc`], or no gap is
    /// large enough; all three are silent capacity outcomes, never faults.
    ///
    /// The call site is accepted for interface symmetry with
    /// [`Self::dealloc`]; allocation records no diagnostics.
    pub fn alloc(&mut self, size: usize, _site: Site) -> Option<usize> {
        let aligned = align_up(size)?;
        if aligned == 0 || aligned > self.max_alloc() {
            return None;
        }

        let first = self.first_chunk();

        // Chain never started, or every chunk has been freed: restart the
        // chain right after the reserved header.
        if first == UNINITIALIZED || first == CAP {
            return Some(self.place(RESERVED_SIZE, aligned, CAP, Predecessor::Reserved));
        }

        // Gap between the reserved header and the first chunk.
        if first - RESERVED_SIZE >= aligned + CHUNK_HEADER_SIZE {
            return Some(self.place(RESERVED_SIZE, aligned, first, Predecessor::Reserved));
        }

        // Gaps between chain-adjacent chunks, including the one between the
        // last chunk and the end of the arena.
        let mut prev = first;
        let mut curr = first;
        loop {
            let prev_end = ChunkHeader::read(&self.mem, prev).end(prev);
            let gap = if curr == prev { 0 } else { curr - prev_end };
            if gap >= aligned + CHUNK_HEADER_SIZE {
                return Some(self.place(prev_end, aligned, curr, Predecessor::Chunk(prev)));
            }
            if curr == CAP {
                break;
            }
            prev = curr;
            curr = ChunkHeader::read(&self.mem, curr).next;
        }
        None
    }

    /// Deallocates the chunk whose data region starts at `ptr`.
    ///
    /// Anything other than an exact match is a no-op that classifies the
    /// target and records a fault: outside the arena's data range (or the
    /// chain never started) is [`Fault::NotFromAllocator`]; strictly inside
    /// a live chunk's data is [`Fault::NotChunkStart`]; everything that
    /// lands in free space, an empty chain included, is
    /// [`Fault::AlreadyFreed`]. A successful unlink is silent and leaves
    /// the chunk's former bytes untouched.
    pub fn dealloc(&mut self, ptr: usize, site: Site) {
        let first = self.first_chunk();
        if first == UNINITIALIZED || ptr < RESERVED_SIZE + CHUNK_HEADER_SIZE || ptr >= CAP {
            self.report(Fault::NotFromAllocator { ptr }, site);
            return;
        }
        if first == CAP {
            self.report(Fault::AlreadyFreed { ptr }, site);
            return;
        }

        let mut prev = first;
        let mut curr = first;
        loop {
            if curr != CAP {
                let header = ChunkHeader::read(&self.mem, curr);
                if curr + CHUNK_HEADER_SIZE == ptr {
                    if curr == first {
                        self.set_first_chunk(header.next);
                    } else {
                        self.set_next(prev, header.next);
                    }
                    return;
                }
                if ptr > curr + CHUNK_HEADER_SIZE && ptr < header.end(curr) {
                    self.report(Fault::NotChunkStart { ptr }, site);
                    return;
                }
            }
            if curr != prev {
                let prev_end = ChunkHeader::read(&self.mem, prev).end(prev);
                if ptr >= prev_end && ptr < curr {
                    self.report(Fault::AlreadyFreed { ptr }, site);
                    return;
                }
            }
            if curr == CAP {
                break;
            }
            prev = curr;
            curr = ChunkHeader::read(&self.mem, curr).next;
        }

        // In-bounds targets the walk never classified sit in free space it
        // stepped over (the gap before the first chunk) or inside header
        // bytes. Both are bookkeeping territory, not live data, so they get
        // the free-space diagnostic instead of the original's silent no-op.
        self.report(Fault::AlreadyFreed { ptr }, site);
    }

    /// Whether any chunk is still live. O(1).
    #[must_use]
    pub fn leaks(&self) -> bool {
        let first = self.first_chunk();
        first != UNINITIALIZED && first != CAP
    }

    /// Data size of the live chunk whose data region starts at `ptr`.
    #[must_use]
    pub fn lookup(&self, ptr: usize) -> Option<usize> {
        self.chunks()
            .find(|&(at, _)| at + CHUNK_HEADER_SIZE == ptr)
            .map(|(_, header)| header.data_size)
    }

    /// Number of live chunks. O(n) chain walk.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.chunks().count()
    }

    /// The data region of the live chunk starting at `ptr`, if any.
    #[must_use]
    pub fn data(&self, ptr: usize) -> Option<&[u8]> {
        let size = self.lookup(ptr)?;
        Some(&self.mem[ptr..ptr + size])
    }

    /// Mutable view of the data region of the live chunk starting at `ptr`.
    pub fn data_mut(&mut self, ptr: usize) -> Option<&mut [u8]> {
        let size = self.lookup(ptr)?;
        Some(&mut self.mem[ptr..ptr + size])
    }

    /// Fault records accumulated so far.
    #[must_use]
    pub fn faults(&self) -> &[FaultRecord] {
        &self.faults
    }

    /// Drains the accumulated fault records.
    pub fn drain_faults(&mut self) -> Vec<FaultRecord> {
        std::mem::take(&mut self.faults)
    }

    fn first_chunk(&self) -> usize {
        read_word(&self.mem, 0)
    }

    fn set_first_chunk(&mut self, at: usize) {
        write_word(&mut self.mem, 0, at);
    }

    /// Writes a new chunk at `at` pointing to `next`, and splices it in
    /// behind `pred`. Returns the data offset.
    fn place(&mut self, at: usize, data_size: usize, next: usize, pred: Predecessor) -> usize {
        ChunkHeader { data_size, next }.write(&mut self.mem, at);
        match pred {
            Predecessor::Reserved => self.set_first_chunk(at),
            Predecessor::Chunk(prev) => self.set_next(prev, at),
        }
        at + CHUNK_HEADER_SIZE
    }

    /// The next link is the second word of a chunk header.
    fn set_next(&mut self, chunk: usize, next: usize) {
        write_word(&mut self.mem, chunk + 8, next);
    }

    fn report(&mut self, fault: Fault, site: Site) {
        self.faults.push(FaultRecord {
            op: "dealloc",
            fault,
            site,
        });
    }

    fn chunks(&self) -> Chunks<'_, CAP> {
        let first = self.first_chunk();
        Chunks {
            arena: self,
            at: if first == UNINITIALIZED { CAP } else { first },
        }
    }
}

impl<const CAP: usize> Default for Arena<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

/// What sits immediately before a freshly carved chunk in the chain.
enum Predecessor {
    Reserved,
    Chunk(usize),
}

/// Iterator over `(chunk offset, header)` pairs of the live chain.
struct Chunks<'a, const CAP: usize> {
    arena: &'a Arena<CAP>,
    at: usize,
}

impl<const CAP: usize> Iterator for Chunks<'_, CAP> {
    type Item = (usize, ChunkHeader);

    fn next(&mut self) -> Option<Self::Item> {
        if self.at == CAP {
            return None;
        }
        let at = self.at;
        let header = ChunkHeader::read(&self.arena.mem, at);
        self.at = header.next;
        Some((at, header))
    }
}
