//! On-buffer layout of the reserved header and chunk headers.
//!
//! All bookkeeping lives inside the arena's byte buffer itself, encoded as
//! little-endian `u64` words. Offset `0` doubles as the "never initialized"
//! sentinel because the buffer starts zero-filled; the arena capacity is the
//! end-of-arena sentinel.

/// Size of the reserved header at offset 0 (one word: the first-chunk link).
pub const RESERVED_SIZE: usize = 8;

/// Size of a chunk header (two words: data size and next link).
pub const CHUNK_HEADER_SIZE: usize = 16;

/// Alignment of every chunk header and data region.
pub const ALIGN: usize = 8;

/// Smallest capacity that can hold the reserved header plus one minimal chunk.
pub const MIN_CAPACITY: usize = RESERVED_SIZE + CHUNK_HEADER_SIZE + ALIGN;

/// Link value meaning the chain has never been started.
pub const UNINITIALIZED: usize = 0;

/// Rounds `size` up to the next multiple of [`ALIGN`].
///
/// Returns `None` when the round-up would overflow `usize`.
#[must_use]
pub fn align_up(size: usize) -> Option<usize> {
    Some(size.checked_add(ALIGN - 1)? & !(ALIGN - 1))
}

pub(crate) fn read_word(mem: &[u8], at: usize) -> usize {
    let mut word = [0u8; 8];
    word.copy_from_slice(&mem[at..at + 8]);
    u64::from_le_bytes(word) as usize
}

pub(crate) fn write_word(mem: &mut [u8], at: usize, value: usize) {
    mem[at..at + 8].copy_from_slice(&(value as u64).to_le_bytes());
}

/// Decoded view of one chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChunkHeader {
    /// Data size in bytes, always a multiple of [`ALIGN`].
    pub data_size: usize,
    /// Offset of the next chunk, or the end-of-arena sentinel.
    pub next: usize,
}

impl ChunkHeader {
    pub(crate) fn read(mem: &[u8], at: usize) -> Self {
        Self {
            data_size: read_word(mem, at),
            next: read_word(mem, at + 8),
        }
    }

    pub(crate) fn write(self, mem: &mut [u8], at: usize) {
        write_word(mem, at, self.data_size);
        write_word(mem, at + 8, self.next);
    }

    /// Offset one past this chunk's data region.
    pub(crate) fn end(self, at: usize) -> usize {
        at + CHUNK_HEADER_SIZE + self.data_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_multiples_of_eight() {
        assert_eq!(align_up(0), Some(0));
        assert_eq!(align_up(1), Some(8));
        assert_eq!(align_up(8), Some(8));
        assert_eq!(align_up(9), Some(16));
        assert_eq!(align_up(511), Some(512));
    }

    #[test]
    fn align_up_rejects_overflow() {
        assert_eq!(align_up(usize::MAX), None);
        assert_eq!(align_up(usize::MAX - 6), None);
        assert_eq!(align_up(usize::MAX - 7), Some(usize::MAX - 7));
    }

    #[test]
    fn header_roundtrips_through_buffer() {
        let mut mem = [0u8; 64];
        let header = ChunkHeader {
            data_size: 40,
            next: 64,
        };
        header.write(&mut mem, 8);
        assert_eq!(ChunkHeader::read(&mem, 8), header);
        assert_eq!(header.end(8), 64);
    }
}
