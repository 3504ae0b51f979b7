//! # chainalloc-core
//!
//! A heap allocator emulated on top of a single fixed-size byte arena.
//!
//! The arena holds a reserved header followed by a singly linked,
//! address-ordered chain of chunks. Every link is an integer byte offset
//! into the arena, so no raw pointers or `unsafe` are involved. Allocation
//! is first-fit over the gaps between chain-adjacent chunks; freeing a
//! chunk simply unlinks it, which makes adjacent free space coalesce
//! implicitly without any free-list bookkeeping. A constant-time leak
//! query reports whether any chunk is still live.
//!
//! Deallocation faults (foreign offsets, double frees, interior offsets)
//! never abort or propagate; they are pushed onto a drainable in-arena
//! record channel and the call returns as a no-op.

#![forbid(unsafe_code)]

pub mod arena;
pub mod chunk;
pub mod fault;
pub mod global;

pub use arena::Arena;
pub use fault::{ConfigError, Fault, FaultRecord, Site};
