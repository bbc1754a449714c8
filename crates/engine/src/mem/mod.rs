//! Arena memory allocator.
//!
//! This module implements the flat memory arena backing process residency:
//! 1. **Arena:** Fixed-capacity, byte-granular first-fit placement with
//!    occupancy and owner tracking.
//! 2. **Handles:** Opaque handles carrying `(offset, size, owner)`; release
//!    validates the owner tag instead of trusting pointer arithmetic.
//! 3. **Snapshots:** A renderer that walks the arena from the highest address
//!    to zero and the `memory_stamp_<NN>.txt` writer.

/// First-fit arena implementation.
pub mod arena;

/// Snapshot rendering and persistence.
pub mod snapshot;

pub use arena::{Arena, MemHandle, Run};
