//! First-fit arena allocator.
//!
//! The arena is a fixed-capacity byte range with a per-byte owner map:
//! a byte is occupied exactly when an owner is recorded for it. Placement
//! scans offsets left to right and takes the first free run large enough
//! (first-fit) — O(capacity) and deliberately prone to external
//! fragmentation, which the scheduler reacts to with its waiting queue.
//!
//! Invariants: `capacity == used + fragmented_space()` at all times, and no
//! two live allocations overlap.

use crate::common::ProcessId;

/// Opaque handle to a live allocation.
///
/// Carries the placement offset, the run length, and the owning process id.
/// [`Arena::deallocate`] validates the owner tag at the handle's offset, so a
/// stale or foreign handle cannot release someone else's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemHandle {
    offset: usize,
    size: usize,
    owner: ProcessId,
}

impl MemHandle {
    /// Returns the starting byte offset of the allocation.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the allocation length in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the owning process id.
    pub fn owner(&self) -> ProcessId {
        self.owner
    }
}

/// One maximal contiguous span of the arena, occupied or free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Inclusive start offset of the span.
    pub start: usize,
    /// Exclusive end offset of the span.
    pub end: usize,
    /// Owner of the span, or `None` for a free span.
    pub owner: Option<ProcessId>,
}

/// Fixed-capacity first-fit memory arena.
#[derive(Debug)]
pub struct Arena {
    capacity: usize,
    owners: Vec<Option<ProcessId>>,
    used: usize,
    allocations: usize,
}

impl Arena {
    /// Creates an empty arena of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            owners: vec![None; capacity],
            used: 0,
            allocations: 0,
        }
    }

    /// Returns the total arena capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of occupied bytes.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Returns the number of live allocations.
    pub fn allocation_count(&self) -> usize {
        self.allocations
    }

    /// Free capacity, counted as external fragmentation: `capacity - used`.
    pub fn fragmented_space(&self) -> usize {
        self.capacity - self.used
    }

    /// Returns `true` when the byte at `offset` belongs to a live allocation.
    pub fn occupied(&self, offset: usize) -> bool {
        self.owners.get(offset).is_some_and(Option::is_some)
    }

    /// Places `size` bytes for `owner` at the lowest-addressed free run.
    ///
    /// Returns `None` exactly when no free run of `size` bytes exists; this
    /// is a normal outcome, not an error, and the caller defers the process.
    pub fn allocate(&mut self, size: usize, owner: ProcessId) -> Option<MemHandle> {
        if size == 0 || size > self.capacity {
            return None;
        }
        let mut offset = 0;
        while offset + size <= self.capacity {
            match self.first_occupied_in(offset, size) {
                // Skip past the blocking allocation's byte rather than
                // rescanning from offset + 1.
                Some(hit) => offset = hit + 1,
                None => {
                    for slot in &mut self.owners[offset..offset + size] {
                        *slot = Some(owner);
                    }
                    self.used += size;
                    self.allocations += 1;
                    return Some(MemHandle { offset, size, owner });
                }
            }
        }
        None
    }

    /// Releases the run identified by `handle`.
    ///
    /// Silent no-op when the handle's starting offset is not currently
    /// occupied or its owner tag does not match the arena's record, so a
    /// redundant or foreign release changes no state.
    pub fn deallocate(&mut self, handle: &MemHandle) {
        if self.owners.get(handle.offset).copied().flatten() != Some(handle.owner) {
            return;
        }
        for slot in &mut self.owners[handle.offset..handle.offset + handle.size] {
            *slot = None;
        }
        self.used -= handle.size;
        self.allocations -= 1;
    }

    /// Returns the maximal contiguous spans of the arena in ascending
    /// address order.
    pub fn runs(&self) -> Vec<Run> {
        let mut runs: Vec<Run> = Vec::new();
        for (offset, owner) in self.owners.iter().enumerate() {
            match runs.last_mut() {
                Some(run) if run.owner == *owner => run.end = offset + 1,
                _ => runs.push(Run {
                    start: offset,
                    end: offset + 1,
                    owner: *owner,
                }),
            }
        }
        runs
    }

    /// Returns the first occupied offset within `[offset, offset + size)`,
    /// or `None` when the whole window is free.
    fn first_occupied_in(&self, offset: usize, size: usize) -> Option<usize> {
        (offset..offset + size).find(|&i| self.owners[i].is_some())
    }
}
