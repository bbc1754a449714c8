//! Process and core identifier types.
//!
//! Strong types prevent accidental mixing of process ids, core indices, and
//! plain integers at the scheduler's seams. Process ids are monotonically
//! increasing from 1 and double as the deterministic arrival order.

use std::fmt;

use serde::Serialize;

/// Identity of a simulated process.
///
/// Ids are assigned monotonically starting at 1 and are never reused. The
/// display form is the memory-snapshot spelling `P<n>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProcessId(pub u64);

/// Stable index of a CPU core in the scheduler's core pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CoreId(pub usize);

impl ProcessId {
    /// Returns the raw id value.
    #[inline]
    pub fn val(&self) -> u64 {
        self.0
    }

    /// Returns the zero-based registry index for this id.
    ///
    /// Ids start at 1; the process registry is a dense, append-only list, so
    /// the registry slot is always `id - 1`.
    #[inline]
    pub fn index(&self) -> usize {
        (self.0 - 1) as usize
    }
}

impl CoreId {
    /// Returns the raw core index.
    #[inline]
    pub fn val(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
