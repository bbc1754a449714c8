//! Scheduling policy selection and the shortest-job-first ordering.

use std::cmp::Ordering;
use std::time::Duration;

use crate::common::ProcessId;

/// Scheduling policy for the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// First-come-first-served: a single FIFO ready queue; processes run to
    /// completion in submission order.
    #[default]
    Fcfs,
    /// Shortest-job-first: the ready structure is ordered by ascending
    /// remaining burst, ties broken by earlier arrival.
    Sjf {
        /// When `true`, a strictly shorter waiting job preempts a running one.
        preemptive: bool,
    },
    /// Round-robin: FIFO queue plus a wall-clock quantum; every quantum
    /// boundary preempts all cores and releases their memory.
    RoundRobin {
        /// Maximum wall-clock time a process may hold a core.
        quantum: Duration,
    },
}

/// Entry in the shortest-job-first ready structure.
///
/// The burst is captured at enqueue time; a queued process executes nothing
/// while it waits, so the captured value stays current until redispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SjfEntry {
    /// Remaining instruction count at enqueue time.
    pub burst: usize,
    /// Arrival order (monotonic process id).
    pub arrival: u64,
    /// The queued process.
    pub pid: ProcessId,
}

impl SjfEntry {
    /// Creates an entry for `pid` with its current burst.
    pub fn new(burst: usize, pid: ProcessId) -> Self {
        Self {
            burst,
            arrival: pid.val(),
            pid,
        }
    }
}

// Explicit comparator: the primary key is ascending burst, the tie-break is
// ascending arrival. `BinaryHeap` is a max-heap, so both keys compare
// reversed — the heap's maximum is the shortest, earliest-arrived job.
impl Ord for SjfEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .burst
            .cmp(&self.burst)
            .then_with(|| other.arrival.cmp(&self.arrival))
    }
}

impl PartialOrd for SjfEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
