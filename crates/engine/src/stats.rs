//! Status reporting types and rendering.
//!
//! Reports are computed on demand from the current core states and the
//! process registry — nothing is cached. The [`StatusReport`] display form
//! reproduces the classic console layout: utilization header, running
//! processes per core, then finished processes.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Formats a timestamp the way the status report prints it, e.g.
/// `(08/06/26 10:15:00 AM)`.
pub(crate) fn format_stamp(at: DateTime<Local>) -> String {
    format!("({})", at.format("%D %r"))
}

/// A process currently running on a core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunningProcess {
    /// Process name.
    pub name: String,
    /// Formatted arrival timestamp.
    pub arrival: String,
    /// Instructions executed so far.
    pub executed: usize,
    /// Total instruction count.
    pub total: usize,
}

/// Status of one core: its index and the process it runs, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoreStatus {
    /// Stable core index.
    pub core_id: usize,
    /// The running process, or `None` when the core is idle.
    pub process: Option<RunningProcess>,
}

/// A process that has run to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishedProcess {
    /// Process name.
    pub name: String,
    /// Formatted finish timestamp.
    pub finished: String,
    /// Instructions executed (equals the total once finished).
    pub executed: usize,
    /// Total instruction count.
    pub total: usize,
}

/// Aggregate scheduler status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// CPU utilization: `100 × busy cores / total cores`.
    pub utilization_percent: f64,
    /// Number of busy cores.
    pub cores_used: usize,
    /// Number of idle cores.
    pub cores_available: usize,
    /// Per-core state, in core order.
    pub per_core: Vec<CoreStatus>,
    /// Finished processes, in admission order.
    pub finished: Vec<FinishedProcess>,
}

/// Arena occupancy summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryReport {
    /// Number of live allocations.
    pub allocation_count: usize,
    /// Occupied bytes.
    pub used: usize,
    /// Total arena capacity in bytes.
    pub capacity: usize,
    /// Free capacity, counted as external fragmentation.
    pub fragmented_space: usize,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CPU Utilization: {}%", self.utilization_percent)?;
        writeln!(f, "Cores used: {}", self.cores_used)?;
        writeln!(f, "Cores available: {}", self.cores_available)?;
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(38))?;
        writeln!(f, "Running processes:")?;
        for core in &self.per_core {
            match &core.process {
                Some(proc) => writeln!(
                    f,
                    "{}\t{}\tCore: {}\t{} / {}",
                    proc.name, proc.arrival, core.core_id, proc.executed, proc.total
                )?,
                None => writeln!(f, "Idle\tCore: {}", core.core_id)?,
            }
        }
        writeln!(f)?;
        writeln!(f, "Finished processes:")?;
        for proc in &self.finished {
            writeln!(
                f,
                "{}\t{}\tFinished\t{} / {}",
                proc.name, proc.finished, proc.executed, proc.total
            )?;
        }
        write!(f, "{}", "-".repeat(38))
    }
}

impl fmt::Display for MemoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processes in memory: {}", self.allocation_count)?;
        writeln!(f, "Used: {} / {} bytes", self.used, self.capacity)?;
        write!(f, "External fragmentation: {} bytes", self.fragmented_space)
    }
}
