//! CPU core execution slot.
//!
//! A [`CpuCore`] is a single execution slot: it is **Idle** (no process) or
//! **Busy** (exactly one process assigned). Cores never self-transition; the
//! scheduler drives every transition so each core has a single writer.
//! Idle→Busy happens only through dispatch, after memory acquisition has
//! already succeeded; Busy→Idle happens on completion or preemption.
//!
//! Ownership of processes stays with the scheduler's registry — a core holds
//! only the id of its assigned process.

use std::collections::VecDeque;

use chrono::Local;

use crate::common::{CoreId, ProcessId};

/// Maximum output lines retained per core; older lines are dropped.
const OUTPUT_BACKLOG: usize = 1024;

/// Per-core execution context that records instruction output.
#[derive(Debug)]
pub struct ExecContext {
    core: CoreId,
    output: VecDeque<String>,
}

impl ExecContext {
    /// Creates an empty context for the given core.
    pub fn new(core: CoreId) -> Self {
        Self {
            core,
            output: VecDeque::new(),
        }
    }

    /// Records one line of instruction output, stamped with the wall-clock
    /// time and the core index.
    pub fn record(&mut self, message: &str) {
        if self.output.len() == OUTPUT_BACKLOG {
            let _ = self.output.pop_front();
        }
        let stamp = Local::now().format("%D %r");
        self.output.push_back(format!("({stamp}) Core:{} \"{message}\"", self.core));
    }

    /// Returns the retained output lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.output.iter().map(String::as_str)
    }
}

/// A single CPU execution slot.
#[derive(Debug)]
pub struct CpuCore {
    id: CoreId,
    assigned: Option<ProcessId>,
    /// Output-recording context handed to instructions executed on this core.
    pub ctx: ExecContext,
}

impl CpuCore {
    /// Creates an idle core with the given stable index.
    pub fn new(id: CoreId) -> Self {
        Self {
            id,
            assigned: None,
            ctx: ExecContext::new(id),
        }
    }

    /// Returns the core's stable index.
    pub fn id(&self) -> CoreId {
        self.id
    }

    /// Returns `true` when no process is assigned.
    pub fn is_ready(&self) -> bool {
        self.assigned.is_none()
    }

    /// Returns the id of the assigned process, if any.
    pub fn assigned(&self) -> Option<ProcessId> {
        self.assigned
    }

    /// Assigns a process to this core (Idle → Busy).
    ///
    /// Only the scheduler calls this, and only after the process has acquired
    /// its memory residency.
    pub fn assign(&mut self, pid: ProcessId) {
        debug_assert!(self.assigned.is_none(), "core {} already busy", self.id);
        self.assigned = Some(pid);
    }

    /// Releases the core (Busy → Idle) on completion or preemption.
    pub fn clear(&mut self) {
        self.assigned = None;
    }
}
