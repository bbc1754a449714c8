//! Process model.
//!
//! A [`Process`] is a simulated unit of work: an identity, an ordered
//! instruction sequence, an execution cursor, creation/finish timestamps, and
//! a memory requirement. A process is in exactly one of three states —
//! waiting, resident-and-assigned-to-a-core, or finished — and holds a memory
//! handle if and only if it is resident.

use chrono::{DateTime, Local};

use crate::common::{CoreId, ProcessId};
use crate::core::ExecContext;
use crate::inst::Instruction;
use crate::mem::MemHandle;

/// A simulated process owning its instruction sequence.
#[derive(Debug)]
pub struct Process {
    id: ProcessId,
    name: String,
    instructions: Vec<Instruction>,
    cursor: usize,
    arrival: DateTime<Local>,
    finish: Option<DateTime<Local>>,
    core: Option<CoreId>,
    required_memory: usize,
    memory: Option<MemHandle>,
}

impl Process {
    /// Creates a new process with the given instruction sequence.
    ///
    /// The arrival timestamp is taken at creation. `id` doubles as the
    /// deterministic arrival order: ids are handed out monotonically by the
    /// scheduler's registry.
    pub fn new(
        id: ProcessId,
        name: impl Into<String>,
        instructions: Vec<Instruction>,
        required_memory: usize,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            instructions,
            cursor: 0,
            arrival: Local::now(),
            finish: None,
            core: None,
            required_memory,
            memory: None,
        }
    }

    /// Returns the process id.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Returns the process name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Executes the next pending instruction against `ctx` and advances the
    /// cursor by exactly one. Does nothing once the process has finished.
    pub fn execute(&mut self, ctx: &mut ExecContext) {
        if let Some(inst) = self.instructions.get(self.cursor) {
            inst.execute(ctx);
            self.cursor += 1;
        }
    }

    /// Returns `true` once every instruction has been executed.
    pub fn has_finished(&self) -> bool {
        self.cursor == self.instructions.len()
    }

    /// Remaining work: instruction count minus the cursor.
    ///
    /// This is the shortest-job-first sort key. It changes on every executed
    /// instruction, so callers recompute it at each consultation instead of
    /// caching it.
    pub fn burst(&self) -> usize {
        self.instructions.len() - self.cursor
    }

    /// Returns the number of instructions executed so far.
    pub fn executed(&self) -> usize {
        self.cursor
    }

    /// Returns the total instruction count.
    pub fn total_instructions(&self) -> usize {
        self.instructions.len()
    }

    /// Returns the arrival timestamp.
    pub fn arrival(&self) -> DateTime<Local> {
        self.arrival
    }

    /// Returns the finish timestamp, set exactly once at completion.
    pub fn finish(&self) -> Option<DateTime<Local>> {
        self.finish
    }

    /// Stamps the finish time. Later calls keep the first stamp.
    pub fn mark_finished(&mut self, at: DateTime<Local>) {
        if self.finish.is_none() {
            self.finish = Some(at);
        }
    }

    /// Returns the core this process is assigned to, if any.
    pub fn core(&self) -> Option<CoreId> {
        self.core
    }

    /// Records the core assignment.
    pub fn assign_core(&mut self, core: CoreId) {
        self.core = Some(core);
    }

    /// Clears the core assignment on completion or preemption.
    pub fn clear_core(&mut self) {
        self.core = None;
    }

    /// Returns the memory requirement in bytes.
    pub fn required_memory(&self) -> usize {
        self.required_memory
    }

    /// Overrides the memory requirement.
    ///
    /// Only meaningful before the process becomes resident; the requirement
    /// is fixed for the lifetime of an allocation.
    pub fn set_required_memory(&mut self, size: usize) {
        debug_assert!(self.memory.is_none(), "{} is already resident", self.id);
        self.required_memory = size;
    }

    /// Returns the resident memory handle, if any.
    pub fn memory(&self) -> Option<&MemHandle> {
        self.memory.as_ref()
    }

    /// Attaches an acquired memory handle (the process becomes resident).
    pub fn attach_memory(&mut self, handle: MemHandle) {
        debug_assert!(self.memory.is_none(), "{} is already resident", self.id);
        self.memory = Some(handle);
    }

    /// Detaches the memory handle for release back to the arena.
    pub fn take_memory(&mut self) -> Option<MemHandle> {
        self.memory.take()
    }
}
