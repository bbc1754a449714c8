//! Mutable scheduler state and the policy dispatch steps.
//!
//! All mutable scheduling structures — the core pool, the append-only process
//! registry, the ready/waiting queues, the arena, and the quantum clock —
//! live together in [`EngineState`]. The running scheduler keeps the state
//! behind one mutex (a fixed acquisition order of exactly one lock), and each
//! dispatch step here is a plain synchronous method, so queue discipline is
//! testable without threads or timers.

use std::collections::{BinaryHeap, VecDeque};
use std::time::{Duration, Instant};

use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::common::{CoreId, ProcessId};
use crate::config::Config;
use crate::core::CpuCore;
use crate::inst::Instruction;
use crate::mem::Arena;
use crate::proc::Process;
use crate::sched::policy::{Policy, SjfEntry};
use crate::stats::{CoreStatus, FinishedProcess, MemoryReport, RunningProcess, StatusReport};

/// The scheduler's mutable state: cores, registry, queues, arena, clock.
#[derive(Debug)]
pub struct EngineState {
    cores: Vec<CpuCore>,
    registry: Vec<Process>,
    ready: VecDeque<ProcessId>,
    ready_sjf: BinaryHeap<SjfEntry>,
    waiting: VecDeque<ProcessId>,
    arena: Arena,
    policy: Policy,
    quantum_start: Option<Instant>,
    quantum_cycle: u32,
    process_memory: usize,
    instruction_range: (usize, usize),
    rng: StdRng,
}

impl EngineState {
    /// Builds the initial state from a validated configuration.
    pub fn new(config: &Config) -> Self {
        let cores = (0..config.scheduler.cpu_count)
            .map(|i| CpuCore::new(CoreId(i)))
            .collect();
        let rng = config
            .generator
            .rng_seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            cores,
            registry: Vec::new(),
            ready: VecDeque::new(),
            ready_sjf: BinaryHeap::new(),
            waiting: VecDeque::new(),
            arena: Arena::new(config.memory.capacity),
            policy: Policy::default(),
            quantum_start: None,
            quantum_cycle: 0,
            process_memory: config.memory.process_memory,
            instruction_range: (
                config.generator.min_instructions,
                config.generator.max_instructions,
            ),
            rng,
        }
    }

    /// Creates a process and enqueues it under the active policy.
    ///
    /// `name` defaults to `process_<id>`; the instruction count is drawn
    /// uniformly from `range`, defaulting to the configured range. Returns
    /// the new id. The registry is append-only: finished processes stay for
    /// reporting.
    pub fn admit(&mut self, name: Option<String>, range: Option<(usize, usize)>) -> ProcessId {
        let id = ProcessId(self.registry.len() as u64 + 1);
        let name = name.unwrap_or_else(|| format!("process_{}", id.val()));
        let (min, max) = range.unwrap_or(self.instruction_range);
        let count = self.rng.random_range(min..=max);
        let message = format!("Hello world from {name}!");
        let instructions = (0..count)
            .map(|_| Instruction::EmitText {
                message: message.clone(),
            })
            .collect();
        self.registry
            .push(Process::new(id, name, instructions, self.process_memory));
        self.enqueue(id);
        debug!(%id, count, "process admitted");
        id
    }

    /// Switches the active policy, migrating queued ids between the FIFO
    /// queue and the burst-ordered structure so no submission is stranded.
    pub fn set_policy(&mut self, policy: Policy) {
        let was_sjf = matches!(self.policy, Policy::Sjf { .. });
        let is_sjf = matches!(policy, Policy::Sjf { .. });
        self.policy = policy;
        if matches!(policy, Policy::RoundRobin { .. }) {
            self.quantum_start = None;
        }
        if was_sjf == is_sjf {
            return;
        }
        if is_sjf {
            while let Some(pid) = self.ready.pop_front() {
                let burst = self.registry[pid.index()].burst();
                self.ready_sjf.push(SjfEntry::new(burst, pid));
            }
        } else {
            let mut ids: Vec<ProcessId> = self.ready_sjf.drain().map(|e| e.pid).collect();
            ids.sort_by_key(ProcessId::val);
            self.ready.extend(ids);
        }
    }

    /// Fills idle cores from the FIFO queue in arrival order.
    ///
    /// Memory is acquired before assignment; when the head of the queue
    /// cannot be placed it stays queued (strict FIFO — nothing overtakes it)
    /// and the step ends until the next release.
    pub fn dispatch_fcfs(&mut self) {
        while let Some(core_idx) = self.idle_core() {
            let Some(&pid) = self.ready.front() else {
                return;
            };
            if !self.ensure_resident(pid) {
                return;
            }
            let _ = self.ready.pop_front();
            self.bind(core_idx, pid);
        }
    }

    /// Fills idle cores from the burst-ordered structure, then runs the
    /// preemption pass when `preemptive` is set.
    pub fn dispatch_sjf(&mut self, preemptive: bool) {
        while let Some(core_idx) = self.idle_core() {
            let Some(entry) = self.ready_sjf.peek().copied() else {
                break;
            };
            if !self.ensure_resident(entry.pid) {
                break;
            }
            let _ = self.ready_sjf.pop();
            self.bind(core_idx, entry.pid);
        }
        if preemptive {
            self.preempt_sjf();
        }
    }

    /// Round-robin admission from the ready queue.
    ///
    /// Candidates are popped and offered memory even while every core is
    /// busy, so an unserviceable candidate moves to the waiting queue instead
    /// of camping at the ready head. A candidate that obtains memory but
    /// finds no idle core releases the fresh handle and returns to the head;
    /// residency therefore never exceeds the core count except transiently
    /// inside this step.
    pub fn admit_ready_rr(&mut self) {
        while let Some(pid) = self.ready.pop_front() {
            if !self.ensure_resident(pid) {
                debug!(%pid, "allocation failed; moved to waiting queue");
                self.waiting.push_back(pid);
                continue;
            }
            match self.idle_core() {
                Some(core_idx) => self.bind(core_idx, pid),
                None => {
                    if let Some(handle) = self.registry[pid.index()].take_memory() {
                        self.arena.deallocate(&handle);
                    }
                    self.ready.push_front(pid);
                    return;
                }
            }
        }
    }

    /// Drains the waiting queue back into residency while both memory and
    /// core slots allow, preserving arrival order: when the head cannot be
    /// placed, nothing behind it is tried.
    pub fn drain_waiting(&mut self) {
        while let Some(&pid) = self.waiting.front() {
            let Some(core_idx) = self.idle_core() else {
                return;
            };
            if !self.ensure_resident(pid) {
                return;
            }
            let _ = self.waiting.pop_front();
            self.bind(core_idx, pid);
        }
    }

    /// Checks the wall-clock quantum and, once exceeded, preempts every core.
    ///
    /// Returns the new quantum cycle number when a boundary fired, so the
    /// caller can render the arena snapshot before refilling the cores. The
    /// clock starts on first consultation and resets at each boundary.
    pub fn expire_quantum(&mut self, quantum: Duration) -> Option<u32> {
        let started = *self.quantum_start.get_or_insert_with(Instant::now);
        if started.elapsed() <= quantum {
            return None;
        }
        Some(self.force_quantum_boundary())
    }

    /// Unconditionally runs a quantum boundary: every resident process is
    /// preempted, its memory released, and the process re-queued at the back
    /// of the ready queue in core order; the quantum clock restarts.
    pub fn force_quantum_boundary(&mut self) -> u32 {
        for core_idx in 0..self.cores.len() {
            let Some(pid) = self.cores[core_idx].assigned() else {
                continue;
            };
            let proc = &mut self.registry[pid.index()];
            proc.clear_core();
            let handle = proc.take_memory();
            if let Some(handle) = handle {
                self.arena.deallocate(&handle);
            }
            self.cores[core_idx].clear();
            self.ready.push_back(pid);
            debug!(%pid, core = core_idx, "quantum preemption");
        }
        self.quantum_start = Some(Instant::now());
        self.quantum_cycle += 1;
        self.quantum_cycle
    }

    /// Advances every busy core's process by one instruction.
    ///
    /// A process that reaches its last instruction is stamped finished, its
    /// memory released, and its core idled. Returns the ids finished in this
    /// tick; the next dispatch step refills the freed cores (ready queue
    /// first, then the waiting queue).
    pub fn execute_tick(&mut self) -> Vec<ProcessId> {
        let mut finished = Vec::new();
        for core_idx in 0..self.cores.len() {
            let Some(pid) = self.cores[core_idx].assigned() else {
                continue;
            };
            let core = &mut self.cores[core_idx];
            let proc = &mut self.registry[pid.index()];
            proc.execute(&mut core.ctx);
            if proc.has_finished() {
                proc.mark_finished(Local::now());
                proc.clear_core();
                let handle = proc.take_memory();
                core.clear();
                if let Some(handle) = handle {
                    self.arena.deallocate(&handle);
                }
                finished.push(pid);
            }
        }
        finished
    }

    /// Computes the aggregate status report from the current core states and
    /// the process registry. Nothing is cached.
    pub fn status(&self) -> StatusReport {
        let total = self.cores.len();
        let busy = self.cores.iter().filter(|c| !c.is_ready()).count();
        let per_core = self
            .cores
            .iter()
            .map(|core| CoreStatus {
                core_id: core.id().val(),
                process: core.assigned().map(|pid| {
                    let proc = &self.registry[pid.index()];
                    RunningProcess {
                        name: proc.name().to_string(),
                        arrival: crate::stats::format_stamp(proc.arrival()),
                        executed: proc.executed(),
                        total: proc.total_instructions(),
                    }
                }),
            })
            .collect();
        let finished = self
            .registry
            .iter()
            .filter_map(|proc| {
                proc.finish().map(|at| FinishedProcess {
                    name: proc.name().to_string(),
                    finished: crate::stats::format_stamp(at),
                    executed: proc.executed(),
                    total: proc.total_instructions(),
                })
            })
            .collect();
        StatusReport {
            utilization_percent: 100.0 * busy as f64 / total as f64,
            cores_used: busy,
            cores_available: total - busy,
            per_core,
            finished,
        }
    }

    /// Computes the current arena occupancy report.
    pub fn memory_report(&self) -> MemoryReport {
        MemoryReport {
            allocation_count: self.arena.allocation_count(),
            used: self.arena.used(),
            capacity: self.arena.capacity(),
            fragmented_space: self.arena.fragmented_space(),
        }
    }

    /// Returns the memory arena.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns the core pool.
    pub fn cores(&self) -> &[CpuCore] {
        &self.cores
    }

    /// Returns the process with the given id.
    ///
    /// # Panics
    ///
    /// Panics when `pid` was not issued by this state's registry.
    pub fn process(&self, pid: ProcessId) -> &Process {
        &self.registry[pid.index()]
    }

    /// Returns the number of processes ever admitted.
    pub fn process_count(&self) -> usize {
        self.registry.len()
    }

    /// Overrides the memory requirement of a not-yet-resident process.
    pub fn set_required_memory(&mut self, pid: ProcessId, size: usize) {
        self.registry[pid.index()].set_required_memory(size);
    }

    /// Ids currently in the FIFO ready queue, front first.
    pub fn ready_ids(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.ready.iter().copied()
    }

    /// Ids currently in the waiting queue, front first.
    pub fn waiting_ids(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.waiting.iter().copied()
    }

    /// Routes a new id into the ready structure of the active policy.
    fn enqueue(&mut self, pid: ProcessId) {
        match self.policy {
            Policy::Sjf { .. } => {
                let burst = self.registry[pid.index()].burst();
                self.ready_sjf.push(SjfEntry::new(burst, pid));
            }
            _ => self.ready.push_back(pid),
        }
    }

    /// Index of the first idle core, if any.
    fn idle_core(&self) -> Option<usize> {
        self.cores.iter().position(CpuCore::is_ready)
    }

    /// Makes `pid` resident, acquiring memory first-fit unless it already
    /// holds a handle (a preempted shortest-job keeps its residency).
    /// Returns `false` when no free run fits.
    fn ensure_resident(&mut self, pid: ProcessId) -> bool {
        let need = {
            let proc = &self.registry[pid.index()];
            if proc.memory().is_some() {
                return true;
            }
            proc.required_memory()
        };
        match self.arena.allocate(need, pid) {
            Some(handle) => {
                self.registry[pid.index()].attach_memory(handle);
                true
            }
            None => false,
        }
    }

    /// Assigns an already-resident process to an idle core.
    fn bind(&mut self, core_idx: usize, pid: ProcessId) {
        let core_id = self.cores[core_idx].id();
        self.cores[core_idx].assign(pid);
        self.registry[pid.index()].assign_core(core_id);
        debug!(%pid, core = core_idx, "process dispatched");
    }

    /// Preemption pass: a strictly shorter waiting job displaces a running
    /// one. Equal bursts never preempt, so equal-burst churn cannot livelock
    /// a core. The displaced process keeps its memory handle and re-enters
    /// the ready structure with its current burst.
    fn preempt_sjf(&mut self) {
        for core_idx in 0..self.cores.len() {
            let Some(running) = self.cores[core_idx].assigned() else {
                continue;
            };
            let Some(top) = self.ready_sjf.peek().copied() else {
                return;
            };
            let running_burst = self.registry[running.index()].burst();
            if top.burst >= running_burst {
                continue;
            }
            if !self.ensure_resident(top.pid) {
                return;
            }
            let _ = self.ready_sjf.pop();
            self.cores[core_idx].clear();
            self.registry[running.index()].clear_core();
            self.ready_sjf.push(SjfEntry::new(running_burst, running));
            self.bind(core_idx, top.pid);
            debug!(preempted = %running, dispatched = %top.pid, core = core_idx, "sjf preemption");
        }
    }
}
