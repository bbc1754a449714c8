//! Process scheduler simulation library.
//!
//! This crate implements a multi-core process scheduler simulator with the following:
//! 1. **Processes:** Synthetic processes carrying an ordered instruction sequence,
//!    an execution cursor, arrival/finish timestamps, and a memory requirement.
//! 2. **Instructions:** A closed instruction vocabulary executed against a per-core
//!    execution context that records output.
//! 3. **Memory:** A flat, fixed-capacity arena allocated first-fit, with external
//!    fragmentation accounting and a human-readable snapshot renderer.
//! 4. **Scheduling:** FCFS, shortest-job-first (preemptive and non-preemptive), and
//!    round-robin with a wall-clock quantum, each running as a cancellable dispatch loop.
//! 5. **Reporting:** On-demand CPU utilization, per-core, and finished-process reports.

/// Common types (process/core identifiers, engine errors).
pub mod common;
/// Simulator configuration (defaults, hierarchical config structures).
pub mod config;
/// CPU core execution slot and its output-recording context.
pub mod core;
/// Instruction vocabulary and execution semantics.
pub mod inst;
/// Arena memory allocator (first-fit placement, snapshots).
pub mod mem;
/// Process model (instruction sequence, cursor, timestamps, residency).
pub mod proc;
/// Scheduler: policies, dispatch loops, and the batch process generator.
pub mod sched;
/// Status reporting types and rendering.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Engine error type.
pub use crate::common::EngineError;
/// Scheduling policy selector passed to [`Scheduler::start`].
pub use crate::sched::Policy;
/// The scheduler: owns the core pool, process registry, queues, and arena.
pub use crate::sched::Scheduler;
/// Aggregate status report returned by [`Scheduler::status`].
pub use crate::stats::StatusReport;
