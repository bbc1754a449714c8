//! Scheduler: policies, dispatch loops, and the batch process generator.
//!
//! This module owns the orchestration layer of the simulator:
//! 1. **State:** All mutable scheduling structures behind one mutex
//!    ([`EngineState`]), with each dispatch step a synchronous method.
//! 2. **Loops:** One cancellable dispatch loop per started policy and an
//!    independent batch-generator loop, both `std::thread` workers gated on
//!    atomic run flags and woken by a condition variable instead of spinning.
//! 3. **Lifecycle:** Idempotent start/stop; teardown stops and joins both
//!    loops so no worker thread ever outlives the [`Scheduler`].

/// Policy selection and shortest-job-first ordering.
pub mod policy;

/// Mutable scheduler state and dispatch steps.
pub mod state;

pub use policy::{Policy, SjfEntry};
pub use state::EngineState;

use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::common::{EngineError, ProcessId};
use crate::config::Config;
use crate::mem::snapshot;
use crate::stats::{MemoryReport, StatusReport};

/// State shared between the scheduler handle and its worker loops.
struct Shared {
    state: Mutex<EngineState>,
    /// Wakes the dispatch loop on submission or stop.
    wake: Condvar,
    dispatch_running: AtomicBool,
    generator_running: AtomicBool,
    /// Parking lot for the generator's inter-batch sleep, so stop requests
    /// interrupt the sleep instead of waiting it out.
    gen_park: Mutex<()>,
    gen_wake: Condvar,
}

impl Shared {
    /// Locks the engine state, recovering the guard if a worker panicked
    /// while holding it.
    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The scheduler: core pool, process registry, ready/waiting structures,
/// memory arena, and the dispatch/generator loops.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use schedsim_core::{Config, Policy, Scheduler};
///
/// let mut sched = Scheduler::new(Config::default()).unwrap();
/// sched.submit("alpha");
/// sched.start(Policy::RoundRobin { quantum: Duration::from_secs(2) });
/// std::thread::sleep(Duration::from_secs(5));
/// println!("{}", sched.status());
/// sched.stop();
/// ```
pub struct Scheduler {
    shared: Arc<Shared>,
    config: Config,
    dispatch: Option<JoinHandle<()>>,
    generator: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("running", &self.is_running())
            .field("generating", &self.is_generating())
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Constructs the scheduler from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when the configuration fails
    /// validation.
    pub fn new(config: Config) -> Result<Self, EngineError> {
        config.validate()?;
        let state = EngineState::new(&config);
        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                wake: Condvar::new(),
                dispatch_running: AtomicBool::new(false),
                generator_running: AtomicBool::new(false),
                gen_park: Mutex::new(()),
                gen_wake: Condvar::new(),
            }),
            config,
            dispatch: None,
            generator: None,
        })
    }

    /// Submits a process with the configured instruction-count range.
    ///
    /// Returns the new process id and wakes the dispatch loop.
    pub fn submit(&self, name: &str) -> ProcessId {
        let pid = self.shared.state().admit(Some(name.to_string()), None);
        self.shared.wake.notify_all();
        pid
    }

    /// Submits a process whose instruction count is drawn uniformly from
    /// `instructions`.
    pub fn submit_sized(&self, name: &str, instructions: RangeInclusive<usize>) -> ProcessId {
        let range = (*instructions.start(), *instructions.end());
        let pid = self
            .shared
            .state()
            .admit(Some(name.to_string()), Some(range));
        self.shared.wake.notify_all();
        pid
    }

    /// Starts the dispatch loop under `policy`.
    ///
    /// Silent no-op while a loop is already active, whatever its policy: the
    /// guard is the single running flag. Queued submissions migrate to the
    /// ready structure the policy uses.
    pub fn start(&mut self, policy: Policy) {
        if self.shared.dispatch_running.swap(true, Ordering::AcqRel) {
            debug!("dispatch loop already active; start ignored");
            return;
        }
        self.shared.state().set_policy(policy);
        let shared = Arc::clone(&self.shared);
        let tick = self.config.scheduler.tick_interval();
        let snapshot_dir = self.config.memory.snapshot_dir.clone();
        self.dispatch = Some(thread::spawn(move || {
            dispatch_loop(&shared, policy, tick, &snapshot_dir);
        }));
        info!(?policy, "scheduler started");
    }

    /// Stops the dispatch loop and joins it.
    ///
    /// The stop is a cooperative signal observed at the loop's next polling
    /// point; this call returns only after the loop has exited. No-op when
    /// no loop is active.
    pub fn stop(&mut self) {
        self.shared.dispatch_running.store(false, Ordering::Release);
        self.shared.wake.notify_all();
        if let Some(handle) = self.dispatch.take() {
            let _ = handle.join();
            info!("scheduler stopped");
        }
    }

    /// Starts the batch process generator.
    ///
    /// Silent no-op while the generator is active. The generator is
    /// orthogonal to the dispatch loop: it submits processes through the
    /// normal admission path whether or not a policy is running.
    pub fn start_generator(&mut self) {
        if self.shared.generator_running.swap(true, Ordering::AcqRel) {
            debug!("generator already active; start ignored");
            return;
        }
        let shared = Arc::clone(&self.shared);
        let interval = self.config.generator.batch_interval();
        self.generator = Some(thread::spawn(move || {
            generator_loop(&shared, interval);
        }));
        info!(interval_ms = self.config.generator.batch_interval_ms, "batch generator started");
    }

    /// Stops the batch generator and joins it. No-op when it is not active.
    pub fn stop_generator(&mut self) {
        self.shared.generator_running.store(false, Ordering::Release);
        self.shared.gen_wake.notify_all();
        if let Some(handle) = self.generator.take() {
            let _ = handle.join();
            info!("batch generator stopped");
        }
    }

    /// Returns `true` while a dispatch loop is active.
    pub fn is_running(&self) -> bool {
        self.shared.dispatch_running.load(Ordering::Acquire)
    }

    /// Returns `true` while the batch generator is active.
    pub fn is_generating(&self) -> bool {
        self.shared.generator_running.load(Ordering::Acquire)
    }

    /// Returns the number of processes ever admitted (submitted or
    /// generated); the registry never shrinks.
    pub fn process_count(&self) -> usize {
        self.shared.state().process_count()
    }

    /// Computes the aggregate status report on demand.
    pub fn status(&self) -> StatusReport {
        self.shared.state().status()
    }

    /// Computes the current arena occupancy report on demand.
    pub fn memory_report(&self) -> MemoryReport {
        self.shared.state().memory_report()
    }

    /// Renders the arena snapshot text for the current moment.
    pub fn render_memory(&self) -> String {
        snapshot::render(self.shared.state().arena(), Local::now())
    }
}

impl Drop for Scheduler {
    /// Stops and joins both loops; a worker thread must never outlive the
    /// scheduler that owns its state.
    fn drop(&mut self) {
        self.stop();
        self.stop_generator();
    }
}

/// Dispatch loop body: one pass per tick (or earlier on submission), under
/// the policy fixed at start time.
fn dispatch_loop(shared: &Shared, policy: Policy, tick: Duration, snapshot_dir: &Path) {
    debug!(?policy, "dispatch loop running");
    while shared.dispatch_running.load(Ordering::Acquire) {
        let mut boundary = None;
        {
            let mut state = shared.state();
            match policy {
                Policy::Fcfs => state.dispatch_fcfs(),
                Policy::Sjf { preemptive } => state.dispatch_sjf(preemptive),
                Policy::RoundRobin { quantum } => {
                    if let Some(cycle) = state.expire_quantum(quantum) {
                        // Render between release and refill so the stamp
                        // shows the arena exactly as the boundary left it.
                        boundary = Some((cycle, snapshot::render(state.arena(), Local::now())));
                    }
                    state.admit_ready_rr();
                    state.drain_waiting();
                }
            }
            for pid in state.execute_tick() {
                debug!(%pid, "process finished");
            }
        }
        // File I/O happens outside the state lock.
        if let Some((cycle, contents)) = boundary {
            match snapshot::write_stamp(snapshot_dir, cycle, &contents) {
                Ok(path) => debug!(cycle, path = %path.display(), "memory snapshot written"),
                Err(err) => warn!(cycle, error = %err, "memory snapshot write failed; continuing"),
            }
        }
        let guard = shared.state();
        let _ = shared.wake.wait_timeout(guard, tick);
    }
    debug!("dispatch loop exited");
}

/// Generator loop body: admits one batch process per interval through the
/// normal submission path.
fn generator_loop(shared: &Shared, interval: Duration) {
    debug!("batch generator running");
    while shared.generator_running.load(Ordering::Acquire) {
        let pid = shared.state().admit(None, None);
        debug!(%pid, "generated batch process");
        shared.wake.notify_all();
        let guard = shared
            .gen_park
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let _ = shared.gen_wake.wait_timeout(guard, interval);
    }
    debug!("batch generator exited");
}
