//! Shortest-Job-First Dispatch Tests.
//!
//! Verifies ascending-burst order, the arrival tie-break, and the strict
//! preemption threshold.

use schedsim_core::sched::Policy;

use crate::common::harness::{admit_n, test_state};

fn sjf_state(cores: usize, preemptive: bool) -> schedsim_core::sched::EngineState {
    let mut state = test_state(cores, 65_536, 4096);
    state.set_policy(Policy::Sjf { preemptive });
    state
}

// ══════════════════════════════════════════════════════════
// 1. Ascending burst order
// ══════════════════════════════════════════════════════════

#[test]
fn shortest_job_dispatches_first() {
    let mut state = sjf_state(1, false);
    let long = state.admit(Some("long".into()), Some((40, 40)));
    let short = state.admit(Some("short".into()), Some((5, 5)));
    state.dispatch_sjf(false);
    assert_eq!(state.cores()[0].assigned(), Some(short));
    assert_eq!(state.process(long).core(), None);
}

#[test]
fn two_cores_take_the_two_shortest() {
    let mut state = sjf_state(2, false);
    let a = state.admit(Some("a".into()), Some((30, 30)));
    let b = state.admit(Some("b".into()), Some((10, 10)));
    let c = state.admit(Some("c".into()), Some((20, 20)));
    state.dispatch_sjf(false);
    assert_eq!(state.cores()[0].assigned(), Some(b));
    assert_eq!(state.cores()[1].assigned(), Some(c));
    assert_eq!(state.process(a).core(), None);
}

// ══════════════════════════════════════════════════════════
// 2. Arrival tie-break
// ══════════════════════════════════════════════════════════

#[test]
fn equal_bursts_dispatch_in_arrival_order() {
    let mut state = sjf_state(2, false);
    let pids = admit_n(&mut state, 2, 10);
    state.dispatch_sjf(false);
    assert_eq!(state.cores()[0].assigned(), Some(pids[0]));
    assert_eq!(state.cores()[1].assigned(), Some(pids[1]));
}

#[test]
fn tie_break_holds_across_many_equal_jobs() {
    let mut state = sjf_state(1, false);
    let pids = admit_n(&mut state, 5, 10);
    for expected in pids {
        state.dispatch_sjf(false);
        assert_eq!(state.cores()[0].assigned(), Some(expected));
        for _ in 0..10 {
            let _ = state.execute_tick();
        }
        assert!(state.process(expected).has_finished());
    }
}

// ══════════════════════════════════════════════════════════
// 3. Non-preemptive runs to completion
// ══════════════════════════════════════════════════════════

#[test]
fn non_preemptive_ignores_shorter_arrivals() {
    let mut state = sjf_state(1, false);
    let long = state.admit(Some("long".into()), Some((40, 40)));
    state.dispatch_sjf(false);
    let _ = state.execute_tick();

    let short = state.admit(Some("short".into()), Some((2, 2)));
    state.dispatch_sjf(false);
    assert_eq!(state.cores()[0].assigned(), Some(long));
    assert_eq!(state.process(short).core(), None);
}

// ══════════════════════════════════════════════════════════
// 4. Preemption threshold
// ══════════════════════════════════════════════════════════

#[test]
fn strictly_shorter_job_preempts() {
    let mut state = sjf_state(1, true);
    let long = state.admit(Some("long".into()), Some((40, 40)));
    state.dispatch_sjf(true);
    let _ = state.execute_tick();

    let short = state.admit(Some("short".into()), Some((5, 5)));
    state.dispatch_sjf(true);
    assert_eq!(state.cores()[0].assigned(), Some(short));
    assert_eq!(state.process(long).core(), None);
}

#[test]
fn equal_burst_never_preempts() {
    let mut state = sjf_state(1, true);
    let running = state.admit(Some("running".into()), Some((11, 11)));
    state.dispatch_sjf(true);
    let _ = state.execute_tick();
    assert_eq!(state.process(running).burst(), 10);

    let rival = state.admit(Some("rival".into()), Some((10, 10)));
    state.dispatch_sjf(true);
    assert_eq!(state.cores()[0].assigned(), Some(running));
    assert_eq!(state.process(rival).core(), None);
}

#[test]
fn preempted_job_keeps_its_memory_residency() {
    let mut state = sjf_state(1, true);
    let long = state.admit(Some("long".into()), Some((40, 40)));
    state.dispatch_sjf(true);
    let _ = state.execute_tick();
    let long_offset = state.process(long).memory().unwrap().offset();

    let short = state.admit(Some("short".into()), Some((5, 5)));
    state.dispatch_sjf(true);

    let held = state.process(long).memory().unwrap();
    assert_eq!(held.offset(), long_offset, "preemption must not move the allocation");
    assert_eq!(state.memory_report().allocation_count, 2);
}

#[test]
fn preempted_job_resumes_from_its_cursor() {
    let mut state = sjf_state(1, true);
    let long = state.admit(Some("long".into()), Some((40, 40)));
    state.dispatch_sjf(true);
    for _ in 0..3 {
        let _ = state.execute_tick();
    }
    let short = state.admit(Some("short".into()), Some((5, 5)));
    state.dispatch_sjf(true);
    for _ in 0..5 {
        let _ = state.execute_tick();
    }
    assert!(state.process(short).has_finished());

    state.dispatch_sjf(true);
    assert_eq!(state.cores()[0].assigned(), Some(long));
    assert_eq!(state.process(long).executed(), 3);
    assert_eq!(state.process(long).burst(), 37);
}
