//! Status Reporting Unit Tests.
//!
//! Verifies utilization arithmetic and the classic console rendering.

use schedsim_core::sched::Policy;
use schedsim_core::stats::{StatusReport, MemoryReport};

use crate::common::harness::{admit_n, test_state};

// ══════════════════════════════════════════════════════════
// 1. Utilization
// ══════════════════════════════════════════════════════════

#[test]
fn utilization_counts_busy_cores() {
    let mut state = test_state(4, 65_536, 4096);
    let _ = admit_n(&mut state, 2, 10);
    state.dispatch_fcfs();

    let report = state.status();
    assert_eq!(report.cores_used, 2);
    assert_eq!(report.cores_available, 2);
    assert!((report.utilization_percent - 50.0).abs() < f64::EPSILON);
}

#[test]
fn idle_scheduler_reports_zero_utilization() {
    let state = test_state(4, 16_384, 4096);
    let report = state.status();
    assert_eq!(report.cores_used, 0);
    assert!((report.utilization_percent - 0.0).abs() < f64::EPSILON);
    assert!(report.per_core.iter().all(|core| core.process.is_none()));
}

#[test]
fn report_is_computed_fresh_each_call() {
    let mut state = test_state(2, 16_384, 4096);
    let pids = admit_n(&mut state, 1, 5);
    state.dispatch_fcfs();
    assert_eq!(state.status().cores_used, 1);

    for _ in 0..5 {
        let _ = state.execute_tick();
    }
    assert!(state.process(pids[0]).has_finished());
    let report = state.status();
    assert_eq!(report.cores_used, 0);
    assert_eq!(report.finished.len(), 1);
}

// ══════════════════════════════════════════════════════════
// 2. Per-core detail
// ══════════════════════════════════════════════════════════

#[test]
fn running_entries_track_instruction_progress() {
    let mut state = test_state(1, 16_384, 4096);
    let _ = admit_n(&mut state, 1, 10);
    state.set_policy(Policy::Fcfs);
    state.dispatch_fcfs();
    for _ in 0..3 {
        let _ = state.execute_tick();
    }

    let report = state.status();
    let proc = report.per_core[0].process.as_ref().unwrap();
    assert_eq!(proc.name, "p1");
    assert_eq!(proc.executed, 3);
    assert_eq!(proc.total, 10);
}

// ══════════════════════════════════════════════════════════
// 3. Rendering
// ══════════════════════════════════════════════════════════

#[test]
fn text_report_lists_idle_cores_and_finished_processes() {
    let mut state = test_state(2, 16_384, 4096);
    let pids = admit_n(&mut state, 1, 5);
    state.dispatch_fcfs();
    for _ in 0..5 {
        let _ = state.execute_tick();
    }
    assert!(state.process(pids[0]).has_finished());

    let text = state.status().to_string();
    assert!(text.contains("CPU Utilization: 0%"));
    assert!(text.contains("Cores used: 0"));
    assert!(text.contains("Cores available: 2"));
    assert!(text.contains("Idle\tCore: 0"));
    assert!(text.contains("Idle\tCore: 1"));
    assert!(text.contains("Finished processes:"));
    assert!(text.contains("p1\t"));
    assert!(text.contains("\tFinished\t5 / 5"));
}

#[test]
fn reports_serialize_to_json() {
    let mut state = test_state(2, 16_384, 4096);
    let _ = admit_n(&mut state, 1, 5);
    state.dispatch_fcfs();

    let report: StatusReport = state.status();
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"utilization_percent\":50.0"));
    assert!(json.contains("\"cores_used\":1"));

    let memory: MemoryReport = state.memory_report();
    let json = serde_json::to_string(&memory).unwrap();
    assert!(json.contains("\"allocation_count\":1"));
    assert!(json.contains("\"capacity\":16384"));
}
