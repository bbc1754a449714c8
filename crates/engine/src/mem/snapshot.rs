//! Arena snapshot rendering and persistence.
//!
//! At every round-robin quantum boundary the scheduler renders the arena to a
//! human-readable stamp and writes it to `memory_stamp_<NN>.txt`, where `NN`
//! is the zero-padded quantum cycle counter. Downstream tooling parses these
//! files, so the field order and labels are a compatibility surface and must
//! not change.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::common::EngineError;
use crate::mem::Arena;

/// Renders the arena to the snapshot text format.
///
/// The header carries the timestamp, the live allocation count, and the
/// external fragmentation (the label says KB; the value has always been the
/// raw `capacity - used` byte count). The body walks the arena from the
/// highest address down to zero: each maximal occupied run emits its owning
/// process id between its [start,end) boundary addresses, and each free span
/// emits a blank marker above its lower boundary.
pub fn render(arena: &Arena, now: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str(&format!("Timestamp: {}\n", now.format("%m/%d/%Y, %I:%M:%S %p")));
    out.push_str(&format!("Number of processes in memory: {}\n", arena.allocation_count()));
    out.push_str(&format!("Total external fragmentation in KB: {}\n", arena.fragmented_space()));
    out.push('\n');

    out.push_str(&format!("----end---- = {}\n", arena.capacity()));
    for run in arena.runs().iter().rev() {
        match run.owner {
            Some(owner) => {
                out.push_str(&format!("{}\n{owner}\n{}\n\n", run.end, run.start));
            }
            None => {
                out.push_str(&format!("\n{}\n", run.start));
            }
        }
    }
    out.push_str("----start---- = 0\n");
    out
}

/// Returns the stamp file name for a quantum cycle: `memory_stamp_<NN>.txt`.
pub fn stamp_file_name(cycle: u32) -> String {
    format!("memory_stamp_{cycle:02}.txt")
}

/// Writes rendered snapshot contents into `dir`.
///
/// # Errors
///
/// Returns [`EngineError::Snapshot`] when the file cannot be created or
/// written. Persistence is best-effort: the dispatch loop logs the error and
/// keeps scheduling.
pub fn write_stamp(dir: &Path, cycle: u32, contents: &str) -> Result<PathBuf, EngineError> {
    let path = dir.join(stamp_file_name(cycle));
    let result = fs::File::create(&path).and_then(|mut file| file.write_all(contents.as_bytes()));
    match result {
        Ok(()) => Ok(path),
        Err(source) => Err(EngineError::Snapshot { path, source }),
    }
}
