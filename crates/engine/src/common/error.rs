//! Engine error definitions.
//!
//! The scheduler treats most unusual situations as normal outcomes rather than
//! errors: a failed allocation defers the process, a redundant release is a
//! no-op, and re-starting an active loop does nothing. What remains is
//! configuration validation and snapshot persistence.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the scheduling engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A memory snapshot file could not be written.
    ///
    /// Snapshot persistence is best-effort; the dispatch loop logs this error
    /// and continues scheduling.
    #[error("failed to write memory snapshot {path}")]
    Snapshot {
        /// Destination path of the snapshot file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
