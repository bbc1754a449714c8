//! Configuration system for the scheduler simulator.
//!
//! This module defines all configuration structures used to parameterize the
//! simulator. It provides:
//! 1. **Defaults:** Baseline constants (core count, arena capacity, instruction range).
//! 2. **Structures:** Hierarchical config for the scheduler, memory arena, and generator.
//! 3. **Validation:** Consistency checks performed once at engine construction.
//!
//! Configuration is supplied as JSON (`serde_json`) or use `Config::default()` for the CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::common::EngineError;

/// Default configuration constants for the simulator.
mod defaults {
    /// Number of CPU cores in the pool.
    pub const CPU_COUNT: usize = 4;

    /// Dispatch loop tick interval in milliseconds.
    ///
    /// Each busy core advances its process by one instruction per tick; the
    /// tick also bounds the dispatch latency for newly submitted processes.
    pub const TICK_INTERVAL_MS: u64 = 25;

    /// Total arena capacity in bytes (16 KiB).
    pub const MEMORY_CAPACITY: usize = 16_384;

    /// Memory requirement of one process, equal to the arena's page
    /// granularity (4 KiB).
    pub const PROCESS_MEMORY: usize = 4096;

    /// Directory that receives `memory_stamp_<NN>.txt` snapshot files.
    pub const SNAPSHOT_DIR: &str = ".";

    /// Interval between batch-generated processes in milliseconds.
    pub const BATCH_INTERVAL_MS: u64 = 1000;

    /// Minimum instruction count for a generated process.
    pub const MIN_INSTRUCTIONS: usize = 1000;

    /// Maximum instruction count for a generated process.
    pub const MAX_INSTRUCTIONS: usize = 2000;
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use schedsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.scheduler.cpu_count, 4);
/// assert_eq!(config.memory.capacity, 16_384);
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use schedsim_core::config::Config;
///
/// let json = r#"{
///     "scheduler": { "cpu_count": 8, "tick_interval_ms": 10 },
///     "memory": { "capacity": 32768, "process_memory": 4096 },
///     "generator": { "batch_interval_ms": 500, "min_instructions": 100, "max_instructions": 400 }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.scheduler.cpu_count, 8);
/// assert_eq!(config.generator.max_instructions, 400);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Core pool and dispatch loop settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Memory arena settings.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Batch process generator settings.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Config {
    /// Loads and validates a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when the file cannot be read or
    /// parsed, or when the parsed values fail [`Config::validate`].
    pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
        let raw = fs::read_to_string(path)
            .map_err(|err| EngineError::Config(format!("cannot read {}: {err}", path.display())))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|err| EngineError::Config(format!("cannot parse {}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when a value is out of range: zero
    /// cores, a zero tick, an inverted instruction range, a zero process
    /// memory size, or an arena smaller than one process.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.scheduler.cpu_count == 0 {
            return Err(EngineError::Config("cpu_count must be nonzero".into()));
        }
        if self.scheduler.tick_interval_ms == 0 {
            return Err(EngineError::Config("tick_interval_ms must be nonzero".into()));
        }
        if self.generator.min_instructions == 0 {
            return Err(EngineError::Config("min_instructions must be nonzero".into()));
        }
        if self.generator.min_instructions > self.generator.max_instructions {
            return Err(EngineError::Config(format!(
                "instruction range is inverted: min {} > max {}",
                self.generator.min_instructions, self.generator.max_instructions
            )));
        }
        if self.memory.process_memory == 0 {
            return Err(EngineError::Config("process_memory must be nonzero".into()));
        }
        if self.memory.capacity < self.memory.process_memory {
            return Err(EngineError::Config(format!(
                "arena capacity {} cannot hold one process of {} bytes",
                self.memory.capacity, self.memory.process_memory
            )));
        }
        Ok(())
    }
}

/// Core pool and dispatch loop configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Number of CPU cores in the pool.
    #[serde(default = "SchedulerConfig::default_cpu_count")]
    pub cpu_count: usize,

    /// Dispatch loop tick interval in milliseconds.
    #[serde(default = "SchedulerConfig::default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl SchedulerConfig {
    /// Returns the default core count.
    fn default_cpu_count() -> usize {
        defaults::CPU_COUNT
    }

    /// Returns the default tick interval in milliseconds.
    fn default_tick_interval_ms() -> u64 {
        defaults::TICK_INTERVAL_MS
    }

    /// Returns the tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cpu_count: defaults::CPU_COUNT,
            tick_interval_ms: defaults::TICK_INTERVAL_MS,
        }
    }
}

/// Memory arena configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Total arena capacity in bytes.
    #[serde(default = "MemoryConfig::default_capacity")]
    pub capacity: usize,

    /// Memory requirement of one process in bytes.
    #[serde(default = "MemoryConfig::default_process_memory")]
    pub process_memory: usize,

    /// Directory that receives quantum-boundary snapshot files.
    #[serde(default = "MemoryConfig::default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
}

impl MemoryConfig {
    /// Returns the default arena capacity in bytes.
    fn default_capacity() -> usize {
        defaults::MEMORY_CAPACITY
    }

    /// Returns the default per-process memory size in bytes.
    fn default_process_memory() -> usize {
        defaults::PROCESS_MEMORY
    }

    /// Returns the default snapshot directory.
    fn default_snapshot_dir() -> PathBuf {
        PathBuf::from(defaults::SNAPSHOT_DIR)
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::MEMORY_CAPACITY,
            process_memory: defaults::PROCESS_MEMORY,
            snapshot_dir: PathBuf::from(defaults::SNAPSHOT_DIR),
        }
    }
}

/// Batch process generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Interval between generated processes in milliseconds.
    #[serde(default = "GeneratorConfig::default_batch_interval_ms")]
    pub batch_interval_ms: u64,

    /// Minimum instruction count for a new process.
    #[serde(default = "GeneratorConfig::default_min_instructions")]
    pub min_instructions: usize,

    /// Maximum instruction count for a new process.
    #[serde(default = "GeneratorConfig::default_max_instructions")]
    pub max_instructions: usize,

    /// Seed for the instruction-count RNG; random when unset.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl GeneratorConfig {
    /// Returns the default batch interval in milliseconds.
    fn default_batch_interval_ms() -> u64 {
        defaults::BATCH_INTERVAL_MS
    }

    /// Returns the default minimum instruction count.
    fn default_min_instructions() -> usize {
        defaults::MIN_INSTRUCTIONS
    }

    /// Returns the default maximum instruction count.
    fn default_max_instructions() -> usize {
        defaults::MAX_INSTRUCTIONS
    }

    /// Returns the batch interval as a [`Duration`].
    pub fn batch_interval(&self) -> Duration {
        Duration::from_millis(self.batch_interval_ms)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            batch_interval_ms: defaults::BATCH_INTERVAL_MS,
            min_instructions: defaults::MIN_INSTRUCTIONS,
            max_instructions: defaults::MAX_INSTRUCTIONS,
            rng_seed: None,
        }
    }
}
