//! Process scheduler simulator CLI.
//!
//! This binary is a thin driver for the scheduling engine. It performs:
//! 1. **Run:** Construct the engine (defaults or a JSON config file), submit
//!    processes and/or start the batch generator, run a policy for a while,
//!    and print the status report.
//! 2. **Reporting:** Text (classic console layout) or `--json` output, plus
//!    the arena occupancy summary.

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use schedsim_core::{Config, Policy, Scheduler};

#[derive(Parser, Debug)]
#[command(
    name = "schedsim",
    version,
    about = "Multi-core process scheduler simulator",
    long_about = "Simulate FCFS, SJF, or round-robin scheduling over a pool of CPU cores \
                  backed by a first-fit memory arena.\n\nExamples:\n  \
                  schedsim run --policy rr --quantum-secs 2 --generate --seconds 10\n  \
                  schedsim run --policy sjf-p --processes 8 --seconds 5 --json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scheduling policy for a while and print the status report.
    Run {
        /// JSON configuration file (engine defaults when omitted).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Scheduling policy.
        #[arg(long, value_enum, default_value_t = PolicyArg::Fcfs)]
        policy: PolicyArg,

        /// Round-robin quantum in seconds.
        #[arg(long, default_value_t = 2)]
        quantum_secs: u64,

        /// Number of processes to submit up front.
        #[arg(long, default_value_t = 5)]
        processes: usize,

        /// Also run the batch process generator.
        #[arg(long)]
        generate: bool,

        /// How long to let the scheduler run, in seconds.
        #[arg(long, default_value_t = 10)]
        seconds: u64,

        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

/// Policy names accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// First-come-first-served.
    Fcfs,
    /// Shortest-job-first, non-preemptive.
    Sjf,
    /// Shortest-job-first, preemptive.
    SjfP,
    /// Round-robin with a wall-clock quantum.
    Rr,
}

impl PolicyArg {
    fn into_policy(self, quantum_secs: u64) -> Policy {
        match self {
            Self::Fcfs => Policy::Fcfs,
            Self::Sjf => Policy::Sjf { preemptive: false },
            Self::SjfP => Policy::Sjf { preemptive: true },
            Self::Rr => Policy::RoundRobin {
                quantum: Duration::from_secs(quantum_secs),
            },
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            policy,
            quantum_secs,
            processes,
            generate,
            seconds,
            json,
        } => cmd_run(config, policy, quantum_secs, processes, generate, seconds, json),
    }
}

/// Runs the engine: submit, start, wait, report, stop.
fn cmd_run(
    config: Option<PathBuf>,
    policy: PolicyArg,
    quantum_secs: u64,
    processes: usize,
    generate: bool,
    seconds: u64,
    json: bool,
) -> ExitCode {
    let config = match load_config(config) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("schedsim: {message}");
            return ExitCode::FAILURE;
        }
    };

    let mut sched = match Scheduler::new(config) {
        Ok(sched) => sched,
        Err(err) => {
            eprintln!("schedsim: {err}");
            return ExitCode::FAILURE;
        }
    };

    for i in 1..=processes {
        let _ = sched.submit(&format!("process_{i}"));
    }
    sched.start(policy.into_policy(quantum_secs));
    if generate {
        sched.start_generator();
    }

    thread::sleep(Duration::from_secs(seconds));

    let report = sched.status();
    let memory = sched.memory_report();
    if json {
        match serde_json::to_string_pretty(&(report, memory)) {
            Ok(out) => println!("{out}"),
            Err(err) => {
                eprintln!("schedsim: failed to serialize report: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{report}");
        println!();
        println!("{memory}");
    }

    sched.stop_generator();
    sched.stop();
    ExitCode::SUCCESS
}

/// Loads a JSON config file, or the defaults when no path is given.
fn load_config(path: Option<PathBuf>) -> Result<Config, String> {
    match path {
        Some(path) => Config::from_json_file(&path).map_err(|err| err.to_string()),
        None => Ok(Config::default()),
    }
}
