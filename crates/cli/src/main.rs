//! Cache simulator CLI.
//!
//! This binary is the driver around `cachesim-core`. It performs:
//! 1. **Configuration:** Loads an optional JSON config, then applies command-line
//!    parameters one at a time through `Simulator::set_parameter`.
//! 2. **Simulation:** Streams a trace file through the cache and flushes it.
//! 3. **Reporting:** Prints the settings and statistics, as text or JSON.
//!
//! Every error is fatal: it is printed to stderr and the process exits with status 1.

use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cachesim_core::common::SimError;
use cachesim_core::config::{CacheConfig, CacheParam};
use cachesim_core::sim::{Simulator, TraceReader};

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Trace-driven set-associative cache simulator",
    long_about = "Replay a memory trace through a configurable cache and report miss rates.\n\nTrace lines are `<code> <hex-address>` with code 0 = data read, 1 = data write, 2 = instruction fetch.\n\nExamples:\n  cachesim run traces/spice.trace --bs 32 -a 4\n  cachesim run traces/cc.trace --is 8192 --ds 8192 --wt --nw\n  cachesim settings --config cache.json"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a trace file and print settings and statistics.
    Run {
        /// Trace file to replay.
        trace: PathBuf,

        #[command(flatten)]
        cache: CacheArgs,

        /// Print statistics as JSON instead of the text report.
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration and print the settings without simulating.
    Settings {
        #[command(flatten)]
        cache: CacheArgs,
    },
}

/// Cache parameters, applied in the order listed here after `--config`.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
struct CacheArgs {
    /// JSON configuration file; command-line parameters override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Block size in bytes.
    #[arg(long = "bs", value_name = "BYTES")]
    block_size: Option<u64>,

    /// Unified cache size in bytes.
    #[arg(long = "us", value_name = "BYTES", conflicts_with_all = ["instruction_size", "data_size"])]
    unified_size: Option<u64>,

    /// Instruction cache size in bytes (selects split caches).
    #[arg(long = "is", value_name = "BYTES")]
    instruction_size: Option<u64>,

    /// Data cache size in bytes (selects split caches).
    #[arg(long = "ds", value_name = "BYTES")]
    data_size: Option<u64>,

    /// Associativity (lines per set).
    #[arg(short = 'a', long = "assoc", value_name = "WAYS")]
    associativity: Option<u64>,

    /// Write-back policy.
    #[arg(long = "wb", conflicts_with = "write_through")]
    write_back: bool,

    /// Write-through policy.
    #[arg(long = "wt")]
    write_through: bool,

    /// Write-allocate policy.
    #[arg(long = "wa", conflicts_with = "no_write_allocate")]
    write_allocate: bool,

    /// No-write-allocate policy.
    #[arg(long = "nw")]
    no_write_allocate: bool,
}

impl CacheArgs {
    /// Returns the parameters to apply, in application order.
    fn params(&self) -> Vec<(CacheParam, u64)> {
        let sized = [
            (CacheParam::BlockSize, self.block_size),
            (CacheParam::UnifiedSize, self.unified_size),
            (CacheParam::InstructionSize, self.instruction_size),
            (CacheParam::DataSize, self.data_size),
            (CacheParam::Associativity, self.associativity),
        ];
        let switches = [
            (CacheParam::WriteBack, self.write_back),
            (CacheParam::WriteThrough, self.write_through),
            (CacheParam::WriteAllocate, self.write_allocate),
            (CacheParam::NoWriteAllocate, self.no_write_allocate),
        ];
        sized
            .into_iter()
            .filter_map(|(p, v)| v.map(|v| (p, v)))
            .chain(
                switches
                    .into_iter()
                    .filter(|&(_, on)| on)
                    .map(|(p, _)| (p, 0)),
            )
            .collect()
    }

    /// Builds an uninitialised simulator from the config file and flags.
    fn simulator(&self) -> Result<Simulator, SimError> {
        let config = match &self.config {
            Some(path) => load_config(path)?,
            None => CacheConfig::default(),
        };
        let mut sim = Simulator::new(config);
        for (param, value) in self.params() {
            let _ = sim.set_parameter(param.flag(), value)?;
        }
        Ok(sim)
    }
}

fn load_config(path: &Path) -> Result<CacheConfig, SimError> {
    let text = fs::read_to_string(path)?;
    let config = CacheConfig::from_json(&text)?;
    info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { trace, cache, json } => cmd_run(&trace, &cache, json),
        Commands::Settings { cache } => cmd_settings(&cache),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// Initialises the cache, replays the trace, flushes, and prints the report.
fn cmd_run(trace: &Path, cache: &CacheArgs, json: bool) -> Result<(), SimError> {
    let mut sim = cache.simulator()?;
    sim.init()?;

    let records = sim.run_trace(TraceReader::open(trace)?)?;
    let _ = sim.flush()?;
    info!(records, trace = %trace.display(), "simulation finished");

    let stats = sim.stats()?;
    if json {
        println!("{}", stats.to_json()?);
    } else {
        print!("{}", sim.dump_settings());
        print!("{}", stats.render());
    }
    Ok(())
}

/// Validates the configuration by building the caches, then prints the settings.
fn cmd_settings(cache: &CacheArgs) -> Result<(), SimError> {
    let mut sim = cache.simulator()?;
    sim.init()?;
    print!("{}", sim.dump_settings());
    Ok(())
}
