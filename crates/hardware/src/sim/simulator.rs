//! Simulation Lifecycle.
//!
//! `Simulator` owns the configuration, the caches built from it, and the
//! statistics of the current run. It enforces the lifecycle
//! `set_parameter* -> init -> access* -> flush`: misuse is reported as a
//! [`SimError`] rather than silently producing zeroed results.

use std::io::BufRead;

use tracing::{debug, info, warn};

use super::trace::TraceReader;
use crate::common::{AccessType, ConfigError, SimError, Stream};
use crate::config::{CacheConfig, CacheParam};
use crate::core::units::cache::{AccessOutcome, CacheSim, FlushReport};
use crate::stats::{SimStats, StreamReport};

/// The caches of one run.
#[derive(Clone, Debug)]
enum Caches {
    Unified(CacheSim),
    Split {
        instruction: CacheSim,
        data: CacheSim,
    },
}

impl Caches {
    fn build(config: &CacheConfig) -> Result<Self, ConfigError> {
        let build = |stream| {
            CacheSim::new(
                &config.geometry(stream),
                config.write_policy,
                config.allocation_policy,
                config.words_per_block(),
            )
        };
        if config.split {
            Ok(Self::Split {
                instruction: build(Stream::Instruction)?,
                data: build(Stream::Data)?,
            })
        } else {
            Ok(Self::Unified(build(Stream::Data)?))
        }
    }

    fn for_stream(&self, stream: Stream) -> &CacheSim {
        match self {
            Self::Unified(cache) => cache,
            Self::Split { instruction, data } => match stream {
                Stream::Instruction => instruction,
                Stream::Data => data,
            },
        }
    }

    fn for_stream_mut(&mut self, stream: Stream) -> &mut CacheSim {
        match self {
            Self::Unified(cache) => cache,
            Self::Split { instruction, data } => match stream {
                Stream::Instruction => instruction,
                Stream::Data => data,
            },
        }
    }

    fn flush(&mut self) -> FlushReport {
        let mut total = FlushReport::default();
        let caches: Vec<&mut CacheSim> = match self {
            Self::Unified(cache) => vec![cache],
            Self::Split { instruction, data } => vec![instruction, data],
        };
        for cache in caches {
            let report = cache.flush();
            total.dirty_lines += report.dirty_lines;
            total.words_copied_back += report.words_copied_back;
        }
        total
    }
}

#[derive(Clone, Debug)]
enum Lifecycle {
    Configuring,
    Running(Caches),
    Flushed,
}

/// Trace-driven cache simulator.
///
/// # Example
///
/// ```
/// use cachesim_core::{AccessType, Simulator, Stream};
///
/// let mut sim = Simulator::default();
/// sim.set_parameter("unified_size", 1024).unwrap();
/// sim.set_parameter("block_size", 32).unwrap();
/// sim.set_parameter("associativity", 2).unwrap();
/// sim.init().unwrap();
///
/// assert!(!sim.access(0x0000, AccessType::Read).unwrap().hit);
/// assert!(sim.access(0x0000, AccessType::Read).unwrap().hit);
/// assert_eq!(sim.get_stats(Stream::Data).unwrap().misses, 1);
/// ```
#[derive(Clone, Debug)]
pub struct Simulator {
    config: CacheConfig,
    state: Lifecycle,
    stats: SimStats,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl Simulator {
    /// Creates an uninitialised simulator with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: Lifecycle::Configuring,
            stats: SimStats::default(),
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns `true` between `init` and `flush`.
    pub const fn is_running(&self) -> bool {
        matches!(self.state, Lifecycle::Running(_))
    }

    /// Applies a named parameter.
    ///
    /// Unrecognised names are rejected without touching the configuration.
    /// Changes made after `init` only take effect on the next `init`.
    pub fn set_parameter(&mut self, name: &str, value: u64) -> Result<CacheParam, ConfigError> {
        let param = name.parse::<CacheParam>()?;
        self.set_param(param, value);
        Ok(param)
    }

    /// Applies a parameter.
    pub fn set_param(&mut self, param: CacheParam, value: u64) {
        if !matches!(self.state, Lifecycle::Configuring) {
            warn!(%param, value, "parameter changed after init; takes effect on next init");
        }
        self.config.set_param(param, value);
        if param.is_switch() {
            debug!(%param, "cache parameter set");
        } else {
            debug!(%param, value, "cache parameter set");
        }
    }

    /// Builds the caches from the configuration and resets the statistics.
    ///
    /// Validation happens first: on error the previous state, including any
    /// running caches, is left untouched. Re-initialising a running
    /// simulator discards its residency and dirty state without flushing.
    pub fn init(&mut self) -> Result<(), SimError> {
        self.config.validate()?;
        let caches = Caches::build(&self.config)?;
        if self.is_running() {
            debug!("re-initialising; previous cache state discarded");
        }
        self.state = Lifecycle::Running(caches);
        self.stats = SimStats::default();
        debug!(split = self.config.split, "cache initialised");
        Ok(())
    }

    fn caches_mut(&mut self) -> Result<&mut Caches, SimError> {
        match &mut self.state {
            Lifecycle::Running(caches) => Ok(caches),
            Lifecycle::Configuring => Err(SimError::NotInitialized),
            Lifecycle::Flushed => Err(SimError::AlreadyFlushed),
        }
    }

    /// Performs one access and updates the statistics of its stream.
    ///
    /// # Arguments
    ///
    /// * `addr` - Byte address
    /// * `access` - Read, write, or instruction fetch
    pub fn access(&mut self, addr: u64, access: AccessType) -> Result<AccessOutcome, SimError> {
        let stream = access.stream();
        let outcome = self.caches_mut()?.for_stream_mut(stream).access(addr, access);
        self.stats.stream_mut(stream).record(&outcome);
        Ok(outcome)
    }

    /// Settles every dirty line and releases the caches.
    ///
    /// Words written back are charged to the data stream, the only stream
    /// that can dirty a line. The simulator must be re-initialised before
    /// further accesses; statistics stay readable.
    pub fn flush(&mut self) -> Result<FlushReport, SimError> {
        let report = self.caches_mut()?.flush();
        self.stats.data.copies_back += report.words_copied_back;
        self.state = Lifecycle::Flushed;
        info!(
            dirty_lines = report.dirty_lines,
            words = report.words_copied_back,
            "cache flushed"
        );
        Ok(report)
    }

    /// Statistics of both streams.
    pub fn stats(&self) -> Result<&SimStats, SimError> {
        match &self.state {
            Lifecycle::Configuring => Err(SimError::NotInitialized),
            Lifecycle::Running(_) | Lifecycle::Flushed => Ok(&self.stats),
        }
    }

    /// Snapshot of one stream's accesses, misses, demand fetches, and miss rate.
    pub fn get_stats(&self, stream: Stream) -> Result<StreamReport, SimError> {
        Ok(StreamReport::from(self.stats()?.stream(stream)))
    }

    /// The cache serving `stream` (the same cache for both when unified).
    pub fn cache(&self, stream: Stream) -> Result<&CacheSim, SimError> {
        match &self.state {
            Lifecycle::Running(caches) => Ok(caches.for_stream(stream)),
            Lifecycle::Configuring => Err(SimError::NotInitialized),
            Lifecycle::Flushed => Err(SimError::AlreadyFlushed),
        }
    }

    /// Renders the active configuration.
    pub fn dump_settings(&self) -> String {
        self.config.dump_settings()
    }

    /// Drives every record of a trace through [`Simulator::access`].
    ///
    /// Stops at the first malformed record or I/O error. Returns the number
    /// of records simulated.
    pub fn run_trace<R: BufRead>(&mut self, trace: TraceReader<R>) -> Result<u64, SimError> {
        let mut records = 0;
        for record in trace {
            let record = record?;
            let _ = self.access(record.addr, record.access)?;
            records += 1;
        }
        debug!(records, "trace complete");
        Ok(records)
    }
}
