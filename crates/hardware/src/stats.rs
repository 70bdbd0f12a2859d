//! Simulation statistics collection and reporting.
//!
//! This module tracks the counters the simulator reports. It provides:
//! 1. **Per-stream counters:** Accesses, misses, replacements, demand fetches, and copies back
//!    for the instruction and data streams.
//! 2. **Derived metrics:** Hits, miss rate, and hit rate.
//! 3. **Reporting:** A plain-text report and a JSON form for tooling.
//!
//! Counters only ever grow for the lifetime of one simulation run.

use std::fmt;

use serde::Serialize;

use crate::common::{SimError, Stream};
use crate::core::units::cache::AccessOutcome;

/// Counters for one access stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Accesses issued to the stream.
    pub accesses: u64,
    /// Accesses that did not find their block resident.
    pub misses: u64,
    /// Misses that displaced a valid block.
    pub replacements: u64,
    /// Accesses that required the block to be present (every access).
    pub demand_fetches: u64,
    /// Words written to backing storage.
    pub copies_back: u64,
}

impl CacheStats {
    /// Accesses that found their block resident.
    pub const fn hits(&self) -> u64 {
        self.accesses - self.misses
    }

    /// `misses / accesses`, or 0 when there have been no accesses.
    pub fn miss_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.misses as f64 / self.accesses as f64
        }
    }

    /// `hits / accesses`, or 0 when there have been no accesses.
    pub fn hit_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            1.0 - self.miss_rate()
        }
    }

    /// Folds one access outcome into the counters.
    pub fn record(&mut self, outcome: &AccessOutcome) {
        self.accesses += 1;
        self.demand_fetches += 1;
        if !outcome.hit {
            self.misses += 1;
        }
        if outcome.evicted.is_some() {
            self.replacements += 1;
        }
        self.copies_back += outcome.words_copied_back;
    }
}

/// Read-only snapshot of one stream, as handed to reporting layers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StreamReport {
    /// Total accesses.
    pub accesses: u64,
    /// Total misses.
    pub misses: u64,
    /// Total demand fetches.
    pub demand_fetches: u64,
    /// `misses / accesses` (0 when idle).
    pub miss_rate: f64,
}

impl From<&CacheStats> for StreamReport {
    fn from(stats: &CacheStats) -> Self {
        Self {
            accesses: stats.accesses,
            misses: stats.misses,
            demand_fetches: stats.demand_fetches,
            miss_rate: stats.miss_rate(),
        }
    }
}

/// Statistics for both streams.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    /// Instruction-fetch stream.
    pub instruction: CacheStats,
    /// Data read/write stream.
    pub data: CacheStats,
}

impl SimStats {
    /// Counters of `stream`.
    pub const fn stream(&self, stream: Stream) -> &CacheStats {
        match stream {
            Stream::Instruction => &self.instruction,
            Stream::Data => &self.data,
        }
    }

    /// Mutable counters of `stream`.
    pub fn stream_mut(&mut self, stream: Stream) -> &mut CacheStats {
        match stream {
            Stream::Instruction => &mut self.instruction,
            Stream::Data => &mut self.data,
        }
    }

    /// Demand fetches summed over both streams.
    pub const fn total_demand_fetches(&self) -> u64 {
        self.instruction.demand_fetches + self.data.demand_fetches
    }

    /// Words copied back summed over both streams.
    pub const fn total_copies_back(&self) -> u64 {
        self.instruction.copies_back + self.data.copies_back
    }

    /// Serialises the counters as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Renders the plain-text statistics report.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn write_stream(f: &mut fmt::Formatter<'_>, title: &str, stats: &CacheStats) -> fmt::Result {
    writeln!(f, " {title}")?;
    writeln!(f, "  accesses:  {}", stats.accesses)?;
    writeln!(f, "  misses:    {}", stats.misses)?;
    writeln!(
        f,
        "  miss rate: {:.4} (hit rate {:.4})",
        stats.miss_rate(),
        stats.hit_rate()
    )?;
    writeln!(f, "  replace:   {}", stats.replacements)
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n*** CACHE STATISTICS ***")?;
        write_stream(f, "INSTRUCTIONS", &self.instruction)?;
        write_stream(f, "DATA", &self.data)?;
        writeln!(f, " TRAFFIC")?;
        writeln!(f, "  demand fetch:  {}", self.total_demand_fetches())?;
        writeln!(f, "  copies back:   {} words", self.total_copies_back())
    }
}
