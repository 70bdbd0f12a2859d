//! Configuration system for the cache simulator.
//!
//! This module defines the configuration consumed by [`Simulator::init`](crate::sim::Simulator::init).
//! It provides:
//! 1. **Defaults:** Baseline cache geometry and policies.
//! 2. **Structures:** `CacheConfig` with serde defaults, loadable from JSON.
//! 3. **Parameters:** `CacheParam`, the named knobs a driver sets one at a time.
//! 4. **Validation:** Geometry checks required by shift-based address decoding.
//!
//! Configuration is write-once-then-read: the simulator derives everything it
//! needs at `init` time and never consults the configuration on the access path.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::common::{CacheKind, ConfigError, Stream, WORD_SIZE};

/// Default configuration constants for the simulator.
mod defaults {
    /// Default size of every cache in bytes (8 KiB).
    pub const CACHE_SIZE: u64 = 8 * 1024;

    /// Default block size in bytes.
    pub const BLOCK_SIZE: u64 = 16;

    /// Default associativity (1 way = direct-mapped).
    pub const ASSOCIATIVITY: u64 = 1;
}

/// Write policy applied to data writes that hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum WritePolicy {
    /// Writes mark the line dirty and reach backing storage on eviction or flush.
    #[default]
    #[serde(alias = "write_back", alias = "wb")]
    WriteBack,
    /// Writes reach backing storage immediately; lines are never dirty.
    #[serde(alias = "write_through", alias = "wt")]
    WriteThrough,
}

/// Allocation policy applied to data accesses that miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum AllocationPolicy {
    /// Data misses install the block.
    #[default]
    #[serde(alias = "write_allocate", alias = "wa")]
    WriteAllocate,
    /// Data misses bypass the cache; only instruction fetches install blocks.
    #[serde(alias = "no_write_allocate", alias = "nw")]
    NoWriteAllocate,
}

/// A named configuration parameter.
///
/// Each variant updates exactly one field of [`CacheConfig`] (plus derived
/// fields) when passed to [`CacheConfig::set_param`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheParam {
    /// Block size in bytes; also recomputes words per block.
    BlockSize,
    /// Unified cache size in bytes; selects a unified cache.
    UnifiedSize,
    /// Instruction cache size in bytes; selects split caches.
    InstructionSize,
    /// Data cache size in bytes; selects split caches.
    DataSize,
    /// Lines per set.
    Associativity,
    /// Select write-back.
    WriteBack,
    /// Select write-through.
    WriteThrough,
    /// Select write-allocate.
    WriteAllocate,
    /// Select no-write-allocate.
    NoWriteAllocate,
}

impl CacheParam {
    /// Every recognised parameter, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::BlockSize,
        Self::UnifiedSize,
        Self::InstructionSize,
        Self::DataSize,
        Self::Associativity,
        Self::WriteBack,
        Self::WriteThrough,
        Self::WriteAllocate,
        Self::NoWriteAllocate,
    ];

    /// Canonical long name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::BlockSize => "block_size",
            Self::UnifiedSize => "unified_size",
            Self::InstructionSize => "instruction_size",
            Self::DataSize => "data_size",
            Self::Associativity => "associativity",
            Self::WriteBack => "write_back",
            Self::WriteThrough => "write_through",
            Self::WriteAllocate => "write_allocate",
            Self::NoWriteAllocate => "no_write_allocate",
        }
    }

    /// Short driver flag name.
    pub const fn flag(self) -> &'static str {
        match self {
            Self::BlockSize => "bs",
            Self::UnifiedSize => "us",
            Self::InstructionSize => "is",
            Self::DataSize => "ds",
            Self::Associativity => "a",
            Self::WriteBack => "wb",
            Self::WriteThrough => "wt",
            Self::WriteAllocate => "wa",
            Self::NoWriteAllocate => "nw",
        }
    }

    /// Returns `true` for parameters whose value is ignored (policy selectors).
    pub const fn is_switch(self) -> bool {
        matches!(
            self,
            Self::WriteBack | Self::WriteThrough | Self::WriteAllocate | Self::NoWriteAllocate
        )
    }
}

impl FromStr for CacheParam {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().trim_start_matches('-').replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.name() == key || p.flag() == key)
            .ok_or_else(|| ConfigError::UnknownParameter(s.to_string()))
    }
}

impl fmt::Display for CacheParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Geometry of one cache, as handed to [`CacheSim::new`](crate::core::units::cache::CacheSim::new).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    /// Which cache this geometry builds.
    pub kind: CacheKind,
    /// Total capacity in bytes.
    pub size_bytes: u64,
    /// Bytes per line.
    pub block_size: u64,
    /// Lines per set.
    pub associativity: u64,
}

impl CacheGeometry {
    /// Checks the geometry and returns the number of sets.
    ///
    /// Sizes, block size, and associativity must be positive; block size and
    /// the derived set count must be powers of two. The set count is
    /// `(size_bytes / block_size) / associativity` with integer division, so
    /// capacity beyond the last whole set is ignored.
    pub fn validate(&self) -> Result<u64, ConfigError> {
        if self.size_bytes == 0 {
            return Err(ConfigError::NonPositive {
                param: size_param(self.kind),
                value: 0,
            });
        }
        if self.block_size == 0 {
            return Err(ConfigError::NonPositive {
                param: "block_size",
                value: 0,
            });
        }
        if self.associativity == 0 {
            return Err(ConfigError::NonPositive {
                param: "associativity",
                value: 0,
            });
        }
        if !self.block_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                param: "block_size",
                value: self.block_size,
            });
        }

        let set_bytes = self.block_size.saturating_mul(self.associativity);
        if self.size_bytes < set_bytes {
            return Err(ConfigError::CapacityTooSmall {
                cache: self.kind,
                size: self.size_bytes,
                block_size: self.block_size,
                associativity: self.associativity,
            });
        }

        let sets = (self.size_bytes / self.block_size) / self.associativity;
        if !sets.is_power_of_two() {
            return Err(ConfigError::SetCountNotPowerOfTwo {
                cache: self.kind,
                sets,
            });
        }
        Ok(sets)
    }
}

const fn size_param(kind: CacheKind) -> &'static str {
    match kind {
        CacheKind::Unified => "unified_size",
        CacheKind::Instruction => "instruction_size",
        CacheKind::Data => "data_size",
    }
}

/// Complete simulator configuration.
///
/// # Example
///
/// ```
/// use cachesim_core::config::{CacheConfig, WritePolicy};
///
/// let json = r#"{ "unified_size": 1024, "block_size": 32, "associativity": 2,
///                 "write_policy": "WriteThrough" }"#;
/// let config = CacheConfig::from_json(json).unwrap();
/// assert_eq!(config.words_per_block(), 8);
/// assert_eq!(config.write_policy, WritePolicy::WriteThrough);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Separate instruction and data caches
    #[serde(default)]
    pub split: bool,

    /// Unified cache size in bytes
    #[serde(default = "CacheConfig::default_size")]
    pub unified_size: u64,

    /// Instruction cache size in bytes (split only)
    #[serde(default = "CacheConfig::default_size")]
    pub instruction_size: u64,

    /// Data cache size in bytes (split only)
    #[serde(default = "CacheConfig::default_size")]
    pub data_size: u64,

    /// Block (line) size in bytes
    #[serde(default = "CacheConfig::default_block_size")]
    pub block_size: u64,

    /// Lines per set
    #[serde(default = "CacheConfig::default_associativity")]
    pub associativity: u64,

    /// Write policy
    #[serde(default)]
    pub write_policy: WritePolicy,

    /// Allocation policy
    #[serde(default)]
    pub allocation_policy: AllocationPolicy,
}

impl CacheConfig {
    fn default_size() -> u64 {
        defaults::CACHE_SIZE
    }

    fn default_block_size() -> u64 {
        defaults::BLOCK_SIZE
    }

    fn default_associativity() -> u64 {
        defaults::ASSOCIATIVITY
    }

    /// Parses a JSON configuration document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Document(e.to_string()))
    }

    /// Number of words in one block.
    pub const fn words_per_block(&self) -> u64 {
        self.block_size / WORD_SIZE
    }

    /// Applies one parameter.
    ///
    /// `value` is ignored for policy switches.
    pub fn set_param(&mut self, param: CacheParam, value: u64) {
        match param {
            CacheParam::BlockSize => self.block_size = value,
            CacheParam::UnifiedSize => {
                self.split = false;
                self.unified_size = value;
            }
            CacheParam::InstructionSize => {
                self.split = true;
                self.instruction_size = value;
            }
            CacheParam::DataSize => {
                self.split = true;
                self.data_size = value;
            }
            CacheParam::Associativity => self.associativity = value,
            CacheParam::WriteBack => self.write_policy = WritePolicy::WriteBack,
            CacheParam::WriteThrough => self.write_policy = WritePolicy::WriteThrough,
            CacheParam::WriteAllocate => self.allocation_policy = AllocationPolicy::WriteAllocate,
            CacheParam::NoWriteAllocate => {
                self.allocation_policy = AllocationPolicy::NoWriteAllocate;
            }
        }
    }

    /// Looks up `name` and applies it.
    ///
    /// An unrecognised name returns [`ConfigError::UnknownParameter`] and
    /// leaves the configuration untouched.
    pub fn set_parameter(&mut self, name: &str, value: u64) -> Result<CacheParam, ConfigError> {
        let param = name.parse::<CacheParam>()?;
        self.set_param(param, value);
        Ok(param)
    }

    /// Returns the geometry of every cache `init` will build.
    pub fn geometries(&self) -> Vec<CacheGeometry> {
        if self.split {
            vec![
                self.geometry(Stream::Instruction),
                self.geometry(Stream::Data),
            ]
        } else {
            vec![self.geometry(Stream::Data)]
        }
    }

    /// Returns the geometry of the cache serving `stream`.
    pub const fn geometry(&self, stream: Stream) -> CacheGeometry {
        let (kind, size_bytes) = if self.split {
            match stream {
                Stream::Instruction => (CacheKind::Instruction, self.instruction_size),
                Stream::Data => (CacheKind::Data, self.data_size),
            }
        } else {
            (CacheKind::Unified, self.unified_size)
        };
        CacheGeometry {
            kind,
            size_bytes,
            block_size: self.block_size,
            associativity: self.associativity,
        }
    }

    /// Validates every geometry that `init` will build.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for geometry in self.geometries() {
            let _ = geometry.validate()?;
        }
        Ok(())
    }

    /// Renders the active configuration for reports.
    pub fn dump_settings(&self) -> String {
        self.to_string()
    }
}

impl Default for CacheConfig {
    /// Unified 8 KiB direct-mapped cache with 16-byte blocks, write-back, write-allocate.
    fn default() -> Self {
        Self {
            split: false,
            unified_size: defaults::CACHE_SIZE,
            instruction_size: defaults::CACHE_SIZE,
            data_size: defaults::CACHE_SIZE,
            block_size: defaults::BLOCK_SIZE,
            associativity: defaults::ASSOCIATIVITY,
            write_policy: WritePolicy::default(),
            allocation_policy: AllocationPolicy::default(),
        }
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteBack => write!(f, "WRITE BACK"),
            Self::WriteThrough => write!(f, "WRITE THROUGH"),
        }
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteAllocate => write!(f, "WRITE ALLOCATE"),
            Self::NoWriteAllocate => write!(f, "WRITE NO ALLOCATE"),
        }
    }
}

impl fmt::Display for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*** CACHE SETTINGS ***")?;
        if self.split {
            writeln!(f, "  Split I- D-cache")?;
            writeln!(f, "  I-cache size: \t{}", self.instruction_size)?;
            writeln!(f, "  D-cache size: \t{}", self.data_size)?;
        } else {
            writeln!(f, "  Unified I- D-cache")?;
            writeln!(f, "  Size: \t{}", self.unified_size)?;
        }
        writeln!(f, "  Associativity: \t{}", self.associativity)?;
        writeln!(f, "  Block size: \t{}", self.block_size)?;
        writeln!(f, "  Write policy: \t{}", self.write_policy)?;
        writeln!(f, "  Allocation policy: \t{}", self.allocation_policy)
    }
}
