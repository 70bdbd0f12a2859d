//! Simulator Error Definitions.
//!
//! This module defines the error taxonomy of the simulator. It provides:
//! 1. **Configuration Errors:** Unknown parameters and geometries the address decoder cannot handle.
//! 2. **Misuse Errors:** Lifecycle violations such as accessing a cache before `init` or after `flush`.
//! 3. **Trace Errors:** Malformed records in trace input, reported with their line number.
//!
//! None of these are transient; the driver treats every one of them as fatal.

use thiserror::Error;

use crate::common::data::Stream;

/// Invalid simulator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A parameter name that the configuration does not recognise.
    #[error("unrecognised cache parameter `{0}`")]
    UnknownParameter(String),

    /// A size, block size, or associativity of zero.
    #[error("{param} must be positive (got {value})")]
    NonPositive {
        /// Parameter name.
        param: &'static str,
        /// Offending value.
        value: u64,
    },

    /// A parameter that address decoding requires to be a power of two.
    #[error("{param} must be a power of two (got {value})")]
    NotPowerOfTwo {
        /// Parameter name.
        param: &'static str,
        /// Offending value.
        value: u64,
    },

    /// The cache cannot hold even one full set.
    #[error(
        "{cache} cache of {size} bytes cannot hold one set of {associativity} x {block_size}-byte blocks"
    )]
    CapacityTooSmall {
        /// Which cache (unified, instruction, data).
        cache: CacheKind,
        /// Total size in bytes.
        size: u64,
        /// Block size in bytes.
        block_size: u64,
        /// Lines per set.
        associativity: u64,
    },

    /// `size / block_size / associativity` is not an exact power of two.
    #[error("{cache} cache geometry yields {sets} sets, which is not a power of two")]
    SetCountNotPowerOfTwo {
        /// Which cache (unified, instruction, data).
        cache: CacheKind,
        /// Derived set count (size / block_size / associativity, rounded down).
        sets: u64,
    },

    /// A JSON configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Document(String),
}

/// Identifies one of the caches a configuration can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// Single cache serving both streams.
    Unified,
    /// Instruction half of a split configuration.
    Instruction,
    /// Data half of a split configuration.
    Data,
}

impl CacheKind {
    /// Returns the cache serving `stream` in a split configuration.
    pub const fn split_for(stream: Stream) -> Self {
        match stream {
            Stream::Instruction => Self::Instruction,
            Stream::Data => Self::Data,
        }
    }
}

impl std::fmt::Display for CacheKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unified => write!(f, "unified"),
            Self::Instruction => write!(f, "instruction"),
            Self::Data => write!(f, "data"),
        }
    }
}

/// Malformed trace input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// A record that is not `<code> <address>`.
    #[error("line {line}: expected `<access-code> <hex-address>`, found `{text}`")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// Offending line.
        text: String,
    },

    /// An access code other than 0, 1, or 2.
    #[error("line {line}: unknown access code `{code}`")]
    UnknownAccessCode {
        /// 1-based line number.
        line: usize,
        /// Offending code token.
        code: String,
    },

    /// An address that is not valid hexadecimal.
    #[error("line {line}: invalid hex address `{text}`")]
    BadAddress {
        /// 1-based line number.
        line: usize,
        /// Offending address token.
        text: String,
    },
}

/// Top-level simulator error.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `access`, `flush`, or a statistics read before `init`.
    #[error("cache has not been initialised")]
    NotInitialized,

    /// `access` or `flush` after the cache was flushed.
    #[error("cache has already been flushed; re-initialise before use")]
    AlreadyFlushed,

    /// Malformed trace record.
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// Failure reading trace input.
    #[error("trace I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure serialising statistics.
    #[error("failed to serialise statistics: {0}")]
    Serialize(#[from] serde_json::Error),
}
