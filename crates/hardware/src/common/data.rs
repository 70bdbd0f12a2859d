//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used throughout the simulator.
//! These types are used for the following:
//! 1. **Stream Selection:** Routing an access to the instruction or data statistics.
//! 2. **Policy Decisions:** Only writes dirty a line; only data accesses may bypass allocation.
//! 3. **Trace Decoding:** Mapping the numeric codes found in trace files.

use std::fmt;

use super::constants::{TRACE_DATA_LOAD, TRACE_DATA_STORE, TRACE_INST_LOAD};

/// Type of memory access operation.
///
/// Used to distinguish between instruction fetches, data loads, and data stores
/// for statistics bucketing and write/allocation policy handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Instruction fetch access.
    ///
    /// Always allocates on a miss, regardless of the allocation policy.
    Fetch,

    /// Data read access.
    ///
    /// Bypasses the cache on a miss under no-write-allocate.
    Read,

    /// Data write access.
    ///
    /// Marks the line dirty under write-back and bypasses the cache on a miss
    /// under no-write-allocate.
    Write,
}

impl AccessType {
    /// Decodes a trace access code (`0` read, `1` write, `2` fetch).
    ///
    /// Returns `None` for any other code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            TRACE_DATA_LOAD => Some(Self::Read),
            TRACE_DATA_STORE => Some(Self::Write),
            TRACE_INST_LOAD => Some(Self::Fetch),
            _ => None,
        }
    }

    /// Returns the trace access code for this access type.
    pub const fn code(self) -> u8 {
        match self {
            Self::Read => TRACE_DATA_LOAD,
            Self::Write => TRACE_DATA_STORE,
            Self::Fetch => TRACE_INST_LOAD,
        }
    }

    /// Returns the statistics stream this access is accounted to.
    #[inline]
    pub const fn stream(self) -> Stream {
        match self {
            Self::Fetch => Stream::Instruction,
            Self::Read | Self::Write => Stream::Data,
        }
    }

    /// Returns `true` for data writes.
    #[inline]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

/// Access stream used to bucket statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Instruction fetches.
    Instruction,
    /// Data reads and writes.
    Data,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instruction => write!(f, "instruction"),
            Self::Data => write!(f, "data"),
        }
    }
}
