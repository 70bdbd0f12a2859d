//! Common utilities and types used throughout the cache simulator.
//!
//! This module provides the building blocks shared by the configuration, the
//! cache model, and the simulation driver. It includes:
//! 1. **Address Decoding:** Tag/index/offset extraction for power-of-two geometries.
//! 2. **Constants:** Word size and trace access codes.
//! 3. **Memory Access:** Access types and the statistics stream each maps to.
//! 4. **Error Handling:** Configuration, misuse, and trace errors.

/// Address decoding (tag, set index, block offset).
pub mod addr;

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use addr::{AddressLayout, DecodedAddr};
pub use constants::WORD_SIZE;
pub use data::{AccessType, Stream};
pub use error::{CacheKind, ConfigError, SimError, TraceError};
