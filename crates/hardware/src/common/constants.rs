//! Global Simulator Constants.
//!
//! This module defines constants shared across the simulator. It includes:
//! 1. **Memory Constants:** The word size used to count traffic to backing storage.
//! 2. **Trace Constants:** Numeric access codes used by trace files.

/// Size of a memory word in bytes.
///
/// Traffic to backing storage (`copies_back`) is counted in words, and the
/// number of words in a block is `block_size / WORD_SIZE`.
pub const WORD_SIZE: u64 = 4;

/// Trace access code for a data read.
pub const TRACE_DATA_LOAD: u8 = 0;

/// Trace access code for a data write.
pub const TRACE_DATA_STORE: u8 = 1;

/// Trace access code for an instruction fetch.
pub const TRACE_INST_LOAD: u8 = 2;
