//! Simulation driver and trace input.
//!
//! Provides the `Simulator` lifecycle wrapper around the cache model and
//! the reader that streams trace records into it.

pub mod simulator;
pub mod trace;

pub use simulator::Simulator;
pub use trace::{TraceReader, TraceRecord, parse_record};
