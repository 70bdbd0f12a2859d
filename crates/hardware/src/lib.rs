//! Trace-driven cache simulator library.
//!
//! This crate models a set-associative memory cache driven by a stream of
//! (address, access type) events:
//! 1. **Cache:** Tag lookup, LRU replacement, and dirty tracking under
//!    write-back/write-through and write-allocate/no-write-allocate policies.
//! 2. **Configuration:** Named parameters, JSON loading, and geometry validation.
//! 3. **Statistics:** Per-stream (instruction vs. data) accesses, misses, and traffic.
//! 4. **Simulation:** The `init -> access -> flush` lifecycle and trace input.
//!
//! No block contents are stored and no timing is modelled.

/// Common types (addresses, access types, errors, constants).
pub mod common;
/// Simulator configuration (defaults, policies, named parameters).
pub mod config;
/// Cache model (line store, recency lists, access engine).
pub mod core;
/// Simulation lifecycle and trace reading.
pub mod sim;
/// Statistics collection and reporting.
pub mod stats;

/// Access type of one trace event, and the statistics stream it belongs to.
pub use crate::common::{AccessType, Stream};
/// Root configuration type; use `CacheConfig::default()` or `CacheConfig::from_json`.
pub use crate::config::CacheConfig;
/// Simulation driver; construct with `Simulator::new` and call `init` before accessing.
pub use crate::sim::Simulator;
