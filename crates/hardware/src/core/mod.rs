//! Cache model.
//!
//! Hardware units the simulator is built from. Only the cache itself is
//! modelled; backing storage is implicit.

/// Functional units (the set-associative cache).
pub mod units;
