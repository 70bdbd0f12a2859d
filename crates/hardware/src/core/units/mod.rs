//! Functional units.

/// Set-associative cache with LRU replacement.
pub mod cache;
