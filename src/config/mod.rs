//! Crate-wide configuration
//!
//! Tunables with a behavioral contract (cache precision, rate limits, TTLs)
//! live in [`constants`]; everything deployment-specific is resolved from the
//! environment in [`crate::bootstrap`].

pub mod constants;
