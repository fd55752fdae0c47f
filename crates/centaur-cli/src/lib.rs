//! Support library for the `centaur` binary.
//!
//! Holds the layered configuration so it can be tested without spawning
//! the binary.

pub mod config;
