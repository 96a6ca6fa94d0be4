//! Trace-driven cache simulator.
//!
//! Replays request traces through [`sieve_size::Cache`] under FIFO, SIEVE and
//! SIEVE-size at several window sizes, and reports hit and byte hit rates.

pub mod error;
pub mod generator;
pub mod input;
pub mod models;
pub mod runner;
pub mod stats;

pub use error::{Result, SimulatorError};
