//! Probe cadence and the running/stopped lifecycle of the probe workers.

pub mod constants;
pub mod functions;
pub mod impls;
pub mod types;

pub use types::{Cadence, Scheduler};
