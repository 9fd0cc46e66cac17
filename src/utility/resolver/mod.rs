//! Resolver client
//!
//! Sends a single DNS query over UDP and classifies the response code. One
//! attempt per call, bounded by an explicit timeout; the caller decides what
//! a classification means for availability.

pub mod constants;
pub mod errors;
pub mod impls;
pub mod traits;
pub mod types;

pub use traits::ResolverClient;
pub use types::{QueryKind, UdpResolver};
