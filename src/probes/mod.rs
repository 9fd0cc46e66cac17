pub mod api;
pub mod dns;
pub mod errors;
pub mod traits;

pub use errors::ProbeError;
pub use traits::Probe;
