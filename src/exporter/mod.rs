pub mod constants;
pub mod errors;
pub mod impls;
pub mod server;
pub mod types;

pub use types::{Exporter, ExpositionState};
