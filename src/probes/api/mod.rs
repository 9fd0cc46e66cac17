pub mod constants;
pub mod errors;
pub mod functions;
pub mod impls;
pub mod types;

pub use functions::prime_datastore;
pub use types::LifecycleProbe;
