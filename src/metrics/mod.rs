pub mod constants;
pub mod health;
pub mod impls;
pub mod types;

pub use health::HealthReport;
pub use types::{Aggregator, FamilySnapshot, MetricsSnapshot};
