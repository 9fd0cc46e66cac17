pub mod outcome;
pub mod record;

pub use outcome::{Classification, Family, Outcome};
pub use record::{Envelope, RecordPayload};
