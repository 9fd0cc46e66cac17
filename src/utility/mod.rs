pub mod resolver;
pub mod signals;
