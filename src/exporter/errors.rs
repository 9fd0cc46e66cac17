// 3rd party crates
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpositionError {
    #[error("Failed to bind metrics endpoint on {target}: {source}")]
    Bind {
        target: String,
        source: std::io::Error,
    },

    #[error("Metrics endpoint stopped with error: {0}")]
    Serve(std::io::Error),
}
