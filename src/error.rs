use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a whole run. Per-request failures never surface here;
/// they are recorded inside the matching [`crate::executor::ExecutionResult`].
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("The JSON file must contain an array of requests (found {found})")]
    InvalidInputShape { found: &'static str },

    #[error("reading request file {}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing request file {}", path.display())]
    ParseInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("writing responses to {}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encoding responses")]
    Encode(#[from] serde_json::Error),
}

pub type BatchResult<T> = Result<T, BatchError>;
