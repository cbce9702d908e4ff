pub mod batch;
pub mod config;
pub mod error;
pub mod executor;
pub mod lifecycle;

pub use error::{BatchError, BatchResult};
