mod loader;
mod model;

pub use loader::{load, read_request_file};
pub use model::RequestDescriptor;
