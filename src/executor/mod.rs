mod models;
#[cfg(feature = "cli")]
mod printer;
#[cfg(feature = "cli")]
mod progress;
mod runner;
mod writer;

pub use models::{
    BatchSummary, ExecutionResult, Outcome, ResponseRecord, ResponseStatus, RunnerOptions,
    NO_RESPONSE_STATUS,
};
#[cfg(feature = "cli")]
pub use printer::{print_result_line, print_saved, print_summary};
#[cfg(feature = "cli")]
pub use progress::ConsoleProgress;
pub use runner::BatchRunner;
pub use writer::write_results;
