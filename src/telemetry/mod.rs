//! Process-wide logging and error tracking.

pub mod logger;
pub mod reporter;

pub use logger::JsonLogger;
pub use reporter::{init_reporter, ErrorReporter};
