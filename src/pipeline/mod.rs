//! Frame pipeline for continuous recognition.
//!
//! Each station runs in its own thread, connected by bounded crossbeam
//! channels for backpressure: source → session → sink.

mod error;
mod runner;
mod session_station;
mod sink;
mod station;
mod transcript;

pub use error::{ErrorReporter, LogReporter, StationError};
pub use runner::{Pipeline, PipelineConfig, PipelineHandle};
pub use session_station::SessionStation;
pub use sink::{CollectorSink, ResultSink, StdoutSink};
pub use station::{Station, StationRunner, StationStats};
pub use transcript::Transcript;
