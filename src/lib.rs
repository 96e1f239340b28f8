//! talkify - gesture-to-text for fingerspelling and lip reading
//!
//! Turns per-frame hand or lip landmarks into stable text: landmarks are
//! normalized, classified, voted on over a sliding window and emitted once
//! consensus holds.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod heuristics;
pub mod landmark;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod source;
pub mod stabilizer;

// Composition root for the binary
#[cfg(feature = "cli")]
pub mod app;

// Core traits (source → session → sink)
pub use classify::Classifier;
pub use pipeline::{CollectorSink, ResultSink, StdoutSink};
pub use source::LandmarkSource;

// Sessions and results
pub use session::{Frame, PredictionResult, Session, Status};
pub use stabilizer::{Stabilizer, StabilizerConfig};

// Pipeline
pub use pipeline::{Pipeline, PipelineConfig, PipelineHandle};

// Error handling
pub use error::{Result, TalkifyError};

// Config
pub use config::Config;

// Station framework (for advanced users)
pub use pipeline::{ErrorReporter, Station, StationError};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
