//! Error types for talkify.
//!
//! Only configuration, I/O and contract violations are errors. Lost tracking,
//! missing models and wrong-hand gestures are normal pipeline states and are
//! reported through [`crate::session::Status`] instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TalkifyError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Classifier errors
    #[error("Classifier model not loaded: {model}")]
    ModelNotLoaded { model: String },

    #[error("Classifier inference failed: {message}")]
    Inference { message: String },

    // Contract violations between normalizer and classifier
    #[error("Feature shape mismatch: expected {expected} values, got {actual}")]
    FeatureShape { expected: usize, actual: usize },

    #[error("Classifier output shape mismatch: expected {expected} labels, got {actual}")]
    OutputShape { expected: usize, actual: usize },

    // Landmark source errors
    #[error("Invalid landmark trace at line {line}: {message}")]
    TraceParse { line: usize, message: String },

    // Pipeline errors
    #[error("Station '{station}' stopped: {message}")]
    StationFailed { station: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl TalkifyError {
    /// True for errors that indicate a normalizer/classifier version skew.
    ///
    /// These must stop the session rather than be folded into a status line.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            TalkifyError::FeatureShape { .. } | TalkifyError::OutputShape { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TalkifyError>;
