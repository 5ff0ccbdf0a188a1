use std::io;
use thiserror::Error;

/// The primary error type for the `um25c-rs` library.
#[derive(Error, Debug)]
pub enum UmError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    #[error("Device link closed after {received} of {expected} frame bytes")]
    Disconnected { received: usize, expected: usize },

    #[error("Clock error: {0}")]
    Clock(String),

    #[error("Invalid sampling interval: {0} s (must be positive and finite)")]
    InvalidInterval(f64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid frame length: expected {expected} bytes, got {actual}")]
    FrameLength { expected: usize, actual: usize },

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Interrupted by shutdown request")]
    Interrupted,
}

impl UmError {
    /// Whether this error is a requested shutdown rather than a failure
    pub fn is_interrupted(&self) -> bool {
        matches!(self, UmError::Interrupted)
    }
}
