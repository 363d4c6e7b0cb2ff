//! Error types for onset analysis.

/// Errors that can occur while loading or analyzing a clip
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Processing failed at window {window}: {message}")]
    Processing { window: usize, message: String },
    #[error("Analysis cancelled after {windows_done} windows")]
    Cancelled { windows_done: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),
    #[error("Unsupported audio stream: {0}")]
    UnsupportedStream(String),
    #[error("Analysis worker panicked")]
    WorkerPanicked,
}

impl Error {
    pub(crate) fn processing(window: usize, message: impl Into<String>) -> Self {
        Error::Processing {
            window,
            message: message.into(),
        }
    }
}

/// Result type alias for analysis operations
pub type Result<T, E = Error> = std::result::Result<T, E>;
