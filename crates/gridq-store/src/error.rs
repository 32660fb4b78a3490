//! Error types for the backing store

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the backing store
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fjall storage error
    #[error("storage error: {0}")]
    Fjall(#[from] fjall::Error),

    /// I/O error
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding/decoding error
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
