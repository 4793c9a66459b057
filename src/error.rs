//! # Error Types
//!
//! Custom error types for MultiTx using `thiserror`.

use thiserror::Error;

/// Main error type for MultiTx
#[derive(Debug, Error)]
pub enum MultiTxError {
    /// Unknown or unsupported RF protocol id
    #[error("unsupported protocol id: {0}")]
    UnsupportedProtocol(u8),

    /// Unknown protocol family name (config-facing)
    #[error("unknown protocol family: {0:?} (expected \"d8\", \"d16\" or \"v8\")")]
    UnknownProtocolName(String),

    /// Channel index outside 0-15
    #[error("channel index {0} out of range (0-15)")]
    ChannelIndex(usize),

    /// Serial port errors
    #[error("serial port error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for MultiTx
pub type Result<T> = std::result::Result<T, MultiTxError>;
