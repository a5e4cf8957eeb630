//! Error types for respmachine
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::protocol::{ParseIntegerError, ProtocolError};

/// Result type alias using RespError
pub type Result<T> = std::result::Result<T, RespError>;

/// Unified error type for respmachine operations
#[derive(Debug, Error)]
pub enum RespError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Integer error: {0}")]
    Integer(#[from] ParseIntegerError),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
