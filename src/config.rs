//! Configuration for respmachine
//!
//! Centralized configuration with sensible defaults.

use crate::error::{RespError, Result};

/// Main configuration for a decoder and the connection driving it
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Decoder Limits
    // -------------------------------------------------------------------------
    /// Max bytes buffered for an unterminated line: an inline request, a
    /// `*<count>` header or a `$<len>` header
    pub max_inline_len: usize,

    /// Max element count accepted in a `*<count>` header
    pub max_multibulk_len: usize,

    /// Max payload length accepted in a `$<len>` header (in bytes)
    pub max_bulk_len: usize,

    // -------------------------------------------------------------------------
    // Connection Configuration
    // -------------------------------------------------------------------------
    /// Bytes requested from the stream per read
    pub read_buffer_size: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_inline_len: 64 * 1024,          // 64 KB
            max_multibulk_len: 1024 * 1024,
            max_bulk_len: 512 * 1024 * 1024,    // 512 MB
            read_buffer_size: 16 * 1024,        // 16 KB
            read_timeout_ms: 0,
            write_timeout_ms: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that every limit is usable
    pub fn validate(&self) -> Result<()> {
        if self.read_buffer_size == 0 {
            return Err(RespError::Config(
                "read_buffer_size must be greater than zero".to_string(),
            ));
        }
        if self.max_inline_len == 0 {
            return Err(RespError::Config(
                "max_inline_len must be greater than zero".to_string(),
            ));
        }
        // Lengths are parsed as i64, anything larger is unreachable
        if self.max_bulk_len > i64::MAX as usize || self.max_multibulk_len > i64::MAX as usize {
            return Err(RespError::Config(format!(
                "length limits must not exceed {}",
                i64::MAX
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the inline request size limit (in bytes)
    pub fn max_inline_len(mut self, len: usize) -> Self {
        self.config.max_inline_len = len;
        self
    }

    /// Set the maximum multi-bulk element count
    pub fn max_multibulk_len(mut self, len: usize) -> Self {
        self.config.max_multibulk_len = len;
        self
    }

    /// Set the maximum bulk string length (in bytes)
    pub fn max_bulk_len(mut self, len: usize) -> Self {
        self.config.max_bulk_len = len;
        self
    }

    /// Set the per-read buffer size (in bytes)
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
