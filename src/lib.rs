//! # respmachine
//!
//! Incremental RESP request decoder and reply encoder:
//! - Resumable decoding of requests delivered in arbitrary chunks
//! - Inline and multi-bulk grammars, sniffed from the first byte
//! - Strict integer codec with exact i64 round-tripping
//! - Owned or zero-copy (`BytesMut`) arguments
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Connection (network)                     │
//! │           owns the receive buffer, reads the stream          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    RequestDecoder                            │
//! │          Init → Processing → Success | Error(_)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ lengths
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Integer   │◄─────────│    Reply    │
//!   │    codec    │          │   encoder   │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RespError, Result};
pub use config::Config;
pub use protocol::{ProtocolError, Reply, RequestDecoder, RequestKind, Status};
pub use network::Connection;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of respmachine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
