//! Network Module
//!
//! Stream handling around the decoder.
//!
//! ## Architecture
//! - One `Connection` (and one decoder) per client
//! - The connection owns buffering; the decoder only parses
//! - Command execution is supplied by the caller of `serve`

mod connection;

pub use connection::Connection;
