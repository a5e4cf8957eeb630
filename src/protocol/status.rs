//! Decoder status definitions
//!
//! Observable state of a [`RequestDecoder`](super::RequestDecoder) after each call.

use thiserror::Error;

/// Framing errors that end a parse cycle
///
/// Once one of these is reported the byte offset of the next command is
/// unknown, so the connection should be dropped rather than resynchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("{0}")]
    Generic(&'static str),

    /// The `*<count>` header is not a strict integer (or exceeds the limit)
    #[error("invalid multibulk length")]
    InvalidMultiBulkLength,

    /// An element header does not start with `$`
    #[error("expected '$' length prefix")]
    MissingLengthPrefix,

    /// An element's `$<len>` is not a strict non-negative integer (or exceeds the limit)
    #[error("invalid bulk length")]
    InvalidBulkLength,
}

/// Decoder status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Fresh or reset, nothing fed yet
    Init,

    /// Part of a command has been seen, more bytes are needed
    Processing,

    /// A full command is available from `args()`
    Success,

    /// Terminal until `reset()`
    Error(ProtocolError),
}

impl Status {
    /// Success or error: the current cycle is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Success | Status::Error(_))
    }

    pub fn error(&self) -> Option<ProtocolError> {
        match self {
            Status::Error(e) => Some(*e),
            _ => None,
        }
    }
}

/// Grammar picked by the first byte of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Not sniffed yet
    Unknown,

    /// `<arg> <arg> ...\n`
    Inline,

    /// `*<count>\r\n` followed by `$<len>\r\n<bytes>\r\n` elements
    MultiBulk,
}
