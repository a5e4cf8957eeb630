//! Protocol Module
//!
//! RESP request decoding and reply encoding.
//!
//! ## Request Formats
//! ```text
//! Inline:      <arg> <arg> ...\r\n            (\r optional)
//! Multi-bulk:  *<count>\r\n
//!              $<len>\r\n<bytes>\r\n          (count times)
//! ```
//!
//! ## Reply Formats
//! ```text
//! +<text>\r\n   -<text>\r\n   :<integer>\r\n
//! $<len>\r\n<bytes>\r\n   $-1\r\n   *<count>\r\n   *-1\r\n
//! ```
//!
//! ## Components
//! - `integer`: strict decimal <-> i64 codec (all lengths go through it)
//! - `reply`: stateless append functions and the typed `Reply`
//! - `decoder`: the resumable request state machine

mod integer;
mod status;
mod reply;
mod decoder;

pub use integer::{
    digits10, format_integer, parse_strict_integer, IntegerBuf, ParseIntegerError,
    MAX_INTEGER_LEN,
};
pub use status::{ProtocolError, RequestKind, Status};
pub use reply::{
    append_array_length, append_bulk_string, append_error, append_integer,
    append_null_array, append_null_bulk_string, append_simple_string, encode_command, Reply,
    CRLF,
};
pub use decoder::RequestDecoder;
