//! Reply encoding
//!
//! Stateless functions that append one framed value to an output buffer.
//! Any `BufMut` works, so replies can go straight into a `Vec<u8>` or the
//! `BytesMut` that is about to be written to the peer.
//!
//! ```text
//! +<text>\r\n            simple string
//! -<text>\r\n            error
//! :<integer>\r\n         integer
//! $<len>\r\n<bytes>\r\n  bulk string
//! $-1\r\n                null bulk string
//! *<count>\r\n           array header (elements follow)
//! *-1\r\n                null array
//! ```
//!
//! Payloads are not validated. Simple strings and errors must not contain
//! `\r\n`; bulk strings may contain anything.

use bytes::{BufMut, Bytes, BytesMut};

use super::integer::IntegerBuf;

pub const CRLF: &[u8] = b"\r\n";

const NULL_BULK: &[u8] = b"$-1\r\n";
const NULL_ARRAY: &[u8] = b"*-1\r\n";

// =============================================================================
// Append Functions
// =============================================================================

pub fn append_simple_string<B: BufMut>(buf: &mut B, s: &[u8]) {
    buf.put_u8(b'+');
    buf.put_slice(s);
    buf.put_slice(CRLF);
}

pub fn append_error<B: BufMut>(buf: &mut B, s: &[u8]) {
    buf.put_u8(b'-');
    buf.put_slice(s);
    buf.put_slice(CRLF);
}

pub fn append_integer<B: BufMut>(buf: &mut B, value: i64) {
    append_prefixed_integer(buf, b':', value);
}

pub fn append_bulk_string<B: BufMut>(buf: &mut B, payload: &[u8]) {
    append_prefixed_integer(buf, b'$', payload.len() as i64);
    buf.put_slice(payload);
    buf.put_slice(CRLF);
}

/// Frame an array header only; the caller appends `len` elements after it
pub fn append_array_length<B: BufMut>(buf: &mut B, len: i64) {
    append_prefixed_integer(buf, b'*', len);
}

pub fn append_null_bulk_string<B: BufMut>(buf: &mut B) {
    buf.put_slice(NULL_BULK);
}

pub fn append_null_array<B: BufMut>(buf: &mut B) {
    buf.put_slice(NULL_ARRAY);
}

fn append_prefixed_integer<B: BufMut>(buf: &mut B, prefix: u8, value: i64) {
    let mut digits = IntegerBuf::new();
    buf.put_u8(prefix);
    buf.put_slice(digits.format(value));
    buf.put_slice(CRLF);
}

/// Encode a command as a multi-bulk request
///
/// Format: `*<argc>\r\n` then `$<len>\r\n<arg>\r\n` per argument
pub fn encode_command<A: AsRef<[u8]>>(args: &[A]) -> Vec<u8> {
    let payload_len: usize = args.iter().map(|a| a.as_ref().len() + 32).sum();
    let mut message = Vec::with_capacity(16 + payload_len);

    append_array_length(&mut message, args.len() as i64);
    for arg in args {
        append_bulk_string(&mut message, arg.as_ref());
    }

    message
}

// =============================================================================
// Typed Replies
// =============================================================================

/// A reply to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    SimpleString(Bytes),
    Error(Bytes),
    Integer(i64),
    Bulk(Bytes),
    NullBulk,
    Array(Vec<Reply>),
    NullArray,
}

impl Reply {
    /// `+OK`
    pub fn ok() -> Self {
        Reply::SimpleString(Bytes::from_static(b"OK"))
    }

    /// An error reply carrying `message`
    pub fn error(message: &str) -> Self {
        Reply::Error(Bytes::copy_from_slice(message.as_bytes()))
    }

    pub fn bulk(payload: impl Into<Bytes>) -> Self {
        Reply::Bulk(payload.into())
    }

    /// Append the wire form of this reply (recursively for arrays)
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        match self {
            Reply::SimpleString(s) => append_simple_string(buf, s),
            Reply::Error(s) => append_error(buf, s),
            Reply::Integer(v) => append_integer(buf, *v),
            Reply::Bulk(payload) => append_bulk_string(buf, payload),
            Reply::NullBulk => append_null_bulk_string(buf),
            Reply::Array(items) => {
                append_array_length(buf, items.len() as i64);
                for item in items {
                    item.encode(buf);
                }
            }
            Reply::NullArray => append_null_array(buf),
        }
    }

    /// Encode into a fresh buffer
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }
}

impl From<i64> for Reply {
    fn from(value: i64) -> Self {
        Reply::Integer(value)
    }
}

impl From<Option<Bytes>> for Reply {
    fn from(value: Option<Bytes>) -> Self {
        match value {
            Some(payload) => Reply::Bulk(payload),
            None => Reply::NullBulk,
        }
    }
}
