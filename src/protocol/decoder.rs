//! Request decoder
//!
//! Resumable state machine that turns a byte stream, delivered in chunks of
//! any size, into one command's argument list per parse cycle.
//!
//! ## Grammars
//! The first byte of a cycle picks the grammar and it sticks until the cycle
//! ends:
//! - `*` selects multi-bulk: `*<count>\r\n` then `$<len>\r\n<bytes>\r\n` per element
//! - anything else selects inline: `<arg> <arg> ...\n` (optional `\r` before `\n`)
//!
//! ## Call Contract
//! Every call returns how many bytes at the front of the supplied buffer are
//! permanently consumed. The next call must be handed the unconsumed tail
//! with any newly received bytes appended after it. A consumed prefix is
//! never presented again.
//!
//! - `Processing`: more bytes are needed; call again with the tail.
//! - `Success`: `args()` holds the command. Bytes past the returned count
//!   belong to the next (pipelined) command; the next call starts a new cycle.
//! - `Error(_)`: returns 0 and the stream is desynchronized. Every further
//!   call is a no-op until `reset()`.
//!
//! ## Argument Ownership
//! `input` copies each argument into an owned [`Bytes`] as soon as it is
//! complete, so the caller's buffer may be moved or freed after any call.
//! `input_buf` is the zero-copy variant: it splits the consumed prefix off
//! the caller's [`BytesMut`] and hands out views into that frozen chunk.

use std::mem;
use std::ops::Range;

use bytes::{Bytes, BytesMut};
use memchr::{memchr, memchr_iter, memmem};

use crate::config::Config;
use super::integer::parse_strict_integer;
use super::status::{ProtocolError, RequestKind, Status};

/// Incremental decoder for one connection
#[derive(Debug, Clone)]
pub struct RequestDecoder {
    /// Observable state of the current cycle
    status: Status,

    /// Grammar of the current cycle (sniffed once)
    kind: RequestKind,

    /// Arguments in wire order
    args: Vec<Bytes>,

    /// Elements still to read; 0 = header not parsed yet, or all read
    pending_array_len: usize,

    /// Payload length of the element being read; None = header not parsed yet
    pending_bulk_len: Option<usize>,

    /// Argument ranges produced by the current call, relative to its buffer
    spans: Vec<Range<usize>>,

    max_inline_len: usize,
    max_multibulk_len: usize,
    max_bulk_len: usize,
}

impl RequestDecoder {
    /// Create a decoder with default limits
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Create a decoder using the limits in `config`
    pub fn with_config(config: &Config) -> Self {
        Self {
            status: Status::Init,
            kind: RequestKind::Unknown,
            args: Vec::new(),
            pending_array_len: 0,
            pending_bulk_len: None,
            spans: Vec::new(),
            max_inline_len: config.max_inline_len,
            max_multibulk_len: config.max_multibulk_len,
            max_bulk_len: config.max_bulk_len,
        }
    }

    // =========================================================================
    // Feeding
    // =========================================================================

    /// Feed `buf` and copy completed arguments out of it
    ///
    /// Returns the number of bytes consumed from the front of `buf`.
    pub fn input(&mut self, buf: &[u8]) -> usize {
        let consumed = self.step(buf);
        let spans = mem::take(&mut self.spans);
        self.args
            .extend(spans.iter().map(|span| Bytes::copy_from_slice(&buf[span.clone()])));
        self.recycle_spans(spans);
        consumed
    }

    /// Feed `buf` without copying arguments
    ///
    /// The consumed prefix is removed from `buf`; arguments share its
    /// allocation. Returns the number of bytes removed.
    pub fn input_buf(&mut self, buf: &mut BytesMut) -> usize {
        let consumed = self.step(&buf[..]);
        let spans = mem::take(&mut self.spans);
        if consumed > 0 {
            let chunk = buf.split_to(consumed).freeze();
            self.args
                .extend(spans.iter().map(|span| chunk.slice(span.clone())));
        }
        self.recycle_spans(spans);
        consumed
    }

    fn recycle_spans(&mut self, mut spans: Vec<Range<usize>>) {
        spans.clear();
        self.spans = spans;
    }

    /// Advance the state machine over `buf`, recording new argument ranges
    fn step(&mut self, buf: &[u8]) -> usize {
        // Empty input never touches state, not even a finished cycle
        let Some(&first) = buf.first() else {
            return 0;
        };

        match self.status {
            Status::Error(_) => return 0,
            Status::Success => self.reset(),
            Status::Init | Status::Processing => {}
        }
        self.status = Status::Processing;

        if self.kind == RequestKind::Unknown {
            self.kind = if first == b'*' {
                RequestKind::MultiBulk
            } else {
                RequestKind::Inline
            };
            tracing::trace!("New request cycle: {:?}", self.kind);
        }

        let consumed = if self.kind == RequestKind::MultiBulk {
            self.process_multibulk(buf)
        } else {
            self.process_inline(buf)
        };

        tracing::trace!(
            "Decoded {} of {} bytes, status {:?}",
            consumed,
            buf.len(),
            self.status
        );
        if self.status == Status::Success {
            tracing::debug!("Request complete: {} arguments", self.args.len() + self.spans.len());
        }

        consumed
    }

    // =========================================================================
    // Inline Grammar
    // =========================================================================

    fn process_inline(&mut self, buf: &[u8]) -> usize {
        let Some(newline) = memchr(b'\n', buf) else {
            if buf.len() > self.max_inline_len {
                return self.fail(ProtocolError::Generic("too big inline request"));
            }
            return 0;
        };

        let mut line = &buf[..newline];
        if let Some((&b'\r', rest)) = line.split_last() {
            line = rest;
        }

        // Single spaces separate arguments; runs of spaces give empty ones
        let mut start = 0;
        for space in memchr_iter(b' ', line) {
            self.spans.push(start..space);
            start = space + 1;
        }
        self.spans.push(start..line.len());

        self.status = Status::Success;
        newline + 1
    }

    // =========================================================================
    // Multi-Bulk Grammar
    // =========================================================================

    fn process_multibulk(&mut self, buf: &[u8]) -> usize {
        let mut consumed = 0;

        if self.pending_array_len == 0 {
            let Some(eol) = find_crlf(buf) else {
                // An unterminated count line may not grow past the inline limit
                if buf.len() > self.max_inline_len {
                    return self.fail(ProtocolError::InvalidMultiBulkLength);
                }
                return 0;
            };

            // Skip the '*'
            let count = match buf.get(1..eol).map(parse_strict_integer) {
                Some(Ok(count)) if count <= 0 || count as u64 <= self.max_multibulk_len as u64 => {
                    count
                }
                _ => return self.fail(ProtocolError::InvalidMultiBulkLength),
            };
            consumed = eol + 2;

            if count <= 0 {
                self.status = Status::Success;
                return consumed;
            }
            self.pending_array_len = count as usize;
        }

        while self.pending_array_len > 0 {
            let bulk_len = match self.pending_bulk_len {
                Some(len) => len,
                None => {
                    let rest = &buf[consumed..];
                    let Some(eol) = find_crlf(rest) else {
                        if rest.len() > self.max_inline_len {
                            return self.fail(ProtocolError::InvalidBulkLength);
                        }
                        return consumed;
                    };

                    let header = &rest[..eol];
                    let Some((&b'$', digits)) = header.split_first() else {
                        return self.fail(ProtocolError::MissingLengthPrefix);
                    };

                    let len = match parse_strict_integer(digits) {
                        Ok(len) if len >= 0 && len as u64 <= self.max_bulk_len as u64 => {
                            len as usize
                        }
                        _ => return self.fail(ProtocolError::InvalidBulkLength),
                    };

                    consumed += eol + 2;
                    self.pending_bulk_len = Some(len);
                    len
                }
            };

            // Payload plus trailing \r\n must be fully buffered
            if buf.len() - consumed < bulk_len.saturating_add(2) {
                break;
            }

            self.spans.push(consumed..consumed + bulk_len);
            consumed += bulk_len + 2;
            self.pending_bulk_len = None;
            self.pending_array_len -= 1;
        }

        if self.pending_array_len == 0 {
            self.status = Status::Success;
        }
        consumed
    }

    /// Enter a terminal error state, dropping everything parsed so far
    fn fail(&mut self, error: ProtocolError) -> usize {
        tracing::warn!("Protocol error in {:?} request: {}", self.kind, error);
        self.status = Status::Error(error);
        self.args.clear();
        self.spans.clear();
        0
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current status
    pub fn status(&self) -> Status {
        self.status
    }

    /// Grammar of the current cycle
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Arguments parsed so far, complete once status is `Success`
    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// Move the arguments out, leaving the list empty
    pub fn take_args(&mut self) -> Vec<Bytes> {
        mem::take(&mut self.args)
    }

    /// Multi-bulk elements still expected
    pub fn pending_array_len(&self) -> usize {
        self.pending_array_len
    }

    /// Payload length of the element being read, if its header is parsed
    pub fn pending_bulk_len(&self) -> Option<usize> {
        self.pending_bulk_len
    }

    /// Start a new cycle on the same connection
    pub fn reset(&mut self) {
        self.status = Status::Init;
        self.kind = RequestKind::Unknown;
        self.args.clear();
        self.pending_array_len = 0;
        self.pending_bulk_len = None;
        self.spans.clear();
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    memmem::find(buf, b"\r\n")
}
