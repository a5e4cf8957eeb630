//! Connection Handler
//!
//! Drives a [`RequestDecoder`] from a byte stream and writes replies back.
//! The connection owns the receive buffer; the decoder never sees I/O.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use bytes::{Bytes, BytesMut};

use crate::config::Config;
use crate::error::{RespError, Result};
use crate::protocol::{Reply, RequestDecoder, Status};

/// One client connection: a stream, its receive buffer and its decoder
pub struct Connection<S> {
    /// Underlying stream (socket, pipe, file, ...)
    stream: S,

    /// Received bytes the decoder has not consumed yet
    buffer: BytesMut,

    /// Per-connection decoder, never shared
    decoder: RequestDecoder,

    /// Scratch space for encoding replies
    out: BytesMut,

    /// Bytes requested per read
    read_buffer_size: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl<S> Connection<S> {
    /// Wrap `stream` using the limits in `config`
    pub fn new(stream: S, config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            stream,
            buffer: BytesMut::with_capacity(config.read_buffer_size),
            decoder: RequestDecoder::with_config(config),
            out: BytesMut::new(),
            read_buffer_size: config.read_buffer_size,
            peer_addr: "stream".to_string(),
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// The decoder's view of the current cycle
    pub fn decoder(&self) -> &RequestDecoder {
        &self.decoder
    }

    /// Bytes received but not yet consumed (pipelined requests)
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl Connection<TcpStream> {
    /// Wrap a TCP stream, disabling Nagle and applying the configured timeouts
    pub fn from_tcp(stream: TcpStream, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        let mut connection = Self::new(stream, config)?;
        connection.peer_addr = peer_addr;
        Ok(connection)
    }
}

impl<S: Read> Connection<S> {
    /// Read the next complete command
    ///
    /// Returns `Ok(None)` when the stream ends cleanly between commands.
    /// Bytes after the command stay buffered for the next call.
    pub fn read_request(&mut self) -> Result<Option<Vec<Bytes>>> {
        loop {
            if !self.buffer.is_empty() {
                self.decoder.input_buf(&mut self.buffer);

                match self.decoder.status() {
                    Status::Success => {
                        let args = self.decoder.take_args();
                        self.decoder.reset();
                        tracing::trace!(
                            "Received {} arguments from {}",
                            args.len(),
                            self.peer_addr
                        );
                        return Ok(Some(args));
                    }
                    Status::Error(e) => {
                        tracing::warn!("Protocol error from {}: {}", self.peer_addr, e);
                        return Err(e.into());
                    }
                    Status::Init | Status::Processing => {}
                }
            }

            if self.fill_buffer()? == 0 {
                if self.buffer.is_empty() && self.decoder.status() == Status::Init {
                    return Ok(None);
                }
                return Err(RespError::Io(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "stream closed in the middle of a request",
                )));
            }
        }
    }

    /// Append one read's worth of bytes to the buffer
    fn fill_buffer(&mut self) -> Result<usize> {
        let start = self.buffer.len();
        self.buffer.resize(start + self.read_buffer_size, 0);

        let read = loop {
            match self.stream.read(&mut self.buffer[start..]) {
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                other => break other,
            }
        };

        match read {
            Ok(n) => {
                self.buffer.truncate(start + n);
                Ok(n)
            }
            Err(e) => {
                self.buffer.truncate(start);
                Err(e.into())
            }
        }
    }
}

impl<S: Write> Connection<S> {
    /// Encode and flush one reply
    pub fn write_reply(&mut self, reply: &Reply) -> Result<()> {
        self.out.clear();
        reply.encode(&mut self.out);
        self.stream.write_all(&self.out)?;
        self.stream.flush()?;
        Ok(())
    }
}

impl<S: Read + Write> Connection<S> {
    /// Serve requests until the client goes away
    ///
    /// `handler` maps each command's arguments to a reply. A protocol error
    /// is reported to the client and ends the connection.
    pub fn serve<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(Vec<Bytes>) -> Reply,
    {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let args = match self.read_request() {
                Ok(Some(args)) => args,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(RespError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} went away: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(RespError::Protocol(e)) => {
                    let _ = self.write_reply(&Reply::error(&format!("ERR Protocol error: {}", e)));
                    return Err(e.into());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            let reply = handler(args);

            if let Err(e) = self.write_reply(&reply) {
                if let RespError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before reply could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
    )
}
