//! Tests for Connection
//!
//! These tests verify:
//! - Buffering across short reads
//! - Pipelined requests and clean EOF
//! - Protocol and EOF errors
//! - Request/reply flow through `serve`, in memory and over TCP

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use bytes::Bytes;
use respmachine::protocol::encode_command;
use respmachine::{Config, Connection, ProtocolError, Reply, RespError};

// =============================================================================
// Helper Functions
// =============================================================================

/// In-memory duplex stream that returns at most `chunk` bytes per read
struct MockStream {
    input: Vec<u8>,
    pos: usize,
    chunk: usize,
    output: Vec<u8>,
}

impl MockStream {
    fn new(input: &[u8], chunk: usize) -> Self {
        Self {
            input: input.to_vec(),
            pos: 0,
            chunk,
            output: Vec::new(),
        }
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.input.len() - self.pos);
        buf[..n].copy_from_slice(&self.input[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn connection(input: &[u8], chunk: usize) -> Connection<MockStream> {
    let config = Config::builder().read_buffer_size(chunk).build();
    Connection::new(MockStream::new(input, chunk), &config).unwrap()
}

fn strs(args: &[&str]) -> Vec<Bytes> {
    args.iter().map(|a| Bytes::copy_from_slice(a.as_bytes())).collect()
}

/// PING -> +PONG, ECHO x -> $x, anything else -> error
fn handler(args: Vec<Bytes>) -> Reply {
    match args.first().map(|a| &a[..]) {
        Some(b"PING") => Reply::SimpleString(Bytes::from_static(b"PONG")),
        Some(b"ECHO") if args.len() == 2 => Reply::Bulk(args[1].clone()),
        _ => Reply::error("ERR unknown command"),
    }
}

// =============================================================================
// Reading Tests
// =============================================================================

#[test]
fn test_read_pipelined_requests() {
    let mut input = encode_command(&["SET", "k", "v"]);
    input.extend_from_slice(b"GET k\r\n");
    let mut conn = connection(&input, 4096);

    assert_eq!(conn.read_request().unwrap(), Some(strs(&["SET", "k", "v"])));
    assert_eq!(conn.read_request().unwrap(), Some(strs(&["GET", "k"])));
    assert_eq!(conn.read_request().unwrap(), None);
}

#[test]
fn test_read_one_byte_at_a_time() {
    let mut input = encode_command(&["LPUSH", "list", "a\r\nb"]);
    input.extend_from_slice(b"LLEN list\n");
    let mut conn = connection(&input, 1);

    assert_eq!(
        conn.read_request().unwrap(),
        Some(strs(&["LPUSH", "list", "a\r\nb"]))
    );
    assert_eq!(conn.read_request().unwrap(), Some(strs(&["LLEN", "list"])));
    assert_eq!(conn.read_request().unwrap(), None);
}

#[test]
fn test_read_keeps_leftover_bytes() {
    let mut conn = connection(b"PING\r\nPI", 4096);

    assert_eq!(conn.read_request().unwrap(), Some(strs(&["PING"])));
    assert_eq!(conn.buffered(), b"PI");
}

#[test]
fn test_read_empty_stream() {
    let mut conn = connection(b"", 16);
    assert_eq!(conn.read_request().unwrap(), None);
}

#[test]
fn test_eof_mid_request() {
    let mut conn = connection(b"*2\r\n$3\r\nGET\r\n", 16);

    match conn.read_request() {
        Err(RespError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("Expected UnexpectedEof, got {:?}", other),
    }
}

#[test]
fn test_protocol_error() {
    let mut conn = connection(b"*1\r\n:1\r\n", 16);

    match conn.read_request() {
        Err(RespError::Protocol(e)) => assert_eq!(e, ProtocolError::MissingLengthPrefix),
        other => panic!("Expected protocol error, got {:?}", other),
    }
    assert!(conn.decoder().status().is_terminal());
}

#[test]
fn test_unterminated_count_line_is_bounded() {
    let mut input = b"*".to_vec();
    input.extend(std::iter::repeat(b'1').take(4096));
    let config = Config::builder()
        .max_inline_len(64)
        .read_buffer_size(16)
        .build();
    let mut conn = Connection::new(MockStream::new(&input, 16), &config).unwrap();

    match conn.read_request() {
        Err(RespError::Protocol(e)) => assert_eq!(e, ProtocolError::InvalidMultiBulkLength),
        other => panic!("Expected protocol error, got {:?}", other),
    }
    assert!(conn.buffered().len() <= 64 + 16);
}

#[test]
fn test_invalid_config_rejected() {
    let config = Config::builder().read_buffer_size(0).build();
    let result = Connection::new(MockStream::new(b"", 1), &config);

    assert!(matches!(result, Err(RespError::Config(_))));
}

// =============================================================================
// Serve Tests
// =============================================================================

#[test]
fn test_serve_replies_in_order() {
    let mut input = encode_command(&["PING"]);
    input.extend_from_slice(b"ECHO hi\r\nNOPE\r\n");
    let mut conn = connection(&input, 3);

    conn.serve(handler).unwrap();

    let stream = conn.into_inner();
    assert_eq!(
        stream.output,
        b"+PONG\r\n$2\r\nhi\r\n-ERR unknown command\r\n".to_vec()
    );
}

#[test]
fn test_serve_reports_protocol_error() {
    let mut conn = connection(b"PING\r\n*2\r\n$x\r\n", 64);

    let result = conn.serve(handler);
    assert!(matches!(
        result,
        Err(RespError::Protocol(ProtocolError::InvalidBulkLength))
    ));

    let stream = conn.into_inner();
    assert_eq!(
        stream.output,
        b"+PONG\r\n-ERR Protocol error: invalid bulk length\r\n".to_vec()
    );
}

#[test]
fn test_serve_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let config = Config::builder().read_timeout_ms(5000).build();
        let mut conn = Connection::from_tcp(stream, &config).unwrap();
        assert_ne!(conn.peer_addr(), "unknown");
        conn.serve(handler)
    });

    let mut client = TcpStream::connect(addr).unwrap();
    client.write_all(&encode_command(&["PING"])).unwrap();
    client.write_all(&encode_command(&["ECHO", "over tcp"])).unwrap();

    let expected = b"+PONG\r\n$8\r\nover tcp\r\n";
    let mut reply = vec![0u8; expected.len()];
    client.read_exact(&mut reply).unwrap();
    assert_eq!(reply, expected.to_vec());

    drop(client);
    server.join().unwrap().unwrap();
}
