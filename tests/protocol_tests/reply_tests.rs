//! Tests for reply encoding
//!
//! Exact wire bytes for every reply type, through both the append
//! functions and the typed `Reply`.

use bytes::{Bytes, BytesMut};
use respmachine::protocol::{
    append_array_length, append_bulk_string, append_error, append_integer,
    append_null_array, append_null_bulk_string, append_simple_string, encode_command, Reply,
};

// =============================================================================
// Append Function Tests
// =============================================================================

#[test]
fn test_append_simple_string() {
    let mut buf: Vec<u8> = Vec::new();
    append_simple_string(&mut buf, b"OK");
    assert_eq!(buf, b"+OK\r\n");
}

#[test]
fn test_append_error() {
    let mut buf: Vec<u8> = Vec::new();
    append_error(&mut buf, b"ERR unknown command");
    assert_eq!(buf, b"-ERR unknown command\r\n");
}

#[test]
fn test_append_integer() {
    let mut buf: Vec<u8> = Vec::new();
    append_integer(&mut buf, 1000);
    append_integer(&mut buf, -1);
    append_integer(&mut buf, 0);
    assert_eq!(buf, b":1000\r\n:-1\r\n:0\r\n");
}

#[test]
fn test_append_integer_extremes() {
    let mut buf: Vec<u8> = Vec::new();
    append_integer(&mut buf, i64::MIN);
    append_integer(&mut buf, i64::MAX);
    assert_eq!(
        buf,
        b":-9223372036854775808\r\n:9223372036854775807\r\n".to_vec()
    );
}

#[test]
fn test_append_bulk_string() {
    let mut buf: Vec<u8> = Vec::new();
    append_bulk_string(&mut buf, b"foobar");
    assert_eq!(buf, b"$6\r\nfoobar\r\n");
}

#[test]
fn test_append_bulk_string_empty() {
    let mut buf: Vec<u8> = Vec::new();
    append_bulk_string(&mut buf, b"");
    assert_eq!(buf, b"$0\r\n\r\n");
}

#[test]
fn test_append_bulk_string_binary() {
    // Embedded CRLF and non-UTF-8 bytes are legal: the length frames them
    let mut buf: Vec<u8> = Vec::new();
    append_bulk_string(&mut buf, b"a\r\n\xff");
    assert_eq!(buf, b"$4\r\na\r\n\xff\r\n");
}

#[test]
fn test_append_array_length() {
    let mut buf: Vec<u8> = Vec::new();
    append_array_length(&mut buf, 2);
    append_bulk_string(&mut buf, b"foo");
    append_bulk_string(&mut buf, b"bar");
    assert_eq!(buf, b"*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n");
}

#[test]
fn test_append_nulls() {
    let mut buf: Vec<u8> = Vec::new();
    append_null_bulk_string(&mut buf);
    append_null_array(&mut buf);
    assert_eq!(buf, b"$-1\r\n*-1\r\n");
}

#[test]
fn test_append_into_bytes_mut() {
    let mut buf = BytesMut::new();
    append_simple_string(&mut buf, b"PONG");
    append_integer(&mut buf, 42);
    assert_eq!(&buf[..], b"+PONG\r\n:42\r\n");
}

// =============================================================================
// Typed Reply Tests
// =============================================================================

#[test]
fn test_reply_constructors() {
    assert_eq!(Reply::ok().to_bytes(), Bytes::from_static(b"+OK\r\n"));
    assert_eq!(
        Reply::error("ERR wrong type").to_bytes(),
        Bytes::from_static(b"-ERR wrong type\r\n")
    );
    assert_eq!(
        Reply::bulk("hello").to_bytes(),
        Bytes::from_static(b"$5\r\nhello\r\n")
    );
}

#[test]
fn test_reply_nested_array() {
    let reply = Reply::Array(vec![
        Reply::Integer(1),
        Reply::Array(vec![Reply::bulk("a"), Reply::NullBulk]),
        Reply::NullArray,
    ]);

    assert_eq!(
        reply.to_bytes(),
        Bytes::from_static(b"*3\r\n:1\r\n*2\r\n$1\r\na\r\n$-1\r\n*-1\r\n")
    );
}

#[test]
fn test_reply_empty_array() {
    assert_eq!(Reply::Array(vec![]).to_bytes(), Bytes::from_static(b"*0\r\n"));
}

#[test]
fn test_reply_from_conversions() {
    assert_eq!(Reply::from(-3i64), Reply::Integer(-3));
    assert_eq!(Reply::from(None::<Bytes>), Reply::NullBulk);
    assert_eq!(
        Reply::from(Some(Bytes::from_static(b"v"))),
        Reply::Bulk(Bytes::from_static(b"v"))
    );
}

// =============================================================================
// Command Encoding Tests
// =============================================================================

#[test]
fn test_encode_command() {
    let encoded = encode_command(&["LLEN", "mylist"]);
    assert_eq!(encoded, b"*2\r\n$4\r\nLLEN\r\n$6\r\nmylist\r\n");
}

#[test]
fn test_encode_command_empty() {
    let args: [&[u8]; 0] = [];
    assert_eq!(encode_command(&args), b"*0\r\n");
}
