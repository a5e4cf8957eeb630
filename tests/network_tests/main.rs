//! Network Tests
//!
//! Connection buffering and request/reply flow over streams.

mod connection_tests;
