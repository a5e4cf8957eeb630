//! Protocol Tests
//!
//! Integer codec, reply encoding and request decoding.

mod reply_tests;
