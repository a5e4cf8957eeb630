//! Strict integer codec
//!
//! Decimal text <-> `i64` conversion used for every length and integer on
//! the wire.
//!
//! Parsing only accepts the canonical form: an optional `-`, then either a
//! lone `0` or a digit 1-9 followed by any digits. No whitespace, no `+`, no
//! leading zeros, no `-0`. Anything accepted here formats back to the exact
//! same bytes, which the length-prefixed framing relies on.

use thiserror::Error;

/// Longest formatted `i64`: `-9223372036854775808`
pub const MAX_INTEGER_LEN: usize = 20;

/// Two-digit lookup table: "00", "01", ... "99"
const DIGIT_PAIRS: &[u8; 200] = b"\
0001020304050607080910111213141516171819\
2021222324252627282930313233343536373839\
4041424344454647484950515253545556575859\
6061626364656667686970717273747576777879\
8081828384858687888990919293949596979899";

/// Reasons a byte string is not a strict integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseIntegerError {
    #[error("no digits")]
    Empty,

    #[error("leading zero")]
    LeadingZero,

    #[error("invalid digit")]
    InvalidDigit,

    #[error("value out of 64-bit signed range")]
    Overflow,
}

/// Parse `text` as a strict decimal `i64`
pub fn parse_strict_integer(text: &[u8]) -> Result<i64, ParseIntegerError> {
    if text == b"0" {
        return Ok(0);
    }

    let (negative, digits) = match text.split_first() {
        None => return Err(ParseIntegerError::Empty),
        Some((&b'-', rest)) => (true, rest),
        Some(_) => (false, text),
    };

    let (&lead, rest) = digits.split_first().ok_or(ParseIntegerError::Empty)?;
    let mut magnitude = match lead {
        b'1'..=b'9' => u64::from(lead - b'0'),
        b'0' => return Err(ParseIntegerError::LeadingZero),
        _ => return Err(ParseIntegerError::InvalidDigit),
    };

    for &byte in rest {
        if !byte.is_ascii_digit() {
            return Err(ParseIntegerError::InvalidDigit);
        }
        magnitude = magnitude
            .checked_mul(10)
            .and_then(|m| m.checked_add(u64::from(byte - b'0')))
            .ok_or(ParseIntegerError::Overflow)?;
    }

    if negative {
        // |i64::MIN| is one past i64::MAX, so the check happens in u64
        if magnitude > i64::MIN.unsigned_abs() {
            return Err(ParseIntegerError::Overflow);
        }
        Ok((magnitude as i64).wrapping_neg())
    } else {
        i64::try_from(magnitude).map_err(|_| ParseIntegerError::Overflow)
    }
}

/// Number of decimal digits in `v`
pub fn digits10(v: u64) -> usize {
    if v < 10 {
        return 1;
    }
    if v < 100 {
        return 2;
    }
    if v < 1_000 {
        return 3;
    }
    if v < 1_000_000_000_000 {
        if v < 100_000_000 {
            if v < 1_000_000 {
                if v < 10_000 {
                    return 4;
                }
                return 5 + usize::from(v >= 100_000);
            }
            return 7 + usize::from(v >= 10_000_000);
        }
        if v < 10_000_000_000 {
            return 9 + usize::from(v >= 1_000_000_000);
        }
        return 11 + usize::from(v >= 100_000_000_000);
    }
    12 + digits10(v / 1_000_000_000_000)
}

/// Format `value` into the front of `dst`
///
/// Returns the number of bytes written, or `None` if `dst` is too small.
pub fn format_integer(dst: &mut [u8], value: i64) -> Option<usize> {
    let length = formatted_len(value);
    if length > dst.len() {
        return None;
    }
    write_digits(&mut dst[..length], value);
    Some(length)
}

fn formatted_len(value: i64) -> usize {
    digits10(value.unsigned_abs()) + usize::from(value < 0)
}

/// Fill `dst` (exactly `formatted_len(value)` bytes) from the right
fn write_digits(dst: &mut [u8], value: i64) {
    // unsigned_abs widens i64::MIN without overflowing
    let mut v = value.unsigned_abs();
    let mut next = dst.len() - 1;

    while v >= 100 {
        let i = (v % 100) as usize * 2;
        v /= 100;
        dst[next] = DIGIT_PAIRS[i + 1];
        dst[next - 1] = DIGIT_PAIRS[i];
        next -= 2;
    }

    if v < 10 {
        dst[next] = b'0' + v as u8;
    } else {
        let i = v as usize * 2;
        dst[next] = DIGIT_PAIRS[i + 1];
        dst[next - 1] = DIGIT_PAIRS[i];
    }

    if value < 0 {
        dst[0] = b'-';
    }
}

/// Stack buffer that always fits a formatted `i64`
#[derive(Debug, Clone, Copy)]
pub struct IntegerBuf {
    bytes: [u8; MAX_INTEGER_LEN],
}

impl IntegerBuf {
    pub fn new() -> Self {
        Self {
            bytes: [0; MAX_INTEGER_LEN],
        }
    }

    /// Format `value` and borrow the digits
    pub fn format(&mut self, value: i64) -> &[u8] {
        let length = formatted_len(value);
        write_digits(&mut self.bytes[..length], value);
        &self.bytes[..length]
    }
}

impl Default for IntegerBuf {
    fn default() -> Self {
        Self::new()
    }
}
