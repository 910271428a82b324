//! Decoding percent-escaped values in CloudFront log fields.
//!
//! CloudFront percent-encodes field values before writing them to a log, and
//! it encodes space, double quote and backslash twice. For example, a space
//! appears as `%2520` rather than `%20`. See [Web distribution log file
//! format] for details.
//!
//! [Web distribution log file format]:
//! https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/AccessLogs.html

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    combinator::{map, value},
    sequence::preceded,
    IResult, Parser,
};
use std::borrow::Cow;
use std::error;
use std::fmt;

/// The error type for a malformed escape sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnescapeError {
    fragment: String,
}

impl UnescapeError {
    /// Returns the offending sequence starting at its `%`. It is at most three
    /// bytes long, and shorter if the value ends early.
    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

impl error::Error for UnescapeError {}

impl fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid escape sequence {:?}", self.fragment)
    }
}

/// Decodes a field value.
///
/// Every `%` must be followed by two hexadecimal digits. `%2520`, `%2522` and
/// `%255C` decode to a single space, double quote and backslash,
/// respectively; any other `%XX` decodes to the byte `0xXX`. Decoded bytes
/// that are not valid UTF-8 are replaced with U+FFFD.
///
/// A value without `%` is returned as is, without allocation.
///
/// # Errors
///
/// Returns an error if a `%` is not followed by two hexadecimal digits.
pub fn unescape(s: &str) -> Result<Cow<'_, str>, UnescapeError> {
    if !s.contains('%') {
        return Ok(Cow::Borrowed(s));
    }

    let mut input = s.as_bytes();
    let mut buf = Vec::with_capacity(input.len());
    while let Some(pos) = input.iter().position(|&c| c == b'%') {
        buf.extend_from_slice(&input[..pos]);
        input = &input[pos..];
        match escape_sequence(input) {
            Ok((rest, byte)) => {
                buf.push(byte);
                input = rest;
            }
            Err(_) => {
                let end = input.len().min(3);
                return Err(UnescapeError {
                    fragment: String::from_utf8_lossy(&input[..end]).into_owned(),
                });
            }
        }
    }
    buf.extend_from_slice(input);

    let decoded = match String::from_utf8(buf) {
        Ok(decoded) => decoded,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    Ok(Cow::Owned(decoded))
}

/// Recognizes one escape sequence at the beginning of `input`.
fn escape_sequence(input: &[u8]) -> IResult<&[u8], u8> {
    alt((
        value(b' ', tag(&b"%2520"[..])),
        value(b'"', tag(&b"%2522"[..])),
        value(b'\\', tag(&b"%255C"[..])),
        preceded(
            tag(&b"%"[..]),
            map(
                take_while_m_n(2, 2, |c: u8| c.is_ascii_hexdigit()),
                hex_value,
            ),
        ),
    ))
    .parse(input)
}

fn hex_value(digits: &[u8]) -> u8 {
    digits.iter().fold(0, |acc, &d| (acc << 4) | nibble(d))
}

fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}
