//! Decoders for the fields of a log line.
//!
//! A field holding `-` has no value; it decodes to an empty string or zero,
//! except for the timestamp and the client IP address, which are always
//! present.

use crate::unescape::unescape;
use crate::ParseErrorKind;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

const PLACEHOLDER: &str = "-";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
// `9` stands for an ASCII digit.
const DATE_SHAPE: &str = "9999-99-99";
const TIME_SHAPE: &str = "99:99:99";

/// A field that parses as its type but is not allowed in a log.
#[derive(Debug)]
struct FormatError(&'static str);

impl error::Error for FormatError {}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Splits a line into tab-separated fields, requiring at least `expected`
/// of them.
pub(crate) fn split(line: &str, expected: usize) -> Result<Vec<&str>, ParseErrorKind> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < expected {
        return Err(ParseErrorKind::InsufficientFields {
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

pub(crate) fn string(field: &'static str, value: &str) -> Result<String, ParseErrorKind> {
    if value == PLACEHOLDER {
        return Ok(String::new());
    }
    unescape(value)
        .map(Cow::into_owned)
        .map_err(|source| ParseErrorKind::InvalidEscape { field, source })
}

/// Decodes an integer field, or a float through [`float`].
pub(crate) fn number<T>(field: &'static str, value: &str) -> Result<T, ParseErrorKind>
where
    T: FromStr + Default,
    T::Err: error::Error + Send + Sync + 'static,
{
    if value == PLACEHOLDER {
        return Ok(T::default());
    }
    value.parse().map_err(|e| invalid(field, value, e))
}

/// Decodes a floating-point field. `NaN` and infinities are rejected since
/// they have no JSON representation.
pub(crate) fn float(field: &'static str, value: &str) -> Result<f64, ParseErrorKind> {
    let n: f64 = number(field, value)?;
    if !n.is_finite() {
        return Err(invalid(field, value, FormatError("not a finite number")));
    }
    Ok(n)
}

/// Decodes the date and time fields, which are in UTC.
pub(crate) fn timestamp(date: &str, time: &str) -> Result<DateTime<Utc>, ParseErrorKind> {
    let value = format!("{} {}", date, time);
    if !has_shape(date, DATE_SHAPE) || !has_shape(time, TIME_SHAPE) {
        return Err(invalid(
            "time",
            &value,
            FormatError("expected YYYY-MM-DD HH:MM:SS"),
        ));
    }
    match NaiveDateTime::parse_from_str(&value, TIME_FORMAT) {
        Ok(t) => Ok(t.and_utc()),
        Err(e) => Err(invalid("time", &value, e)),
    }
}

fn has_shape(value: &str, shape: &str) -> bool {
    value.len() == shape.len()
        && value.bytes().zip(shape.bytes()).all(|(c, s)| match s {
            b'9' => c.is_ascii_digit(),
            _ => c == s,
        })
}

pub(crate) fn ip_addr(field: &'static str, value: &str) -> Result<IpAddr, ParseErrorKind> {
    value.parse().map_err(|e| invalid(field, value, e))
}

fn invalid<E>(field: &'static str, value: &str, source: E) -> ParseErrorKind
where
    E: error::Error + Send + Sync + 'static,
{
    ParseErrorKind::InvalidField {
        field,
        value: value.to_string(),
        source: Box::new(source),
    }
}
