//! Parsers for Amazon CloudFront access logs.
//!
//! This crate turns lines of CloudFront's tab-separated access logs, for both
//! web and RTMP distributions, into typed records that can be serialized with
//! serde. It also provides a channel-based line reader and a record writer,
//! which `cflog2json` glues together.

pub mod convert;
mod field;
pub mod output;
pub mod rtmp;
pub mod text;
pub mod unescape;
pub mod web;

pub use rtmp::RtmpLog;
pub use unescape::{unescape, UnescapeError};
pub use web::WebLog;

use serde::Serialize;
use std::error;
use std::fmt;

/// A trait for a data source that sends events through a channel.
pub trait Input {
    /// Reads events until the source is exhausted or the data channel is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn run(self) -> Result<(), Error>;
}

/// A unit of data received from an [`Input`].
pub trait Event {
    type Ack;

    /// Returns the value to send back to the input once this event has been
    /// handled.
    fn ack(&self) -> Self::Ack;
}

/// A record of a CloudFront access log, parsed from a single line.
pub trait Record: Serialize + Sized {
    /// The kind of distribution the log comes from.
    const NAME: &'static str;

    /// Parses a line of the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the line has too few fields or any field is
    /// malformed. No partial record is returned.
    fn parse_line(line: &str) -> Result<Self, ParseError>;
}

/// The error type for event I/O operations.
#[derive(Debug)]
pub enum Error {
    /// The data channel was closed.
    ChannelClosed,
    /// Cannot read events from the source.
    CannotFetch(Box<dyn error::Error + Send + Sync>),
    /// Cannot write records to the destination.
    CannotWrite(Box<dyn error::Error + Send + Sync>),
    /// Cannot serialize a record.
    InvalidMessage(Box<dyn error::Error + Send + Sync>),
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::CannotFetch(e) | Self::CannotWrite(e) | Self::InvalidMessage(e) => {
                Some(e.as_ref())
            }
            Self::ChannelClosed => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelClosed => write!(f, "data channel closed"),
            Self::CannotFetch(e) => write!(f, "cannot read input: {}", e),
            Self::CannotWrite(e) => write!(f, "cannot write output: {}", e),
            Self::InvalidMessage(e) => write!(f, "cannot serialize record: {}", e),
        }
    }
}

/// The error type for parsing a log line.
#[derive(Debug)]
pub struct ParseError {
    kind: ParseErrorKind,
    line: String,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, line: &str) -> Self {
        Self {
            kind,
            line: line.to_string(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Returns the line that failed to parse.
    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }
}

impl error::Error for ParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ParseErrorKind::InsufficientFields { .. } => None,
            ParseErrorKind::InvalidEscape { source, .. } => Some(source),
            ParseErrorKind::InvalidField { source, .. } => Some(source.as_ref()),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.line)
    }
}

/// The reason a line failed to parse.
#[derive(Debug)]
pub enum ParseErrorKind {
    /// The line has fewer tab-separated fields than the format requires.
    InsufficientFields { expected: usize, found: usize },
    /// A string field contains a malformed escape sequence.
    InvalidEscape {
        field: &'static str,
        source: UnescapeError,
    },
    /// A timestamp, IP address or numeric field cannot be parsed.
    InvalidField {
        field: &'static str,
        value: String,
        source: Box<dyn error::Error + Send + Sync>,
    },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientFields { expected, found } => write!(
                f,
                "insufficient number of fields (expected {}, found {})",
                expected, found
            ),
            Self::InvalidEscape { field, source } => write!(f, "{} in {}", source, field),
            Self::InvalidField {
                field,
                value,
                source,
            } => write!(f, "invalid {} {:?}: {}", field, value, source),
        }
    }
}
