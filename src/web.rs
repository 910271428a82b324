//! Records of web distribution logs.
//!
//! See [Web distribution log file format] for the meaning of each field. Field
//! names follow the table definition in [Querying Amazon CloudFront logs].
//!
//! [Web distribution log file format]:
//! https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/AccessLogs.html
//! [Querying Amazon CloudFront logs]:
//! https://docs.aws.amazon.com/athena/latest/ug/cloudfront-logs.html

use crate::{field, ParseError, ParseErrorKind, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// The number of tab-separated fields in a line, with the date and the time
/// counted separately.
pub const FIELDS: usize = 26;

/// A record of a web distribution log.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WebLog {
    pub time: DateTime<Utc>,
    pub location: String,
    pub bytes: u64,
    pub request_ip: IpAddr,
    pub method: String,
    pub host: String,
    pub uri: String,
    pub status: u16,
    pub referrer: String,
    pub user_agent: String,
    pub query_string: String,
    pub cookie: String,
    pub result_type: String,
    pub request_id: String,
    pub host_header: String,
    pub request_protocol: String,
    pub request_bytes: u64,
    pub time_taken: f64,
    pub xforwarded_for: String,
    pub ssl_protocol: String,
    pub ssl_cipher: String,
    pub response_result_type: String,
    pub http_version: String,
    pub fle_status: String,
    pub fle_encrypted_fields: u32,
}

impl Record for WebLog {
    const NAME: &'static str = "web";

    fn parse_line(line: &str) -> Result<Self, ParseError> {
        parse_line(line)
    }
}

/// Parses a line of a web distribution log.
///
/// # Errors
///
/// Returns an error if the line has fewer than [`FIELDS`] fields, or if any
/// field cannot be decoded into its type.
pub fn parse_line(line: &str) -> Result<WebLog, ParseError> {
    parse_fields(line).map_err(|kind| ParseError::new(kind, line))
}

fn parse_fields(line: &str) -> Result<WebLog, ParseErrorKind> {
    let f = field::split(line, FIELDS)?;
    Ok(WebLog {
        time: field::timestamp(f[0], f[1])?,
        location: field::string("location", f[2])?,
        bytes: field::number("bytes", f[3])?,
        request_ip: field::ip_addr("request_ip", f[4])?,
        method: field::string("method", f[5])?,
        host: field::string("host", f[6])?,
        uri: field::string("uri", f[7])?,
        status: field::number("status", f[8])?,
        referrer: field::string("referrer", f[9])?,
        user_agent: field::string("user_agent", f[10])?,
        query_string: field::string("query_string", f[11])?,
        cookie: field::string("cookie", f[12])?,
        result_type: field::string("result_type", f[13])?,
        request_id: field::string("request_id", f[14])?,
        host_header: field::string("host_header", f[15])?,
        request_protocol: field::string("request_protocol", f[16])?,
        request_bytes: field::number("request_bytes", f[17])?,
        time_taken: field::float("time_taken", f[18])?,
        xforwarded_for: field::string("xforwarded_for", f[19])?,
        ssl_protocol: field::string("ssl_protocol", f[20])?,
        ssl_cipher: field::string("ssl_cipher", f[21])?,
        response_result_type: field::string("response_result_type", f[22])?,
        http_version: field::string("http_version", f[23])?,
        fle_status: field::string("fle_status", f[24])?,
        fle_encrypted_fields: field::number("fle_encrypted_fields", f[25])?,
    })
}
