//! Records of RTMP distribution logs.
//!
//! See [RTMP distribution log file format] for the meaning of each field.
//!
//! [RTMP distribution log file format]:
//! https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/AccessLogs.html

use crate::{field, ParseError, ParseErrorKind, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// The number of tab-separated fields in a line, with the date and the time
/// counted separately.
pub const FIELDS: usize = 17;

/// A record of an RTMP distribution log.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RtmpLog {
    pub time: DateTime<Utc>,
    pub location: String,
    pub request_ip: IpAddr,
    /// One of `connect`, `play`, `stop`, `pause`, `unpause`, `seek` and
    /// `disconnect`.
    pub event_type: String,
    pub bytes: u64,
    pub status: String,
    pub client_id: String,
    pub uri: String,
    pub query_string: String,
    pub referrer: String,
    pub page_url: String,
    pub user_agent: String,
    pub stream_name: String,
    pub stream_query: String,
    pub stream_file_ext: String,
    pub stream_id: u32,
}

impl Record for RtmpLog {
    const NAME: &'static str = "RTMP";

    fn parse_line(line: &str) -> Result<Self, ParseError> {
        parse_line(line)
    }
}

/// Parses a line of an RTMP distribution log.
///
/// # Errors
///
/// Returns an error if the line has fewer than [`FIELDS`] fields, or if any
/// field cannot be decoded into its type.
pub fn parse_line(line: &str) -> Result<RtmpLog, ParseError> {
    parse_fields(line).map_err(|kind| ParseError::new(kind, line))
}

fn parse_fields(line: &str) -> Result<RtmpLog, ParseErrorKind> {
    let f = field::split(line, FIELDS)?;
    Ok(RtmpLog {
        time: field::timestamp(f[0], f[1])?,
        location: field::string("location", f[2])?,
        request_ip: field::ip_addr("request_ip", f[3])?,
        event_type: field::string("event_type", f[4])?,
        bytes: field::number("bytes", f[5])?,
        status: field::string("status", f[6])?,
        client_id: field::string("client_id", f[7])?,
        uri: field::string("uri", f[8])?,
        query_string: field::string("query_string", f[9])?,
        referrer: field::string("referrer", f[10])?,
        page_url: field::string("page_url", f[11])?,
        user_agent: field::string("user_agent", f[12])?,
        stream_name: field::string("stream_name", f[13])?,
        stream_query: field::string("stream_query", f[14])?,
        stream_file_ext: field::string("stream_file_ext", f[15])?,
        stream_id: field::number("stream_id", f[16])?,
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_line, RtmpLog};
    use crate::ParseErrorKind;
    use chrono::{TimeZone, Utc};

    const CONNECT: &str = "2010-03-12\t23:51:20\tSEA4\t192.0.2.147\tconnect\t2014\tOK\tbfd8a98bee0840d9b871b7f6ade9908f\trtmp://shqshne4jdp4b6.cloudfront.net/cfx/st\tkey=value\thttp://player.longtailvideo.com/player.swf\thttp://www.longtailvideo.com/support/jw-player-setup-wizard?example=204\tLNX%2010,0,32,18\t-\t-\t-\t-";
    const PLAY: &str = "2010-03-12\t23:51:21\tSEA4\t192.0.2.222\tplay\t3914\tOK\tbfd8a98bee0840d9b871b7f6ade9908f\trtmp://shqshne4jdp4b6.cloudfront.net/cfx/st\tkey=value\thttp://player.longtailvideo.com/player.swf\thttp://www.longtailvideo.com/support/jw-player-setup-wizard?example=204\tLNX%2010,0,32,18\tmyvideo\tp=2&q=4\tflv\t1";

    #[test]
    fn connect() {
        assert_eq!(
            parse_line(CONNECT).unwrap(),
            RtmpLog {
                time: Utc.with_ymd_and_hms(2010, 3, 12, 23, 51, 20).unwrap(),
                location: "SEA4".into(),
                request_ip: "192.0.2.147".parse().unwrap(),
                event_type: "connect".into(),
                bytes: 2014,
                status: "OK".into(),
                client_id: "bfd8a98bee0840d9b871b7f6ade9908f".into(),
                uri: "rtmp://shqshne4jdp4b6.cloudfront.net/cfx/st".into(),
                query_string: "key=value".into(),
                referrer: "http://player.longtailvideo.com/player.swf".into(),
                page_url: "http://www.longtailvideo.com/support/jw-player-setup-wizard?example=204"
                    .into(),
                user_agent: "LNX 10,0,32,18".into(),
                stream_name: String::new(),
                stream_query: String::new(),
                stream_file_ext: String::new(),
                stream_id: 0,
            }
        );
    }

    #[test]
    fn play() {
        let log = parse_line(PLAY).unwrap();
        assert_eq!(log.event_type, "play");
        assert_eq!(log.bytes, 3914);
        assert_eq!(log.stream_name, "myvideo");
        assert_eq!(log.stream_query, "p=2&q=4");
        assert_eq!(log.stream_file_ext, "flv");
        assert_eq!(log.stream_id, 1);
    }

    #[test]
    fn json_keys() {
        let json = serde_json::to_value(parse_line(PLAY).unwrap()).unwrap();
        assert_eq!(json["time"], "2010-03-12T23:51:21Z");
        assert_eq!(json["request_ip"], "192.0.2.222");
        assert_eq!(json["page_url"], "http://www.longtailvideo.com/support/jw-player-setup-wizard?example=204");
        assert_eq!(json["stream_id"], 1);
        assert_eq!(json.as_object().unwrap().len(), 16);
    }

    #[test]
    fn insufficient_fields() {
        let (line, _) = CONNECT.rsplit_once('\t').unwrap();
        assert!(matches!(
            parse_line(line).unwrap_err().kind(),
            ParseErrorKind::InsufficientFields {
                expected: 17,
                found: 16
            }
        ));
    }

    #[test]
    fn web_line_is_rejected() {
        let line = "2014-05-23\t01:13:11\tFRA2\t182\t192.0.2.10\tGET\td111111abcdef8.cloudfront.net\t/view/my/file.html\t200\twww.displaymyfiles.com\tMozilla/4.0%20(compatible;%20MSIE%205.0b1;%20Mac_PowerPC)\t-\tzip=98101\tRefreshHit\tMRVMF7KydIvxMWfJIglgwHQwZsbG2IhRJ07sn9AkKUFSHS9EXAMPLE==\td111111abcdef8.cloudfront.net\thttp\t-\t0.001\t-\t-\t-\tRefreshHit\tHTTP/1.1\tProcessed\t1";
        match parse_line(line).unwrap_err().kind() {
            ParseErrorKind::InvalidField { field, value, .. } => {
                assert_eq!(*field, "request_ip");
                assert_eq!(value, "182");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn invalid_stream_id() {
        let line = PLAY.replace("\tflv\t1", "\tflv\tone");
        match parse_line(&line).unwrap_err().kind() {
            ParseErrorKind::InvalidField { field, .. } => assert_eq!(*field, "stream_id"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
