//! Writing records to a byte stream.

use crate::Error;
use rmp_serde::Serializer;
use serde::Serialize;
use std::io::Write;

/// The encoding of records in the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// One JSON object per line.
    #[default]
    Json,
    /// Concatenated MessagePack maps.
    MessagePack,
}

/// Record writer.
pub struct Output<W: Write> {
    writer: W,
    format: Format,
    buf: Vec<u8>,
}

impl<W: Write> Output<W> {
    pub fn new(writer: W, format: Format) -> Self {
        Self {
            writer,
            format,
            buf: Vec::new(),
        }
    }

    /// Serializes a record and writes it out.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<(), Error> {
        self.buf.clear();
        match self.format {
            Format::Json => {
                serde_json::to_writer(&mut self.buf, record)
                    .map_err(|e| Error::InvalidMessage(Box::new(e)))?;
                self.buf.push(b'\n');
            }
            Format::MessagePack => {
                record
                    .serialize(&mut Serializer::new(&mut self.buf).with_struct_map())
                    .map_err(|e| Error::InvalidMessage(Box::new(e)))?;
            }
        }
        self.writer
            .write_all(&self.buf)
            .map_err(|e| Error::CannotWrite(Box::new(e)))
    }

    /// # Errors
    ///
    /// Returns an error if the underlying writer cannot be flushed.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.writer
            .flush()
            .map_err(|e| Error::CannotWrite(Box::new(e)))
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::{Format, Output};
    use crate::{rtmp, RtmpLog};

    const PLAY: &str = "2010-03-12\t23:51:21\tSEA4\t192.0.2.222\tplay\t3914\tOK\tbfd8a98bee0840d9b871b7f6ade9908f\trtmp://shqshne4jdp4b6.cloudfront.net/cfx/st\tkey=value\thttp://player.longtailvideo.com/player.swf\thttp://www.longtailvideo.com/support/jw-player-setup-wizard?example=204\tLNX%2010,0,32,18\tmyvideo\tp=2&q=4\tflv\t1";

    #[test]
    fn json_lines() {
        let log = rtmp::parse_line(PLAY).unwrap();
        let mut output = Output::new(Vec::new(), Format::Json);
        output.write(&log).unwrap();
        output.write(&log).unwrap();
        output.flush().unwrap();

        let text = String::from_utf8(output.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(
            r#"{"time":"2010-03-12T23:51:21Z","location":"SEA4","request_ip":"192.0.2.222","event_type":"play""#
        ));
        assert!(lines[0].ends_with(r#""stream_file_ext":"flv","stream_id":1}"#));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn message_pack() {
        let log = rtmp::parse_line(PLAY).unwrap();
        let mut output = Output::new(Vec::new(), Format::MessagePack);
        output.write(&log).unwrap();

        let buf = output.into_inner();
        let decoded: RtmpLog = rmp_serde::from_slice(&buf).unwrap();
        assert_eq!(decoded, log);
    }
}
