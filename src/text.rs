//! Reading lines as events from a text input.

use crate::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// A line without its terminator.
#[derive(Debug)]
pub struct Event {
    pub raw: String,
    pub line_no: u64,
}

impl crate::Event for Event {
    type Ack = u64;

    fn ack(&self) -> u64 {
        self.line_no
    }
}

/// Event reader for a text input.
pub struct Input<T: Read> {
    data_channel: Option<crossbeam_channel::Sender<Event>>,
    ack_channel: crossbeam_channel::Receiver<u64>,
    buf: BufReader<T>,
}

impl Input<File> {
    /// Creates a reader for the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn with_path<P: AsRef<Path>>(
        data_channel: crossbeam_channel::Sender<Event>,
        ack_channel: crossbeam_channel::Receiver<u64>,
        path: P,
    ) -> Result<Self, io::Error> {
        let file = File::open(path.as_ref())?;
        Ok(Self::with_read(data_channel, ack_channel, file))
    }
}

impl<T: Read> Input<T> {
    pub fn with_read(
        data_channel: crossbeam_channel::Sender<Event>,
        ack_channel: crossbeam_channel::Receiver<u64>,
        read: T,
    ) -> Self {
        Self {
            data_channel: Some(data_channel),
            ack_channel,
            buf: BufReader::new(read),
        }
    }
}

/// Reads the next line, stripping `\n` or `\r\n`. Invalid UTF-8 sequences are
/// replaced with U+FFFD.
fn read_line<T: Read>(
    reader: &mut BufReader<T>,
    buf: &mut Vec<u8>,
) -> Result<Option<String>, Error> {
    buf.clear();
    let bytes = reader
        .read_until(b'\n', buf)
        .map_err(|e| Error::CannotFetch(Box::new(e)))?;
    if bytes == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

impl<T: Read> super::Input for Input<T> {
    fn run(mut self) -> Result<(), Error> {
        let data_channel = if let Some(channel) = &self.data_channel {
            channel
        } else {
            return Err(Error::ChannelClosed);
        };

        let mut sel = crossbeam_channel::Select::new();
        let send_data = sel.send(data_channel);
        let recv_ack = sel.recv(&self.ack_channel);
        let mut line_no = 0;
        let mut buf = Vec::new();
        'poll: while let Some(line) = read_line(&mut self.buf, &mut buf)? {
            line_no += 1;
            loop {
                let oper = sel.select();
                match oper.index() {
                    i if i == send_data => {
                        let event = Event { raw: line, line_no };
                        if oper.send(data_channel, event).is_err() {
                            // data_channel was disconnected. Stop reading.
                            break 'poll;
                        }
                        break;
                    }
                    i if i == recv_ack => {
                        if oper.recv(&self.ack_channel).is_err() {
                            // ack_channel was disconnected. Stop reading.
                            break 'poll;
                        };
                    }
                    _ => unreachable!(),
                }
            }
        }
        self.data_channel = None;
        for _ in &self.ack_channel {}
        Ok(())
    }
}
