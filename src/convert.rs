//! Converting lines of a log into serialized records.

use crate::output::Output;
use crate::{text, Error, Event, Record};
use log::warn;
use std::io::Write;
use std::ops::AddAssign;

/// Counts of lines handled by [`run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Lines written out as records.
    pub records: u64,
    /// Comment lines, which carry the log's version and field names.
    pub comments: u64,
    /// Lines that failed to parse.
    pub failures: u64,
}

impl AddAssign for Stats {
    fn add_assign(&mut self, other: Self) {
        self.records += other.records;
        self.comments += other.comments;
        self.failures += other.failures;
    }
}

#[must_use]
pub fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

/// Parses each line received from `data_rx` as a record of type `R` and
/// writes it to `output`, acknowledging every line through `ack_tx`.
///
/// Comment lines are skipped. A line that fails to parse is logged as a
/// warning, prefixed with `source` and its line number, and does not stop the
/// conversion.
///
/// # Errors
///
/// Returns an error if a record cannot be written to `output`.
pub fn run<R, W>(
    data_rx: crossbeam_channel::Receiver<text::Event>,
    ack_tx: crossbeam_channel::Sender<u64>,
    output: &mut Output<W>,
    source: &str,
) -> Result<Stats, Error>
where
    R: Record,
    W: Write,
{
    let mut stats = Stats::default();
    for ev in data_rx {
        if is_comment(&ev.raw) {
            stats.comments += 1;
        } else {
            match R::parse_line(&ev.raw) {
                Ok(record) => {
                    output.write(&record)?;
                    stats.records += 1;
                }
                Err(e) => {
                    warn!("{}:{}: {}", source, ev.line_no, e);
                    stats.failures += 1;
                }
            }
        }
        if ack_tx.send(ev.ack()).is_err() {
            // The input stopped waiting for acks. Keep what has been
            // converted so far.
            break;
        }
    }
    Ok(stats)
}
