//! Log Replay
//!
//! Reads events back from the log file in file order.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};

use tracing::{debug, warn};

use crate::error::{KvError, Result};

use super::{Event, LogWriter};

/// Lazy, single-pass iterator over the events of a log file.
///
/// Every id must be greater than the highest id seen so far by the owning
/// logger, and every line must end with a newline. The first malformed line
/// or out-of-order id is yielded as an error and ends the iteration; events
/// yielded before it stay valid.
pub struct Replay<'a> {
    reader: BufReader<File>,

    /// The owning writer, told about every accepted event
    writer: &'a mut LogWriter,

    line: String,
    line_no: u64,
    replayed: u64,
    finished: bool,
}

impl<'a> Replay<'a> {
    /// `file` must already be positioned at the first byte not yet replayed
    pub(crate) fn new(file: File, writer: &'a mut LogWriter) -> Self {
        Self {
            reader: BufReader::new(file),
            writer,
            line: String::new(),
            line_no: 0,
            replayed: 0,
            finished: false,
        }
    }

    /// Number of events yielded so far
    pub fn events_replayed(&self) -> u64 {
        self.replayed
    }

    /// Highest id accepted so far
    pub fn last_id(&self) -> Option<u64> {
        self.writer.last_id()
    }

    fn read_event(&mut self) -> Option<Result<Event>> {
        self.line.clear();
        let len = match self.reader.read_line(&mut self.line) {
            Ok(0) => {
                debug!(events = self.replayed, last_id = ?self.writer.last_id(), "replay reached end of log");
                return None;
            }
            Ok(len) => len as u64,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Some(Err(KvError::MalformedRecord(format!(
                    "line {} is not valid UTF-8",
                    self.line_no + 1
                ))));
            }
            Err(e) => return Some(Err(e.into())),
        };
        self.line_no += 1;

        // A torn tail must not be appended to
        let Some(text) = self.line.strip_suffix('\n') else {
            return Some(Err(KvError::MalformedRecord(format!(
                "line {} is not terminated by a newline",
                self.line_no
            ))));
        };
        let event = match Event::decode(text) {
            Ok(event) => event,
            Err(e) => return Some(Err(e)),
        };

        if let Some(last) = self.writer.last_id() {
            if event.id <= last {
                return Some(Err(KvError::OutOfOrder {
                    last,
                    found: event.id,
                }));
            }
        }

        self.writer.accept_replayed(event.id, len);
        self.replayed += 1;
        Some(Ok(event))
    }
}

impl Iterator for Replay<'_> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let item = self.read_event();
        match &item {
            None => self.finished = true,
            Some(Err(e)) => {
                warn!(line = self.line_no, error = %e, "replay stopped");
                self.finished = true;
            }
            Some(Ok(_)) => {}
        }
        item
    }
}
