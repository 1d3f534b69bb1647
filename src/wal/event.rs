//! Log event definitions
//!
//! Defines the mutation record and its line encoding:
//!
//! ```text
//! <id> \t <kind> \t <key> \t <value>
//! ```
//!
//! `kind` is `0` for Put and `1` for Delete. Fields are not escaped, so a
//! key or value must not contain a tab or a line break. The logger rejects
//! such fields before they reach the file (see [`Event::check_field`]).

use std::fmt;
use std::str::FromStr;

use crate::error::{KvError, Result};

const FIELD_SEPARATOR: char = '\t';
const FIELD_COUNT: usize = 4;

/// Kind of mutation recorded by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Put,
    Delete,
}

impl EventKind {
    /// Integer written to the log for this kind
    pub fn code(self) -> u8 {
        match self {
            EventKind::Put => 0,
            EventKind::Delete => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(EventKind::Put),
            1 => Some(EventKind::Delete),
            _ => None,
        }
    }
}

/// A single committed entry of the transaction log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Sequence id, strictly increasing in file order
    pub id: u64,

    pub kind: EventKind,

    pub key: String,

    /// Empty (and ignored) for deletes
    pub value: String,
}

impl Event {
    pub fn put(id: u64, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id,
            kind: EventKind::Put,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(id: u64, key: impl Into<String>) -> Self {
        Self {
            id,
            kind: EventKind::Delete,
            key: key.into(),
            value: String::new(),
        }
    }

    /// Encode as a single log line, without the trailing newline
    pub fn encode(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}{sep}{}",
            self.id,
            self.kind.code(),
            self.key,
            self.value,
            sep = FIELD_SEPARATOR
        )
    }

    /// Decode a log line (without its newline)
    pub fn decode(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() != FIELD_COUNT {
            return Err(KvError::MalformedRecord(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            )));
        }

        let id = parse_decimal::<u64>(fields[0])
            .ok_or_else(|| KvError::MalformedRecord(format!("bad id {:?}", fields[0])))?;

        let kind = parse_decimal::<u8>(fields[1])
            .and_then(EventKind::from_code)
            .ok_or_else(|| KvError::MalformedRecord(format!("bad kind {:?}", fields[1])))?;

        Ok(Self {
            id,
            kind,
            key: fields[2].to_string(),
            value: fields[3].to_string(),
        })
    }

    /// Reject a key or value that the line format cannot carry
    pub fn check_field(field: &'static str, text: &str) -> Result<()> {
        if text.contains(['\t', '\n']) {
            return Err(KvError::InvalidField { field });
        }
        Ok(())
    }
}

/// Parse a number only in the form `encode` writes it: ASCII digits, no sign,
/// no leading zero.
fn parse_decimal<T: FromStr>(text: &str) -> Option<T> {
    let digits = !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
    if !digits || (text.len() > 1 && text.starts_with('0')) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// A mutation waiting in the submission queue.
///
/// It has no id yet: the log writer assigns one when it dequeues the
/// mutation, which keeps id order identical to file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Put { key: String, value: String },
    Delete { key: String },
}

impl Mutation {
    /// Attach the id assigned at write time
    pub fn into_event(self, id: u64) -> Event {
        match self {
            Mutation::Put { key, value } => Event::put(id, key, value),
            Mutation::Delete { key } => Event::delete(id, key),
        }
    }
}
