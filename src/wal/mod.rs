//! Write-Ahead Transaction Log Module
//!
//! Records mutation intents durably and in a single total order.
//!
//! ## Responsibilities
//! - Accept mutations from many producers through a bounded queue
//! - Assign sequence ids at write time on a single writer thread
//! - Append one text line per event
//! - Replay the file in order after a restart
//!
//! The logger never touches the store. Applying replayed events is the
//! caller's job (see [`crate::ShardedStore::apply`]).
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ 1 \t 0 \t key \t value \n              │
//! │ 2 \t 1 \t key \t \n                    │
//! │ ...                                    │
//! └────────────────────────────────────────┘
//!   id    kind (0 = put, 1 = delete)
//! ```
//! No header, checksum or length prefix: corruption shows up as a line that
//! fails to decode or an id that does not increase.

mod event;
mod logger;
mod replay;
mod writer;

pub use event::{Event, EventKind, Mutation};
pub use logger::{LoggerState, LoggerStats, TransactionLogger};
pub use replay::Replay;
pub use writer::LogWriter;
