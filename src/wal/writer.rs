//! Log Writer
//!
//! Appends committed events to the log file. Owned by the logger's single
//! consumer thread once the logger is running.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::config::SyncStrategy;
use crate::error::{KvError, Result};

use super::{Event, Mutation};

/// Open the log for reading and appending, creating it if absent
pub(crate) fn open_log_file(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).append(true).create(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    options.open(path).map_err(|source| KvError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes events to the log file, assigning ids as it goes
pub struct LogWriter {
    file: File,

    /// Highest id written or replayed; `None` until one is seen
    last_id: Option<u64>,

    /// Bytes at the head of the file that replay accepted as whole events
    replayed_len: u64,

    sync_strategy: SyncStrategy,

    /// Lines written since the last fsync
    unsynced: usize,
}

impl LogWriter {
    /// Open or create a log file for appending
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        Ok(Self::from_file(open_log_file(path)?, sync_strategy))
    }

    pub(crate) fn from_file(file: File, sync_strategy: SyncStrategy) -> Self {
        Self {
            file,
            last_id: None,
            replayed_len: 0,
            sync_strategy,
            unsynced: 0,
        }
    }

    /// Assign the next id to `mutation` and append it as one line.
    ///
    /// The line goes out in a single `write_all`, so a failed append never
    /// leaves a line that looks complete.
    pub fn append(&mut self, mutation: Mutation) -> Result<Event> {
        let id = self.next_id()?;
        let event = mutation.into_event(id);

        let mut line = event.encode();
        line.push('\n');
        self.file.write_all(line.as_bytes())?;

        self.last_id = Some(id);
        self.unsynced += 1;

        let due = match self.sync_strategy {
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNEntries { count } => self.unsynced >= count,
            SyncStrategy::OsBuffered => false,
        };
        if due {
            self.sync()?;
        }

        Ok(event)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Highest id this writer has written or been told about by replay
    pub fn last_id(&self) -> Option<u64> {
        self.last_id
    }

    /// Lines written but not yet fsynced
    pub fn unsynced_count(&self) -> usize {
        self.unsynced
    }

    /// Record an event accepted by replay. `len` counts its newline.
    pub(crate) fn accept_replayed(&mut self, id: u64, len: u64) {
        self.last_id = Some(id);
        self.replayed_len += len;
    }

    pub(crate) fn replayed_len(&self) -> u64 {
        self.replayed_len
    }

    /// A second handle on the same open file, sharing its cursor
    pub(crate) fn reader_handle(&self) -> Result<File> {
        Ok(self.file.try_clone()?)
    }

    pub(crate) fn file_len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn next_id(&self) -> Result<u64> {
        match self.last_id {
            None => Ok(1),
            Some(id) => id
                .checked_add(1)
                .ok_or_else(|| KvError::WriterIo(format!("id space exhausted after {}", id))),
        }
    }
}
