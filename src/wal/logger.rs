//! Transaction Logger
//!
//! Many producers, one writer. Producers enqueue mutations on a bounded
//! queue; a single consumer thread dequeues them in FIFO order, assigns ids
//! and appends them to the log file.
//!
//! ## Lifecycle
//! ```text
//!   open ──► Open ──run──► Running ──close──► Closed
//!             │                                 ▲
//!             └──────────────close──────────────┘
//! ```
//!
//! Replay is only available while `Open`: it takes `&mut self`, so the
//! logger cannot be started or shared until the replay iterator is dropped.
//! `run` refuses to start until replay has accepted every byte of the file,
//! so new ids always continue after the ids already on disk.

use std::fmt;
use std::io::{Seek, SeekFrom};
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, Receiver, Sender};
use crossbeam::select;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::LoggerConfig;
use crate::error::{KvError, Result};

use super::writer::open_log_file;
use super::{Event, LogWriter, Mutation, Replay};

/// Externally visible lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    Open,
    Running,
    Closed,
}

impl LoggerState {
    pub fn as_str(self) -> &'static str {
        match self {
            LoggerState::Open => "open",
            LoggerState::Running => "running",
            LoggerState::Closed => "closed",
        }
    }
}

impl fmt::Display for LoggerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of the log writer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggerStats {
    /// Events written by this logger instance
    pub events_written: u64,

    /// Highest id written or replayed
    pub last_id: Option<u64>,
}

/// Writer fault shared between the consumer and the producers
type Fault = Arc<Mutex<Option<String>>>;

/// Writer progress, with a condvar signalled after every write
#[derive(Default)]
struct Progress {
    stats: Mutex<LoggerStats>,
    advanced: Condvar,
}

impl Progress {
    /// Wake every `drain` waiter. Taking the lock first means a waiter that
    /// is between its checks and its wait cannot miss the signal.
    fn wake(&self) {
        drop(self.stats.lock());
        self.advanced.notify_all();
    }
}

enum Phase {
    Open {
        receiver: Receiver<Mutation>,
        writer: LogWriter,
        error_tx: Sender<KvError>,
    },
    Running {
        shutdown: Sender<()>,
        consumer: JoinHandle<Result<()>>,
    },
    Closed,
}

impl Phase {
    fn state(&self) -> LoggerState {
        match self {
            Phase::Open { .. } => LoggerState::Open,
            Phase::Running { .. } => LoggerState::Running,
            Phase::Closed => LoggerState::Closed,
        }
    }
}

/// File-backed write-ahead transaction log
pub struct TransactionLogger {
    path: PathBuf,
    config: LoggerConfig,

    /// Producer side of the submission queue
    sender: Sender<Mutation>,

    /// Asynchronous writer failures (capacity 1)
    errors: Receiver<KvError>,

    /// Mutations accepted onto the queue
    submitted: AtomicU64,

    closed: AtomicBool,
    fault: Fault,
    progress: Arc<Progress>,
    phase: Mutex<Phase>,
}

impl TransactionLogger {
    /// Open or create the log file at `path`. The logger starts in `Open`:
    /// submissions queue up but nothing is written until [`run`](Self::run).
    pub fn open(path: impl AsRef<Path>, config: LoggerConfig) -> Result<Self> {
        config.validate()?;

        let path = path.as_ref().to_path_buf();
        let file = open_log_file(&path)?;
        let writer = LogWriter::from_file(file, config.sync_strategy);

        let (sender, receiver) = bounded(config.queue_capacity);
        let (error_tx, errors) = bounded(1);

        info!(
            path = %path.display(),
            queue_capacity = config.queue_capacity,
            sync = ?config.sync_strategy,
            "transaction log opened"
        );

        Ok(Self {
            path,
            config,
            sender,
            errors,
            submitted: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            fault: Arc::new(Mutex::new(None)),
            progress: Arc::new(Progress::default()),
            phase: Mutex::new(Phase::Open {
                receiver,
                writer,
                error_tx,
            }),
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start the single consumer thread.
    ///
    /// A non-empty log must be replayed to its end first. Otherwise fails
    /// with [`KvError::UnreplayedLog`] and the logger stays `Open`.
    pub fn run(&self) -> Result<()> {
        let mut phase = self.phase.lock();
        if let Phase::Open { writer, .. } = &*phase {
            let len = writer.file_len()?;
            let replayed = writer.replayed_len();
            if replayed < len {
                warn!(path = %self.path.display(), replayed, len, "refusing to run before full replay");
                return Err(KvError::UnreplayedLog { replayed, len });
            }
        }

        let (receiver, writer, error_tx) = match mem::replace(&mut *phase, Phase::Closed) {
            Phase::Open {
                receiver,
                writer,
                error_tx,
            } => (receiver, writer, error_tx),
            other => {
                let actual = other.state().as_str();
                *phase = other;
                return Err(KvError::InvalidState {
                    expected: LoggerState::Open.as_str(),
                    actual,
                });
            }
        };

        self.progress.stats.lock().last_id = writer.last_id();

        let (shutdown, shutdown_rx) = bounded::<()>(1);
        let consumer = Consumer {
            writer,
            error_tx,
            fault: Arc::clone(&self.fault),
            progress: Arc::clone(&self.progress),
        };

        let spawned = thread::Builder::new()
            .name("shardkv-log-writer".into())
            .spawn(move || consumer.run(receiver, shutdown_rx));
        match spawned {
            Ok(handle) => {
                *phase = Phase::Running {
                    shutdown,
                    consumer: handle,
                };
                debug!(path = %self.path.display(), "log writer started");
                Ok(())
            }
            Err(e) => {
                self.closed.store(true, Ordering::SeqCst);
                Err(e.into())
            }
        }
    }

    /// Stop accepting submissions, stop the writer and release the file.
    ///
    /// Mutations still queued are dropped. If the writer had failed, its
    /// error is returned here as well.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(KvError::LoggerClosed);
        }

        let previous = mem::replace(&mut *self.phase.lock(), Phase::Closed);
        let queued = self.sender.len();
        let result = match previous {
            Phase::Open { .. } | Phase::Closed => Ok(()),
            Phase::Running { shutdown, consumer } => {
                drop(shutdown);
                consumer
                    .join()
                    .unwrap_or_else(|_| Err(KvError::WriterIo("log writer thread panicked".into())))
            }
        };

        self.progress.wake();
        info!(
            path = %self.path.display(),
            events_written = self.progress.stats.lock().events_written,
            queued,
            "transaction log closed"
        );
        result
    }

    /// Replay the log from the first line not yet accepted.
    ///
    /// Only valid before [`run`](Self::run). The returned iterator is
    /// single-pass. A later call resumes after the last accepted event, so
    /// after a clean pass it yields nothing and after an error it yields the
    /// same error again.
    pub fn replay(&mut self) -> Result<Replay<'_>> {
        match self.phase.get_mut() {
            Phase::Open { writer, .. } => {
                let mut file = writer.reader_handle()?;
                file.seek(SeekFrom::Start(writer.replayed_len()))?;
                debug!(
                    path = %self.path.display(),
                    offset = writer.replayed_len(),
                    "replaying transaction log"
                );
                Ok(Replay::new(file, writer))
            }
            other => Err(KvError::InvalidState {
                expected: LoggerState::Open.as_str(),
                actual: other.state().as_str(),
            }),
        }
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Queue a put. Blocks while the queue is full.
    pub fn submit_put(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        Event::check_field("key", &key)?;
        Event::check_field("value", &value)?;
        self.submit(Mutation::Put { key, value })
    }

    /// Queue a delete. Blocks while the queue is full.
    pub fn submit_delete(&self, key: impl Into<String>) -> Result<()> {
        let key = key.into();
        Event::check_field("key", &key)?;
        self.submit(Mutation::Delete { key })
    }

    fn submit(&self, mutation: Mutation) -> Result<()> {
        if let Some(reason) = self.fault.lock().as_ref() {
            return Err(KvError::LoggerFailed(reason.clone()));
        }
        if self.closed.load(Ordering::SeqCst) {
            return Err(KvError::LoggerClosed);
        }

        // Fails only once the consumer side is gone
        self.sender.send(mutation).map_err(|_| self.rejection())?;
        self.submitted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn rejection(&self) -> KvError {
        match self.fault.lock().as_ref() {
            Some(reason) => KvError::LoggerFailed(reason.clone()),
            None => KvError::LoggerClosed,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Receive-only stream of asynchronous writer failures.
    ///
    /// An empty stream means no failure has been reported yet, not that
    /// every submission is durable.
    pub fn errors(&self) -> Receiver<KvError> {
        self.errors.clone()
    }

    /// The writer's fault, if it has failed
    pub fn fault(&self) -> Option<String> {
        self.fault.lock().clone()
    }

    pub fn state(&self) -> LoggerState {
        self.phase.lock().state()
    }

    pub fn stats(&self) -> LoggerStats {
        *self.progress.stats.lock()
    }

    /// Mutations accepted by `submit_put`/`submit_delete` so far
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::SeqCst)
    }

    /// Wait until every mutation submitted before this call has been
    /// written, or until `timeout` elapses.
    ///
    /// Returns `Ok(false)` on timeout. This is the only way to learn that a
    /// write reached the file; there is no per-submission acknowledgment.
    pub fn drain(&self, timeout: Duration) -> Result<bool> {
        let target = self.submitted();
        let deadline = Instant::now() + timeout;

        let mut stats = self.progress.stats.lock();
        loop {
            if let Some(reason) = self.fault.lock().as_ref() {
                return Err(KvError::LoggerFailed(reason.clone()));
            }
            if stats.events_written >= target {
                return Ok(true);
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(KvError::LoggerClosed);
            }
            if self
                .progress
                .advanced
                .wait_until(&mut stats, deadline)
                .timed_out()
            {
                return Ok(stats.events_written >= target);
            }
        }
    }

    /// Mutations waiting in the queue
    pub fn queued(&self) -> usize {
        self.sender.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }
}

impl Drop for TransactionLogger {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            if let Err(e) = self.close() {
                warn!(path = %self.path.display(), error = %e, "error closing transaction log");
            }
        }
    }
}

/// State moved onto the writer thread
struct Consumer {
    writer: LogWriter,
    error_tx: Sender<KvError>,
    fault: Fault,
    progress: Arc<Progress>,
}

impl Consumer {
    fn run(mut self, receiver: Receiver<Mutation>, shutdown: Receiver<()>) -> Result<()> {
        loop {
            select! {
                recv(receiver) -> msg => {
                    let Ok(mutation) = msg else { break };
                    self.write(mutation)?;
                }
                // Sender dropped by close()
                recv(shutdown) -> _ => break,
            }
        }
        self.writer.sync()
    }

    fn write(&mut self, mutation: Mutation) -> Result<()> {
        match self.writer.append(mutation) {
            Ok(event) => {
                {
                    let mut stats = self.progress.stats.lock();
                    stats.events_written += 1;
                    stats.last_id = Some(event.id);
                }
                self.progress.advanced.notify_all();
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                error!(error = %reason, "log write failed; writer stopped");
                *self.fault.lock() = Some(reason.clone());
                let _ = self.error_tx.try_send(KvError::WriterIo(reason.clone()));
                self.progress.wake();
                Err(KvError::WriterIo(reason))
            }
        }
    }
}
