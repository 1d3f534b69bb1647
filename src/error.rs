//! Error types for shardkv
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for shardkv operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Construction Errors
    // -------------------------------------------------------------------------
    #[error("Invalid shard count {0}: a store needs at least one shard")]
    InvalidShardCount(usize),

    #[error("Failed to open log file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Key not found: {0:?}")]
    KeyNotFound(String),

    // -------------------------------------------------------------------------
    // Log Record Errors
    // -------------------------------------------------------------------------
    #[error("Malformed log record: {0}")]
    MalformedRecord(String),

    #[error("Transaction ids out of order: id {found} follows {last}")]
    OutOfOrder { last: u64, found: u64 },

    #[error("Invalid {field}: tab and newline characters cannot be logged")]
    InvalidField { field: &'static str },

    // -------------------------------------------------------------------------
    // Logger Errors
    // -------------------------------------------------------------------------
    #[error("Log write failed: {0}")]
    WriterIo(String),

    #[error("Logger has failed and accepts no more writes: {0}")]
    LoggerFailed(String),

    #[error("Logger is closed")]
    LoggerClosed,

    #[error("Log has {len} bytes but replay accepted only {replayed}; replay it fully before running")]
    UnreplayedLog { replayed: u64, len: u64 },

    #[error("Logger is {actual}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
}
