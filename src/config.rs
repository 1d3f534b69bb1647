//! Configuration for shardkv
//!
//! Centralized configuration with sensible defaults. Every field has a
//! default, so a partial document deserializes into a complete `Config`.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{KvError, Result};

/// Main configuration for a shardkv instance
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for data files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── transactions.log   (write-ahead transaction log)
    pub data_dir: PathBuf,

    /// Number of independently-locked shards in the store.
    /// Fixed for the lifetime of the store.
    pub shard_count: usize,

    // -------------------------------------------------------------------------
    // Transaction Log Configuration
    // -------------------------------------------------------------------------
    /// Capacity of the submission queue in front of the log writer.
    /// Producers block once this many mutations are waiting.
    pub queue_capacity: usize,

    /// Sync strategy: how often to fsync the log
    pub sync_strategy: SyncStrategy,
}

/// Log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced entries (balanced durability/performance)
    EveryNEntries { count: usize },

    /// Hand lines to the OS and never fsync until close
    OsBuffered,
}

/// Settings owned by the transaction logger
#[derive(Debug, Clone, Copy)]
pub struct LoggerConfig {
    pub queue_capacity: usize,
    pub sync_strategy: SyncStrategy,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            sync_strategy: SyncStrategy::EveryWrite,
        }
    }
}

impl LoggerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(KvError::Config("queue_capacity must be at least 1".into()));
        }
        if let SyncStrategy::EveryNEntries { count: 0 } = self.sync_strategy {
            return Err(KvError::Config("sync count must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let logger = LoggerConfig::default();
        Self {
            data_dir: PathBuf::from("./shardkv_data"),
            shard_count: 16,
            queue_capacity: logger.queue_capacity,
            sync_strategy: logger.sync_strategy,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// The logger-only subset of this config
    pub fn logger(&self) -> LoggerConfig {
        LoggerConfig {
            queue_capacity: self.queue_capacity,
            sync_strategy: self.sync_strategy,
        }
    }

    /// Check settings that would otherwise fail deep inside startup
    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(KvError::InvalidShardCount(self.shard_count));
        }
        self.logger().validate()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the number of store shards
    pub fn shard_count(mut self, count: usize) -> Self {
        self.config.shard_count = count;
        self
    }

    /// Set the submission queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the log sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
