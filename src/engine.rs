//! Engine Module
//!
//! Glue between the transaction log and the sharded store.
//!
//! ## Responsibilities
//! - Rebuild the store from the log on startup
//! - Record every mutation in the log before applying it to the store
//! - Serve reads straight from the store

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::Config;
use crate::error::Result;
use crate::store::ShardedStore;
use crate::wal::TransactionLogger;

/// An opened store with its transaction log
///
/// ## Write Path
/// `put`/`delete` submit the mutation to the logger first and then apply it
/// to the store. The log is the source of truth; the store is a cache that
/// can always be rebuilt by replay.
///
/// ## Concurrency
/// All methods take `&self`. Writers contend only on the shard lock of their
/// key and on the logger's bounded queue. Because submission and application
/// are two steps, two concurrent writers of the same key may apply in a
/// different order than they were logged; callers that need per-key order
/// must serialize their own writes to that key.
pub struct Engine {
    config: Config,
    store: ShardedStore,
    logger: TransactionLogger,

    /// Events applied from the log during open
    recovered: u64,
}

impl Engine {
    const LOG_FILENAME: &'static str = "transactions.log";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Build an empty store
    /// 3. Replay the log into the store
    /// 4. Start the log writer
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let store = ShardedStore::new(config.shard_count)?;
        let mut logger = TransactionLogger::open(Self::log_path(&config.data_dir), config.logger())?;

        let recovered = Self::recover(&mut logger, &store)?;
        logger.run()?;

        info!(
            data_dir = %config.data_dir.display(),
            shards = config.shard_count,
            recovered,
            keys = store.len(),
            "engine opened"
        );

        Ok(Self {
            config,
            store,
            logger,
            recovered,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Path of the log file inside `data_dir`
    pub fn log_path(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::LOG_FILENAME)
    }

    fn recover(logger: &mut TransactionLogger, store: &ShardedStore) -> Result<u64> {
        let mut replay = logger.replay()?;
        while let Some(event) = replay.next() {
            match event {
                Ok(event) => store.apply(&event),
                Err(e) => {
                    error!(
                        applied = replay.events_replayed(),
                        error = %e,
                        "log replay failed; refusing to start"
                    );
                    return Err(e);
                }
            }
        }
        Ok(replay.events_replayed())
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Result<String> {
        self.store.get(key)
    }

    /// Log, then apply, a put
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        self.logger.submit_put(key, value)?;
        self.store.put(key, value);
        Ok(())
    }

    /// Log, then apply, a delete
    pub fn delete(&self, key: &str) -> Result<()> {
        self.logger.submit_delete(key)?;
        self.store.delete(key);
        Ok(())
    }

    /// Close the transaction log.
    ///
    /// Mutations still queued in the logger are dropped.
    pub fn close(self) -> Result<()> {
        self.logger.close()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn store(&self) -> &ShardedStore {
        &self.store
    }

    pub fn logger(&self) -> &TransactionLogger {
        &self.logger
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of events replayed into the store during open
    pub fn recovered_events(&self) -> u64 {
        self.recovered
    }
}
