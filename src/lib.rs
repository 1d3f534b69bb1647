//! # shardkv
//!
//! An embedded key-value storage core with:
//! - A hash-sharded concurrent in-memory map
//! - A write-ahead transaction log with a single ordered writer
//! - State reconstruction by replaying the log after a restart
//!
//! ## Architecture Overview
//!
//! ```text
//!   producers (many threads)
//!        │                 │
//!        │ submit_put      │ put / get / delete
//!        │ submit_delete   │
//!        ▼                 ▼
//! ┌──────────────┐   ┌─────────────────────────────┐
//! │ bounded queue│   │        ShardedStore         │
//! │  (crossbeam) │   │ ┌───────┐┌───────┐┌───────┐ │
//! └──────┬───────┘   │ │RwLock ││RwLock ││RwLock │ │
//!        │ FIFO      │ │HashMap││HashMap││HashMap│ │
//!        ▼           │ └───────┘└───────┘└───────┘ │
//! ┌──────────────┐   └──────────────▲──────────────┘
//! │ log writer   │                  │
//! │ (one thread) │                  │ apply
//! └──────┬───────┘                  │
//!        ▼                          │
//!   transactions.log ──── replay ───┘
//! ```
//!
//! The logger never touches the store. [`Engine`] is the glue that replays
//! the log into a store on open and then logs every write before applying it.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod store;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::{Config, LoggerConfig, SyncStrategy};
pub use engine::Engine;
pub use store::ShardedStore;
pub use wal::{Event, EventKind, TransactionLogger};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of shardkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
