//! Sharded Store Module
//!
//! In-memory key-value map split into independently-locked shards.
//!
//! ## Responsibilities
//! - Fast concurrent reads and writes in memory
//! - Route each key to one shard by a stable hash
//! - Rebuild state from replayed log events
//!
//! ## Data Structure Choice
//! A fixed boxed slice of `HashMap`s, each behind its own `RwLock`:
//! - Operations on keys in different shards never contend
//! - Per-key linearizable, no cross-key atomicity
//! - Shard count is fixed at construction; a key never changes shard
//!
//! ## Shard Selection
//! ```text
//! shard_index(key) = fnv1a_32(key) % shard_count
//! ```
//! FNV-1a is deterministic across processes and platforms, unlike the
//! randomly seeded std hasher.

mod hash;
mod shard;
mod table;

pub use hash::{fnv1a_32, shard_for};
pub use table::ShardedStore;
