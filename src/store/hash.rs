//! Stable key hashing

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a
pub const fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Index of the shard owning `key` among `shard_count` shards.
///
/// Always in `0..shard_count`. Panics if `shard_count` is zero.
pub fn shard_for(key: &str, shard_count: usize) -> usize {
    assert!(shard_count > 0, "shard count must be positive");
    (u64::from(fnv1a_32(key.as_bytes())) % shard_count as u64) as usize
}
