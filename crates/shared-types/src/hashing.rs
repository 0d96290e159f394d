//! Hashing utilities shared by every subsystem
//!
//! All block, body, bundle and transaction digests are double SHA-256 over a
//! canonical byte concatenation. Independent implementations must agree on
//! these bytes, so nothing here goes through a serializer.

use crate::entities::Hash;
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of data
#[inline]
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute double SHA-256 hash, the digest used for every commitment.
#[inline]
pub fn double_hash(data: &[u8]) -> Hash {
    let first_hash = sha256(data);
    sha256(&first_hash)
}

/// Double hash of the empty byte string, the padding leaf for empty shards.
pub fn empty_leaf_hash() -> Hash {
    double_hash(&[])
}

/// Lowercase hex rendering of a hash, the form concatenated into records.
#[inline]
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Parse a 64-character hex string back into a hash.
pub fn hash_from_hex(s: &str) -> Option<Hash> {
    let bytes = hex::decode(s).ok()?;
    if bytes.len() != 32 {
        return None;
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Some(out)
}

/// Hash two sibling nodes into their parent.
#[inline]
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(left);
    data[32..].copy_from_slice(right);
    double_hash(&data)
}
