//! priority-request digest
//!
//! the queue stores a keccak digest of each request's public data truncated
//! to 20 bytes instead of the full payload. the full bytes stay retrievable
//! by replaying `PriorityRequestAdded` events.

use sha3::{Digest, Keccak256};

/// truncated digest width in bytes
pub const DIGEST_WIDTH: usize = 20;

/// truncated keccak digest of an operation's public data
pub type PubdataDigest = [u8; DIGEST_WIDTH];

/// keccak256 of `data`, truncated to [`DIGEST_WIDTH`] bytes
pub fn pubdata_digest(data: &[u8]) -> PubdataDigest {
    let full = Keccak256::digest(data);
    let mut out = [0u8; DIGEST_WIDTH];
    out.copy_from_slice(&full[..DIGEST_WIDTH]);
    out
}
