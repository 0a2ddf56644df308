//! canonical public-data layout for the mirage settlement core
//!
//! every L2 transaction serializes to a tagged, fixed-length byte record.
//! blocks carry the concatenation of these records plus per-transaction
//! offsets; the settlement core re-slices the blob to recover the
//! L1-originated operations it must match against the priority queue.
//!
//! unknown tags are rejected, never skipped: a blob this core cannot fully
//! interpret cannot be committed.

pub mod digest;
pub mod error;
pub mod op;

pub use digest::{pubdata_digest, PubdataDigest, DIGEST_WIDTH};
pub use error::{PubdataError, Result};
pub use op::{walk, Operation, OperationKind};
