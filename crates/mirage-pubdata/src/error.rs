//! error types for pubdata decoding

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PubdataError {
    #[error("empty public data")]
    Empty,

    #[error("unknown operation tag {0:#04x}")]
    UnknownTag(u8),

    #[error("truncated operation: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },

    #[error("operation length mismatch: expected {expected} bytes, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("offset {offset} out of bounds for public data of {len} bytes")]
    OffsetOutOfBounds { offset: u32, len: usize },

    #[error("transaction offsets must be strictly increasing")]
    OffsetsNotIncreasing,

    #[error("operation at offset {offset} overlaps the previous one")]
    OverlappingOperations { offset: u32 },
}

pub type Result<T> = core::result::Result<T, PubdataError>;
