//! error types for the settlement core
//!
//! every validation failure gets its own stable variant so off-chain tooling
//! can tell "resubmit differently" from "retry later" from "the system is in
//! desert mode".

use mirage_merkle::MerkleError;
use mirage_pubdata::PubdataError;
use thiserror::Error;

use crate::types::{AccountIndex, AssetId, NftIndex, RequestId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    // chain / commit validation
    #[error("supplied last block does not hash to the stored chain head")]
    WrongChainHead,

    #[error("non-sequential block: expected {expected}, got {got}")]
    NonSequentialBlock { expected: u32, got: u32 },

    #[error("priority operation digest does not match request {expected_id}")]
    PriorityDigestMismatch { expected_id: RequestId },

    #[error("block claims {claimed} priority operations but only {open} are open")]
    TooManyPriorityOps { claimed: u64, open: u64 },

    // execute validation
    #[error("block {block_number} was never committed or its stored info was altered")]
    UnknownCommittedBlock { block_number: u32 },

    #[error("pending on-chain operations hash mismatch for block {block_number}")]
    OnchainOpsHashMismatch { block_number: u32 },

    #[error("operation is not a priority operation")]
    NotAPriorityOp,

    #[error("validity proof rejected")]
    ProofRejected,

    // queue
    #[error("cannot consume {requested} requests, only {open} open")]
    ConsumeBeyondWindow { requested: u64, open: u64 },

    #[error("priority request {0} not found in the open window")]
    RequestNotFound(RequestId),

    #[error("priority request {0} has not expired yet")]
    RequestNotExpired(RequestId),

    #[error("request {id} is not the oldest open request ({oldest})")]
    NotOldestRequest { id: RequestId, oldest: RequestId },

    #[error("supplied public data does not match request {0}")]
    CancelDigestMismatch(RequestId),

    // desert mode
    #[error("operation disabled: desert mode is active")]
    DesertModeActive,

    #[error("operation requires desert mode")]
    DesertModeNotActive,

    #[error("account {account_index} already exited asset {asset_id}")]
    AlreadyExited {
        account_index: AccountIndex,
        asset_id: AssetId,
    },

    #[error("NFT {0} already exited")]
    NftAlreadyExited(NftIndex),

    // deposits / requests
    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("asset is not listed")]
    AssetNotListed,

    #[error("asset {0} is paused")]
    AssetPaused(AssetId),

    #[error("unknown account name")]
    UnknownAccountName,

    // transfers
    #[error("asset transfer failed: {0}")]
    TransferFailed(String),

    #[error("no pending delivery for NFT {0}")]
    NftNotPending(NftIndex),

    // subordinate layers
    #[error(transparent)]
    Pubdata(#[from] PubdataError),

    #[error(transparent)]
    Merkle(#[from] MerkleError),
}

pub type Result<T> = core::result::Result<T, CoreError>;
