//! Mirage Core - L2 settlement state machine
//!
//! The bridging and settlement core of an L2 rollup, as one explicit state
//! machine. It tracks what the contract side of a rollup must never forget:
//! the priority request queue, the committed-block hash chain, pending NFT
//! deliveries, and the desert-mode exit flags.
//!
//! # Lifecycle
//!
//! ```text
//!  L1 user ──deposit / full exit──▶ PriorityQueue (gapless id window)
//!                                        │
//!  operator ──commit_block──▶ StoredBlockInfo chain (hashes only)
//!                                        │
//!  operator ──verify_and_execute_blocks──▶ proof check, payouts,
//!                                          queue consumption
//!
//!  nobody executes for EXPIRATION_BLOCKS?
//!      anyone ──activate_desert_mode──▶ pipeline frozen, users exit
//!      unilaterally with merkle proofs or cancel open requests
//! ```
//!
//! Everything the core cannot decide locally (proof verification, asset
//! transfers, the NFT factory, governance registries) sits behind the traits
//! in [`collab`].

pub mod collab;
pub mod desert;
pub mod error;
pub mod event;
pub mod ledger;
pub mod pipeline;
pub mod queue;
pub mod state;
pub mod types;

pub use collab::{
    AssetBackend, AssetRegistry, FactoryError, NameRegistry, NftFactory, ProofVerifier,
    TransferError,
};
pub use error::{CoreError, Result};
pub use event::Event;
pub use pipeline::ExecuteBlockInfo;
pub use queue::PriorityQueue;
pub use state::SettlementState;
pub use types::{
    AccountIndex, Address, AssetId, BlockHeight, CommitBlockInfo, Hash, NftIndex, PendingNft,
    PriorityRequest, RequestId, StoredBlockInfo, EXPIRATION_BLOCKS, NATIVE_ASSET, ZERO_HASH,
};

// exit claims and the hash primitives they verify against live one crate down
pub use mirage_merkle::{AssetExitClaim, Blake3ExitHasher, ExitHasher, NftExitClaim};
pub use mirage_pubdata::{Operation, OperationKind, PubdataDigest};
