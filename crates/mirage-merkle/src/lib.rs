//! desert-exit merkle verifier
//!
//! recomputes the global L2 state root from exit claims, bottom-up: an asset
//! leaf folds up the per-account asset tree into the account leaf, which
//! folds up the account tree; NFT leaves fold up the NFT tree; the global
//! root is the width-2 hash of the account root and the NFT root.
//!
//! trees are fixed-depth and shallow leaves are padded with empty-subtree
//! hashes on the prover side, so a sibling array of the wrong length is
//! rejected outright rather than truncated.

pub mod hasher;
pub mod proof;

pub use hasher::{account_leaf, asset_leaf, nft_leaf, Blake3ExitHasher, ExitHasher};
pub use proof::{
    fold_path, verify_asset_exit, verify_nft_exit, AssetExitClaim, NftExitClaim,
};

use thiserror::Error;

/// 32-byte tree node
pub type Hash = [u8; 32];

/// account tree depth (account index keyed)
pub const ACCOUNT_TREE_DEPTH: usize = 32;
/// per-account asset tree depth (asset id keyed)
pub const ASSET_TREE_DEPTH: usize = 16;
/// NFT tree depth (nft index keyed)
pub const NFT_TREE_DEPTH: usize = 40;

/// domain separator for internal tree nodes
pub const NODE_DOMAIN: &[u8] = b"mirage.exit.node.v1";
/// domain separator for leaf hashes
pub const LEAF_DOMAIN: &[u8] = b"mirage.exit.leaf.v1";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("wrong proof length: expected {expected} siblings, got {got}")]
    WrongProofLength { expected: usize, got: usize },

    #[error("recomputed root does not match the executed state root")]
    RootMismatch,
}

pub type Result<T> = core::result::Result<T, MerkleError>;
