//! exit claims and path folding

use crate::hasher::{account_leaf, asset_leaf, nft_leaf, ExitHasher};
use crate::{
    Hash, MerkleError, Result, ACCOUNT_TREE_DEPTH, ASSET_TREE_DEPTH, NFT_TREE_DEPTH,
};

/// fold a leaf up its merkle path
///
/// `siblings` runs leaf-to-root; the matching index bit picks the side at
/// each level. a sibling array of the wrong length is rejected, never
/// truncated or zero-padded here.
pub fn fold_path<H: ExitHasher>(
    hasher: &H,
    leaf: Hash,
    index: u64,
    siblings: &[Hash],
    expected_depth: usize,
) -> Result<Hash> {
    if siblings.len() != expected_depth {
        return Err(MerkleError::WrongProofLength {
            expected: expected_depth,
            got: siblings.len(),
        });
    }

    let mut current = leaf;
    let mut pos = index;
    for sibling in siblings {
        current = if pos & 1 == 0 {
            hasher.hash2(&current, sibling)
        } else {
            hasher.hash2(sibling, &current)
        };
        pos >>= 1;
    }
    Ok(current)
}

/// unilateral withdrawal claim for a fungible balance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetExitClaim {
    pub account_index: u32,
    pub account_name_hash: Hash,
    pub pub_key_x: Hash,
    pub pub_key_y: Hash,
    pub nonce: u64,
    pub collection_nonce: u64,

    pub asset_id: u16,
    pub amount: u128,
    pub offer_bitmap: u128,

    /// siblings up the per-account asset tree, leaf to root
    pub asset_path: Vec<Hash>,
    /// siblings up the account tree, leaf to root
    pub account_path: Vec<Hash>,
    /// root of the NFT tree at the claimed state
    pub nft_root: Hash,
}

/// unilateral withdrawal claim for an NFT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftExitClaim {
    pub nft_index: u64,
    pub creator_account_index: u32,
    pub owner_account_index: u32,
    pub content_hash: Hash,
    pub creator_treasury_rate: u16,
    pub content_type: u8,

    /// siblings up the NFT tree, leaf to root
    pub nft_path: Vec<Hash>,
    /// root of the account tree at the claimed state
    pub account_root: Hash,
}

/// recompute the global root from an asset claim and compare it with the
/// last executed state root
pub fn verify_asset_exit<H: ExitHasher>(
    hasher: &H,
    claim: &AssetExitClaim,
    state_root: &Hash,
) -> Result<()> {
    let leaf = asset_leaf(hasher, claim.amount, claim.offer_bitmap);
    let asset_subroot = fold_path(
        hasher,
        leaf,
        claim.asset_id as u64,
        &claim.asset_path,
        ASSET_TREE_DEPTH,
    )?;

    let leaf = account_leaf(
        hasher,
        &claim.account_name_hash,
        &claim.pub_key_x,
        &claim.pub_key_y,
        claim.nonce,
        claim.collection_nonce,
        &asset_subroot,
    );
    let account_root = fold_path(
        hasher,
        leaf,
        claim.account_index as u64,
        &claim.account_path,
        ACCOUNT_TREE_DEPTH,
    )?;

    let global = hasher.hash2(&account_root, &claim.nft_root);
    if global != *state_root {
        return Err(MerkleError::RootMismatch);
    }
    Ok(())
}

/// recompute the global root from an NFT claim and compare it with the last
/// executed state root
pub fn verify_nft_exit<H: ExitHasher>(
    hasher: &H,
    claim: &NftExitClaim,
    state_root: &Hash,
) -> Result<()> {
    let leaf = nft_leaf(
        hasher,
        claim.creator_account_index,
        claim.owner_account_index,
        &claim.content_hash,
        claim.creator_treasury_rate,
        claim.content_type,
    );
    let nft_root = fold_path(hasher, leaf, claim.nft_index, &claim.nft_path, NFT_TREE_DEPTH)?;

    let global = hasher.hash2(&claim.account_root, &nft_root);
    if global != *state_root {
        return Err(MerkleError::RootMismatch);
    }
    Ok(())
}
