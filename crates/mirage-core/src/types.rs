//! core types for the settlement state machine

use scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use sha2::{Digest, Sha256};

use mirage_pubdata::{OperationKind, PubdataDigest};

/// 32-byte hash
pub type Hash = [u8; 32];

/// L1 address
pub type Address = [u8; 20];

/// priority request sequence id (monotonic)
pub type RequestId = u64;

/// L1 block height
pub type BlockHeight = u64;

/// L2 account index
pub type AccountIndex = u32;

/// listed asset id; 0 is the native asset
pub type AssetId = u16;

/// NFT index in the NFT tree
pub type NftIndex = u64;

/// zero hash constant
pub const ZERO_HASH: Hash = [0u8; 32];

/// the native asset's id
pub const NATIVE_ASSET: AssetId = 0;

/// notice window for priority requests: the operator must include a request
/// within this many L1 blocks or anyone may flip the system into desert mode
/// (two weeks at 30-second blocks)
pub const EXPIRATION_BLOCKS: BlockHeight = 40_320;

/// an open L1-initiated operation awaiting L2 inclusion
///
/// only the truncated digest of the operation's public data is retained; the
/// full bytes are observable on the `PriorityRequestAdded` event
#[derive(Clone, Debug, Encode, Decode, TypeInfo, PartialEq, Eq)]
pub struct PriorityRequest {
    pub id: RequestId,
    pub digest: PubdataDigest,
    pub kind: u8,
    pub expiry_height: BlockHeight,
}

impl PriorityRequest {
    pub fn kind(&self) -> Option<OperationKind> {
        OperationKind::from_tag(self.kind).ok()
    }
}

/// canonical digest of an executed or committed block
///
/// this is a rolling chain: block N's info derives only from block N-1's
/// info plus the new block's data. the contract state keeps hashes of these,
/// never the structs themselves.
#[derive(Clone, Copy, Debug, Encode, Decode, TypeInfo, PartialEq, Eq)]
pub struct StoredBlockInfo {
    pub block_size: u16,
    pub block_number: u32,
    pub priority_operations: u64,
    pub pending_onchain_ops_hash: Hash,
    pub timestamp: u64,
    pub state_root: Hash,
    pub commitment: Hash,
}

impl StoredBlockInfo {
    /// genesis entry anchoring the chain at the initial state root
    pub fn genesis(state_root: Hash) -> Self {
        Self {
            block_size: 0,
            block_number: 0,
            priority_operations: 0,
            pending_onchain_ops_hash: ZERO_HASH,
            timestamp: 0,
            state_root,
            commitment: ZERO_HASH,
        }
    }

    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.block_size.to_be_bytes());
        hasher.update(self.block_number.to_be_bytes());
        hasher.update(self.priority_operations.to_be_bytes());
        hasher.update(self.pending_onchain_ops_hash);
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update(self.state_root);
        hasher.update(self.commitment);
        hasher.finalize().into()
    }
}

/// a proposed block, transient to a single commit call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitBlockInfo {
    pub new_state_root: Hash,
    /// concatenated public data of all L2 transactions in the block
    pub pubdata: Vec<u8>,
    /// per-transaction byte offsets into `pubdata`
    pub offsets: Vec<u32>,
    pub timestamp: u64,
    pub block_number: u32,
    pub block_size: u16,
}

/// everything needed to retry a deferred NFT delivery
#[derive(Clone, Debug, Encode, Decode, TypeInfo, PartialEq, Eq)]
pub struct PendingNft {
    pub nft_index: NftIndex,
    pub creator_account_index: AccountIndex,
    pub owner_account_index: AccountIndex,
    pub creator_treasury_rate: u16,
    pub collection_id: u16,
    pub recipient: Address,
    pub content_hash: Hash,
    pub content_type: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_block_hash_changes_with_fields() {
        let base = StoredBlockInfo::genesis([1u8; 32]);
        let mut other = base;
        other.block_number = 1;
        assert_ne!(base.hash(), other.hash());

        let mut other = base;
        other.pending_onchain_ops_hash = [2u8; 32];
        assert_ne!(base.hash(), other.hash());
    }

    #[test]
    fn stored_block_hash_deterministic() {
        let info = StoredBlockInfo {
            block_size: 4,
            block_number: 9,
            priority_operations: 2,
            pending_onchain_ops_hash: [3u8; 32],
            timestamp: 1_700_000_000,
            state_root: [4u8; 32],
            commitment: [5u8; 32],
        };
        assert_eq!(info.hash(), info.hash());
    }
}
