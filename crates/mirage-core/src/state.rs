//! settlement state
//!
//! one explicit state struct, no ambient singletons: every entry point takes
//! `&mut self` plus its collaborators and the current L1 height, and returns
//! the emitted events. a returned error means no state change.

use std::collections::{BTreeMap, BTreeSet};

use mirage_pubdata::Operation;

use crate::collab::{AssetBackend, AssetRegistry, NameRegistry};
use crate::error::{CoreError, Result};
use crate::event::Event;
use crate::queue::PriorityQueue;
use crate::types::{
    AccountIndex, Address, AssetId, BlockHeight, Hash, NftIndex, PendingNft, RequestId,
    StoredBlockInfo, NATIVE_ASSET, ZERO_HASH,
};

#[derive(Clone, Debug)]
pub struct SettlementState {
    /// hash of the last committed block's StoredBlockInfo
    pub(crate) stored_chain_head: Hash,
    pub(crate) last_committed_block: u32,
    pub(crate) last_executed_block: u32,
    /// state root of the last *executed* block; desert exits verify against
    /// this, never against merely committed roots
    pub(crate) last_executed_state_root: Hash,
    /// StoredBlockInfo hashes of committed, not yet executed blocks
    pub(crate) committed_block_hashes: BTreeMap<u32, Hash>,
    /// priority requests consumed by committed-but-unexecuted blocks
    pub(crate) committed_priority_ops: u64,
    pub(crate) queue: PriorityQueue,
    pub(crate) pending_nfts: BTreeMap<NftIndex, PendingNft>,
    pub(crate) desert_mode: bool,
    pub(crate) exited_assets: BTreeSet<(AccountIndex, AssetId)>,
    pub(crate) exited_nfts: BTreeSet<NftIndex>,
}

impl SettlementState {
    /// initialize at a genesis state root
    pub fn new(genesis_root: Hash) -> Self {
        let genesis = StoredBlockInfo::genesis(genesis_root);
        Self {
            stored_chain_head: genesis.hash(),
            last_committed_block: 0,
            last_executed_block: 0,
            last_executed_state_root: genesis_root,
            committed_block_hashes: BTreeMap::new(),
            committed_priority_ops: 0,
            queue: PriorityQueue::new(),
            pending_nfts: BTreeMap::new(),
            desert_mode: false,
            exited_assets: BTreeSet::new(),
            exited_nfts: BTreeSet::new(),
        }
    }

    // ------------------------------------------------------------------
    // L1-initiated requests
    // ------------------------------------------------------------------

    /// register an L2 account for an L1 owner
    ///
    /// index assignment and name semantics belong to the naming system; this
    /// core only records the registration as a priority operation the next
    /// blocks must acknowledge.
    pub fn register_account(
        &mut self,
        account_index: AccountIndex,
        account_name_hash: Hash,
        pub_key_x: Hash,
        pub_key_y: Hash,
        owner: Address,
        current_height: BlockHeight,
    ) -> Result<(RequestId, Vec<Event>)> {
        self.ensure_accepting_requests()?;
        let op = Operation::Register {
            account_index,
            account_name_hash,
            pub_key_x,
            pub_key_y,
            owner,
        };
        Ok(self.add_priority_request(&op, current_height))
    }

    /// deposit the native asset for an L2 account
    pub fn deposit_native(
        &mut self,
        owner: Address,
        to_account_index: AccountIndex,
        amount: u128,
        current_height: BlockHeight,
    ) -> Result<(RequestId, Vec<Event>)> {
        self.ensure_accepting_requests()?;
        if amount == 0 {
            return Err(CoreError::ZeroAmount);
        }
        let op = Operation::Deposit {
            account_index: to_account_index,
            asset_id: NATIVE_ASSET,
            amount,
            owner,
        };
        Ok(self.add_priority_request(&op, current_height))
    }

    /// deposit a listed fungible asset; consults governance for listing and
    /// pause state, then pulls the tokens into the bridge
    pub fn deposit_fungible<R: AssetRegistry, B: AssetBackend>(
        &mut self,
        registry: &R,
        backend: &mut B,
        asset_address: Address,
        owner: Address,
        to_account_index: AccountIndex,
        amount: u128,
        current_height: BlockHeight,
    ) -> Result<(RequestId, Vec<Event>)> {
        self.ensure_accepting_requests()?;
        if amount == 0 {
            return Err(CoreError::ZeroAmount);
        }
        let asset_id = registry
            .validate_asset(asset_address)
            .ok_or(CoreError::AssetNotListed)?;
        if registry.is_paused(asset_id) {
            return Err(CoreError::AssetPaused(asset_id));
        }
        backend
            .collect(asset_id, owner, amount)
            .map_err(|e| CoreError::TransferFailed(e.0))?;

        let op = Operation::Deposit {
            account_index: to_account_index,
            asset_id,
            amount,
            owner,
        };
        Ok(self.add_priority_request(&op, current_height))
    }

    /// deposit an NFT held by the bridge's factory on L1
    #[allow(clippy::too_many_arguments)]
    pub fn deposit_nft(
        &mut self,
        owner: Address,
        to_account_index: AccountIndex,
        creator_account_index: AccountIndex,
        creator_treasury_rate: u16,
        nft_index: NftIndex,
        collection_id: u16,
        content_hash: Hash,
        content_type: u8,
        current_height: BlockHeight,
    ) -> Result<(RequestId, Vec<Event>)> {
        self.ensure_accepting_requests()?;
        let op = Operation::NftDeposit {
            account_index: to_account_index,
            creator_account_index,
            creator_treasury_rate,
            nft_index,
            collection_id,
            owner,
            content_hash,
            content_type,
        };
        Ok(self.add_priority_request(&op, current_height))
    }

    /// request a forced exit of a fungible balance; the final balance is
    /// filled in by L2 and read back from the executed block's public data
    pub fn request_full_exit<N: NameRegistry>(
        &mut self,
        names: &N,
        account_name_hash: Hash,
        asset_id: AssetId,
        owner: Address,
        current_height: BlockHeight,
    ) -> Result<(RequestId, Vec<Event>)> {
        self.ensure_accepting_requests()?;
        let account_index = names
            .resolve(account_name_hash)
            .ok_or(CoreError::UnknownAccountName)?;
        let op = Operation::FullExit {
            account_index,
            asset_id,
            amount: 0,
            owner,
        };
        Ok(self.add_priority_request(&op, current_height))
    }

    /// request a forced exit of an NFT; creator and content fields are
    /// unknown at request time and zeroed in the request's public data
    pub fn request_full_exit_nft<N: NameRegistry>(
        &mut self,
        names: &N,
        account_name_hash: Hash,
        nft_index: NftIndex,
        owner: Address,
        current_height: BlockHeight,
    ) -> Result<(RequestId, Vec<Event>)> {
        self.ensure_accepting_requests()?;
        let account_index = names
            .resolve(account_name_hash)
            .ok_or(CoreError::UnknownAccountName)?;
        let op = Operation::NftFullExit {
            account_index,
            creator_account_index: 0,
            creator_treasury_rate: 0,
            nft_index,
            collection_id: 0,
            owner,
            content_hash: ZERO_HASH,
            content_type: 0,
        };
        Ok(self.add_priority_request(&op, current_height))
    }

    fn ensure_accepting_requests(&self) -> Result<()> {
        if self.desert_mode {
            return Err(CoreError::DesertModeActive);
        }
        Ok(())
    }

    fn add_priority_request(
        &mut self,
        op: &Operation,
        current_height: BlockHeight,
    ) -> (RequestId, Vec<Event>) {
        let pubdata = op.encode();
        let request = self.queue.enqueue(op.kind(), &pubdata, current_height);
        let event = Event::PriorityRequestAdded {
            id: request.id,
            kind: request.kind,
            pubdata,
            expiry_height: request.expiry_height,
        };
        (request.id, vec![event])
    }

    // ------------------------------------------------------------------
    // read-only queries
    // ------------------------------------------------------------------

    pub fn is_desert_mode(&self) -> bool {
        self.desert_mode
    }

    pub fn stored_chain_head(&self) -> Hash {
        self.stored_chain_head
    }

    pub fn last_committed_block(&self) -> u32 {
        self.last_committed_block
    }

    pub fn last_executed_block(&self) -> u32 {
        self.last_executed_block
    }

    pub fn last_executed_state_root(&self) -> Hash {
        self.last_executed_state_root
    }

    pub fn first_open_request(&self) -> RequestId {
        self.queue.first_open()
    }

    pub fn open_request_count(&self) -> u64 {
        self.queue.open_count()
    }

    pub fn pending_nft(&self, nft_index: NftIndex) -> Option<&PendingNft> {
        self.pending_nfts.get(&nft_index)
    }

    pub fn has_exited(&self, account_index: AccountIndex, asset_id: AssetId) -> bool {
        self.exited_assets.contains(&(account_index, asset_id))
    }

    pub fn has_exited_nft(&self, nft_index: NftIndex) -> bool {
        self.exited_nfts.contains(&nft_index)
    }
}
