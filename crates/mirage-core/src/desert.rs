//! desert mode: the one-way liveness fallback
//!
//! once the oldest open priority request outlives its notice window, anyone
//! can flip the system into desert mode. from then on the block pipeline and
//! all request entry points are frozen, and users withdraw unilaterally:
//! fungible balances and NFTs against merkle proofs over the last *executed*
//! state root, and still-open requests by cancellation with a refund.

use mirage_merkle::{verify_asset_exit, verify_nft_exit, AssetExitClaim, ExitHasher, NftExitClaim};
use mirage_pubdata::Operation;

use crate::collab::{AssetBackend, NftFactory};
use crate::error::{CoreError, Result};
use crate::event::Event;
use crate::state::SettlementState;
use crate::types::{Address, BlockHeight, PendingNft, RequestId};

impl SettlementState {
    /// flip into desert mode if the oldest open request has expired
    ///
    /// permissionless, one-way, and deliberately non-failing: callers probe
    /// it speculatively, and racing activators cannot fail each other. the
    /// returned events say whether this call was the one that flipped it.
    pub fn activate_desert_mode(&mut self, current_height: BlockHeight) -> Vec<Event> {
        if self.desert_mode {
            return Vec::new();
        }
        if !self.queue.peek_expired(current_height) {
            return Vec::new();
        }

        let trigger_id = self.queue.first_open();
        self.desert_mode = true;
        tracing::warn!(trigger_id, "desert mode activated");
        vec![Event::DesertModeActivated { trigger_id }]
    }

    /// withdraw a fungible balance against a merkle proof over the last
    /// executed state root
    ///
    /// each (account, asset) pair exits at most once. a zero balance still
    /// burns the exit flag so the proof cannot be retried with a different
    /// claimed amount later.
    pub fn desert_exit_asset<H, B>(
        &mut self,
        hasher: &H,
        backend: &mut B,
        claim: &AssetExitClaim,
        recipient: Address,
    ) -> Result<Vec<Event>>
    where
        H: ExitHasher,
        B: AssetBackend,
    {
        if !self.desert_mode {
            return Err(CoreError::DesertModeNotActive);
        }
        if self.exited_assets.contains(&(claim.account_index, claim.asset_id)) {
            return Err(CoreError::AlreadyExited {
                account_index: claim.account_index,
                asset_id: claim.asset_id,
            });
        }
        verify_asset_exit(hasher, claim, &self.last_executed_state_root)?;

        if claim.amount > 0 {
            backend
                .transfer_out(claim.asset_id, recipient, claim.amount)
                .map_err(|e| CoreError::TransferFailed(e.0))?;
        }

        self.exited_assets
            .insert((claim.account_index, claim.asset_id));
        tracing::info!(
            account_index = claim.account_index,
            asset_id = claim.asset_id,
            amount = claim.amount,
            "desert asset exit"
        );
        Ok(vec![Event::DesertExit {
            account_index: claim.account_index,
            asset_id: claim.asset_id,
            amount: claim.amount,
        }])
    }

    /// withdraw an NFT against a merkle proof over the last executed state
    /// root
    ///
    /// the exit flag is set before the factory is called: the NFT's claim on
    /// the tree is burned by the proof, and a failed delivery lands in the
    /// pending ledger for `retry_nft_delivery`, never back in the tree.
    pub fn desert_exit_nft<H, F>(
        &mut self,
        hasher: &H,
        factory: &mut F,
        claim: &NftExitClaim,
        recipient: Address,
    ) -> Result<Vec<Event>>
    where
        H: ExitHasher,
        F: NftFactory,
    {
        if !self.desert_mode {
            return Err(CoreError::DesertModeNotActive);
        }
        if self.exited_nfts.contains(&claim.nft_index) {
            return Err(CoreError::NftAlreadyExited(claim.nft_index));
        }
        verify_nft_exit(hasher, claim, &self.last_executed_state_root)?;

        self.exited_nfts.insert(claim.nft_index);
        let spec = PendingNft {
            nft_index: claim.nft_index,
            creator_account_index: claim.creator_account_index,
            owner_account_index: claim.owner_account_index,
            creator_treasury_rate: claim.creator_treasury_rate,
            // collections are an L2 notion the exit leaf does not carry
            collection_id: 0,
            recipient,
            content_hash: claim.content_hash,
            content_type: claim.content_type,
        };
        let mut events = vec![Event::DesertNftExit {
            nft_index: claim.nft_index,
            recipient,
        }];
        events.extend(self.try_deliver_nft(factory, spec));
        tracing::info!(nft_index = claim.nft_index, "desert NFT exit");
        Ok(events)
    }

    /// cancel the oldest open request and refund what it escrowed
    ///
    /// the caller replays the request's public data, observable on its
    /// `PriorityRequestAdded` event. deposits refund their escrowed value;
    /// registrations and full exits escrowed nothing. strictly sequential,
    /// so the open window shrinks from the front without gaps.
    pub fn cancel_outstanding_request<B, F>(
        &mut self,
        backend: &mut B,
        factory: &mut F,
        id: RequestId,
        pubdata: &[u8],
        current_height: BlockHeight,
    ) -> Result<Vec<Event>>
    where
        B: AssetBackend,
        F: NftFactory,
    {
        if !self.desert_mode {
            return Err(CoreError::DesertModeNotActive);
        }
        self.queue.check_cancellable(id, pubdata, current_height)?;
        let op = Operation::decode(pubdata)?;

        let mut events = Vec::new();
        match &op {
            Operation::Deposit {
                asset_id,
                amount,
                owner,
                ..
            } => {
                backend
                    .transfer_out(*asset_id, *owner, *amount)
                    .map_err(|e| CoreError::TransferFailed(e.0))?;
            }
            Operation::NftDeposit {
                account_index,
                creator_account_index,
                creator_treasury_rate,
                nft_index,
                collection_id,
                owner,
                content_hash,
                content_type,
            } => {
                let spec = PendingNft {
                    nft_index: *nft_index,
                    creator_account_index: *creator_account_index,
                    owner_account_index: *account_index,
                    creator_treasury_rate: *creator_treasury_rate,
                    collection_id: *collection_id,
                    recipient: *owner,
                    content_hash: *content_hash,
                    content_type: *content_type,
                };
                events.extend(self.try_deliver_nft(factory, spec));
            }
            // registrations and full exits escrowed nothing
            _ => {}
        }

        self.queue.cancel(id, pubdata, current_height)?;
        tracing::info!(id, kind = ?op.kind(), "priority request cancelled");
        events.push(Event::RequestCancelled { id });
        Ok(events)
    }
}
