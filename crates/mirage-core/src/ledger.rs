//! pending-transfer ledger
//!
//! NFT delivery crosses into an external factory that may fail for reasons
//! this core cannot see. delivery is therefore total: it either succeeds or
//! becomes durable pending state, and block execution completes either way.

use crate::collab::{FactoryError, NftFactory};
use crate::error::{CoreError, Result};
use crate::event::Event;
use crate::state::SettlementState;
use crate::types::{NftIndex, PendingNft};

impl SettlementState {
    /// attempt an NFT delivery; never fails
    ///
    /// exactly one of `NftDelivered` / `NftDeliveryPending` results. a second
    /// failed delivery for the same index overwrites the stored spec.
    pub fn try_deliver_nft<F: NftFactory>(
        &mut self,
        factory: &mut F,
        spec: PendingNft,
    ) -> Vec<Event> {
        match guarded_delivery(factory, &spec) {
            Ok(()) => {
                tracing::debug!(nft_index = spec.nft_index, "NFT delivered");
                vec![Event::NftDelivered {
                    nft_index: spec.nft_index,
                    recipient: spec.recipient,
                }]
            }
            Err(err) => {
                tracing::warn!(
                    nft_index = spec.nft_index,
                    error = %err,
                    "NFT delivery failed, recorded as pending"
                );
                let event = Event::NftDeliveryPending {
                    nft_index: spec.nft_index,
                    recipient: spec.recipient,
                };
                self.pending_nfts.insert(spec.nft_index, spec);
                vec![event]
            }
        }
    }

    /// re-attempt a deferred delivery; callable by anyone, indefinitely
    ///
    /// a missing entry is reported as `NftNotPending` so callers can tell a
    /// completed retry from one that never existed; a failing factory leaves
    /// the entry untouched.
    pub fn retry_nft_delivery<F: NftFactory>(
        &mut self,
        factory: &mut F,
        nft_index: NftIndex,
    ) -> Result<Vec<Event>> {
        let spec = self
            .pending_nfts
            .get(&nft_index)
            .cloned()
            .ok_or(CoreError::NftNotPending(nft_index))?;

        guarded_delivery(factory, &spec).map_err(|e| CoreError::TransferFailed(e.0))?;

        self.pending_nfts.remove(&nft_index);
        tracing::debug!(nft_index, "pending NFT delivered on retry");
        Ok(vec![Event::NftDelivered {
            nft_index,
            recipient: spec.recipient,
        }])
    }
}

/// call the factory without letting a panic cross the boundary
fn guarded_delivery<F: NftFactory>(
    factory: &mut F,
    spec: &PendingNft,
) -> std::result::Result<(), FactoryError> {
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        factory.mint_or_transfer(spec)
    }));
    match outcome {
        Ok(result) => result,
        Err(_) => Err(FactoryError("factory panicked".into())),
    }
}
