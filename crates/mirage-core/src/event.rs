//! observable events
//!
//! every externally visible state change emits one of these. note that
//! `PriorityRequestAdded` carries the full public data even though the state
//! only keeps its digest: replaying events is the canonical way to recover
//! request payloads.

use scale_codec::{Decode, Encode};
use scale_info::TypeInfo;

use crate::types::{AccountIndex, Address, AssetId, BlockHeight, NftIndex, RequestId};

#[derive(Clone, Debug, Encode, Decode, TypeInfo, PartialEq, Eq)]
pub enum Event {
    PriorityRequestAdded {
        id: RequestId,
        kind: u8,
        pubdata: Vec<u8>,
        expiry_height: BlockHeight,
    },
    BlockCommitted {
        block_number: u32,
    },
    BlockExecuted {
        block_number: u32,
    },
    Withdrawal {
        recipient: Address,
        asset_id: AssetId,
        amount: u128,
    },
    NftDelivered {
        nft_index: NftIndex,
        recipient: Address,
    },
    NftDeliveryPending {
        nft_index: NftIndex,
        recipient: Address,
    },
    DesertModeActivated {
        /// the expired request that triggered activation
        trigger_id: RequestId,
    },
    DesertExit {
        account_index: AccountIndex,
        asset_id: AssetId,
        amount: u128,
    },
    DesertNftExit {
        nft_index: NftIndex,
        recipient: Address,
    },
    RequestCancelled {
        id: RequestId,
    },
}
