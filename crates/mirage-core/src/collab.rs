//! external collaborator interfaces
//!
//! the settlement core verifies claims and moves assets; everything it
//! cannot decide locally sits behind one of these traits. implementations
//! must not panic across the boundary; the NFT factory is additionally
//! wrapped in a panic guard (see `ledger`), because a failed delivery must
//! become pending state, never abort a block.

use thiserror::Error;

use crate::types::{AccountIndex, Address, AssetId, Hash, PendingNft};

/// failure of a native or fungible transfer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransferError(pub String);

/// failure of an NFT factory call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct FactoryError(pub String);

/// opaque validity-proof verifier; pure and stateless from this side
pub trait ProofVerifier {
    fn verify(&self, public_inputs: &[u8]) -> bool;
}

/// asset transfer backend
///
/// native and fungible failures propagate to the caller and abort the
/// enclosing call; only NFT deliveries get partial-failure isolation.
pub trait AssetBackend {
    /// pay out a balance held by the bridge; asset 0 is native
    fn transfer_out(
        &mut self,
        asset_id: AssetId,
        to: Address,
        amount: u128,
    ) -> Result<(), TransferError>;

    /// pull a fungible deposit into the bridge (return-value checked)
    fn collect(
        &mut self,
        asset_id: AssetId,
        from: Address,
        amount: u128,
    ) -> Result<(), TransferError>;
}

/// cross-domain NFT factory
pub trait NftFactory {
    fn mint_or_transfer(&mut self, spec: &PendingNft) -> Result<(), FactoryError>;
}

/// asset-listing governance view
pub trait AssetRegistry {
    /// resolve a token address to its listed asset id
    fn validate_asset(&self, address: Address) -> Option<AssetId>;
    fn is_paused(&self, asset_id: AssetId) -> bool;
}

/// name registry resolving account identifiers to account indices
pub trait NameRegistry {
    fn resolve(&self, name_hash: Hash) -> Option<AccountIndex>;
}

/// shared mock collaborators for crate tests
#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::types::NftIndex;
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};

    pub struct MockVerifier {
        pub accept: bool,
        pub inputs_seen: RefCell<Vec<Vec<u8>>>,
    }

    impl MockVerifier {
        pub fn accepting() -> Self {
            Self { accept: true, inputs_seen: RefCell::new(Vec::new()) }
        }

        pub fn rejecting() -> Self {
            Self { accept: false, inputs_seen: RefCell::new(Vec::new()) }
        }
    }

    impl ProofVerifier for MockVerifier {
        fn verify(&self, public_inputs: &[u8]) -> bool {
            self.inputs_seen.borrow_mut().push(public_inputs.to_vec());
            self.accept
        }
    }

    #[derive(Default)]
    pub struct MockBackend {
        pub transfers: Vec<(AssetId, Address, u128)>,
        pub collected: Vec<(AssetId, Address, u128)>,
        pub fail_transfers: bool,
    }

    impl AssetBackend for MockBackend {
        fn transfer_out(
            &mut self,
            asset_id: AssetId,
            to: Address,
            amount: u128,
        ) -> Result<(), TransferError> {
            if self.fail_transfers {
                return Err(TransferError("backend offline".into()));
            }
            self.transfers.push((asset_id, to, amount));
            Ok(())
        }

        fn collect(
            &mut self,
            asset_id: AssetId,
            from: Address,
            amount: u128,
        ) -> Result<(), TransferError> {
            if self.fail_transfers {
                return Err(TransferError("backend offline".into()));
            }
            self.collected.push((asset_id, from, amount));
            Ok(())
        }
    }

    /// factory whose behavior is scriptable per call
    #[derive(Default)]
    pub struct MockFactory {
        pub fail: bool,
        pub panic: bool,
        pub delivered: Vec<NftIndex>,
    }

    impl NftFactory for MockFactory {
        fn mint_or_transfer(&mut self, spec: &PendingNft) -> Result<(), FactoryError> {
            if self.panic {
                panic!("factory bug");
            }
            if self.fail {
                return Err(FactoryError("mint reverted".into()));
            }
            self.delivered.push(spec.nft_index);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockRegistry {
        pub listed: HashMap<Address, AssetId>,
        pub paused: HashSet<AssetId>,
    }

    impl AssetRegistry for MockRegistry {
        fn validate_asset(&self, address: Address) -> Option<AssetId> {
            self.listed.get(&address).copied()
        }

        fn is_paused(&self, asset_id: AssetId) -> bool {
            self.paused.contains(&asset_id)
        }
    }

    #[derive(Default)]
    pub struct MockNames {
        pub accounts: HashMap<Hash, AccountIndex>,
    }

    impl NameRegistry for MockNames {
        fn resolve(&self, name_hash: Hash) -> Option<AccountIndex> {
            self.accounts.get(&name_hash).copied()
        }
    }
}
