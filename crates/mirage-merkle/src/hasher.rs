//! tree hash primitive
//!
//! the circuit side commits to the state with a fixed-arity algebraic hash;
//! this side only ever recomputes, so the primitive is a trait and the
//! default implementation is blake3 with domain separation. leaf encodings
//! pack scalars into 32-byte big-endian words so an algebraic implementation
//! can map them to field elements unchanged.

use crate::{Hash, LEAF_DOMAIN, NODE_DOMAIN};

/// fixed-arity hash over 32-byte words
pub trait ExitHasher {
    fn hash2(&self, a: &Hash, b: &Hash) -> Hash;
    fn hash5(&self, inputs: &[Hash; 5]) -> Hash;
    fn hash6(&self, inputs: &[Hash; 6]) -> Hash;
}

/// default blake3 implementation with domain-separated nodes
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3ExitHasher;

impl Blake3ExitHasher {
    fn hash_words(&self, domain: &[u8], inputs: &[Hash]) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(domain);
        hasher.update(&[inputs.len() as u8]);
        for word in inputs {
            hasher.update(word);
        }
        *hasher.finalize().as_bytes()
    }
}

impl ExitHasher for Blake3ExitHasher {
    fn hash2(&self, a: &Hash, b: &Hash) -> Hash {
        self.hash_words(NODE_DOMAIN, &[*a, *b])
    }

    fn hash5(&self, inputs: &[Hash; 5]) -> Hash {
        self.hash_words(LEAF_DOMAIN, inputs)
    }

    fn hash6(&self, inputs: &[Hash; 6]) -> Hash {
        self.hash_words(LEAF_DOMAIN, inputs)
    }
}

/// pack a scalar into a 32-byte big-endian word
pub fn word(value: u128) -> Hash {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&value.to_be_bytes());
    out
}

/// asset-tree leaf: (amount, offer bitmap word); the asset id is the leaf index
pub fn asset_leaf<H: ExitHasher>(hasher: &H, amount: u128, offer_bitmap: u128) -> Hash {
    hasher.hash2(&word(amount), &word(offer_bitmap))
}

/// account-tree leaf; the account index is the leaf index
pub fn account_leaf<H: ExitHasher>(
    hasher: &H,
    account_name_hash: &Hash,
    pub_key_x: &Hash,
    pub_key_y: &Hash,
    nonce: u64,
    collection_nonce: u64,
    asset_subroot: &Hash,
) -> Hash {
    hasher.hash6(&[
        *account_name_hash,
        *pub_key_x,
        *pub_key_y,
        word(nonce as u128),
        word(collection_nonce as u128),
        *asset_subroot,
    ])
}

/// NFT-tree leaf; the nft index is the leaf index
pub fn nft_leaf<H: ExitHasher>(
    hasher: &H,
    creator_account_index: u32,
    owner_account_index: u32,
    content_hash: &Hash,
    creator_treasury_rate: u16,
    content_type: u8,
) -> Hash {
    hasher.hash5(&[
        word(creator_account_index as u128),
        word(owner_account_index as u128),
        *content_hash,
        word(creator_treasury_rate as u128),
        word(content_type as u128),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash2_is_order_sensitive() {
        let h = Blake3ExitHasher;
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_ne!(h.hash2(&a, &b), h.hash2(&b, &a));
    }

    #[test]
    fn arity_is_domain_separated() {
        // hash5 of x repeated must not collide with hash6 of x repeated
        // truncated; the arity byte keeps the encodings disjoint
        let h = Blake3ExitHasher;
        let x = [7u8; 32];
        assert_ne!(h.hash5(&[x; 5]), h.hash6(&[x; 6]));
    }

    #[test]
    fn word_packs_big_endian() {
        let w = word(1);
        assert_eq!(w[31], 1);
        assert_eq!(&w[..31], &[0u8; 31]);
    }

    #[test]
    fn leaf_hashes_depend_on_every_field() {
        let h = Blake3ExitHasher;
        let base = nft_leaf(&h, 1, 2, &[3u8; 32], 4, 5);
        assert_ne!(base, nft_leaf(&h, 9, 2, &[3u8; 32], 4, 5));
        assert_ne!(base, nft_leaf(&h, 1, 9, &[3u8; 32], 4, 5));
        assert_ne!(base, nft_leaf(&h, 1, 2, &[9u8; 32], 4, 5));
        assert_ne!(base, nft_leaf(&h, 1, 2, &[3u8; 32], 9, 5));
        assert_ne!(base, nft_leaf(&h, 1, 2, &[3u8; 32], 4, 9));
    }
}
