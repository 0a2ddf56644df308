//! block pipeline: commit, then verify and execute
//!
//! commit validates a proposed block against the chain head and the priority
//! queue and advances the stored-block chain; nothing is consumed from the
//! queue until execution, so a block that never gets a valid proof never
//! consumes requests. execution re-derives the pending-on-chain-operations
//! hash fixed at commit time, checks the batch validity proof, and only then
//! applies L1 effects.

use sha2::{Digest, Sha256};

use mirage_pubdata::{pubdata_digest, walk, Operation};

use crate::collab::{AssetBackend, NftFactory, ProofVerifier};
use crate::error::{CoreError, Result};
use crate::event::Event;
use crate::state::SettlementState;
use crate::types::{
    Address, AssetId, CommitBlockInfo, Hash, PendingNft, StoredBlockInfo, ZERO_HASH,
};

/// a committed block handed back for execution, exactly as committed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecuteBlockInfo {
    pub stored: StoredBlockInfo,
    /// the priority operations the block consumed, in consumption order
    pub pending_ops: Vec<Operation>,
}

impl SettlementState {
    /// validate and commit one proposed block on top of the current head
    pub fn commit_block(
        &mut self,
        last: &StoredBlockInfo,
        new: &CommitBlockInfo,
    ) -> Result<Vec<Event>> {
        if self.desert_mode {
            return Err(CoreError::DesertModeActive);
        }
        if last.hash() != self.stored_chain_head {
            return Err(CoreError::WrongChainHead);
        }
        let expected = last.block_number + 1;
        if new.block_number != expected {
            return Err(CoreError::NonSequentialBlock {
                expected,
                got: new.block_number,
            });
        }

        let ops = walk(&new.pubdata, &new.offsets)?;

        // requests already claimed by committed-but-unexecuted blocks are
        // spoken for; this block matches from the one after
        let available = self.queue.open_count() - self.committed_priority_ops;
        let match_from = self.queue.first_open() + self.committed_priority_ops;

        let mut consumed = 0u64;
        let mut onchain_ops_hash = ZERO_HASH;
        for op in &ops {
            if !op.is_priority() {
                continue;
            }
            if consumed == available {
                return Err(CoreError::TooManyPriorityOps {
                    claimed: consumed + 1,
                    open: available,
                });
            }
            let expected_id = match_from + consumed;
            let request = self
                .queue
                .get(expected_id)
                .ok_or(CoreError::RequestNotFound(expected_id))?;
            // full exits carry L2-computed fields the request could not know;
            // those are zeroed before comparing digests
            let canonical = request_canonical(op);
            if pubdata_digest(&canonical.encode()) != request.digest {
                return Err(CoreError::PriorityDigestMismatch { expected_id });
            }
            onchain_ops_hash = chain_onchain_ops(&onchain_ops_hash, op);
            consumed += 1;
        }

        let stored = StoredBlockInfo {
            block_size: new.block_size,
            block_number: new.block_number,
            priority_operations: consumed,
            pending_onchain_ops_hash: onchain_ops_hash,
            timestamp: new.timestamp,
            state_root: new.new_state_root,
            commitment: block_commitment(last, new, &onchain_ops_hash),
        };

        self.stored_chain_head = stored.hash();
        self.committed_block_hashes
            .insert(stored.block_number, self.stored_chain_head);
        self.committed_priority_ops += consumed;
        self.last_committed_block = stored.block_number;

        tracing::info!(
            block_number = stored.block_number,
            priority_ops = consumed,
            "block committed"
        );
        Ok(vec![Event::BlockCommitted {
            block_number: stored.block_number,
        }])
    }

    /// verify a batch validity proof and execute the blocks' L1 effects
    ///
    /// all-or-nothing: any validation or fungible-transfer failure leaves the
    /// state untouched. only NFT deliveries are isolated (see `ledger`).
    pub fn verify_and_execute_blocks<V, B, F>(
        &mut self,
        verifier: &V,
        backend: &mut B,
        factory: &mut F,
        blocks: &[ExecuteBlockInfo],
    ) -> Result<Vec<Event>>
    where
        V: ProofVerifier,
        B: AssetBackend,
        F: NftFactory,
    {
        if self.desert_mode {
            return Err(CoreError::DesertModeActive);
        }
        if blocks.is_empty() {
            return Ok(Vec::new());
        }

        // validation pass: sequencing, committed records, op-hash re-derivation
        for (i, block) in blocks.iter().enumerate() {
            let expected = self.last_executed_block + 1 + i as u32;
            if block.stored.block_number != expected {
                return Err(CoreError::NonSequentialBlock {
                    expected,
                    got: block.stored.block_number,
                });
            }
            let recorded = self
                .committed_block_hashes
                .get(&block.stored.block_number)
                .ok_or(CoreError::UnknownCommittedBlock {
                    block_number: block.stored.block_number,
                })?;
            if *recorded != block.stored.hash() {
                return Err(CoreError::UnknownCommittedBlock {
                    block_number: block.stored.block_number,
                });
            }

            let mut onchain_ops_hash = ZERO_HASH;
            for op in &block.pending_ops {
                if !op.is_priority() {
                    return Err(CoreError::NotAPriorityOp);
                }
                onchain_ops_hash = chain_onchain_ops(&onchain_ops_hash, op);
            }
            if onchain_ops_hash != block.stored.pending_onchain_ops_hash
                || block.pending_ops.len() as u64 != block.stored.priority_operations
            {
                return Err(CoreError::OnchainOpsHashMismatch {
                    block_number: block.stored.block_number,
                });
            }
        }

        let inputs = batch_public_inputs(self.last_executed_state_root, blocks);
        if !verifier.verify(&inputs) {
            return Err(CoreError::ProofRejected);
        }

        // fungible payouts go out before any state is touched, so a failing
        // backend aborts the call with the state unchanged
        for (asset_id, recipient, amount) in planned_payouts(blocks) {
            backend
                .transfer_out(asset_id, recipient, amount)
                .map_err(|e| CoreError::TransferFailed(e.0))?;
        }

        // state mutation pass; nothing below can fail except by invariant
        // breakage, which consume_prefix would surface
        let mut events = Vec::new();
        for block in blocks {
            self.queue.consume_prefix(block.stored.priority_operations)?;
            self.committed_priority_ops -= block.stored.priority_operations;

            for op in &block.pending_ops {
                match op {
                    Operation::FullExit {
                        asset_id,
                        amount,
                        owner,
                        ..
                    } if *amount > 0 => {
                        events.push(Event::Withdrawal {
                            recipient: *owner,
                            asset_id: *asset_id,
                            amount: *amount,
                        });
                    }
                    Operation::NftFullExit {
                        creator_account_index,
                        account_index,
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
                    // deposits and registrations already took effect on L1 at
                    // request time; execution just settles them on L2
                    _ => {}
                }
            }

            self.committed_block_hashes.remove(&block.stored.block_number);
            self.last_executed_block = block.stored.block_number;
            self.last_executed_state_root = block.stored.state_root;
            tracing::info!(block_number = block.stored.block_number, "block executed");
            events.push(Event::BlockExecuted {
                block_number: block.stored.block_number,
            });
        }

        Ok(events)
    }
}

/// fungible payouts a batch will make, in execution order
fn planned_payouts(blocks: &[ExecuteBlockInfo]) -> Vec<(AssetId, Address, u128)> {
    let mut payouts = Vec::new();
    for block in blocks {
        for op in &block.pending_ops {
            if let Operation::FullExit {
                asset_id,
                amount,
                owner,
                ..
            } = op
            {
                if *amount > 0 {
                    payouts.push((*asset_id, *owner, *amount));
                }
            }
        }
    }
    payouts
}

/// zero the L2-computed fields of a full-exit operation so its digest can be
/// compared with the digest stored at request time
fn request_canonical(op: &Operation) -> Operation {
    match op {
        Operation::FullExit {
            account_index,
            asset_id,
            owner,
            ..
        } => Operation::FullExit {
            account_index: *account_index,
            asset_id: *asset_id,
            amount: 0,
            owner: *owner,
        },
        Operation::NftFullExit {
            account_index,
            nft_index,
            owner,
            ..
        } => Operation::NftFullExit {
            account_index: *account_index,
            creator_account_index: 0,
            creator_treasury_rate: 0,
            nft_index: *nft_index,
            collection_id: 0,
            owner: *owner,
            content_hash: ZERO_HASH,
            content_type: 0,
        },
        other => other.clone(),
    }
}

/// running digest binding a block to the exact priority operations it consumed
fn chain_onchain_ops(previous: &Hash, op: &Operation) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(previous);
    hasher.update(op.encode());
    hasher.finalize().into()
}

/// block commitment over the state transition and the block's public data
fn block_commitment(last: &StoredBlockInfo, new: &CommitBlockInfo, onchain_ops_hash: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(last.state_root);
    hasher.update(new.new_state_root);
    hasher.update(new.block_number.to_be_bytes());
    hasher.update(new.timestamp.to_be_bytes());
    hasher.update(onchain_ops_hash);
    hasher.update(&new.pubdata);
    hasher.finalize().into()
}

/// public inputs for the batch proof: prior executed root, every block
/// commitment in order, final root
fn batch_public_inputs(prev_root: Hash, blocks: &[ExecuteBlockInfo]) -> Vec<u8> {
    let mut inputs = Vec::with_capacity(32 * (blocks.len() + 2));
    inputs.extend_from_slice(&prev_root);
    for block in blocks {
        inputs.extend_from_slice(&block.stored.commitment);
    }
    if let Some(last) = blocks.last() {
        inputs.extend_from_slice(&last.stored.state_root);
    }
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::mock::{MockBackend, MockFactory, MockNames, MockVerifier};

    const OWNER: Address = [1u8; 20];

    fn deposit_op(i: u8) -> Operation {
        Operation::Deposit {
            account_index: 7,
            asset_id: 0,
            amount: 100 + i as u128,
            owner: OWNER,
        }
    }

    /// concatenate ops into (pubdata, offsets)
    fn build_pubdata(ops: &[Operation]) -> (Vec<u8>, Vec<u32>) {
        let mut pubdata = Vec::new();
        let mut offsets = Vec::new();
        for op in ops {
            offsets.push(pubdata.len() as u32);
            pubdata.extend_from_slice(&op.encode());
        }
        (pubdata, offsets)
    }

    fn commit_info(block_number: u32, ops: &[Operation]) -> CommitBlockInfo {
        let (pubdata, offsets) = build_pubdata(ops);
        CommitBlockInfo {
            new_state_root: [block_number as u8 + 10; 32],
            pubdata,
            offsets,
            timestamp: 1_700_000_000 + block_number as u64,
            block_number,
            block_size: ops.len() as u16,
        }
    }

    /// state with three native deposits enqueued (ids 0, 1, 2)
    fn state_with_deposits() -> (SettlementState, Vec<Operation>) {
        let mut state = SettlementState::new([0u8; 32]);
        let ops: Vec<Operation> = (0..3).map(deposit_op).collect();
        for op in &ops {
            if let Operation::Deposit { amount, .. } = op {
                state.deposit_native(OWNER, 7, *amount, 100).unwrap();
            }
        }
        (state, ops)
    }

    /// mirror of commit-side StoredBlockInfo derivation for test expectations
    fn expected_stored(
        last: &StoredBlockInfo,
        info: &CommitBlockInfo,
        ops: &[Operation],
    ) -> StoredBlockInfo {
        let mut onchain = ZERO_HASH;
        let mut count = 0u64;
        for op in ops {
            if op.is_priority() {
                onchain = chain_onchain_ops(&onchain, op);
                count += 1;
            }
        }
        StoredBlockInfo {
            block_size: info.block_size,
            block_number: info.block_number,
            priority_operations: count,
            pending_onchain_ops_hash: onchain,
            timestamp: info.timestamp,
            state_root: info.new_state_root,
            commitment: block_commitment(last, info, &onchain),
        }
    }

    #[test]
    fn commit_requires_current_chain_head() {
        let (mut state, ops) = state_with_deposits();
        let mut stale = StoredBlockInfo::genesis([0u8; 32]);
        stale.timestamp = 999; // not the genesis actually stored

        let err = state
            .commit_block(&stale, &commit_info(1, &ops[..1]))
            .unwrap_err();
        assert_eq!(err, CoreError::WrongChainHead);
    }

    #[test]
    fn commit_chains_and_defers_queue_consumption() {
        let (mut state, ops) = state_with_deposits();
        let genesis = StoredBlockInfo::genesis([0u8; 32]);
        let info = commit_info(1, &ops[..2]);

        let events = state.commit_block(&genesis, &info).unwrap();
        assert_eq!(events, vec![Event::BlockCommitted { block_number: 1 }]);

        let stored = expected_stored(&genesis, &info, &ops[..2]);
        assert_eq!(state.stored_chain_head(), stored.hash());
        // committed, not executed: the queue window has not moved
        assert_eq!(state.first_open_request(), 0);
        assert_eq!(state.open_request_count(), 3);
    }

    #[test]
    fn commit_rejects_out_of_order_priority_ops() {
        let (mut state, ops) = state_with_deposits();
        let genesis = StoredBlockInfo::genesis([0u8; 32]);

        // claim request 1's pubdata where request 0's is expected
        let swapped = [ops[1].clone(), ops[0].clone()];
        let err = state
            .commit_block(&genesis, &commit_info(1, &swapped))
            .unwrap_err();
        assert_eq!(err, CoreError::PriorityDigestMismatch { expected_id: 0 });
    }

    #[test]
    fn commit_rejects_more_ops_than_open() {
        let (mut state, ops) = state_with_deposits();
        let genesis = StoredBlockInfo::genesis([0u8; 32]);

        let mut four = ops.clone();
        four.push(deposit_op(0));
        let err = state
            .commit_block(&genesis, &commit_info(1, &four))
            .unwrap_err();
        assert_eq!(err, CoreError::TooManyPriorityOps { claimed: 4, open: 3 });
    }

    #[test]
    fn commit_skips_l2_only_ops() {
        let (mut state, ops) = state_with_deposits();
        let genesis = StoredBlockInfo::genesis([0u8; 32]);

        let mixed = vec![
            Operation::Transfer {
                from_account_index: 7,
                to_account_index: 8,
                asset_id: 0,
                amount: 5,
            },
            ops[0].clone(),
        ];
        state.commit_block(&genesis, &commit_info(1, &mixed)).unwrap();
        // only the deposit counted as a priority op
        assert_eq!(state.committed_priority_ops, 1);
    }

    #[test]
    fn execute_advances_queue_and_prunes_committed_record() {
        let (mut state, ops) = state_with_deposits();
        let genesis = StoredBlockInfo::genesis([0u8; 32]);
        let info = commit_info(1, &ops[..2]);
        state.commit_block(&genesis, &info).unwrap();
        let stored = expected_stored(&genesis, &info, &ops[..2]);

        let verifier = MockVerifier::accepting();
        let mut backend = MockBackend::default();
        let mut factory = MockFactory::default();
        let events = state
            .verify_and_execute_blocks(
                &verifier,
                &mut backend,
                &mut factory,
                &[ExecuteBlockInfo { stored, pending_ops: ops[..2].to_vec() }],
            )
            .unwrap();

        assert_eq!(events, vec![Event::BlockExecuted { block_number: 1 }]);
        assert_eq!(state.first_open_request(), 2);
        assert_eq!(state.open_request_count(), 1);
        assert_eq!(state.last_executed_state_root(), stored.state_root);
        assert!(state.committed_block_hashes.is_empty());

        // verifier saw prev root || commitment || final root
        let inputs = verifier.inputs_seen.borrow();
        assert_eq!(inputs.len(), 1);
        assert_eq!(&inputs[0][..32], &[0u8; 32]);
        assert_eq!(&inputs[0][32..64], &stored.commitment);
        assert_eq!(&inputs[0][64..], &stored.state_root);
    }

    #[test]
    fn execute_rejects_failing_proof_atomically() {
        let (mut state, ops) = state_with_deposits();
        let genesis = StoredBlockInfo::genesis([0u8; 32]);
        let info = commit_info(1, &ops[..2]);
        state.commit_block(&genesis, &info).unwrap();
        let stored = expected_stored(&genesis, &info, &ops[..2]);

        let err = state
            .verify_and_execute_blocks(
                &MockVerifier::rejecting(),
                &mut MockBackend::default(),
                &mut MockFactory::default(),
                &[ExecuteBlockInfo { stored, pending_ops: ops[..2].to_vec() }],
            )
            .unwrap_err();
        assert_eq!(err, CoreError::ProofRejected);
        // nothing consumed, nothing executed
        assert_eq!(state.first_open_request(), 0);
        assert_eq!(state.last_executed_block(), 0);
    }

    #[test]
    fn execute_detects_tampered_operations() {
        let (mut state, ops) = state_with_deposits();
        let genesis = StoredBlockInfo::genesis([0u8; 32]);
        let info = commit_info(1, &ops[..2]);
        state.commit_block(&genesis, &info).unwrap();
        let stored = expected_stored(&genesis, &info, &ops[..2]);

        // mutate a consumed op's fields between commit and execute
        let mut tampered = ops[..2].to_vec();
        if let Operation::Deposit { amount, .. } = &mut tampered[1] {
            *amount += 1;
        }
        let err = state
            .verify_and_execute_blocks(
                &MockVerifier::accepting(),
                &mut MockBackend::default(),
                &mut MockFactory::default(),
                &[ExecuteBlockInfo { stored, pending_ops: tampered }],
            )
            .unwrap_err();
        assert_eq!(err, CoreError::OnchainOpsHashMismatch { block_number: 1 });
    }

    #[test]
    fn execute_rejects_tampered_stored_info() {
        let (mut state, ops) = state_with_deposits();
        let genesis = StoredBlockInfo::genesis([0u8; 32]);
        let info = commit_info(1, &ops[..2]);
        state.commit_block(&genesis, &info).unwrap();
        let mut stored = expected_stored(&genesis, &info, &ops[..2]);
        stored.state_root = [0xEE; 32];

        let err = state
            .verify_and_execute_blocks(
                &MockVerifier::accepting(),
                &mut MockBackend::default(),
                &mut MockFactory::default(),
                &[ExecuteBlockInfo { stored, pending_ops: ops[..2].to_vec() }],
            )
            .unwrap_err();
        assert_eq!(err, CoreError::UnknownCommittedBlock { block_number: 1 });
    }

    #[test]
    fn full_exit_pays_final_balance_from_pubdata() {
        let mut state = SettlementState::new([0u8; 32]);
        let mut names = MockNames::default();
        names.accounts.insert([5u8; 32], 42);
        state
            .request_full_exit(&names, [5u8; 32], 0, OWNER, 100)
            .unwrap();

        // L2 filled in the final balance; the request digest still matches
        // because full exits are compared with the amount zeroed
        let exit_op = Operation::FullExit {
            account_index: 42,
            asset_id: 0,
            amount: 7_777,
            owner: OWNER,
        };
        let genesis = StoredBlockInfo::genesis([0u8; 32]);
        let info = commit_info(1, std::slice::from_ref(&exit_op));
        state.commit_block(&genesis, &info).unwrap();
        let stored = expected_stored(&genesis, &info, std::slice::from_ref(&exit_op));

        let mut backend = MockBackend::default();
        let events = state
            .verify_and_execute_blocks(
                &MockVerifier::accepting(),
                &mut backend,
                &mut MockFactory::default(),
                &[ExecuteBlockInfo { stored, pending_ops: vec![exit_op] }],
            )
            .unwrap();

        assert_eq!(backend.transfers, vec![(0, OWNER, 7_777)]);
        assert!(events.contains(&Event::Withdrawal {
            recipient: OWNER,
            asset_id: 0,
            amount: 7_777
        }));
    }

    #[test]
    fn nft_full_exit_failure_does_not_abort_block() {
        let mut state = SettlementState::new([0u8; 32]);
        let mut names = MockNames::default();
        names.accounts.insert([5u8; 32], 42);
        state
            .request_full_exit_nft(&names, [5u8; 32], 9, OWNER, 100)
            .unwrap();

        let exit_op = Operation::NftFullExit {
            account_index: 42,
            creator_account_index: 3,
            creator_treasury_rate: 25,
            nft_index: 9,
            collection_id: 2,
            owner: OWNER,
            content_hash: [6u8; 32],
            content_type: 1,
        };
        let genesis = StoredBlockInfo::genesis([0u8; 32]);
        let info = commit_info(1, std::slice::from_ref(&exit_op));
        state.commit_block(&genesis, &info).unwrap();
        let stored = expected_stored(&genesis, &info, std::slice::from_ref(&exit_op));

        let mut factory = MockFactory { fail: true, ..Default::default() };
        let events = state
            .verify_and_execute_blocks(
                &MockVerifier::accepting(),
                &mut MockBackend::default(),
                &mut factory,
                &[ExecuteBlockInfo { stored, pending_ops: vec![exit_op] }],
            )
            .unwrap();

        // block executed; the delivery was diverted to the pending ledger
        assert!(events.contains(&Event::BlockExecuted { block_number: 1 }));
        assert!(events.contains(&Event::NftDeliveryPending { nft_index: 9, recipient: OWNER }));
        assert!(state.pending_nft(9).is_some());
        assert_eq!(state.last_executed_block(), 1);
    }

    /// spec scenario: enqueue 3 deposits, commit ids 0 and 1, execute, then
    /// a block claiming id 2 followed by a replay of id 1 must fail
    #[test]
    fn consumed_requests_cannot_be_replayed() {
        let (mut state, ops) = state_with_deposits();
        let genesis = StoredBlockInfo::genesis([0u8; 32]);
        let info = commit_info(1, &ops[..2]);
        state.commit_block(&genesis, &info).unwrap();
        let stored = expected_stored(&genesis, &info, &ops[..2]);

        state
            .verify_and_execute_blocks(
                &MockVerifier::accepting(),
                &mut MockBackend::default(),
                &mut MockFactory::default(),
                &[ExecuteBlockInfo { stored, pending_ops: ops[..2].to_vec() }],
            )
            .unwrap();
        assert_eq!(state.first_open_request(), 2);
        assert_eq!(state.open_request_count(), 1);

        // id 2 followed by a replay of id 1's pubdata
        let replay = [ops[2].clone(), ops[1].clone()];
        let err = state
            .commit_block(&stored, &commit_info(2, &replay))
            .unwrap_err();
        assert_eq!(err, CoreError::TooManyPriorityOps { claimed: 2, open: 1 });
    }

    #[test]
    fn second_committed_block_matches_after_first_blocks_claims() {
        let (mut state, ops) = state_with_deposits();
        let genesis = StoredBlockInfo::genesis([0u8; 32]);

        let info1 = commit_info(1, &ops[..2]);
        state.commit_block(&genesis, &info1).unwrap();
        let stored1 = expected_stored(&genesis, &info1, &ops[..2]);

        // without executing block 1, block 2 must match starting at id 2;
        // replaying id 0 must fail
        let err = state
            .commit_block(&stored1, &commit_info(2, &ops[..1]))
            .unwrap_err();
        assert_eq!(err, CoreError::PriorityDigestMismatch { expected_id: 2 });

        state
            .commit_block(&stored1, &commit_info(2, &ops[2..]))
            .unwrap();
        assert_eq!(state.committed_priority_ops, 3);
    }

    #[test]
    fn failing_backend_aborts_batch_without_state_change() {
        let mut state = SettlementState::new([0u8; 32]);
        let mut names = MockNames::default();
        names.accounts.insert([5u8; 32], 42);
        state
            .request_full_exit(&names, [5u8; 32], 0, OWNER, 100)
            .unwrap();

        let exit_op = Operation::FullExit {
            account_index: 42,
            asset_id: 0,
            amount: 1_000,
            owner: OWNER,
        };
        let genesis = StoredBlockInfo::genesis([0u8; 32]);
        let info = commit_info(1, std::slice::from_ref(&exit_op));
        state.commit_block(&genesis, &info).unwrap();
        let stored = expected_stored(&genesis, &info, std::slice::from_ref(&exit_op));

        let mut backend = MockBackend { fail_transfers: true, ..Default::default() };
        let err = state
            .verify_and_execute_blocks(
                &MockVerifier::accepting(),
                &mut backend,
                &mut MockFactory::default(),
                &[ExecuteBlockInfo { stored, pending_ops: vec![exit_op] }],
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::TransferFailed(_)));
        assert_eq!(state.last_executed_block(), 0);
        assert_eq!(state.first_open_request(), 0);
    }
}
