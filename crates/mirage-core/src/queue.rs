//! priority request queue
//!
//! a durable, ordered log of L1-initiated operations awaiting L2 inclusion.
//! the open window is gapless: `first_open` and the open count describe it
//! completely. requests are consumed strictly in sequence-id order, and in
//! desert mode cancelled strictly in sequence-id order too.

use std::collections::BTreeMap;

use mirage_pubdata::{pubdata_digest, OperationKind};

use crate::error::{CoreError, Result};
use crate::types::{BlockHeight, PriorityRequest, RequestId, EXPIRATION_BLOCKS};

#[derive(Clone, Debug, Default)]
pub struct PriorityQueue {
    /// id of the oldest open request
    first_open: RequestId,
    /// id to assign to the next request
    next_id: RequestId,
    /// open requests, keyed by id; closed ids are removed
    requests: BTreeMap<RequestId, PriorityRequest>,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// assign the next sequence id and store the request's digest and expiry
    pub fn enqueue(
        &mut self,
        kind: OperationKind,
        pubdata: &[u8],
        current_height: BlockHeight,
    ) -> PriorityRequest {
        let request = PriorityRequest {
            id: self.next_id,
            digest: pubdata_digest(pubdata),
            kind: kind.tag(),
            expiry_height: current_height + EXPIRATION_BLOCKS,
        };
        self.requests.insert(request.id, request.clone());
        self.next_id += 1;
        request
    }

    /// advance the open window past the `n` oldest requests
    pub fn consume_prefix(&mut self, n: u64) -> Result<()> {
        let open = self.open_count();
        if n > open {
            return Err(CoreError::ConsumeBeyondWindow { requested: n, open });
        }
        for id in self.first_open..self.first_open + n {
            self.requests.remove(&id);
        }
        self.first_open += n;
        Ok(())
    }

    /// true iff the oldest open request's expiry height has passed
    pub fn peek_expired(&self, current_height: BlockHeight) -> bool {
        self.requests
            .get(&self.first_open)
            .is_some_and(|r| current_height > r.expiry_height)
    }

    /// validate that `id` could be cancelled right now, without touching
    /// anything
    ///
    /// cancellation is strictly sequential: only the current oldest open
    /// request may be cancelled, so the window never develops gaps. the
    /// desert-mode gate is the caller's responsibility.
    pub fn check_cancellable(
        &self,
        id: RequestId,
        pubdata: &[u8],
        current_height: BlockHeight,
    ) -> Result<()> {
        let request = self
            .requests
            .get(&id)
            .ok_or(CoreError::RequestNotFound(id))?;
        if id != self.first_open {
            return Err(CoreError::NotOldestRequest {
                id,
                oldest: self.first_open,
            });
        }
        if current_height <= request.expiry_height {
            return Err(CoreError::RequestNotExpired(id));
        }
        if pubdata_digest(pubdata) != request.digest {
            return Err(CoreError::CancelDigestMismatch(id));
        }
        Ok(())
    }

    /// remove an expired request after verifying its public data
    pub fn cancel(
        &mut self,
        id: RequestId,
        pubdata: &[u8],
        current_height: BlockHeight,
    ) -> Result<PriorityRequest> {
        self.check_cancellable(id, pubdata, current_height)?;
        let request = self.requests.remove(&id).ok_or(CoreError::RequestNotFound(id))?;
        self.first_open += 1;
        Ok(request)
    }

    pub fn first_open(&self) -> RequestId {
        self.first_open
    }

    pub fn next_id(&self) -> RequestId {
        self.next_id
    }

    pub fn open_count(&self) -> u64 {
        self.next_id - self.first_open
    }

    pub fn get(&self, id: RequestId) -> Option<&PriorityRequest> {
        self.requests.get(&id)
    }
}
