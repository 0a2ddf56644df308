//! tagged operation records
//!
//! each variant has a fixed encoded length, so a block's per-transaction
//! offsets are enough to re-slice the concatenated public data.

use crate::error::{PubdataError, Result};

/// operation type tags as they appear on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OperationKind {
    /// account registration (name-registry adjacent, still a priority op)
    Register = 0x01,
    /// native or fungible asset deposit from L1
    Deposit = 0x02,
    /// NFT deposit from L1
    NftDeposit = 0x03,
    /// forced exit of a fungible balance
    FullExit = 0x04,
    /// forced exit of an NFT
    NftFullExit = 0x05,
    /// L2-internal transfer, no L1 effect
    Transfer = 0x06,
    /// L2-initiated withdrawal, no priority-queue entry
    Withdraw = 0x07,
}

impl OperationKind {
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0x01 => Ok(Self::Register),
            0x02 => Ok(Self::Deposit),
            0x03 => Ok(Self::NftDeposit),
            0x04 => Ok(Self::FullExit),
            0x05 => Ok(Self::NftFullExit),
            0x06 => Ok(Self::Transfer),
            0x07 => Ok(Self::Withdraw),
            other => Err(PubdataError::UnknownTag(other)),
        }
    }

    pub fn tag(&self) -> u8 {
        *self as u8
    }

    /// encoded record length including the tag byte
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Register => 1 + 4 + 32 + 32 + 32 + 20,
            Self::Deposit | Self::FullExit => 1 + 4 + 2 + 16 + 20,
            Self::NftDeposit | Self::NftFullExit => 1 + 4 + 4 + 2 + 8 + 2 + 20 + 32 + 1,
            Self::Transfer => 1 + 4 + 4 + 2 + 16,
            Self::Withdraw => 1 + 4 + 2 + 16 + 20,
        }
    }

    /// true for operations that originate on L1 and must be matched against
    /// the priority queue in order
    pub fn is_priority(&self) -> bool {
        matches!(
            self,
            Self::Register | Self::Deposit | Self::NftDeposit | Self::FullExit | Self::NftFullExit
        )
    }
}

/// a decoded L2 transaction record
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Register {
        account_index: u32,
        account_name_hash: [u8; 32],
        pub_key_x: [u8; 32],
        pub_key_y: [u8; 32],
        owner: [u8; 20],
    },
    Deposit {
        account_index: u32,
        asset_id: u16,
        amount: u128,
        owner: [u8; 20],
    },
    NftDeposit {
        account_index: u32,
        creator_account_index: u32,
        creator_treasury_rate: u16,
        nft_index: u64,
        collection_id: u16,
        owner: [u8; 20],
        content_hash: [u8; 32],
        content_type: u8,
    },
    /// full exit carries the account's *final* balance as computed by L2;
    /// at request time the amount field is zero
    FullExit {
        account_index: u32,
        asset_id: u16,
        amount: u128,
        owner: [u8; 20],
    },
    NftFullExit {
        account_index: u32,
        creator_account_index: u32,
        creator_treasury_rate: u16,
        nft_index: u64,
        collection_id: u16,
        owner: [u8; 20],
        content_hash: [u8; 32],
        content_type: u8,
    },
    Transfer {
        from_account_index: u32,
        to_account_index: u32,
        asset_id: u16,
        amount: u128,
    },
    Withdraw {
        account_index: u32,
        asset_id: u16,
        amount: u128,
        recipient: [u8; 20],
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Register { .. } => OperationKind::Register,
            Self::Deposit { .. } => OperationKind::Deposit,
            Self::NftDeposit { .. } => OperationKind::NftDeposit,
            Self::FullExit { .. } => OperationKind::FullExit,
            Self::NftFullExit { .. } => OperationKind::NftFullExit,
            Self::Transfer { .. } => OperationKind::Transfer,
            Self::Withdraw { .. } => OperationKind::Withdraw,
        }
    }

    pub fn is_priority(&self) -> bool {
        self.kind().is_priority()
    }

    /// serialize to the canonical wire record (tag byte + big-endian fields)
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.kind().encoded_len());
        out.push(self.kind().tag());
        match self {
            Self::Register {
                account_index,
                account_name_hash,
                pub_key_x,
                pub_key_y,
                owner,
            } => {
                out.extend_from_slice(&account_index.to_be_bytes());
                out.extend_from_slice(account_name_hash);
                out.extend_from_slice(pub_key_x);
                out.extend_from_slice(pub_key_y);
                out.extend_from_slice(owner);
            }
            Self::Deposit {
                account_index,
                asset_id,
                amount,
                owner,
            }
            | Self::FullExit {
                account_index,
                asset_id,
                amount,
                owner,
            } => {
                out.extend_from_slice(&account_index.to_be_bytes());
                out.extend_from_slice(&asset_id.to_be_bytes());
                out.extend_from_slice(&amount.to_be_bytes());
                out.extend_from_slice(owner);
            }
            Self::NftDeposit {
                account_index,
                creator_account_index,
                creator_treasury_rate,
                nft_index,
                collection_id,
                owner,
                content_hash,
                content_type,
            }
            | Self::NftFullExit {
                account_index,
                creator_account_index,
                creator_treasury_rate,
                nft_index,
                collection_id,
                owner,
                content_hash,
                content_type,
            } => {
                out.extend_from_slice(&account_index.to_be_bytes());
                out.extend_from_slice(&creator_account_index.to_be_bytes());
                out.extend_from_slice(&creator_treasury_rate.to_be_bytes());
                out.extend_from_slice(&nft_index.to_be_bytes());
                out.extend_from_slice(&collection_id.to_be_bytes());
                out.extend_from_slice(owner);
                out.extend_from_slice(content_hash);
                out.push(*content_type);
            }
            Self::Transfer {
                from_account_index,
                to_account_index,
                asset_id,
                amount,
            } => {
                out.extend_from_slice(&from_account_index.to_be_bytes());
                out.extend_from_slice(&to_account_index.to_be_bytes());
                out.extend_from_slice(&asset_id.to_be_bytes());
                out.extend_from_slice(&amount.to_be_bytes());
            }
            Self::Withdraw {
                account_index,
                asset_id,
                amount,
                recipient,
            } => {
                out.extend_from_slice(&account_index.to_be_bytes());
                out.extend_from_slice(&asset_id.to_be_bytes());
                out.extend_from_slice(&amount.to_be_bytes());
                out.extend_from_slice(recipient);
            }
        }
        debug_assert_eq!(out.len(), self.kind().encoded_len());
        out
    }

    /// decode a single record from an exact slice
    ///
    /// the slice must be exactly the variant's encoded length; trailing or
    /// missing bytes are errors, not silently tolerated.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let tag = *data.first().ok_or(PubdataError::Empty)?;
        let kind = OperationKind::from_tag(tag)?;
        let expected = kind.encoded_len();
        if data.len() != expected {
            return Err(PubdataError::LengthMismatch {
                expected,
                got: data.len(),
            });
        }

        let mut cur = Cursor::new(&data[1..]);
        let op = match kind {
            OperationKind::Register => Self::Register {
                account_index: cur.u32()?,
                account_name_hash: cur.bytes32()?,
                pub_key_x: cur.bytes32()?,
                pub_key_y: cur.bytes32()?,
                owner: cur.bytes20()?,
            },
            OperationKind::Deposit => Self::Deposit {
                account_index: cur.u32()?,
                asset_id: cur.u16()?,
                amount: cur.u128()?,
                owner: cur.bytes20()?,
            },
            OperationKind::FullExit => Self::FullExit {
                account_index: cur.u32()?,
                asset_id: cur.u16()?,
                amount: cur.u128()?,
                owner: cur.bytes20()?,
            },
            OperationKind::NftDeposit | OperationKind::NftFullExit => {
                let account_index = cur.u32()?;
                let creator_account_index = cur.u32()?;
                let creator_treasury_rate = cur.u16()?;
                let nft_index = cur.u64()?;
                let collection_id = cur.u16()?;
                let owner = cur.bytes20()?;
                let content_hash = cur.bytes32()?;
                let content_type = cur.u8()?;
                if kind == OperationKind::NftDeposit {
                    Self::NftDeposit {
                        account_index,
                        creator_account_index,
                        creator_treasury_rate,
                        nft_index,
                        collection_id,
                        owner,
                        content_hash,
                        content_type,
                    }
                } else {
                    Self::NftFullExit {
                        account_index,
                        creator_account_index,
                        creator_treasury_rate,
                        nft_index,
                        collection_id,
                        owner,
                        content_hash,
                        content_type,
                    }
                }
            }
            OperationKind::Transfer => Self::Transfer {
                from_account_index: cur.u32()?,
                to_account_index: cur.u32()?,
                asset_id: cur.u16()?,
                amount: cur.u128()?,
            },
            OperationKind::Withdraw => Self::Withdraw {
                account_index: cur.u32()?,
                asset_id: cur.u16()?,
                amount: cur.u128()?,
                recipient: cur.bytes20()?,
            },
        };
        Ok(op)
    }
}

/// re-slice a block's concatenated public data by its per-transaction
/// offsets, decoding every record
///
/// offsets must be strictly increasing and records must not overlap; every
/// record must fit within the blob. returns ops in offset order.
pub fn walk(pubdata: &[u8], offsets: &[u32]) -> Result<Vec<Operation>> {
    let mut ops = Vec::with_capacity(offsets.len());
    let mut prev_offset: Option<u32> = None;
    let mut min_offset = 0usize;
    for &offset in offsets {
        if let Some(prev) = prev_offset {
            if offset <= prev {
                return Err(PubdataError::OffsetsNotIncreasing);
            }
        }
        prev_offset = Some(offset);
        let start = offset as usize;
        if start >= pubdata.len() {
            return Err(PubdataError::OffsetOutOfBounds {
                offset,
                len: pubdata.len(),
            });
        }
        if start < min_offset {
            return Err(PubdataError::OverlappingOperations { offset });
        }
        let kind = OperationKind::from_tag(pubdata[start])?;
        let end = start + kind.encoded_len();
        if end > pubdata.len() {
            return Err(PubdataError::Truncated {
                expected: kind.encoded_len(),
                got: pubdata.len() - start,
            });
        }
        ops.push(Operation::decode(&pubdata[start..end])?);
        min_offset = end;
    }
    Ok(ops)
}

/// bounds-checked big-endian reader
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.data.len() {
            return Err(PubdataError::Truncated {
                expected: self.pos + n,
                got: self.data.len(),
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_be_bytes(buf))
    }

    fn u128(&mut self) -> Result<u128> {
        let b = self.take(16)?;
        let mut buf = [0u8; 16];
        buf.copy_from_slice(b);
        Ok(u128::from_be_bytes(buf))
    }

    fn bytes20(&mut self) -> Result<[u8; 20]> {
        let b = self.take(20)?;
        let mut buf = [0u8; 20];
        buf.copy_from_slice(b);
        Ok(buf)
    }

    fn bytes32(&mut self) -> Result<[u8; 32]> {
        let b = self.take(32)?;
        let mut buf = [0u8; 32];
        buf.copy_from_slice(b);
        Ok(buf)
    }
}
