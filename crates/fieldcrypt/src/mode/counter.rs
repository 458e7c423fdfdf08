//! 128-bit counter block: 12-byte nonce followed by a 32-bit big-endian counter.

use super::NONCE_LEN;
use crate::aes::{Block, BLOCK_LEN};
use crate::error::CryptoError;

/// Counter block for CTR keystream generation.
///
/// Only the trailing four bytes ever change; the nonce prefix is fixed for
/// the lifetime of the counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Counter {
    block: Block,
}

impl Counter {
    /// Initial counter value used when none is given.
    pub const DEFAULT_INITIAL: u64 = 1;

    /// Build a counter from a 12-byte nonce and an initial 32-bit value.
    ///
    /// `initial_value` is taken as `u64` so out-of-range values can be
    /// reported instead of silently truncated.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidNonceSize`] if `nonce` is not 12 bytes.
    /// - [`CryptoError::InvalidCounterRange`] if `initial_value >= 2^32`.
    pub fn new(nonce: &[u8], initial_value: u64) -> Result<Self, CryptoError> {
        if nonce.len() != NONCE_LEN {
            return Err(CryptoError::InvalidNonceSize(nonce.len()));
        }
        let count =
            u32::try_from(initial_value).map_err(|_| CryptoError::InvalidCounterRange(initial_value))?;
        let mut block = [0u8; BLOCK_LEN];
        block[..NONCE_LEN].copy_from_slice(nonce);
        block[NONCE_LEN..].copy_from_slice(&count.to_be_bytes());
        Ok(Self { block })
    }

    /// The current 16-byte counter block.
    pub fn value(&self) -> &Block {
        &self.block
    }

    /// The fixed nonce prefix.
    pub fn nonce(&self) -> &[u8] {
        &self.block[..NONCE_LEN]
    }

    /// The current 32-bit counter field.
    pub fn count(&self) -> u32 {
        let mut tail = [0u8; 4];
        tail.copy_from_slice(&self.block[NONCE_LEN..]);
        u32::from_be_bytes(tail)
    }

    /// Add one to the counter field, wrapping to zero past `u32::MAX`.
    ///
    /// The carry never reaches the nonce.
    pub fn increment(&mut self) {
        let next = self.count().wrapping_add(1);
        self.block[NONCE_LEN..].copy_from_slice(&next.to_be_bytes());
    }
}
