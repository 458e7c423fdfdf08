//! Modes of operation over [`crate::aes::BlockCipher`].
//!
//! Mode instances carry per-message cursor state (counter, buffered
//! keystream). They borrow the block cipher, are not `Sync`-shared, and are
//! built fresh for every message.

pub mod counter;
pub mod ctr;
pub mod gcm;
pub mod ghash;

pub use counter::Counter;
pub use ctr::CtrMode;
pub use gcm::{Gcm, TAG_LEN};
pub use ghash::GHash;

use crate::error::CryptoError;

/// Byte length of a nonce.
pub const NONCE_LEN: usize = 12;

/// Draw a nonce from the OS CSPRNG.
pub fn random_nonce() -> Result<[u8; NONCE_LEN], CryptoError> {
    let mut nonce = [0u8; NONCE_LEN];
    getrandom::getrandom(&mut nonce).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(nonce)
}
