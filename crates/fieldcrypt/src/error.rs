//! Error kinds produced by the cipher, mode, and envelope layers.

use thiserror::Error;

use crate::field::MIN_BLOB_LEN;

/// Errors produced by every `fieldcrypt` operation.
///
/// None of the messages carry plaintext or key material, so they are safe to
/// log at the service boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The raw key is not 16, 24 or 32 bytes long.
    #[error("invalid key size: expected 16, 24 or 32 bytes, got {0}")]
    InvalidKeySize(usize),

    /// Key text is not an even-length hex string.
    #[error("invalid key encoding: expected hex text")]
    InvalidKeyHex,

    /// A nonce is not exactly 12 bytes long.
    #[error("invalid nonce size: expected 12 bytes, got {0}")]
    InvalidNonceSize(usize),

    /// The initial counter value does not fit in 32 bits.
    #[error("initial counter value {0} is outside 0..2^32")]
    InvalidCounterRange(u64),

    /// More than one block of input was handed to a single-block transform.
    #[error("invalid block size: expected at most 16 bytes, got {0}")]
    InvalidBlockSize(usize),

    /// The authentication tag did not match.
    #[error("authentication tag mismatch")]
    AuthenticationFailure,

    /// An encrypted field blob is too short to hold a nonce and a tag.
    #[error("malformed blob: expected at least {MIN_BLOB_LEN} bytes, got {0}")]
    MalformedBlob(usize),

    /// Authenticated plaintext is not valid UTF-8 text.
    #[error("decrypted plaintext is not valid UTF-8")]
    InvalidPlaintext,

    /// The unwrapped subkey is not 64 hex characters.
    #[error("wrapped subkey does not decode to a 32-byte key")]
    InvalidWrappedKey,

    /// The decrypted rotation counter is not a decimal integer.
    #[error("rotation counter is not a decimal integer")]
    InvalidRotationCounter,

    /// The OS random source failed.
    #[error("random number generation failed: {0}")]
    RngFailed(String),
}
