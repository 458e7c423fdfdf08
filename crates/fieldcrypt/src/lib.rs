//! Field-level encryption engine.
//!
//! Layers, leaves first:
//!
//! 1. [`aes`]: FIPS-197 key schedule and single-block cipher.
//! 2. [`mode`]: 32-bit counter, CTR keystream, GHASH and the GCM-style AEAD.
//! 3. [`field`]: `nonce || ciphertext || tag` blobs for one textual value.
//! 4. [`envelope`]: per-record subkeys wrapped under a master key, with
//!    rotation after a configured number of owner reads.
//!
//! Everything here is synchronous and CPU-bound. The block cipher is safe to
//! share; mode instances are not and are built fresh for every message.

pub mod aes;
pub mod envelope;
pub mod error;
pub mod field;
pub mod keys;
pub mod mode;

pub use aes::BlockCipher;
pub use envelope::{
    EnvelopeCipher, EnvelopeConfig, EnvelopeRecord, ReadOutcome, RecordAccess, RecordUpdate,
    SealedRecord,
};
pub use error::CryptoError;
pub use field::{decrypt_field, encrypt_field, generate_subkey, EncryptedField};
pub use keys::{MasterKey, SubKey};
