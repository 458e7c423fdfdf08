//! In-memory person records with envelope-encrypted sensitive fields.
//!
//! # Lifecycle
//!
//! 1. [`RecordStore::create`] seals the submitted fields under a new subkey and
//!    assigns the next id.
//! 2. Every read takes the record's own lock, runs one envelope read cycle,
//!    and persists the returned update before releasing it. Reads of different
//!    records never wait on each other.
//! 3. A failed cycle leaves the stored record exactly as it was.
//!
//! # Security invariants
//!
//! - Field values and subkeys exist in plaintext only for the duration of an
//!   owner read; only blobs are stored.

pub mod records;

pub use records::RecordStore;

use std::collections::BTreeMap;

use common::ServiceError;
use fieldcrypt::{CryptoError, SealedRecord};
use thiserror::Error;

/// Errors produced by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record has this id.
    #[error("person {0} does not exist")]
    NotFound(u64),

    /// Another record already uses this username.
    #[error("username {0:?} is already taken")]
    DuplicateUsername(String),

    /// The envelope layer refused to seal or open the record.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ServiceError::NotFound(err.to_string()),
            StoreError::DuplicateUsername(_) => ServiceError::BadRequest(err.to_string()),
            StoreError::Crypto(_) => {
                ServiceError::EncryptionFailure("record could not be processed".into())
            }
        }
    }
}

/// Sensitive fields as released to one requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldView {
    /// Plaintext, for the record's owner.
    Plain(BTreeMap<String, String>),
    /// Hex blobs, for everyone else.
    Sealed(SealedRecord),
}

/// One record as released by a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRead {
    pub id: u64,
    pub username: String,
    pub view: FieldView,
}
