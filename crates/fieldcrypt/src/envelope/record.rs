//! Persisted envelope records and the outcomes of reading them.

use std::collections::BTreeMap;

/// Everything persisted for one record's sensitive data.
///
/// Every blob uses the `nonce || ciphertext || tag` layout. The wrapped
/// subkey is sealed under the master key; the fields and the rotation
/// counter are sealed under the subkey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeRecord {
    /// Hex text of the subkey, sealed under the master key.
    pub wrapped_subkey: Vec<u8>,
    /// One sealed blob per sensitive field, keyed by field name.
    pub fields: BTreeMap<String, Vec<u8>>,
    /// Decimal owner-read count since the last rotation, sealed under the subkey.
    pub rotation_counter: Vec<u8>,
}

/// What has to be written back after an owner read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordUpdate {
    /// Only the counter blob changes.
    Counter {
        /// Freshly sealed counter blob.
        rotation_counter: Vec<u8>,
        /// Owner reads since the last rotation, including this one.
        reads: u64,
    },
    /// The subkey was rotated; every blob is replaced.
    Rotated(EnvelopeRecord),
}

impl RecordUpdate {
    /// Write this update into `record` in a single assignment.
    pub fn apply_to(self, record: &mut EnvelopeRecord) {
        match self {
            RecordUpdate::Counter {
                rotation_counter, ..
            } => record.rotation_counter = rotation_counter,
            RecordUpdate::Rotated(replacement) => *record = replacement,
        }
    }

    /// `true` if this update replaced the subkey.
    pub fn is_rotation(&self) -> bool {
        matches!(self, RecordUpdate::Rotated(_))
    }
}

/// Result of a successful owner read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Decrypted field values.
    pub fields: BTreeMap<String, String>,
    /// Blobs that must be persisted for the read to count.
    pub update: RecordUpdate,
}

/// Hex-encoded blobs, handed out untouched to anyone but the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedRecord {
    /// Hex of the wrapped-subkey blob.
    pub wrapped_subkey: String,
    /// Hex of each field blob.
    pub fields: BTreeMap<String, String>,
    /// Hex of the rotation-counter blob.
    pub rotation_counter: String,
}

impl From<&EnvelopeRecord> for SealedRecord {
    fn from(record: &EnvelopeRecord) -> Self {
        Self {
            wrapped_subkey: hex::encode(&record.wrapped_subkey),
            fields: record
                .fields
                .iter()
                .map(|(name, blob)| (name.clone(), hex::encode(blob)))
                .collect(),
            rotation_counter: hex::encode(&record.rotation_counter),
        }
    }
}

/// What a requester gets back from a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordAccess {
    /// The owner's view: plaintext plus the update to persist.
    Opened(ReadOutcome),
    /// Everyone else's view: opaque hex blobs, nothing decrypted.
    Sealed(SealedRecord),
}
