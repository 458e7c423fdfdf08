//! Envelope encryption of a record's sensitive fields, with subkey rotation.
//!
//! # Lifecycle
//!
//! 1. [`EnvelopeCipher::create_record`] generates a random 32-byte subkey,
//!    seals every field and a zero rotation counter under it, and wraps the
//!    subkey's hex text under the master key.
//! 2. Each owner read ([`EnvelopeCipher::read_and_maybe_rotate`]) unwraps the
//!    subkey, decrypts all fields and the counter, and bumps the counter.
//! 3. Once the bumped counter exceeds the rotation threshold, the read
//!    instead re-seals everything under a brand-new subkey with the counter
//!    back at zero.
//!
//! Reads never write anything themselves. They return a [`RecordUpdate`]
//! that the caller persists, under whatever per-record serialization its
//! store provides. Two unserialized reads of one record can both see the same
//! counter and lose an update.
//!
//! # Failure
//!
//! Any decrypt failure aborts the read: no plaintext, no update.

pub mod record;

pub use record::{EnvelopeRecord, ReadOutcome, RecordAccess, RecordUpdate, SealedRecord};

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::CryptoError;
use crate::field::{decrypt_field, encrypt_field, generate_subkey};
use crate::keys::{wipe, MasterKey, SubKey};

/// Settings injected into [`EnvelopeCipher`] at construction.
#[derive(Debug, Clone)]
pub struct EnvelopeConfig {
    /// Key that wraps every record's subkey.
    pub master_key: MasterKey,
    /// Owner reads allowed under one subkey before it is rotated.
    pub rotation_threshold: u64,
}

impl EnvelopeConfig {
    /// Bundle a master key and rotation threshold.
    pub fn new(master_key: MasterKey, rotation_threshold: u64) -> Self {
        Self {
            master_key,
            rotation_threshold,
        }
    }
}

/// Seals, opens, and rotates [`EnvelopeRecord`]s under one master key.
#[derive(Debug, Clone)]
pub struct EnvelopeCipher {
    config: EnvelopeConfig,
}

impl EnvelopeCipher {
    /// Build a cipher from injected configuration.
    pub fn new(config: EnvelopeConfig) -> Self {
        Self { config }
    }

    /// Configured rotation threshold.
    pub fn rotation_threshold(&self) -> u64 {
        self.config.rotation_threshold
    }

    /// Seal a new record's fields under a freshly generated subkey.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::RngFailed`] if key or nonce generation fails.
    pub fn create_record(
        &self,
        fields: &BTreeMap<String, String>,
    ) -> Result<EnvelopeRecord, CryptoError> {
        let record = self.seal_record(fields)?;
        debug!(fields = fields.len(), "envelope record created");
        Ok(record)
    }

    /// Run one owner read cycle.
    ///
    /// Returns the decrypted fields together with the update to persist:
    /// either the incremented counter or, past the threshold, a fully
    /// re-sealed record under a new subkey.
    ///
    /// # Errors
    ///
    /// Any error from unwrapping the subkey or decrypting a field or the
    /// counter. Nothing is returned for persistence in that case.
    pub fn read_and_maybe_rotate(
        &self,
        record: &EnvelopeRecord,
    ) -> Result<ReadOutcome, CryptoError> {
        let subkey = self.unwrap_subkey(&record.wrapped_subkey)?;
        let fields = open_fields(&subkey, &record.fields)?;
        let reads = open_counter(&subkey, &record.rotation_counter)?.saturating_add(1);

        let update = if reads > self.config.rotation_threshold {
            let replacement = self.seal_record(&fields)?;
            info!(
                reads,
                threshold = self.config.rotation_threshold,
                "record subkey rotated"
            );
            RecordUpdate::Rotated(replacement)
        } else {
            debug!(reads, "record read counted");
            RecordUpdate::Counter {
                rotation_counter: encrypt_field(subkey.as_bytes(), &reads.to_string())?,
                reads,
            }
        };

        Ok(ReadOutcome { fields, update })
    }

    /// Read on behalf of a requester.
    ///
    /// The owner gets [`RecordAccess::Opened`]. Anyone else gets the blobs as
    /// hex, with no cryptographic operation attempted.
    ///
    /// # Errors
    ///
    /// Same as [`EnvelopeCipher::read_and_maybe_rotate`], owner reads only.
    pub fn read_for(
        &self,
        record: &EnvelopeRecord,
        requester_is_owner: bool,
    ) -> Result<RecordAccess, CryptoError> {
        if requester_is_owner {
            self.read_and_maybe_rotate(record).map(RecordAccess::Opened)
        } else {
            Ok(RecordAccess::Sealed(SealedRecord::from(record)))
        }
    }

    /// Owner reads counted since the last rotation, without changing anything.
    ///
    /// # Errors
    ///
    /// Any error from unwrapping the subkey or decrypting the counter.
    pub fn rotation_count(&self, record: &EnvelopeRecord) -> Result<u64, CryptoError> {
        let subkey = self.unwrap_subkey(&record.wrapped_subkey)?;
        open_counter(&subkey, &record.rotation_counter)
    }

    fn seal_record(
        &self,
        fields: &BTreeMap<String, String>,
    ) -> Result<EnvelopeRecord, CryptoError> {
        let subkey = generate_subkey()?;
        let sealed = fields
            .iter()
            .map(|(name, value)| {
                encrypt_field(subkey.as_bytes(), value).map(|blob| (name.clone(), blob))
            })
            .collect::<Result<BTreeMap<_, _>, CryptoError>>()?;

        let subkey_hex = subkey.to_hex();
        let wrapped = encrypt_field(self.config.master_key.as_bytes(), &subkey_hex);
        wipe(subkey_hex);

        Ok(EnvelopeRecord {
            wrapped_subkey: wrapped?,
            fields: sealed,
            rotation_counter: encrypt_field(subkey.as_bytes(), "0")?,
        })
    }

    fn unwrap_subkey(&self, wrapped: &[u8]) -> Result<SubKey, CryptoError> {
        let text = decrypt_field(self.config.master_key.as_bytes(), wrapped)?;
        let subkey = SubKey::from_hex(&text);
        wipe(text);
        subkey
    }
}

fn open_fields(
    subkey: &SubKey,
    fields: &BTreeMap<String, Vec<u8>>,
) -> Result<BTreeMap<String, String>, CryptoError> {
    fields
        .iter()
        .map(|(name, blob)| decrypt_field(subkey.as_bytes(), blob).map(|text| (name.clone(), text)))
        .collect()
}

fn open_counter(subkey: &SubKey, blob: &[u8]) -> Result<u64, CryptoError> {
    decrypt_field(subkey.as_bytes(), blob)?
        .parse()
        .map_err(|_| CryptoError::InvalidRotationCounter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::MIN_BLOB_LEN;

    fn cipher(threshold: u64) -> EnvelopeCipher {
        let master = MasterKey::new(&[0x5a; 32]).unwrap();
        EnvelopeCipher::new(EnvelopeConfig::new(master, threshold))
    }

    fn person() -> BTreeMap<String, String> {
        [
            ("email", "somchai@example.com"),
            ("gender", "male"),
            ("city", "Chiang Mai"),
            ("phone_number", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
    }

    /// Run one owner read and persist its update.
    fn owner_read(env: &EnvelopeCipher, record: &mut EnvelopeRecord) -> ReadOutcome {
        let outcome = env.read_and_maybe_rotate(record).unwrap();
        outcome.update.clone().apply_to(record);
        outcome
    }

    #[test]
    fn create_seals_every_field_and_zero_counter() {
        let env = cipher(5);
        let record = env.create_record(&person()).unwrap();

        assert_eq!(record.fields.len(), 4);
        assert_eq!(
            record.fields["city"].len(),
            MIN_BLOB_LEN + "Chiang Mai".len()
        );
        // 64 hex chars of subkey.
        assert_eq!(record.wrapped_subkey.len(), MIN_BLOB_LEN + 64);
        assert_eq!(env.rotation_count(&record).unwrap(), 0);
    }

    #[test]
    fn owner_read_returns_plaintext_and_counts() {
        let env = cipher(5);
        let mut record = env.create_record(&person()).unwrap();
        let wrapped = record.wrapped_subkey.clone();

        let outcome = owner_read(&env, &mut record);
        assert_eq!(outcome.fields, person());
        assert!(matches!(outcome.update, RecordUpdate::Counter { reads: 1, .. }));
        assert_eq!(env.rotation_count(&record).unwrap(), 1);
        assert_eq!(record.wrapped_subkey, wrapped);
    }

    #[test]
    fn rotates_after_threshold_plus_one_reads() {
        let threshold = 3;
        let env = cipher(threshold);
        let mut record = env.create_record(&person()).unwrap();
        let original_wrapped = record.wrapped_subkey.clone();

        for expected in 1..=threshold {
            let outcome = owner_read(&env, &mut record);
            assert!(!outcome.update.is_rotation());
            assert_eq!(env.rotation_count(&record).unwrap(), expected);
            assert_eq!(record.wrapped_subkey, original_wrapped);
        }

        let before = record.clone();
        let outcome = owner_read(&env, &mut record);
        assert!(outcome.update.is_rotation());
        assert_eq!(outcome.fields, person());
        assert_ne!(record.wrapped_subkey, original_wrapped);
        assert_eq!(env.rotation_count(&record).unwrap(), 0);
        for (name, blob) in &record.fields {
            assert_ne!(blob, &before.fields[name]);
        }

        // The rotated record reads back the same values.
        assert_eq!(owner_read(&env, &mut record).fields, person());
    }

    #[test]
    fn threshold_comes_from_config() {
        assert_eq!(cipher(7).rotation_threshold(), 7);
        assert_eq!(cipher(0).rotation_threshold(), 0);
    }

    #[test]
    fn zero_threshold_rotates_on_every_read() {
        let env = cipher(0);
        let mut record = env.create_record(&person()).unwrap();
        for _ in 0..3 {
            let wrapped = record.wrapped_subkey.clone();
            assert!(owner_read(&env, &mut record).update.is_rotation());
            assert_ne!(record.wrapped_subkey, wrapped);
        }
    }

    #[test]
    fn wrong_master_key_fails_without_update() {
        let record = cipher(5).create_record(&person()).unwrap();
        let other = EnvelopeCipher::new(EnvelopeConfig::new(
            MasterKey::new(&[0x11; 32]).unwrap(),
            5,
        ));
        assert_eq!(
            other.read_and_maybe_rotate(&record).unwrap_err(),
            CryptoError::AuthenticationFailure
        );
    }

    #[test]
    fn one_tampered_field_aborts_the_whole_read() {
        let env = cipher(5);
        let mut record = env.create_record(&person()).unwrap();
        if let Some(blob) = record.fields.get_mut("gender") {
            let last = blob.len() - 1;
            blob[last] ^= 0x01;
        }
        assert_eq!(
            env.read_and_maybe_rotate(&record).unwrap_err(),
            CryptoError::AuthenticationFailure
        );
    }

    #[test]
    fn truncated_counter_is_malformed() {
        let env = cipher(5);
        let mut record = env.create_record(&person()).unwrap();
        record.rotation_counter.truncate(20);
        assert_eq!(
            env.read_and_maybe_rotate(&record).unwrap_err(),
            CryptoError::MalformedBlob(20)
        );
    }

    #[test]
    fn non_numeric_counter_is_rejected() {
        let env = cipher(5);
        let mut record = env.create_record(&person()).unwrap();
        let subkey = env.unwrap_subkey(&record.wrapped_subkey).unwrap();
        record.rotation_counter = encrypt_field(subkey.as_bytes(), "many").unwrap();
        assert_eq!(
            env.read_and_maybe_rotate(&record).unwrap_err(),
            CryptoError::InvalidRotationCounter
        );
    }

    #[test]
    fn non_owner_gets_sealed_hex_untouched() {
        let env = cipher(5);
        let record = env.create_record(&person()).unwrap();
        match env.read_for(&record, false).unwrap() {
            RecordAccess::Sealed(sealed) => {
                assert_eq!(sealed, SealedRecord::from(&record));
                assert_eq!(sealed.fields["email"], hex::encode(&record.fields["email"]));
            }
            RecordAccess::Opened(_) => panic!("non-owner must not see plaintext"),
        }
        assert_eq!(env.rotation_count(&record).unwrap(), 0);
    }

    #[test]
    fn non_owner_gets_sealed_view_even_for_corrupt_record() {
        let env = cipher(5);
        let mut record = env.create_record(&person()).unwrap();
        record.wrapped_subkey.clear();
        assert!(matches!(
            env.read_for(&record, false).unwrap(),
            RecordAccess::Sealed(_)
        ));
        assert!(env.read_for(&record, true).is_err());
    }

    #[test]
    fn empty_record_still_rotates() {
        let env = cipher(1);
        let mut record = env.create_record(&BTreeMap::new()).unwrap();
        owner_read(&env, &mut record);
        assert!(owner_read(&env, &mut record).update.is_rotation());
        assert!(record.fields.is_empty());
    }
}
