//! [`RecordStore`]: id-indexed person records, each behind its own lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use fieldcrypt::{EnvelopeCipher, EnvelopeRecord, ReadOutcome, RecordAccess};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::{FieldView, PersonRead, StoreError};

#[derive(Debug, Clone)]
struct Entry {
    username: String,
    envelope: Arc<Mutex<EnvelopeRecord>>,
}

#[derive(Debug, Default)]
struct Records {
    last_id: u64,
    by_username: HashMap<String, u64>,
    entries: BTreeMap<u64, Entry>,
}

/// Thread-safe store of person records.
///
/// The id map sits behind an `RwLock` that is held only long enough to look
/// up or insert an entry. Each record's envelope has its own `Mutex`, held for
/// the whole read-decrypt-update cycle so concurrent owner reads of one record
/// are counted one after another.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    inner: Arc<RwLock<Records>>,
}

impl RecordStore {
    /// Create a new, empty [`RecordStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Seal `fields` and store them under a new id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DuplicateUsername`] if the username is taken.
    /// - [`StoreError::Crypto`] if sealing fails.
    pub async fn create(
        &self,
        cipher: &EnvelopeCipher,
        username: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<u64, StoreError> {
        if self.inner.read().await.by_username.contains_key(username) {
            return Err(StoreError::DuplicateUsername(username.to_owned()));
        }
        let envelope = cipher.create_record(fields)?;

        let mut records = self.inner.write().await;
        // Re-check: another create may have won the race while sealing.
        if records.by_username.contains_key(username) {
            return Err(StoreError::DuplicateUsername(username.to_owned()));
        }
        records.last_id += 1;
        let id = records.last_id;
        records.by_username.insert(username.to_owned(), id);
        records.entries.insert(
            id,
            Entry {
                username: username.to_owned(),
                envelope: Arc::new(Mutex::new(envelope)),
            },
        );
        debug!(id, fields = fields.len(), "person stored");
        Ok(id)
    }

    /// Ids of every stored record, ascending.
    pub async fn ids(&self) -> Vec<u64> {
        self.inner.read().await.entries.keys().copied().collect()
    }

    /// Read record `id` on behalf of person `requester`.
    ///
    /// When the requester owns the record, the fields are decrypted and the
    /// rotation counter (or the whole envelope, on rotation) is written back
    /// before the record lock is released. Anyone else gets the sealed blobs
    /// and nothing is written.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] for an unknown id.
    /// - [`StoreError::Crypto`] if the owner read fails; the record is unchanged.
    pub async fn read(
        &self,
        cipher: &EnvelopeCipher,
        id: u64,
        requester: u64,
    ) -> Result<PersonRead, StoreError> {
        let entry = self
            .inner
            .read()
            .await
            .entries
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))?;

        let mut envelope = entry.envelope.lock().await;
        let view = match cipher.read_for(&envelope, requester == id)? {
            RecordAccess::Opened(ReadOutcome { fields, update }) => {
                if update.is_rotation() {
                    debug!(id, "person subkey rotated");
                }
                update.apply_to(&mut envelope);
                FieldView::Plain(fields)
            }
            RecordAccess::Sealed(sealed) => FieldView::Sealed(sealed),
        };

        Ok(PersonRead {
            id,
            username: entry.username,
            view,
        })
    }
}
