//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use fieldcrypt::EnvelopeCipher;

use crate::store::RecordStore;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or already `Arc`-backed) so
/// that Axum can clone the state for each request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// Person records and their per-record locks.
    pub store: RecordStore,
    /// Envelope cipher holding the master key and rotation threshold.
    pub cipher: Arc<EnvelopeCipher>,
    /// Name of the HTTP header carrying the requesting person's id.
    pub principal_header: Arc<String>,
}

impl AppState {
    /// Create a new [`AppState`] with the provided store, cipher and header name.
    pub fn new(store: RecordStore, cipher: EnvelopeCipher, principal_header: String) -> Self {
        Self {
            store,
            cipher: Arc::new(cipher),
            principal_header: Arc::new(principal_header),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// Empty store, fixed test master key, default principal header.
    pub fn for_tests(rotation_threshold: u64) -> Self {
        use fieldcrypt::{EnvelopeConfig, MasterKey};

        let master = MasterKey::new(&[0x42; 32]).expect("valid test key");
        Self::new(
            RecordStore::new(),
            EnvelopeCipher::new(EnvelopeConfig::new(master, rotation_threshold)),
            "X-Principal-Id".into(),
        )
    }
}
