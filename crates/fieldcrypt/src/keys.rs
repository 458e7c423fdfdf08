//! Holders for master-key and subkey material.
//!
//! Both types overwrite their bytes with zeroes on drop and never print key
//! material, not even in `Debug` output.

use crate::aes::key_schedule::rounds_for_key_len;
use crate::error::CryptoError;

/// Byte length of a per-record subkey (AES-256).
pub const SUBKEY_LEN: usize = 32;

/// Overwrite the buffer of a string holding key text with zeroes before it is
/// freed. Returns the zeroed buffer.
pub(crate) fn wipe(text: String) -> Vec<u8> {
    let mut bytes = text.into_bytes();
    bytes.iter_mut().for_each(|b| *b = 0);
    bytes
}

/// Process-wide key that wraps every record's subkey.
///
/// Supplied from configuration, read-only for the life of the process and
/// never persisted.
#[derive(Clone)]
pub struct MasterKey(Box<[u8]>);

impl MasterKey {
    /// Accept a raw 16, 24 or 32 byte master key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeySize`] for any other length.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        rounds_for_key_len(key.len())?;
        Ok(Self(key.into()))
    }

    /// Parse a master key from its hex encoding.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidKeyHex`] if the text is not an even-length hex string.
    /// - [`CryptoError::InvalidKeySize`] with the decoded length if it is not a
    ///   valid key length.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let mut raw = hex::decode(text.trim()).map_err(|_| CryptoError::InvalidKeyHex)?;
        let key = Self::new(&raw);
        raw.iter_mut().for_each(|b| *b = 0);
        key
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// Random 32-byte key that encrypts one record's fields.
///
/// Generated once per record and replaced wholesale on rotation.
#[derive(Clone)]
pub struct SubKey(Box<[u8; SUBKEY_LEN]>);

impl SubKey {
    /// Wrap exactly [`SUBKEY_LEN`] bytes.
    pub fn from_bytes(bytes: [u8; SUBKEY_LEN]) -> Self {
        Self(Box::new(bytes))
    }

    /// Parse the lowercase or uppercase hex text a subkey is wrapped as.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidWrappedKey`] unless the text is exactly
    /// 64 hex characters.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let mut buf = Box::new([0u8; SUBKEY_LEN]);
        hex::decode_to_slice(text, &mut buf[..]).map_err(|_| CryptoError::InvalidWrappedKey)?;
        Ok(Self(buf))
    }

    /// Lowercase hex text of the key. This is what gets wrapped under the
    /// master key.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0[..])
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; SUBKEY_LEN] {
        &self.0
    }
}

impl Drop for SubKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SubKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SubKey([REDACTED])")
    }
}

impl PartialEq for SubKey {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl Eq for SubKey {}
