//! Encryption of individual textual field values.
//!
//! # Blob format
//!
//! ```text
//! nonce (12) || ciphertext (len(plaintext)) || tag (16)
//! ```
//!
//! Each call draws a fresh random nonce and uses empty associated data. The
//! same layout stores both sensitive columns and wrapped subkeys.

use crate::aes::BlockCipher;
use crate::error::CryptoError;
use crate::keys::{SubKey, SUBKEY_LEN};
use crate::mode::{Gcm, NONCE_LEN, TAG_LEN};

/// Shortest well-formed blob: a nonce and a tag around empty ciphertext.
pub const MIN_BLOB_LEN: usize = NONCE_LEN + TAG_LEN;

/// A parsed encrypted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedField {
    /// Nonce the field was sealed under.
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// Authentication tag.
    pub tag: [u8; TAG_LEN],
}

impl EncryptedField {
    /// Concatenate into the persisted blob layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MIN_BLOB_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Split a persisted blob into its parts.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedBlob`] if `blob` is shorter than
    /// [`MIN_BLOB_LEN`].
    pub fn from_bytes(blob: &[u8]) -> Result<Self, CryptoError> {
        if blob.len() < MIN_BLOB_LEN {
            return Err(CryptoError::MalformedBlob(blob.len()));
        }
        let (nonce, rest) = blob.split_at(NONCE_LEN);
        let (ciphertext, tag) = rest.split_at(rest.len() - TAG_LEN);

        let mut field = Self {
            nonce: [0u8; NONCE_LEN],
            ciphertext: ciphertext.to_vec(),
            tag: [0u8; TAG_LEN],
        };
        field.nonce.copy_from_slice(nonce);
        field.tag.copy_from_slice(tag);
        Ok(field)
    }

    /// Hex text of the persisted blob, as handed to non-owners.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

/// Generate a fresh random subkey.
///
/// # Errors
///
/// Returns [`CryptoError::RngFailed`] if the OS random source fails.
pub fn generate_subkey() -> Result<SubKey, CryptoError> {
    let mut bytes = [0u8; SUBKEY_LEN];
    getrandom::getrandom(&mut bytes).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    let key = SubKey::from_bytes(bytes);
    bytes.fill(0);
    Ok(key)
}

/// Encrypt one textual value under `key`, returning the blob bytes.
///
/// # Errors
///
/// - [`CryptoError::InvalidKeySize`] if `key` is not 16, 24 or 32 bytes.
/// - [`CryptoError::RngFailed`] if no nonce can be drawn.
pub fn encrypt_field(key: &[u8], plaintext: &str) -> Result<Vec<u8>, CryptoError> {
    seal(key, plaintext).map(|field| field.to_bytes())
}

/// Encrypt one textual value under `key`, returning the parsed parts.
///
/// # Errors
///
/// Same as [`encrypt_field`].
pub fn seal(key: &[u8], plaintext: &str) -> Result<EncryptedField, CryptoError> {
    let cipher = BlockCipher::new(key)?;
    let gcm = Gcm::new(&cipher, None, &[])?;
    let nonce = *gcm.nonce();
    let (ciphertext, tag) = gcm.encrypt(plaintext.as_bytes());
    Ok(EncryptedField {
        nonce,
        ciphertext,
        tag,
    })
}

/// Authenticate and decrypt a blob produced by [`encrypt_field`].
///
/// The blob length is checked before any key expansion or cipher work.
///
/// # Errors
///
/// - [`CryptoError::MalformedBlob`] if the blob is shorter than [`MIN_BLOB_LEN`].
/// - [`CryptoError::InvalidKeySize`] if `key` is not 16, 24 or 32 bytes.
/// - [`CryptoError::AuthenticationFailure`] on wrong key or tampered data.
/// - [`CryptoError::InvalidPlaintext`] if the authenticated bytes are not UTF-8.
pub fn decrypt_field(key: &[u8], blob: &[u8]) -> Result<String, CryptoError> {
    let field = EncryptedField::from_bytes(blob)?;
    open(key, &field)
}

/// Authenticate and decrypt an already parsed field.
///
/// # Errors
///
/// Same as [`decrypt_field`], minus the length check.
pub fn open(key: &[u8], field: &EncryptedField) -> Result<String, CryptoError> {
    let cipher = BlockCipher::new(key)?;
    let plaintext = Gcm::new(&cipher, Some(&field.nonce[..]), &[])?
        .decrypt(&field.ciphertext, &field.tag)?;
    String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidPlaintext)
}
