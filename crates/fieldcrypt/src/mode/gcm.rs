//! GCM-style authenticated encryption built from [`CtrMode`] and [`GHash`].
//!
//! ```text
//! Y0  = nonce || 00000001
//! H   = E(K, 0^128)
//! C   = CTR(K, nonce || 00000002, P)
//! tag = E(K, Y0) XOR GHASH_H(A, C)
//! ```

use subtle::ConstantTimeEq;

use super::{counter::Counter, ctr::CtrMode, ghash::GHash, random_nonce, NONCE_LEN};
use crate::aes::{Block, BlockCipher, BLOCK_LEN};
use crate::error::CryptoError;

/// Byte length of an authentication tag.
pub const TAG_LEN: usize = 16;

/// One authenticated message under one nonce.
///
/// `encrypt` and `decrypt` consume the instance: a nonce is never used for a
/// second message by accident.
pub struct Gcm<'c> {
    cipher: &'c BlockCipher,
    nonce: [u8; NONCE_LEN],
    aad: Vec<u8>,
    y0: Block,
    hash: GHash,
    ctr: CtrMode<'c>,
}

impl<'c> Gcm<'c> {
    /// Prepare a message under `nonce` (or a fresh random one) with
    /// associated data `aad`.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidNonceSize`] if a supplied nonce is not 12 bytes.
    /// - [`CryptoError::RngFailed`] if a random nonce cannot be drawn.
    pub fn new(
        cipher: &'c BlockCipher,
        nonce: Option<&[u8]>,
        aad: &[u8],
    ) -> Result<Self, CryptoError> {
        let nonce: [u8; NONCE_LEN] = match nonce {
            Some(n) => n
                .try_into()
                .map_err(|_| CryptoError::InvalidNonceSize(n.len()))?,
            None => random_nonce()?,
        };

        let mut counter = Counter::new(&nonce, Counter::DEFAULT_INITIAL)?;
        let y0 = *counter.value();
        counter.increment();

        let mut h = [0u8; BLOCK_LEN];
        cipher.encrypt_block(&mut h);

        Ok(Self {
            cipher,
            nonce,
            aad: aad.to_vec(),
            y0,
            hash: GHash::new(&h),
            ctr: CtrMode::new(cipher, counter),
        })
    }

    /// The nonce this message is bound to.
    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// Encrypt `plaintext`, returning `(ciphertext, tag)`.
    pub fn encrypt(mut self, plaintext: &[u8]) -> (Vec<u8>, [u8; TAG_LEN]) {
        let ciphertext = self.ctr.encrypt(plaintext);
        let tag = self.tag_for(&ciphertext);
        (ciphertext, tag)
    }

    /// Verify `tag` over `ciphertext` and the associated data, then decrypt.
    ///
    /// No plaintext is produced unless the tag matches. The comparison runs
    /// in constant time.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::AuthenticationFailure`] on any mismatch,
    /// including a tag of the wrong length.
    pub fn decrypt(mut self, ciphertext: &[u8], tag: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let expected = self.tag_for(ciphertext);
        if !bool::from(expected.as_slice().ct_eq(tag)) {
            return Err(CryptoError::AuthenticationFailure);
        }
        Ok(self.ctr.decrypt(ciphertext))
    }

    fn tag_for(&self, ciphertext: &[u8]) -> [u8; TAG_LEN] {
        let mut mask = self.y0;
        self.cipher.encrypt_block(&mut mask);
        let s = self.hash.digest(&self.aad, ciphertext);
        (u128::from_be_bytes(mask) ^ s).to_be_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unhex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    struct Vector {
        key: &'static str,
        nonce: &'static str,
        aad: &'static str,
        plaintext: &'static str,
        ciphertext: &'static str,
        tag: &'static str,
    }

    // Test cases 1-4 of the original GCM submission (AES-128).
    const VECTORS: &[Vector] = &[
        Vector {
            key: "00000000000000000000000000000000",
            nonce: "000000000000000000000000",
            aad: "",
            plaintext: "",
            ciphertext: "",
            tag: "58e2fccefa7e3061367f1d57a4e7455a",
        },
        Vector {
            key: "00000000000000000000000000000000",
            nonce: "000000000000000000000000",
            aad: "",
            plaintext: "00000000000000000000000000000000",
            ciphertext: "0388dace60b6a392f328c2b971b2fe78",
            tag: "ab6e47d42cec13bdf53a67b21257bddf",
        },
        Vector {
            key: "feffe9928665731c6d6a8f9467308308",
            nonce: "cafebabefacedbaddecaf888",
            aad: "",
            plaintext: "d9313225f88406e5a55909c5aff5269a86a7a9531534f7da2e4c303d8a318a72\
                        1c3c0c95956809532fcf0e2449a6b525b16aedf5aa0de657ba637b391aafd255",
            ciphertext: "42831ec2217774244b7221b784d0d49ce3aa212f2c02a4e035c17e2329aca12e\
                         21d514b25466931c7d8f6a5aac84aa051ba30b396a0aac973d58e091473f5985",
            tag: "4d5c2af327cd64a62cf35abd2ba6fab4",
        },
        Vector {
            key: "feffe9928665731c6d6a8f9467308308",
            nonce: "cafebabefacedbaddecaf888",
            aad: "feedfacedeadbeeffeedfacedeadbeefabaddad2",
            plaintext: "d9313225f88406e5a55909c5aff5269a86a7a9531534f7da2e4c303d8a318a72\
                        1c3c0c95956809532fcf0e2449a6b525b16aedf5aa0de657ba637b39",
            ciphertext: "42831ec2217774244b7221b784d0d49ce3aa212f2c02a4e035c17e2329aca12e\
                         21d514b25466931c7d8f6a5aac84aa051ba30b396a0aac973d58e091",
            tag: "5bc94fbc3221a5db94fae95ae7121a47",
        },
    ];

    #[test]
    fn known_answer_vectors() {
        for (i, v) in VECTORS.iter().enumerate() {
            let cipher = BlockCipher::new(&unhex(v.key)).unwrap();
            let nonce = unhex(v.nonce);
            let aad = unhex(v.aad);

            let (ct, tag) = Gcm::new(&cipher, Some(&nonce[..]), &aad)
                .unwrap()
                .encrypt(&unhex(v.plaintext));
            assert_eq!(hex::encode(&ct), v.ciphertext, "case {}", i + 1);
            assert_eq!(hex::encode(tag), v.tag, "case {}", i + 1);

            let pt = Gcm::new(&cipher, Some(&nonce[..]), &aad)
                .unwrap()
                .decrypt(&ct, &tag)
                .unwrap();
            assert_eq!(hex::encode(pt), v.plaintext, "case {}", i + 1);
        }
    }

    #[test]
    fn random_nonces_differ() {
        let cipher = BlockCipher::new(&[0u8; 32]).unwrap();
        let a = Gcm::new(&cipher, None, b"").unwrap();
        let b = Gcm::new(&cipher, None, b"").unwrap();
        assert_ne!(a.nonce(), b.nonce());
    }

    #[test]
    fn rejects_bad_nonce_length() {
        let cipher = BlockCipher::new(&[0u8; 16]).unwrap();
        assert_eq!(
            Gcm::new(&cipher, Some(&[0u8; 8][..]), b"").err(),
            Some(CryptoError::InvalidNonceSize(8))
        );
    }

    #[test]
    fn tampered_tag_ciphertext_or_aad_fails() {
        let cipher = BlockCipher::new(&[0x24u8; 24]).unwrap();
        let nonce = [7u8; NONCE_LEN];
        let (ct, tag) = Gcm::new(&cipher, Some(&nonce[..]), b"person:42")
            .unwrap()
            .encrypt(b"+1 555 0100");

        let mut bad_tag = tag;
        bad_tag[15] ^= 0x01;
        assert_eq!(
            Gcm::new(&cipher, Some(&nonce[..]), b"person:42")
                .unwrap()
                .decrypt(&ct, &bad_tag),
            Err(CryptoError::AuthenticationFailure)
        );

        let mut bad_ct = ct.clone();
        bad_ct[0] ^= 0x80;
        assert_eq!(
            Gcm::new(&cipher, Some(&nonce[..]), b"person:42")
                .unwrap()
                .decrypt(&bad_ct, &tag),
            Err(CryptoError::AuthenticationFailure)
        );

        assert_eq!(
            Gcm::new(&cipher, Some(&nonce[..]), b"person:43")
                .unwrap()
                .decrypt(&ct, &tag),
            Err(CryptoError::AuthenticationFailure)
        );
    }

    #[test]
    fn truncated_tag_fails() {
        let cipher = BlockCipher::new(&[1u8; 16]).unwrap();
        let nonce = [0u8; NONCE_LEN];
        let (ct, tag) = Gcm::new(&cipher, Some(&nonce[..]), b"").unwrap().encrypt(b"x");
        assert_eq!(
            Gcm::new(&cipher, Some(&nonce[..]), b"")
                .unwrap()
                .decrypt(&ct, &tag[..12]),
            Err(CryptoError::AuthenticationFailure)
        );
    }

    #[test]
    fn wrong_key_fails() {
        let k1 = BlockCipher::new(&[1u8; 32]).unwrap();
        let k2 = BlockCipher::new(&[2u8; 32]).unwrap();
        let nonce = [3u8; NONCE_LEN];
        let (ct, tag) = Gcm::new(&k1, Some(&nonce[..]), b"").unwrap().encrypt(b"secret");
        assert!(Gcm::new(&k2, Some(&nonce[..]), b"")
            .unwrap()
            .decrypt(&ct, &tag)
            .is_err());
    }
}
