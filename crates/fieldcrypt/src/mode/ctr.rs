//! Counter-mode stream cipher.

use super::{counter::Counter, random_nonce};
use crate::aes::BlockCipher;
use crate::error::CryptoError;

/// Initial counter used when the stream picks its own nonce. Counter value 1
/// is reserved for the authenticated mode's tag block.
const RANDOM_NONCE_INITIAL: u64 = 2;

/// CTR keystream XOR cipher over a borrowed [`BlockCipher`].
///
/// Keystream bytes left over from one call are kept for the next, so feeding
/// a message in arbitrary chunks yields the same output as one call. An
/// instance belongs to exactly one message; start a new one (with a fresh
/// nonce) for every message.
pub struct CtrMode<'c> {
    cipher: &'c BlockCipher,
    counter: Counter,
    keystream: Vec<u8>,
}

impl<'c> CtrMode<'c> {
    /// Start a stream at `counter`.
    pub fn new(cipher: &'c BlockCipher, counter: Counter) -> Self {
        Self {
            cipher,
            counter,
            keystream: Vec::new(),
        }
    }

    /// Start a stream under a fresh random nonce, counting from 2.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::RngFailed`] if the OS random source fails.
    pub fn with_random_nonce(cipher: &'c BlockCipher) -> Result<Self, CryptoError> {
        let nonce = random_nonce()?;
        Ok(Self::new(cipher, Counter::new(&nonce, RANDOM_NONCE_INITIAL)?))
    }

    /// The next counter block that will be turned into keystream.
    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    /// XOR `data` against the keystream.
    pub fn encrypt(&mut self, data: &[u8]) -> Vec<u8> {
        while self.keystream.len() < data.len() {
            let mut block = *self.counter.value();
            self.cipher.encrypt_block(&mut block);
            self.keystream.extend_from_slice(&block);
            self.counter.increment();
        }

        data.iter()
            .zip(self.keystream.drain(..data.len()))
            .map(|(d, k)| d ^ k)
            .collect()
    }

    /// Identical to [`CtrMode::encrypt`]; XOR is its own inverse.
    pub fn decrypt(&mut self, data: &[u8]) -> Vec<u8> {
        self.encrypt(data)
    }
}

impl Drop for CtrMode<'_> {
    fn drop(&mut self) {
        self.keystream.iter_mut().for_each(|b| *b = 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unhex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn sp800_38a_f51_vector() {
        let cipher = BlockCipher::new(&unhex("2b7e151628aed2a6abf7158809cf4f3c")).unwrap();
        let counter = Counter::new(&unhex("f0f1f2f3f4f5f6f7f8f9fafb"), 0xfcfd_feff).unwrap();
        let plaintext = unhex(
            "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51\
             30c81c46a35ce411e5fbc1191a0a52eff69f2445df4f9b17ad2b417be66c3710",
        );
        let ct = CtrMode::new(&cipher, counter).encrypt(&plaintext);
        assert_eq!(
            hex::encode(ct),
            "874d6191b620e3261bef6864990db6ce9806f66b7970fdff8617187bb9fffdff\
             5ae4df3edbd5d35e5b4f09020db03eab1e031dda2fbe03d1792170a0f3009cee"
        );
    }

    #[test]
    fn round_trip_with_same_counter() {
        let cipher = BlockCipher::new(&[5u8; 32]).unwrap();
        let counter = Counter::new(&[9u8; 12], 1).unwrap();
        let msg = b"attack at dawn, bring snacks and a spare block or two";
        let ct = CtrMode::new(&cipher, counter.clone()).encrypt(msg);
        assert_ne!(ct.as_slice(), msg.as_slice());
        let pt = CtrMode::new(&cipher, counter).decrypt(&ct);
        assert_eq!(pt, msg);
    }

    #[test]
    fn chunked_calls_match_single_call() {
        let cipher = BlockCipher::new(&[1u8; 16]).unwrap();
        let counter = Counter::new(&[2u8; 12], 7).unwrap();
        let msg: Vec<u8> = (0..77u8).collect();

        let whole = CtrMode::new(&cipher, counter.clone()).encrypt(&msg);

        let mut stream = CtrMode::new(&cipher, counter);
        let mut pieces = Vec::new();
        for chunk in [&msg[..3], &msg[3..3], &msg[3..20], &msg[20..21], &msg[21..]] {
            pieces.extend(stream.encrypt(chunk));
        }
        assert_eq!(pieces, whole);
    }

    #[test]
    fn counter_advances_once_per_generated_block() {
        let cipher = BlockCipher::new(&[0u8; 16]).unwrap();
        let mut stream = CtrMode::new(&cipher, Counter::new(&[0u8; 12], 1).unwrap());
        stream.encrypt(&[0u8; 17]);
        assert_eq!(stream.counter().count(), 3);
        // 15 buffered bytes cover this call without another block.
        stream.encrypt(&[0u8; 15]);
        assert_eq!(stream.counter().count(), 3);
    }

    #[test]
    fn empty_input_generates_nothing() {
        let cipher = BlockCipher::new(&[0u8; 16]).unwrap();
        let mut stream = CtrMode::new(&cipher, Counter::new(&[0u8; 12], 1).unwrap());
        assert!(stream.encrypt(&[]).is_empty());
        assert_eq!(stream.counter().count(), 1);
    }

    #[test]
    fn random_nonce_stream_starts_at_two() {
        let cipher = BlockCipher::new(&[0u8; 16]).unwrap();
        let a = CtrMode::with_random_nonce(&cipher).unwrap();
        let b = CtrMode::with_random_nonce(&cipher).unwrap();
        assert_eq!(a.counter().count(), 2);
        assert_ne!(a.counter().nonce(), b.counter().nonce());
    }
}
