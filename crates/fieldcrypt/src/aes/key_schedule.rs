//! Key expansion (FIPS-197 section 5.2).

use super::tables::{RCON, SBOX};
use super::BLOCK_LEN;
use crate::error::CryptoError;

/// Round keys derived once from a raw key.
///
/// Holds `rounds + 1` round keys of [`BLOCK_LEN`] bytes each. Immutable after
/// expansion and freely shared across block operations.
#[derive(Clone)]
pub struct KeySchedule {
    round_keys: Vec<[u8; BLOCK_LEN]>,
}

impl KeySchedule {
    /// Expand a 16, 24 or 32 byte key into 10, 12 or 14 rounds of key material.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeySize`] for any other key length.
    pub fn expand(key: &[u8]) -> Result<Self, CryptoError> {
        let rounds = rounds_for_key_len(key.len())?;
        let nk = key.len() / 4;
        let total_words = 4 * (rounds + 1);

        let mut words: Vec<[u8; 4]> = key
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();

        for i in nk..total_words {
            let mut temp = words[i - 1];
            if i % nk == 0 {
                temp.rotate_left(1);
                sub_word(&mut temp);
                temp[0] ^= RCON[i / nk - 1];
            } else if nk > 6 && i % nk == 4 {
                sub_word(&mut temp);
            }
            let prev = words[i - nk];
            words.push([
                prev[0] ^ temp[0],
                prev[1] ^ temp[1],
                prev[2] ^ temp[2],
                prev[3] ^ temp[3],
            ]);
        }

        let round_keys = words
            .chunks_exact(4)
            .map(|w| {
                let mut rk = [0u8; BLOCK_LEN];
                for (dst, word) in rk.chunks_exact_mut(4).zip(w) {
                    dst.copy_from_slice(word);
                }
                rk
            })
            .collect();

        Ok(Self { round_keys })
    }

    /// Number of cipher rounds (10, 12 or 14).
    pub fn rounds(&self) -> usize {
        self.round_keys.len() - 1
    }

    /// Round key `round`, where `0..=rounds()` is valid.
    pub fn round_key(&self, round: usize) -> &[u8; BLOCK_LEN] {
        &self.round_keys[round]
    }

    /// The full schedule as one contiguous byte vector of `(rounds + 1) * 16` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.round_keys.iter().flatten().copied().collect()
    }
}

impl Drop for KeySchedule {
    fn drop(&mut self) {
        self.round_keys.iter_mut().for_each(|rk| rk.fill(0));
    }
}

impl std::fmt::Debug for KeySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeySchedule {{ rounds: {}, [REDACTED] }}", self.rounds())
    }
}

/// Round count for a raw key length.
pub fn rounds_for_key_len(len: usize) -> Result<usize, CryptoError> {
    match len {
        16 => Ok(10),
        24 => Ok(12),
        32 => Ok(14),
        other => Err(CryptoError::InvalidKeySize(other)),
    }
}

fn sub_word(word: &mut [u8; 4]) {
    for b in word.iter_mut() {
        *b = SBOX[*b as usize];
    }
}
