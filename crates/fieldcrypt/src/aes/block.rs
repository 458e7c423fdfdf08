//! Single-block AES cipher and inverse cipher.
//!
//! The state is a flat 16-byte array in FIPS-197 input order: bytes
//! `4c..4c+4` form column `c`, so row `r` is `state[r], state[r+4], state[r+8],
//! state[r+12]`.

use super::key_schedule::KeySchedule;
use super::tables::{INV_SBOX, MUL11, MUL13, MUL14, MUL2, MUL3, MUL9, SBOX};
use super::{Block, BLOCK_LEN};
use crate::error::CryptoError;

/// AES block cipher bound to one expanded key.
///
/// Stateless between calls: every method takes `&self`, so one instance can
/// serve any number of concurrent block operations.
#[derive(Clone, Debug)]
pub struct BlockCipher {
    schedule: KeySchedule,
}

impl BlockCipher {
    /// Expand `key` and build a cipher for it.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeySize`] unless `key` is 16, 24 or 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self::from_schedule(KeySchedule::expand(key)?))
    }

    /// Build a cipher from an already expanded schedule.
    pub fn from_schedule(schedule: KeySchedule) -> Self {
        Self { schedule }
    }

    /// Number of rounds this cipher runs.
    pub fn rounds(&self) -> usize {
        self.schedule.rounds()
    }

    /// Encipher one full block in place.
    pub fn encrypt_block(&self, state: &mut Block) {
        let rounds = self.rounds();
        self.add_round_key(state, 0);
        for round in 1..rounds {
            sub_bytes(state);
            shift_rows(state);
            mix_columns(state);
            self.add_round_key(state, round);
        }
        sub_bytes(state);
        shift_rows(state);
        self.add_round_key(state, rounds);
    }

    /// Decipher one full block in place.
    pub fn decrypt_block(&self, state: &mut Block) {
        let rounds = self.rounds();
        self.add_round_key(state, rounds);
        for round in (1..rounds).rev() {
            inv_shift_rows(state);
            inv_sub_bytes(state);
            self.add_round_key(state, round);
            inv_mix_columns(state);
        }
        inv_shift_rows(state);
        inv_sub_bytes(state);
        self.add_round_key(state, 0);
    }

    /// Encipher up to one block of input.
    ///
    /// Input shorter than 16 bytes is first filled up with `16 - len` copies
    /// of the byte `16 - len`. Callers that need any other padding must pad
    /// before calling.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidBlockSize`] if `input` is longer than 16 bytes.
    pub fn cipher_block(&self, input: &[u8]) -> Result<Block, CryptoError> {
        let deficit = BLOCK_LEN
            .checked_sub(input.len())
            .ok_or(CryptoError::InvalidBlockSize(input.len()))?;
        let mut state = [deficit as u8; BLOCK_LEN];
        state[..input.len()].copy_from_slice(input);
        self.encrypt_block(&mut state);
        Ok(state)
    }

    /// Decipher up to one block of input; short input is zero-padded.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidBlockSize`] if `input` is longer than 16 bytes.
    pub fn decipher_block(&self, input: &[u8]) -> Result<Block, CryptoError> {
        if input.len() > BLOCK_LEN {
            return Err(CryptoError::InvalidBlockSize(input.len()));
        }
        let mut state = [0u8; BLOCK_LEN];
        state[..input.len()].copy_from_slice(input);
        self.decrypt_block(&mut state);
        Ok(state)
    }

    fn add_round_key(&self, state: &mut Block, round: usize) {
        for (s, k) in state.iter_mut().zip(self.schedule.round_key(round)) {
            *s ^= k;
        }
    }
}

fn sub_bytes(state: &mut Block) {
    for b in state.iter_mut() {
        *b = SBOX[*b as usize];
    }
}

fn inv_sub_bytes(state: &mut Block) {
    for b in state.iter_mut() {
        *b = INV_SBOX[*b as usize];
    }
}

/// Rotate row `r` left by `r` positions.
fn shift_rows(state: &mut Block) {
    for r in 1..4 {
        let mut row = [state[r], state[r + 4], state[r + 8], state[r + 12]];
        row.rotate_left(r);
        for (c, b) in row.into_iter().enumerate() {
            state[r + 4 * c] = b;
        }
    }
}

/// Rotate row `r` right by `r` positions.
fn inv_shift_rows(state: &mut Block) {
    for r in 1..4 {
        let mut row = [state[r], state[r + 4], state[r + 8], state[r + 12]];
        row.rotate_right(r);
        for (c, b) in row.into_iter().enumerate() {
            state[r + 4 * c] = b;
        }
    }
}

fn mix_columns(state: &mut Block) {
    for col in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
        col[0] = MUL2[a0 as usize] ^ MUL3[a1 as usize] ^ a2 ^ a3;
        col[1] = a0 ^ MUL2[a1 as usize] ^ MUL3[a2 as usize] ^ a3;
        col[2] = a0 ^ a1 ^ MUL2[a2 as usize] ^ MUL3[a3 as usize];
        col[3] = MUL3[a0 as usize] ^ a1 ^ a2 ^ MUL2[a3 as usize];
    }
}

fn inv_mix_columns(state: &mut Block) {
    for col in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [col[0] as usize, col[1] as usize, col[2] as usize, col[3] as usize];
        col[0] = MUL14[a0] ^ MUL11[a1] ^ MUL13[a2] ^ MUL9[a3];
        col[1] = MUL9[a0] ^ MUL14[a1] ^ MUL11[a2] ^ MUL13[a3];
        col[2] = MUL13[a0] ^ MUL9[a1] ^ MUL14[a2] ^ MUL11[a3];
        col[3] = MUL11[a0] ^ MUL13[a1] ^ MUL9[a2] ^ MUL14[a3];
    }
}
