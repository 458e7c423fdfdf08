//! GHASH over GF(2^128).
//!
//! Field defined by `1 + a + a^2 + a^7 + a^128`. Bit order is
//! most-significant-first: the MSB of a big-endian `u128` is the coefficient
//! of `a^0`, so multiplying by `a` is a right shift.

use crate::aes::BLOCK_LEN;

/// `1 + a + a^2 + a^7` in the reflected bit order.
const R: u128 = 0xE1 << 120;

/// Multiply two field elements.
pub fn gf_mul(mut x: u128, y: u128) -> u128 {
    let mut product = 0u128;
    for i in (0..128).rev() {
        let bit = (y >> i) & 1;
        product ^= x & bit.wrapping_neg();
        x = (x >> 1) ^ (R & (x & 1).wrapping_neg());
    }
    product
}

/// GHASH keyed by the hash subkey `H`.
#[derive(Clone)]
pub struct GHash {
    h: u128,
}

impl GHash {
    /// Build a hash from the subkey block `H = E(K, 0^128)`.
    pub fn new(h: &[u8; BLOCK_LEN]) -> Self {
        Self {
            h: u128::from_be_bytes(*h),
        }
    }

    /// Hash associated data `aad` and `ciphertext`.
    ///
    /// Each input is zero-padded to a whole number of blocks and folded in,
    /// then one block of their bit lengths (two big-endian `u64`s).
    pub fn digest(&self, aad: &[u8], ciphertext: &[u8]) -> u128 {
        let mut x = self.absorb(0, aad);
        x = self.absorb(x, ciphertext);

        let aad_bits = (aad.len() as u64).wrapping_mul(8);
        let ct_bits = (ciphertext.len() as u64).wrapping_mul(8);
        let lengths = (u128::from(aad_bits) << 64) | u128::from(ct_bits);
        gf_mul(x ^ lengths, self.h)
    }

    fn absorb(&self, mut x: u128, data: &[u8]) -> u128 {
        for chunk in data.chunks(BLOCK_LEN) {
            let mut block = [0u8; BLOCK_LEN];
            block[..chunk.len()].copy_from_slice(chunk);
            x = gf_mul(x ^ u128::from_be_bytes(block), self.h);
        }
        x
    }
}

impl Drop for GHash {
    fn drop(&mut self) {
        self.h = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The multiplicative identity: coefficient of `a^0` set.
    const ONE: u128 = 1 << 127;

    #[test]
    fn one_is_the_identity() {
        let x = 0x0123_4567_89ab_cdef_fedc_ba98_7654_3210u128;
        assert_eq!(gf_mul(x, ONE), x);
        assert_eq!(gf_mul(ONE, x), x);
    }

    #[test]
    fn zero_annihilates() {
        assert_eq!(gf_mul(0, 0xdead_beef), 0);
        assert_eq!(gf_mul(0xdead_beef, 0), 0);
    }

    #[test]
    fn multiplication_commutes() {
        let a = 0x66e9_4bd4_ef8a_2c3b_884c_fa59_ca34_2b2eu128;
        let b = 0x0388_dace_60b6_a392_f328_c2b9_71b2_fe78u128;
        assert_eq!(gf_mul(a, b), gf_mul(b, a));
    }

    #[test]
    fn alpha_times_alpha127_reduces() {
        // a * a^127 = a^128 = 1 + a + a^2 + a^7.
        let alpha = 1u128 << 126;
        let alpha127 = 1u128;
        assert_eq!(gf_mul(alpha, alpha127), R);
    }

    #[test]
    fn empty_inputs_hash_to_zero() {
        let hash = GHash::new(&[0x42; 16]);
        assert_eq!(hash.digest(&[], &[]), 0);
    }

    #[test]
    fn digest_depends_on_split_between_aad_and_ciphertext() {
        let hash = GHash::new(&[0x11; 16]);
        assert_ne!(hash.digest(b"ab", b"c"), hash.digest(b"a", b"bc"));
    }
}
