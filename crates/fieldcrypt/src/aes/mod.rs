//! AES block cipher implemented from FIPS-197.
//!
//! [`KeySchedule`] expands a raw key once; [`BlockCipher`] runs the round
//! transforms over single 16-byte blocks using that schedule. No hardware
//! acceleration and no side-channel hardening.

pub mod block;
pub mod key_schedule;
pub mod tables;

pub use block::BlockCipher;
pub use key_schedule::KeySchedule;

/// Byte length of one AES block.
pub const BLOCK_LEN: usize = 16;

/// One AES block of state.
pub type Block = [u8; BLOCK_LEN];
