//! The toy SPN block cipher under attack.
//!
//! The 16-bit state is split into four 4-bit cells, with cell 0 in the most
//! significant position. One round adds a 16-bit round key, substitutes every
//! cell through the S-box and transposes the state seen as a 4×4 bit grid.
//! Encryption runs three full rounds, a fourth key addition and substitution,
//! and a final post-whitening key addition. The 80-bit key supplies the four
//! round keys as consecutive 16-bit slices of its 64 high-order bits; the 16
//! low-order bits are the final round key the attack recovers.

use crate::error::WidthError;

pub const SBOX: [u8; 16] = [14, 4, 13, 1, 2, 15, 11, 8, 3, 10, 6, 12, 5, 9, 0, 7];
pub const SBOX_INV: [u8; 16] = [14, 3, 4, 8, 1, 12, 10, 15, 7, 13, 9, 6, 11, 2, 0, 5];

/// An 80-bit cipher key split into its 64 high-order bits and the final
/// 16-bit round key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Key80 {
    pub high: u64,
    pub low: u16,
}

impl Key80 {
    pub fn new(high: u64, low: u16) -> Key80 {
        Key80 { high, low }
    }

    /// The 16-bit round key of rounds 0 through 3. The post-whitening key of
    /// the final substitution is `low`, not a round key.
    pub fn round_key(&self, round: usize) -> u16 {
        assert!(round < 4);
        (self.high >> (48 - 16 * round)) as u16
    }

    /// The key as a single 80-bit value, high bits first.
    pub fn to_u128(self) -> u128 {
        (u128::from(self.high) << 16) | u128::from(self.low)
    }

    pub fn from_u128(value: u128) -> Result<Key80, WidthError> {
        if value >> 80 != 0 {
            return Err(WidthError { value, width: 80 });
        }

        Ok(Key80 {
            high: (value >> 16) as u64,
            low: value as u16,
        })
    }
}

/// Extracts the 4-bit value of cell `sbox` (0 is the most significant cell).
#[inline(always)]
pub fn state_nibble(state: u16, sbox: usize) -> u8 {
    ((state >> (12 - 4 * sbox)) & 0xf) as u8
}

/// Places a 4-bit value into cell `sbox` of an otherwise zero state.
#[inline(always)]
pub fn nibble_to_state(nibble: u8, sbox: usize) -> u16 {
    u16::from(nibble) << (12 - 4 * sbox)
}

/// Applies the S-box to every cell of the state.
pub fn sbox_layer(state: u16) -> u16 {
    let mut output = 0;

    for i in 0..4 {
        output |= nibble_to_state(SBOX[state_nibble(state, i) as usize], i);
    }

    output
}

/// Applies the inverse S-box to every cell of the state.
pub fn sbox_layer_inv(state: u16) -> u16 {
    let mut output = 0;

    for i in 0..4 {
        output |= nibble_to_state(SBOX_INV[state_nibble(state, i) as usize], i);
    }

    output
}

/// Transposes the state seen as a 4×4 bit grid: bit `4a+b` moves to `4b+a`.
/// The permutation is an involution.
pub fn permute(state: u16) -> u16 {
    let mut output = 0;

    for row in 0..4 {
        for col in 0..4 {
            output |= ((state >> (4 * row + col)) & 1) << (4 * col + row);
        }
    }

    output
}

/// One full encryption round: key addition, substitution, permutation.
pub fn encryption_round(state: u16, round_key: u16) -> u16 {
    permute(sbox_layer(state ^ round_key))
}

/// Exact inverse of `encryption_round`.
pub fn decryption_round(state: u16, round_key: u16) -> u16 {
    sbox_layer_inv(permute(state)) ^ round_key
}

/// Encrypts one block under the full 80-bit key.
pub fn encrypt_block(plaintext: u16, key: &Key80) -> u16 {
    let mut state = plaintext;

    for round in 0..3 {
        state = encryption_round(state, key.round_key(round));
    }

    // Final round: no permutation, post-whitened with the low key half.
    sbox_layer(state ^ key.round_key(3)) ^ key.low
}

/// Decrypts one block under the full 80-bit key.
pub fn decrypt_block(ciphertext: u16, key: &Key80) -> u16 {
    let mut state = sbox_layer_inv(ciphertext ^ key.low) ^ key.round_key(3);

    for round in (0..3).rev() {
        state = decryption_round(state, key.round_key(round));
    }

    state
}
