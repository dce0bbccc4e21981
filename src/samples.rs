//! Known plaintext/ciphertext sample generation.

use rand::Rng;

use crate::cipher::{encrypt_block, Key80};

/// One known plaintext/ciphertext pair produced under the attacked key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KnownPair {
    pub plaintext: u16,
    pub ciphertext: u16,
}

/// Draws `count` uniformly random plaintexts (repeats allowed) and encrypts
/// each one under `key`.
pub fn generate_samples<R: Rng>(rng: &mut R, count: usize, key: &Key80) -> Vec<KnownPair> {
    (0..count)
        .map(|_| {
            let plaintext = rng.gen::<u16>();
            KnownPair {
                plaintext,
                ciphertext: encrypt_block(plaintext, key),
            }
        })
        .collect()
}

/// Draws a uniformly random 80-bit key.
pub fn random_key<R: Rng>(rng: &mut R) -> Key80 {
    Key80::new(rng.gen(), rng.gen())
}
