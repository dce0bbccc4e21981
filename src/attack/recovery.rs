//! Combination and verification of recovered subkey candidates.

use itertools::Itertools;

use crate::attack::CandidatePool;
use crate::cipher::{encryption_round, nibble_to_state, sbox_layer_inv};
use crate::samples::KnownPair;

/// Checks a final-round key guess against one known pair.
///
/// The plaintext is pushed forward through the three full rounds and the
/// fourth key addition using the known high key bits, while the ciphertext
/// is pulled back through the guessed post-whitening key and the final
/// substitution. The two states meet exactly when the guess is the true
/// final round key, since the substitution layer is injective.
pub fn test_round_key(pair: KnownPair, guess: u16, high_bits: u64) -> bool {
    let mut state = pair.plaintext;

    for round in 0..3 {
        state = encryption_round(state, (high_bits >> (48 - 16 * round)) as u16);
    }
    state ^= high_bits as u16;

    sbox_layer_inv(pair.ciphertext ^ guess) == state
}

/// Walks the cartesian product of the per-S-box candidate sets
/// odometer-style (the last S-box's cursor advances fastest) and returns
/// the first combination verified against the reference pair. Exhausting
/// every combination without a match is a normal `None`.
pub fn recover_round_key(
    pool: &CandidatePool,
    reference: KnownPair,
    high_bits: u64,
) -> Option<u16> {
    for combination in pool
        .sets()
        .iter()
        .map(|set| set.iter().copied())
        .multi_cartesian_product()
    {
        let mut guess = 0;
        for (sbox, &nibble) in combination.iter().enumerate() {
            guess |= nibble_to_state(nibble, sbox);
        }

        if test_round_key(reference, guess, high_bits) {
            return Some(guess);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{encrypt_block, state_nibble, Key80};

    fn reference_pair(key: &Key80) -> KnownPair {
        let plaintext = 0x5a3c;
        KnownPair {
            plaintext,
            ciphertext: encrypt_block(plaintext, key),
        }
    }

    #[test]
    fn only_the_true_key_verifies() {
        let key = Key80::new(0xfedc_ba98_7654_3210, 0x9b1d);
        let pair = reference_pair(&key);

        assert!(test_round_key(pair, key.low, key.high));

        for wrong in (0..=0xffffu16).filter(|&guess| guess != key.low) {
            assert!(!test_round_key(pair, wrong, key.high));
        }
    }

    #[test]
    fn odometer_finds_the_planted_key() {
        let key = Key80::new(0x0123_4567_89ab_cdef, 0x4f82);
        let pair = reference_pair(&key);

        // Seed each cell's candidate set with decoys plus the true nibble.
        let mut pool = CandidatePool::default();
        for sbox in 0..4 {
            let truth = state_nibble(key.low, sbox);
            pool.insert(sbox, truth ^ 0x5);
            pool.insert(sbox, truth);
            pool.insert(sbox, truth ^ 0xa);
        }

        assert_eq!(recover_round_key(&pool, pair, key.high), Some(key.low));
    }

    #[test]
    fn missing_candidates_exhaust_to_none() {
        let key = Key80::new(0x0123_4567_89ab_cdef, 0x4f82);
        let pair = reference_pair(&key);

        // One cell holds only a wrong nibble: no combination can verify.
        let mut pool = CandidatePool::default();
        for sbox in 0..4 {
            pool.insert(sbox, state_nibble(key.low, sbox) ^ 1);
        }
        assert_eq!(recover_round_key(&pool, pair, key.high), None);

        // An empty cell yields no combinations at all.
        let empty = CandidatePool::default();
        assert_eq!(recover_round_key(&empty, pair, key.high), None);
    }
}
