//! Empirical bias estimation of last-round subkey candidates.

use indexmap::IndexSet;

use crate::attack::CandidatePool;
use crate::cipher::{nibble_to_state, sbox_layer_inv, state_nibble};
use crate::samples::KnownPair;
use crate::search::Trail;
use crate::utility::{parity_masks, ProgressBar};

/// Tolerance within which two empirical biases count as tied. Derived from
/// the decimal magnitude of the current best bias, so the tolerance shrinks
/// as stronger candidates appear; calibrated empirically. A best bias of
/// 0.054 yields a delta of 0.005.
fn near_tie_delta(best_bias: f64) -> f64 {
    if best_bias <= 0.0 {
        return 0.0;
    }

    let mut magnitude = 1.0;
    let mut value = best_bias;

    while value < 1.0 {
        value *= 10.0;
        magnitude /= 10.0;
    }

    magnitude / 10.0 * 5.0
}

/// Distributes the bits of `candidate` over the touched S-box cells of a
/// 16-bit key guess; untouched cells stay zero. The most significant nibble
/// of the pattern lands in the lowest-numbered touched S-box.
fn spread_candidate(candidate: u32, touched: &[usize], key_bits: usize) -> u16 {
    let mut guess = 0;

    for (i, &sbox) in touched.iter().enumerate() {
        let nibble = ((candidate >> (key_bits - 4 * (i + 1))) & 0xf) as u8;
        guess |= nibble_to_state(nibble, sbox);
    }

    guess
}

/// Brute-forces every candidate subkey over the trail's touched final-round
/// S-boxes, measures each one's empirical bias against the sample set, and
/// merges the near-optimal nibbles into the global candidate pool.
///
/// For a candidate `k` and pair `(p, c)`, the final round is peeled off by
/// inverting the S-box layer of `k ^ c`; the candidate matches the pair when
/// the parities of the trail's active input and output bits agree. The
/// strongest absolute bias seen so far clears the locally retained nibbles;
/// biases within `near_tie_delta` of it are retained alongside.
pub fn estimate_subkeys(trail: &Trail, samples: &[KnownPair], pool: &mut CandidatePool) {
    debug_assert!(!samples.is_empty());

    let touched = trail.touched_sboxes();
    let key_bits = 4 * touched.len();

    let mut best_bias = -1.0;
    let mut local: [IndexSet<u8>; 4] = Default::default();

    let mut progress = ProgressBar::new(1 << key_bits);

    for candidate in 0..(1u32 << key_bits) {
        progress.increment();
        let guess = spread_candidate(candidate, &touched, key_bits);

        let matches = samples
            .iter()
            .filter(|pair| {
                let inverted = sbox_layer_inv(guess ^ pair.ciphertext);
                parity_masks(pair.plaintext, trail.u[0], inverted, trail.u[3]) == 0
            })
            .count();

        let bias = (matches as f64 / samples.len() as f64 - 0.5).abs();
        let delta = near_tie_delta(best_bias);

        if bias > best_bias {
            for &sbox in &touched {
                local[sbox].clear();
            }
            best_bias = bias;
        } else if bias < best_bias - delta {
            continue;
        }

        for &sbox in &touched {
            local[sbox].insert(state_nibble(guess, sbox));
        }
    }

    for (sbox, nibbles) in local.iter().enumerate() {
        for &nibble in nibbles {
            pool.insert(sbox, nibble);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_follows_the_best_bias_magnitude() {
        assert_eq!(near_tie_delta(-1.0), 0.0);
        assert_eq!(near_tie_delta(0.0), 0.0);
        assert!((near_tie_delta(0.054) - 0.005).abs() < 1e-12);
        assert!((near_tie_delta(0.5) - 0.05).abs() < 1e-12);
        assert!((near_tie_delta(0.003) - 0.0005).abs() < 1e-12);
    }

    #[test]
    fn candidates_spread_most_significant_first() {
        assert_eq!(spread_candidate(0xab, &[0, 2], 8), 0xa0b0);
        assert_eq!(spread_candidate(0x7, &[3], 4), 0x0007);
        assert_eq!(spread_candidate(0xabcd, &[0, 1, 2, 3], 16), 0xabcd);
    }

    #[test]
    fn tied_candidates_are_all_retained() {
        // With a single sample every candidate's bias has magnitude 0.5
        // (the pair either matches or it does not), so the whole candidate
        // set ties and every nibble must survive retention.
        let trail = Trail {
            u: [0x8000, 0, 0, 0x000f],
            v: [0x1000, 0x0008, 0x2000],
            total_bias: 0.0,
        };
        let samples = [KnownPair { plaintext: 0x1234, ciphertext: 0xabcd }];

        let mut pool = CandidatePool::default();
        estimate_subkeys(&trail, &samples, &mut pool);

        assert_eq!(pool.sets()[3].len(), 16);
        assert!(pool.sets()[0].is_empty());
        assert!(pool.sets()[1].is_empty());
        assert!(pool.sets()[2].is_empty());
    }

    #[test]
    fn stronger_candidates_clear_weaker_ones() {
        // Two samples with identical plaintext parity: candidates split into
        // biases of magnitude 0.5 (both pairs agree) and 0 (they disagree).
        // Only the agreeing candidates may survive.
        let trail = Trail {
            u: [0, 0, 0, 0x000f],
            v: [0, 0, 0],
            total_bias: 0.0,
        };
        let samples = [
            KnownPair { plaintext: 0, ciphertext: 0x0000 },
            KnownPair { plaintext: 0, ciphertext: 0x0001 },
        ];

        let mut pool = CandidatePool::default();
        estimate_subkeys(&trail, &samples, &mut pool);

        let retained = &pool.sets()[3];
        assert!(!retained.is_empty());

        for &nibble in retained.iter() {
            let matches = samples
                .iter()
                .filter(|pair| {
                    let guess = nibble_to_state(nibble, 3);
                    let inverted = sbox_layer_inv(guess ^ pair.ciphertext);
                    parity_masks(pair.plaintext, trail.u[0], inverted, trail.u[3]) == 0
                })
                .count();
            // Retained candidates are exactly the ones where both pairs agree
            // or both disagree.
            assert!(matches == 0 || matches == 2);
        }
    }
}
