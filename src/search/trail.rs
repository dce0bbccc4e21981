//! Propagation of a start relation into a three-round trail.

use std::collections::VecDeque;
use std::fmt;

use crate::cipher::{nibble_to_state, permute, state_nibble};
use crate::search::selection::{Relation, RelationSelector};
use crate::table::BiasTable;

/// Number of rounds a trail spans before reaching the final-round input.
pub const TRAIL_ROUNDS: usize = 3;

/// Active-bit matrices of a completed trail.
///
/// `u[r]` holds the S-box input bits active in round `r` and `v[r]` the
/// output bits; `u[3]` is the pattern reaching the final round's S-box
/// inputs. `total_bias` is the piled-up theoretical bias of the whole trail,
/// kept for diagnostics only.
#[derive(Clone, Debug)]
pub struct Trail {
    pub u: [u16; 4],
    pub v: [u16; 3],
    pub total_bias: f64,
}

impl Trail {
    /// Indices of final-round S-boxes with at least one active input bit.
    pub fn touched_sboxes(&self) -> Vec<usize> {
        (0..4).filter(|&sbox| state_nibble(self.u[3], sbox) != 0).collect()
    }
}

/// Trail propagation died out: no S-box was queued when a round boundary was
/// reached. The trail is unusable; the attack skips it and selects again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadTrail {
    pub round: usize,
}

impl fmt::Display for DeadTrail {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "trail propagation died out entering round {}", self.round)
    }
}

/// One application of the piling-up lemma: chains a relation of the given
/// table bias onto a running trail bias.
#[inline(always)]
pub fn pile_up(total_bias: f64, bias: i8) -> f64 {
    total_bias * 2.0 * f64::from(bias) / 16.0
}

/// Propagates `start` from the first-round S-box through the permutation for
/// three rounds.
///
/// Each processed relation activates input and output bits of the current
/// S-box; the permutation maps output bit `j` of S-box `s` onto input bit
/// `s` of S-box `j` of the next round, which for this cipher is the grid
/// transpose itself. After a relation is processed, every S-box of the next
/// round with a non-zero propagated input is queued, and the round advances
/// once all S-boxes queued for it have been processed. Continuation
/// relations are chosen by `RelationSelector::best_by_input`.
///
/// The piling-up of `total_bias` assumes the chained relations are
/// statistically independent from round to round.
pub fn assemble_trail(
    table: &BiasTable,
    selector: &RelationSelector,
    start: Relation,
) -> Result<Trail, DeadTrail> {
    let mut u = [0u16; 4];
    let mut v = [0u16; 3];
    let mut total_bias = 0.5;

    let mut queue: VecDeque<(usize, u8)> = VecDeque::new();
    let mut relation = start;
    let mut sbox = 0;
    let mut round = 0;
    let mut round_boxes = 1;
    let mut enqueued = 0;

    loop {
        total_bias = pile_up(total_bias, table.bias(relation.input, relation.output));

        u[round] |= nibble_to_state(relation.input, sbox);
        let active_out = nibble_to_state(relation.output, sbox);
        v[round] |= active_out;
        u[round + 1] |= permute(active_out);

        enqueued += enqueue_active(u[round + 1], &mut queue);
        round_boxes -= 1;

        if round_boxes == 0 {
            round_boxes = enqueued;
            enqueued = 0;
            round += 1;

            if round == TRAIL_ROUNDS {
                break;
            }
        }

        match queue.pop_front() {
            Some((next_sbox, input)) => {
                sbox = next_sbox;
                relation = selector.best_by_input(input);
            }
            None => return Err(DeadTrail { round }),
        }
    }

    Ok(Trail { u, v, total_bias })
}

/// Queues every S-box of `state` holding a non-zero input cell and returns
/// how many entries were added. Cells already queued are queued again; the
/// repeat processing only affects the diagnostic bias and the visit order.
fn enqueue_active(state: u16, queue: &mut VecDeque<(usize, u8)>) -> usize {
    let mut added = 0;

    for sbox in 0..4 {
        let input = state_nibble(state, sbox);

        if input != 0 {
            queue.push_back((sbox, input));
            added += 1;
        }
    }

    added
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piling_up_is_the_product_law() {
        let biases = [4i8, -2, 6, -4];
        let piled = biases.iter().fold(0.5, |total, &bias| pile_up(total, bias));

        let expected = 0.5
            * biases
                .iter()
                .map(|&b| 2.0 * f64::from(b) / 16.0)
                .product::<f64>();

        assert!((piled - expected).abs() < 1e-12);
    }

    #[test]
    fn first_trail_of_the_real_table() {
        let table = BiasTable::build();
        let mut selector = RelationSelector::new(&table);

        let start = selector.select().expect("the real table has relations");
        assert_eq!(start, Relation { input: 10, output: 1 });

        let trail = assemble_trail(&table, &selector, start).expect("trail completes");

        // Start relation at S-box 0, then one active S-box per round.
        assert_eq!(trail.u, [0xa000, 0x0008, 0x1000, 0x0080]);
        assert_eq!(trail.v, [0x1000, 0x0008, 0x2000]);
        assert_eq!(trail.touched_sboxes(), vec![2]);

        // Chained biases 4, -2, -2.
        assert!((trail.total_bias - 0.015625).abs() < 1e-12);
    }

    #[test]
    fn propagation_is_the_permutation_of_the_output_bits() {
        let table = BiasTable::build();
        let mut selector = RelationSelector::new(&table);

        while let Some(start) = selector.select() {
            let trail = assemble_trail(&table, &selector, start).expect("trail completes");

            // Round 0 only processes the first S-box, so the round-1 input
            // pattern is exactly the permuted round-0 output pattern.
            assert_eq!(trail.u[1], permute(trail.v[0]));
            assert_eq!(trail.u[0], nibble_to_state(start.input, 0));
            assert_eq!(trail.v[0], nibble_to_state(start.output, 0));

            for round in 0..TRAIL_ROUNDS {
                assert_ne!(trail.u[round], 0);
                assert_ne!(trail.v[round], 0);
            }
            assert_ne!(trail.u[3], 0);
            assert!(!trail.touched_sboxes().is_empty());
        }
    }
}
