//! The top-level linear cryptanalysis attack.
//!
//! One attack run owns all mutable state: the output coverage inside the
//! relation selector and the global candidate pool. Trails are discovered
//! and estimated one at a time; their candidate nibbles accumulate in the
//! pool, which is combined and verified at the end.

mod estimator;
mod recovery;

pub use self::estimator::estimate_subkeys;
pub use self::recovery::{recover_round_key, test_round_key};

use std::time::Instant;

use indexmap::IndexSet;

use crate::bits::fmt_state;
use crate::samples::KnownPair;
use crate::search::{assemble_trail, RelationSelector};
use crate::table::BiasTable;

/// Tunable attack parameters. The defaults are the empirically calibrated
/// values of the attack.
#[derive(Clone, Copy, Debug)]
pub struct AttackParams {
    /// Upper bound on the number of trails discovered and estimated. The
    /// run stops earlier once every first-round output bit is covered.
    pub max_trails: usize,
}

impl Default for AttackParams {
    fn default() -> AttackParams {
        AttackParams { max_trails: 20 }
    }
}

/// Subkey nibbles retained per final-round S-box, across all processed
/// trails. Sets are insertion-ordered, deduplicated and only ever grow; a
/// later trail never evicts an accepted nibble.
#[derive(Clone, Debug, Default)]
pub struct CandidatePool {
    sets: [IndexSet<u8>; 4],
}

impl CandidatePool {
    pub fn insert(&mut self, sbox: usize, nibble: u8) {
        self.sets[sbox].insert(nibble);
    }

    pub fn sets(&self) -> &[IndexSet<u8>; 4] {
        &self.sets
    }
}

/// Runs the full attack against `samples`, assuming the 64 high-order key
/// bits are `known_high_bits`. Returns the recovered final 16-bit round
/// key, or `None` when the sample set is empty or every candidate
/// combination fails verification (the caller may retry with fresh
/// samples).
pub fn perform_linear_cryptanalysis(
    table: &BiasTable,
    samples: &[KnownPair],
    known_high_bits: u64,
    params: &AttackParams,
) -> Option<u16> {
    if samples.is_empty() {
        println!("No samples supplied; nothing to estimate.");
        return None;
    }

    let start = Instant::now();
    let mut selector = RelationSelector::new(table);
    let mut pool = CandidatePool::default();

    for _ in 0..params.max_trails {
        let relation = match selector.select() {
            Some(relation) => relation,
            None => {
                println!("All first-round output bits covered.");
                break;
            }
        };

        println!(
            "Selected relation {:x} -> {:x} (bias {})",
            relation.input,
            relation.output,
            table.bias(relation.input, relation.output)
        );

        let trail = match assemble_trail(table, &selector, relation) {
            Ok(trail) => trail,
            Err(dead) => {
                println!("Discarding trail: {}", dead);
                continue;
            }
        };

        for round in 0..3 {
            println!("{} -> {}", fmt_state(trail.u[round]), fmt_state(trail.v[round]));
        }
        println!("{}", fmt_state(trail.u[3]));
        println!(
            "Relation {} -> {} holds with a theoretical bias of {:.4}",
            fmt_state(trail.u[0]),
            fmt_state(trail.u[3]),
            trail.total_bias
        );

        estimate_subkeys(&trail, samples, &mut pool);
    }

    let result = recover_round_key(&pool, samples[0], known_high_bits);

    match result {
        Some(key) => println!(
            "Recovered final round key {:#06x}. [{:?}]",
            key,
            start.elapsed()
        ),
        None => println!("No candidate combination verified; try a different sample set."),
    }

    result
}
