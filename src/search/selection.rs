//! Selection of single S-box linear relations.

use smallvec::SmallVec;

use crate::table::BiasTable;

/// A single-cell linear relation `input mask -> output mask` of the S-box.
/// Its bias is the corresponding bias table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Relation {
    pub input: u8,
    pub output: u8,
}

/// Heuristic chooser of first-round relations.
///
/// Output masks are grouped by Hamming weight and light masks are preferred:
/// every active output bit activates another S-box in the next round, so
/// lighter masks keep trails narrow. Selection tracks which output bit
/// positions of the first-round S-box have been covered and stops once all
/// four have been.
pub struct RelationSelector<'a> {
    table: &'a BiasTable,
    covered: [bool; 4],
    weight_classes: [SmallVec<[u8; 6]>; 4],
}

impl<'a> RelationSelector<'a> {
    pub fn new(table: &'a BiasTable) -> RelationSelector<'a> {
        let mut weight_classes: [SmallVec<[u8; 6]>; 4] = Default::default();

        for mask in 1..16u8 {
            weight_classes[mask.count_ones() as usize - 1].push(mask);
        }

        RelationSelector {
            table,
            covered: [false; 4],
            weight_classes,
        }
    }

    /// True once every output bit position of the first-round S-box has been
    /// covered by some selected relation.
    pub fn all_covered(&self) -> bool {
        self.covered.iter().all(|&covered| covered)
    }

    /// True if every active bit of `mask` has already been covered.
    fn output_covered(&self, mask: u8) -> bool {
        (0..4)
            .filter(|&bit| mask >> bit & 1 == 1)
            .all(|bit| self.covered[bit])
    }

    /// Picks the next first-round relation: the strongest relation with
    /// `|bias| >= max_bias / 2` among weight-1 output masks that still cover
    /// a new output bit, falling back to weight-2 masks if none qualifies.
    /// Scanning is in ascending mask order and ties keep the first maximum.
    /// The active bits of the chosen output are marked covered.
    ///
    /// Returns `None` when coverage is already complete or nothing qualifies.
    pub fn select(&mut self) -> Option<Relation> {
        if self.all_covered() {
            return None;
        }

        let threshold = self.table.max_bias() / 2;
        let mut best: Option<(Relation, i8)> = None;

        for class in &self.weight_classes[..2] {
            for &output in class {
                for input in 1..16u8 {
                    let bias = self.table.bias(input, output).abs();

                    if bias >= threshold
                        && !self.output_covered(output)
                        && best.map_or(true, |(_, b)| bias > b)
                    {
                        best = Some((Relation { input, output }, bias));
                    }
                }
            }

            // Only fall through to the heavier class when nothing qualified.
            if best.is_some() {
                break;
            }
        }

        let (relation, _) = best?;

        for bit in 0..4 {
            if relation.output >> bit & 1 == 1 {
                self.covered[bit] = true;
            }
        }

        Some(relation)
    }

    /// Best continuation relation for a fixed S-box input mask: the weight-1
    /// or weight-2 output mask with the largest absolute bias. Used while a
    /// trail propagates, so there is no threshold and no coverage
    /// bookkeeping.
    pub fn best_by_input(&self, input: u8) -> Relation {
        let mut best_output = 0;
        let mut best_bias = -1i8;

        for class in &self.weight_classes[..2] {
            for &output in class {
                let bias = self.table.bias(input, output).abs();

                if bias > best_bias {
                    best_bias = bias;
                    best_output = output;
                }
            }
        }

        Relation {
            input,
            output: best_output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_table(bias: i8) -> BiasTable {
        let mut entries = [[bias; 16]; 16];
        entries[0][0] = 8;
        // Keep the trivial row and column balanced.
        for i in 1..16 {
            entries[0][i] = 0;
            entries[i][0] = 0;
        }
        BiasTable::from_entries(entries)
    }

    #[test]
    fn selection_terminates_with_full_coverage() {
        let table = BiasTable::build();
        let mut selector = RelationSelector::new(&table);
        let mut selected = Vec::new();

        while let Some(relation) = selector.select() {
            assert!(table.bias(relation.input, relation.output).abs() >= 4);
            assert!(relation.output.count_ones() <= 2);
            selected.push(relation);
            assert!(selected.len() <= 4, "at most one selection per output bit");
        }

        assert!(selector.all_covered());

        let mut coverage = 0u8;
        for relation in &selected {
            coverage |= relation.output;
        }
        assert_eq!(coverage, 0xf);
    }

    #[test]
    fn first_maximum_wins_ties() {
        // Every non-trivial relation has the same bias, so the very first
        // scanned cell (input 1, output mask 1) must win.
        let table = constant_table(4);
        let mut selector = RelationSelector::new(&table);

        let relation = selector.select().expect("a relation qualifies");
        assert_eq!(relation, Relation { input: 1, output: 1 });
    }

    #[test]
    fn weak_relations_are_rejected() {
        // All biases below max_bias / 2: nothing qualifies, coverage stalls.
        let table = constant_table(3);
        let mut selector = RelationSelector::new(&table);

        assert_eq!(selector.select(), None);
        assert!(!selector.all_covered());
    }

    #[test]
    fn covered_outputs_are_skipped() {
        let table = constant_table(4);
        let mut selector = RelationSelector::new(&table);

        let first = selector.select().unwrap();
        assert_eq!(first.output, 1);

        // Output bit 0 is covered now; the next pick must cover a new bit.
        let second = selector.select().unwrap();
        assert_eq!(second.output, 2);
    }

    #[test]
    fn continuation_picks_the_strongest_light_output() {
        let table = BiasTable::build();
        let selector = RelationSelector::new(&table);

        for input in 1..16u8 {
            let relation = selector.best_by_input(input);
            assert_eq!(relation.input, input);
            assert!(relation.output != 0 && relation.output.count_ones() <= 2);

            let chosen = table.bias(input, relation.output).abs();
            for output in 1..16u8 {
                if output.count_ones() <= 2 {
                    assert!(table.bias(input, output).abs() <= chosen);
                }
            }
        }
    }
}
