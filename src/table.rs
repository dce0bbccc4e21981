//! The linear-approximation bias table of the S-box.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::cipher::SBOX;
use crate::error::TableError;
use crate::utility::parity_masks;

/// Signed biases of all 256 single S-box linear relations.
///
/// `bias(a, b)` is the number of S-box inputs for which the parity of the
/// `a`-masked input bits equals the parity of the `b`-masked output bits,
/// minus half the input space. Every entry lies in `[-8, 8]`; the trivial
/// relation `0 -> 0` always holds, so `bias(0, 0) == 8`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BiasTable {
    entries: [[i8; 16]; 16],
}

impl BiasTable {
    /// Computes the table from the S-box definition.
    pub fn build() -> BiasTable {
        let mut entries = [[0i8; 16]; 16];

        for (mask_in, row) in entries.iter_mut().enumerate() {
            for (mask_out, entry) in row.iter_mut().enumerate() {
                let mut count = 0;

                for input in 0..16u16 {
                    let output = u16::from(SBOX[input as usize]);
                    if parity_masks(input, mask_in as u16, output, mask_out as u16) == 0 {
                        count += 1;
                    }
                }

                *entry = count - 8;
            }
        }

        BiasTable { entries }
    }

    /// Loads the persisted table, building and writing it first if the file
    /// does not exist. An existing but malformed file is a fatal
    /// configuration error, reported as `TableError::Parse`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<BiasTable, TableError> {
        let path = path.as_ref();

        if !path.exists() {
            BiasTable::build().write(path)?;
        }

        BiasTable::read(path)
    }

    /// Writes the table as 16 rows of 16 tab-separated signed integers.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), TableError> {
        let mut file = File::create(path)?;
        write!(file, "{}", self)?;
        Ok(())
    }

    fn read(path: &Path) -> Result<BiasTable, TableError> {
        let file = File::open(path)?;
        let mut entries = [[0i8; 16]; 16];
        let mut lines = BufReader::new(file).lines();

        for (row, row_entries) in entries.iter_mut().enumerate() {
            let line = match lines.next() {
                Some(line) => line?,
                None => return Err(TableError::Parse { row, column: 0 }),
            };

            let mut fields = line.split_whitespace();

            for (column, entry) in row_entries.iter_mut().enumerate() {
                let value: i8 = fields
                    .next()
                    .and_then(|field| field.parse().ok())
                    .ok_or(TableError::Parse { row, column })?;

                if value < -8 || value > 8 {
                    return Err(TableError::Parse { row, column });
                }

                *entry = value;
            }
        }

        Ok(BiasTable { entries })
    }

    /// Bias of the relation `mask_in -> mask_out`.
    #[inline(always)]
    pub fn bias(&self, mask_in: u8, mask_out: u8) -> i8 {
        self.entries[mask_in as usize][mask_out as usize]
    }

    /// Bias of the trivial relation; the largest bias any relation can have.
    pub fn max_bias(&self) -> i8 {
        self.entries[0][0]
    }

    #[cfg(test)]
    pub fn from_entries(entries: [[i8; 16]; 16]) -> BiasTable {
        BiasTable { entries }
    }
}

impl fmt::Display for BiasTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in &self.entries {
            let line: Vec<String> = row.iter().map(|entry| entry.to_string()).collect();
            writeln!(f, "{}", line.join("\t"))?;
        }
        Ok(())
    }
}
