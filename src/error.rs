//! Error types of the crate.

use std::error::Error;
use std::fmt;
use std::io;

/// Failure to build, persist or parse the bias table.
///
/// A `Parse` error means the persisted table exists but is not a valid
/// 16×16 grid of biases; callers treat this as a fatal misconfiguration.
#[derive(Debug)]
pub enum TableError {
    Io(io::Error),
    Parse { row: usize, column: usize },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TableError::Io(err) => write!(f, "could not access the bias table: {}", err),
            TableError::Parse { row, column } => {
                write!(f, "malformed bias table entry at row {}, column {}", row, column)
            }
        }
    }
}

impl Error for TableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TableError::Io(err) => Some(err),
            TableError::Parse { .. } => None,
        }
    }
}

impl From<io::Error> for TableError {
    fn from(err: io::Error) -> TableError {
        TableError::Io(err)
    }
}

/// A value did not fit the requested bit width. Values are never silently
/// truncated by the bit codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthError {
    pub value: u128,
    pub width: usize,
}

impl fmt::Display for WidthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "value {:#x} does not fit in {} bits", self.value, self.width)
    }
}

impl Error for WidthError {}
