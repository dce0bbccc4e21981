//! Fixed-width conversions between integers and bit arrays.
//!
//! Bit arrays are little-endian: index 0 holds the least significant bit.
//! The codec round-trips exactly for every representable value and reports
//! an error instead of truncating oversized values.

use crate::error::WidthError;

/// Expands `value` into a `width`-bit array.
pub fn to_bits(value: u128, width: usize) -> Result<Vec<u8>, WidthError> {
    if width < 128 && value >> width != 0 {
        return Err(WidthError { value, width });
    }

    Ok((0..width).map(|i| ((value >> i) & 1) as u8).collect())
}

/// Collapses a bit array back into its integer value.
///
/// # Panics
/// Panics if the array is wider than 128 bits.
pub fn from_bits(bits: &[u8]) -> u128 {
    assert!(bits.len() <= 128, "bit array wider than 128 bits");

    bits.iter()
        .enumerate()
        .fold(0, |value, (i, &bit)| value | (u128::from(bit & 1) << i))
}

/// Renders a bit array as a string, most significant bit first.
pub fn fmt_bits(bits: &[u8]) -> String {
    bits.iter()
        .rev()
        .map(|&bit| if bit & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// Renders a 16-bit cipher state as a bit string, most significant bit first.
pub fn fmt_state(state: u16) -> String {
    let bits = to_bits(u128::from(state), 16).expect("16-bit value always fits");
    fmt_bits(&bits)
}
