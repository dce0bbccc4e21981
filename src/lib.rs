//! Matsui-style linear cryptanalysis of a toy 16-bit SPN block cipher.
//!
//! The cipher under attack has a 16-bit block split into four 4-bit cells,
//! a single 4-bit S-box, a bit-transposition linear layer and four rounds
//! keyed by an 80-bit key. Given known plaintext/ciphertext pairs produced
//! under one fixed key, and assuming the 64 high-order key bits are known,
//! the attack recovers the final 16-bit round key: it builds the bias table
//! of the S-box, discovers three-round linear trails heuristically, tests
//! every last-round subkey touching a trail empirically, and verifies the
//! combined candidates against a reference pair.

pub mod attack;
pub mod bits;
pub mod cipher;
pub mod error;
pub mod samples;
pub mod search;
pub mod table;
pub mod utility;
