//! Small helpers shared across the crate.

use std::io::{self, Write};

/// Modulo 2 sum of the bits of the input.
#[inline(always)]
pub fn parity(x: u16) -> u16 {
    (x.count_ones() & 1) as u16
}

/// Parity of `<input, alpha> ^ <output, beta>`, where `<_,_>` is the inner
/// product over GF(2).
#[inline(always)]
pub fn parity_masks(input: u16, alpha: u16, output: u16, beta: u16) -> u16 {
    parity(input & alpha) ^ parity(output & beta)
}

/// A progress bar printing on the command line.
pub struct ProgressBar {
    step: f64,
    pending: f64,
    used: bool,
}

impl ProgressBar {
    /// Creates a bar tracking `num_items` steps, rendered as 100 ticks.
    pub fn new(num_items: usize) -> ProgressBar {
        ProgressBar {
            step: 100.0 / (num_items as f64),
            pending: 0.0,
            used: false,
        }
    }

    /// Advances the bar by one step, printing any ticks reached.
    #[inline]
    pub fn increment(&mut self) {
        self.pending += self.step;
        self.used = true;

        while self.pending >= 1.0 {
            print!("=");
            io::stdout().flush().expect("could not flush stdout");
            self.pending -= 1.0;
        }
    }
}

impl Drop for ProgressBar {
    fn drop(&mut self) {
        if self.used {
            println!();
        }
    }
}
