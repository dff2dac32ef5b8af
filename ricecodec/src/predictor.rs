//! Component B: in-block prediction.
//!
//! Each block is differenced against its own column-0 and row history
//! before the residuals are zig-zag mapped to unsigned symbols: column 0
//! is delta-coded top-to-bottom, then every row is delta-coded
//! left-to-right starting from its (already-delta-coded) column-0 value.
//! The block's `(0,0)` corner is kept raw as the anchor the whole block
//! is reconstructed from.
//!
//! All arithmetic is byte-wise modulo 256: subtraction wraps, and the
//! wrapped `u8` difference is reinterpreted as the `i8` residual that
//! gets zig-zag mapped. This is total over every pair of input bytes, so
//! prediction never fails.

use crate::zigzag::{unzigzag, zigzag};

fn delta(a: u8, b: u8) -> i8 {
    a.wrapping_sub(b) as i8
}

fn undelta(prev: u8, residual: i8) -> u8 {
    prev.wrapping_add(residual as u8)
}

/// Predict a single `b x b` block in place (row-major, length `b*b`).
///
/// `block[0]` (the `(0,0)` corner) is left untouched as the anchor;
/// every other position is overwritten with its zig-zag mapped delta.
pub fn predict_block(block: &mut [u8], b: u8) {
    let dim = b as usize;
    debug_assert_eq!(block.len(), dim * dim);

    // Column 0, bottom to top is wrong order: deltas must be computed
    // before any position in column 0 is overwritten, so collect them
    // first.
    let mut col0_deltas = vec![0i8; dim];
    for r in 1..dim {
        col0_deltas[r] = delta(block[r * dim], block[(r - 1) * dim]);
    }

    // Row deltas must likewise be computed from the pre-prediction
    // values, so collect them before any row is overwritten.
    let mut row_deltas = vec![0i8; dim * dim];
    for r in 0..dim {
        for c in 1..dim {
            row_deltas[r * dim + c] = delta(block[r * dim + c], block[r * dim + c - 1]);
        }
    }

    for r in 1..dim {
        block[r * dim] = zigzag(col0_deltas[r]);
    }
    for r in 0..dim {
        for c in 1..dim {
            block[r * dim + c] = zigzag(row_deltas[r * dim + c]);
        }
    }
}

/// Inverse of [`predict_block`]: reconstruct a `b x b` block in place
/// from its anchor and zig-zag delta residuals.
pub fn unpredict_block(block: &mut [u8], b: u8) {
    let dim = b as usize;
    debug_assert_eq!(block.len(), dim * dim);

    // Column 0 first: each entry depends on the row above it.
    for r in 1..dim {
        let residual = unzigzag(block[r * dim]);
        block[r * dim] = undelta(block[(r - 1) * dim], residual);
    }

    // Then each row, left to right, starting from its own column-0 value.
    for r in 0..dim {
        for c in 1..dim {
            let residual = unzigzag(block[r * dim + c]);
            block[r * dim + c] = undelta(block[r * dim + c - 1], residual);
        }
    }
}
