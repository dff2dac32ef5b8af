//! Component G: the 32-way interleaved decoder, in its sequential and
//! parallel forms.

pub mod parallel;
pub mod sequential;
pub(crate) mod symbol;

use crate::bitstream::reader::CachedBitReader;
use crate::interleave::BLOCKS_PER_BIG_BLOCK;
use symbol::{decode_symbol, WorkReg};

/// Cache word width used by the production decode path (component G's
/// default per `DESIGN.md`'s canonical-form decision).
pub type DefaultCacheWord = u64;
/// Working register width used by the production decode path.
pub const DEFAULT_WORK_BITS: u32 = 32;

/// Invert [`crate::interleave::lane_block_and_half`]: given the flat
/// half-block chunk index `chunk` (chunk `2*block_index` is a block's top
/// half, `2*block_index + 1` its bottom half), return the big block and
/// lane that produced it.
fn big_block_and_lane_for_chunk(chunk: usize) -> (usize, usize) {
    let block_index = chunk / 2;
    let is_top = chunk % 2 == 0;
    let bb = block_index / BLOCKS_PER_BIG_BLOCK;
    let local = block_index % BLOCKS_PER_BIG_BLOCK;
    let t = local * 2 + if is_top { 0 } else { 1 };
    (bb, t)
}

/// Decode one 32-byte half-block chunk in place.
///
/// `chunk` writes directly into the flat, block-order output this is the
/// inverse of [`crate::interleave::encode_interleaved`] plus
/// [`crate::reshape::split`]: the un-interleaving ("reverse E") is fused
/// into this placement rather than run as a separate shuffle pass, since
/// the offset/`k` lookup already identifies each chunk's final
/// destination directly.
fn decode_chunk(bits: &[u8], offsets: &[u32], k_table: &[u8], chunk_index: usize, out: &mut [u8]) {
    debug_assert_eq!(out.len(), crate::interleave::HALF_BLOCK_BYTES);

    let (bb, t) = big_block_and_lane_for_chunk(chunk_index);
    let block_index = chunk_index / 2;
    let k = k_table[block_index];
    let bit_start = offsets[bb * crate::interleave::LANES + t] as u64;

    let mut reader = CachedBitReader::<DefaultCacheWord>::new(bits, bit_start, DEFAULT_WORK_BITS);
    let mut work = WorkReg::new();
    for slot in out.iter_mut() {
        *slot = decode_symbol(&mut reader, &mut work, k, DEFAULT_WORK_BITS);
    }
}
