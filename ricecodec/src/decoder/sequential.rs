//! Sequential form of component G: decodes every half-block chunk in a
//! single thread, in chunk order. Used as the correctness reference for
//! [`super::parallel::decode_block_order`] and directly by callers that
//! don't want to pull in a thread pool.

use super::{decode_chunk, DefaultCacheWord, DEFAULT_WORK_BITS};
use crate::bitstream::reader::CachedBitReader;
use crate::decoder::symbol::{decode_prefix_len, WorkReg};
use crate::interleave::HALF_BLOCK_BYTES;

/// Decode `num_blocks` blocks' worth of Rice-coded, 32-way interleaved
/// symbols back into the flat, block-flattened byte order
/// [`crate::reshape::split`] and [`crate::predictor::predict_block`]
/// produced at encode time.
pub fn decode_block_order(
    bits: &[u8],
    offsets: &[u32],
    k_table: &[u8],
    num_blocks: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; num_blocks * 64];
    for (chunk_index, chunk) in out.chunks_mut(HALF_BLOCK_BYTES).enumerate() {
        decode_chunk(bits, offsets, k_table, chunk_index, chunk);
    }
    out
}

/// Debugging view of component G: decode only the unary prefix length of
/// every symbol in every lane's half-block, in chunk order, without
/// reconstructing the symbols themselves. A lane whose prefixes run long
/// indicates a poorly chosen `k` for that block.
pub fn decode_prefix_bits(bits: &[u8], offsets: &[u32], k_table: &[u8], num_blocks: usize) -> Vec<u8> {
    let num_chunks = num_blocks * 2;
    let mut out = Vec::with_capacity(num_chunks * (HALF_BLOCK_BYTES));

    for chunk_index in 0..num_chunks {
        let (bb, t) = super::big_block_and_lane_for_chunk(chunk_index);
        let block_index = chunk_index / 2;
        let k = k_table[block_index];
        let bit_start = offsets[bb * crate::interleave::LANES + t] as u64;

        let mut reader = CachedBitReader::<DefaultCacheWord>::new(bits, bit_start, DEFAULT_WORK_BITS);
        let mut work = WorkReg::new();
        for _ in 0..HALF_BLOCK_BYTES {
            out.push(decode_prefix_len(&mut reader, &mut work, k, DEFAULT_WORK_BITS));
        }
    }

    out
}
