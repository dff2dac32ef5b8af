//! Parallel form of component G: every 32-byte half-block chunk is an
//! independent decode (its own lane, own `CachedBitReader` starting from
//! its own offset table entry), so chunks can be handed to a `rayon`
//! thread pool with no synchronization beyond the disjoint output
//! slices `par_chunks_mut` already guarantees.

use rayon::prelude::*;

use super::decode_chunk;
use crate::interleave::HALF_BLOCK_BYTES;

/// Parallel counterpart of [`super::sequential::decode_block_order`].
/// Produces byte-for-byte the same output; any two chunks may run
/// concurrently since each is decoded from its own lane's bit offset
/// into its own disjoint slice of `out`.
pub fn decode_block_order(
    bits: &[u8],
    offsets: &[u32],
    k_table: &[u8],
    num_blocks: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; num_blocks * 64];
    out.par_chunks_mut(HALF_BLOCK_BYTES)
        .enumerate()
        .for_each(|(chunk_index, chunk)| {
            decode_chunk(bits, offsets, k_table, chunk_index, chunk);
        });
    out
}
