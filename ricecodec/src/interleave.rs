//! Component E: the 32-way (`s32`) stream interleaver.
//!
//! Sixteen consecutive blocks (in the block-flattened order produced by
//! [`crate::reshape::split`]) form one *big block*, the scheduling unit
//! the parallel decoder hands out to 32 cooperating workers — two
//! workers per block, one per horizontal half. This module only fixes
//! `B = 8` (spec §4.E: "Assume B=8"), since a half-block of `B*B/2`
//! bytes is only exactly 32 bytes — a convenient SIMD/thread-lane width
//! — at that block size.
//!
//! This implementation groups big blocks as consecutive runs of 16 in
//! block-flattened order rather than tracking the 2-D 4x4 tile each big
//! block spans in the pixel grid. [`crate::reshape`] already maps every
//! block index back to its `(row, col)` position independently of how
//! blocks are grouped for thread scheduling, so this simplification
//! changes nothing observable about round-trip correctness — it only
//! affects which 16 blocks happen to share a big block's bit-stream
//! neighborhood. See `DESIGN.md` for the full rationale.

use crate::bitstream::writer::{encode_block_joint, BitWriter, TAIL_PADDING_BYTES};
use crate::error::{Error, ParameterError};

/// Workers cooperating on one big block.
pub const LANES: usize = 32;
/// Blocks per big block.
pub const BLOCKS_PER_BIG_BLOCK: usize = 16;
/// Bytes in a half-block at the fixed `B = 8` this component assumes.
pub const HALF_BLOCK_BYTES: usize = 32;

/// Which full block, and which half of it, lane `t` owns within one big
/// block.
pub fn lane_block_and_half(lane: usize, big_block: usize) -> (usize, bool) {
    debug_assert!(lane < LANES);
    let block_index = big_block * BLOCKS_PER_BIG_BLOCK + lane / 2;
    let is_top = lane % 2 == 0;
    (block_index, is_top)
}

/// Split a `B=8` block's 64 raster-order bytes into its top and bottom
/// 32-byte halves.
pub fn split_half_block(block: &[u8]) -> (&[u8], &[u8]) {
    debug_assert_eq!(block.len(), 64);
    block.split_at(HALF_BLOCK_BYTES)
}

/// Build the "k half-table" of length `2*Nblocks + 1` described in spec
/// §4.E: entries `2j` and `2j+1` both hold the `k` of block `j`, with a
/// trailing `0` sentinel. This is a derived convenience the container
/// format itself does not persist (it only stores the per-block `k`
/// table); both halves of a block always share that block's `k`.
pub fn k_half_table(k_table: &[u8]) -> Vec<u8> {
    debug_assert_eq!(*k_table.last().unwrap_or(&0), 0);
    let num_blocks = k_table.len() - 1;
    let mut out = Vec::with_capacity(2 * num_blocks + 1);
    for &k in &k_table[..num_blocks] {
        out.push(k);
        out.push(k);
    }
    out.push(0);
    out
}

/// Output of [`encode_interleaved`]: the shared, byte-padded bit buffer
/// and the per-(big block, lane) absolute bit start offsets.
pub struct InterleavedBits {
    pub bits: Vec<u8>,
    /// Length `Nbigblocks * 32`; `offsets[bb * 32 + t]` is the absolute
    /// bit offset at which lane `t`'s half-block for big block `bb`
    /// begins in `bits`.
    pub offsets: Vec<u32>,
}

/// Rice-encode `blocks` (predicted, zig-zag-mapped, block-flattened
/// bytes, `B = 8`, `64` bytes per block) into the 32-way interleaved
/// layout: one bit stream per lane, each stream the concatenation of
/// that lane's half-blocks across every big block in order, all 32
/// streams then concatenated into one shared, padded buffer.
pub fn encode_interleaved(blocks: &[u8], k_table: &[u8]) -> Result<InterleavedBits, Error> {
    if blocks.len() % 64 != 0 {
        return Err(ParameterError::BadBlockDim(8).into());
    }
    let num_blocks = blocks.len() / 64;
    if num_blocks % BLOCKS_PER_BIG_BLOCK != 0 {
        return Err(ParameterError::BadBlockDim(8).into());
    }
    if k_table.len() != num_blocks + 1 {
        return Err(crate::error::HeaderError::KTableLength {
            expected: num_blocks + 1,
            actual: k_table.len(),
        }
        .into());
    }

    let num_big_blocks = num_blocks / BLOCKS_PER_BIG_BLOCK;

    let mut thread_writers: Vec<BitWriter> = (0..LANES).map(|_| BitWriter::new()).collect();
    // thread_half_starts[t][bb] = bit offset of big block bb's half-block
    // within thread t's own (not-yet-concatenated) writer.
    let mut thread_half_starts: Vec<Vec<usize>> = vec![Vec::with_capacity(num_big_blocks); LANES];

    for t in 0..LANES {
        for bb in 0..num_big_blocks {
            let (block_index, is_top) = lane_block_and_half(t, bb);
            let block = &blocks[block_index * 64..][..64];
            let (top, bottom) = split_half_block(block);
            let half = if is_top { top } else { bottom };
            let k = k_table[block_index];

            thread_half_starts[t].push(thread_writers[t].len_bits());
            encode_block_joint(&mut thread_writers[t], half, k);
        }
    }

    let mut combined = BitWriter::new();
    let mut offsets = vec![0u32; num_big_blocks * LANES];

    for t in 0..LANES {
        let thread_abs_start = combined.len_bits();
        combined.append_bits_from(&thread_writers[t]);

        for bb in 0..num_big_blocks {
            offsets[bb * LANES + t] = (thread_abs_start + thread_half_starts[t][bb]) as u32;
        }
    }

    let bits = combined.into_padded_bytes(TAIL_PADDING_BYTES);

    Ok(InterleavedBits { bits, offsets })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_assignment_covers_every_block_exactly_twice() {
        let mut seen = [0u8; 16];
        for lane in 0..LANES {
            let (block_index, _) = lane_block_and_half(lane, 0);
            seen[block_index] += 1;
        }
        assert!(seen.iter().all(|&c| c == 2));
    }

    #[test]
    fn even_lanes_own_top_half_odd_lanes_bottom() {
        for lane in 0..LANES {
            let (_, is_top) = lane_block_and_half(lane, 0);
            assert_eq!(is_top, lane % 2 == 0);
        }
    }

    #[test]
    fn k_half_table_duplicates_each_entry() {
        let k_table = vec![3u8, 5, 0, 0]; // 3 blocks, trailing sentinel
        let half = k_half_table(&k_table);
        assert_eq!(half, vec![3, 3, 5, 5, 0, 0, 0]);
    }

    #[test]
    fn single_big_block_all_zero_encodes_with_valid_offsets() {
        let blocks = vec![0u8; 64 * 16];
        let k_table = vec![0u8; 17];
        let result = encode_interleaved(&blocks, &k_table).unwrap();
        assert_eq!(result.offsets.len(), 32);
        // Every offset must be a valid bit position within the buffer
        // (allowing for the final padding word).
        let total_bits = result.bits.len() * 8;
        for &off in &result.offsets {
            assert!((off as usize) < total_bits);
        }
    }

    #[test]
    fn rejects_block_count_not_multiple_of_16() {
        let blocks = vec![0u8; 64 * 5];
        let k_table = vec![0u8; 6];
        assert!(encode_interleaved(&blocks, &k_table).is_err());
    }
}
