//! Spec §6: the in-memory container format and the two top-level
//! encoder entry points.
//!
//! ```text
//! header  : u32 width, u32 height, u8 B, u8 flags   (little-endian)
//! ktable  : u8[Nblocks + 1]                          (last byte = 0 sentinel)
//! offsets : u32[Nbigblocks * 32]                     (per-lane bit starts)
//! bits    : u32 numBytes, u8[numBytes]               (already includes tail padding)
//! ```
//!
//! `encode_image`/`decode_image` drive the full pipeline (A through G)
//! and always use the 32-way interleaved layout, which — like
//! [`crate::interleave`] itself — is only defined for `B = 8`.
//! `encode_bits`/`decode_block_symbols` expose component D directly, at
//! any supported block size, with one bit stream per block rather than
//! per lane; this is what the smaller end-to-end scenarios in spec §8
//! (a single 4x4 block, B=4) exercise.

use crate::bitstream::reader::CachedBitReader;
use crate::bitstream::writer::{encode_block_joint, BitWriter, TAIL_PADDING_BYTES};
use crate::decoder::symbol::{decode_symbol, WorkReg};
use crate::decoder::{parallel, sequential, DefaultCacheWord, DEFAULT_WORK_BITS};
use crate::error::{Error, HeaderError, ParameterError};
use crate::interleave::{encode_interleaved, BLOCKS_PER_BIG_BLOCK};
use crate::kselect::opt_rice_k;
use crate::predictor::{predict_block, unpredict_block};
use crate::reshape::{block_grid, flatten_and_crop, split};
use std::convert::TryInto;

/// Block dimension the 32-way interleaved container requires.
const INTERLEAVED_BLOCK_DIM: u8 = 8;

fn next_multiple_of_16(n: usize) -> usize {
    let rem = n % BLOCKS_PER_BIG_BLOCK;
    if rem == 0 {
        n
    } else {
        n + (BLOCKS_PER_BIG_BLOCK - rem)
    }
}

fn write_u32le(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn read_u32le(bytes: &[u8], pos: &mut usize) -> Result<u32, Error> {
    let slice = bytes
        .get(*pos..*pos + 4)
        .ok_or_else(|| truncated_error(bytes.len(), *pos + 4))?;
    *pos += 4;
    Ok(u32::from_le_bytes(slice.try_into().unwrap()))
}

fn truncated_error(actual: usize, expected: usize) -> Error {
    Error::TruncatedStream { expected, actual }
}

/// Validate that every entry of a `k` table (including its trailing
/// sentinel) is within the format's `[0,7]` range, so the hot
/// encode/decode loops downstream never see an out-of-range `k` that
/// would underflow `8 - k`.
fn validate_k_table(k_table: &[u8]) -> Result<(), Error> {
    for &k in k_table {
        if k > crate::kselect::MAX_K {
            return Err(ParameterError::BadK(k).into());
        }
    }
    Ok(())
}

/// Encode a `width x height` byte grid into the full container blob:
/// reshape, predict, select `k`, 32-way interleave, and pack the
/// result with its header and tables. `B` must be `8` (the only block
/// size the interleaved layout supports); padding blocks needed to
/// round the block grid up to a multiple of 16 are filled with zero
/// and recorded transparently (they never appear in the decoded
/// output, which is cropped back to `width x height`).
pub fn encode_image(bytes: &[u8], width: u32, height: u32, b: u8) -> Result<Vec<u8>, Error> {
    if b != INTERLEAVED_BLOCK_DIM {
        return Err(ParameterError::BadBlockDim(b).into());
    }
    if bytes.len() != (width as usize) * (height as usize) {
        return Err(HeaderError::SizeMismatch {
            width,
            height,
            num_symbols: bytes.len(),
        }
        .into());
    }

    let (bw, bh) = block_grid(width, height, b);
    let num_blocks = (bw * bh) as usize;
    let block_len = (b as usize) * (b as usize);

    let mut flat = split(bytes, width, height, b);
    for block in flat.chunks_mut(block_len) {
        predict_block(block, b);
    }

    let padded_blocks = next_multiple_of_16(num_blocks);
    if padded_blocks != num_blocks {
        flat.resize(padded_blocks * block_len, 0);
    }

    let k_table = opt_rice_k(&flat, block_len);
    let interleaved = encode_interleaved(&flat, &k_table)?;

    let mut out = Vec::new();
    write_u32le(&mut out, width);
    write_u32le(&mut out, height);
    out.push(b);
    out.push(0); // flags: joint layout only, bit0 unset.
    out.extend_from_slice(&k_table);
    for &off in &interleaved.offsets {
        write_u32le(&mut out, off);
    }
    write_u32le(&mut out, interleaved.bits.len() as u32);
    out.extend_from_slice(&interleaved.bits);

    Ok(out)
}

/// Inverse of [`encode_image`].
pub fn decode_image(blob: &[u8]) -> Result<Vec<u8>, Error> {
    let mut pos = 0usize;
    let width = read_u32le(blob, &mut pos)?;
    let height = read_u32le(blob, &mut pos)?;
    let b = *blob
        .get(pos)
        .ok_or_else(|| truncated_error(blob.len(), pos + 1))?;
    pos += 1;
    let flags = *blob
        .get(pos)
        .ok_or_else(|| truncated_error(blob.len(), pos + 1))?;
    pos += 1;

    if b != INTERLEAVED_BLOCK_DIM {
        return Err(ParameterError::BadBlockDim(b).into());
    }
    if flags & 1 != 0 {
        return Err(HeaderError::UnsupportedLayout.into());
    }

    let (bw, bh) = block_grid(width, height, b);
    let num_blocks = (bw * bh) as usize;
    let padded_blocks = next_multiple_of_16(num_blocks);
    let block_len = (b as usize) * (b as usize);

    let k_table = blob
        .get(pos..pos + padded_blocks + 1)
        .ok_or_else(|| truncated_error(blob.len(), pos + padded_blocks + 1))?
        .to_vec();
    pos += padded_blocks + 1;
    if k_table.len() != padded_blocks + 1 {
        return Err(HeaderError::KTableLength {
            expected: padded_blocks + 1,
            actual: k_table.len(),
        }
        .into());
    }
    validate_k_table(&k_table)?;

    let num_big_blocks = padded_blocks / BLOCKS_PER_BIG_BLOCK;
    let offsets_len = num_big_blocks * 32;
    let mut offsets = Vec::with_capacity(offsets_len);
    for _ in 0..offsets_len {
        offsets.push(read_u32le(blob, &mut pos)?);
    }

    let num_bytes = read_u32le(blob, &mut pos)? as usize;
    let bits = blob
        .get(pos..pos + num_bytes)
        .ok_or_else(|| truncated_error(blob.len(), pos + num_bytes))?;

    let mut flat = parallel::decode_block_order(bits, &offsets, &k_table, padded_blocks);
    flat.truncate(num_blocks * block_len);

    for block in flat.chunks_mut(block_len) {
        unpredict_block(block, b);
    }

    Ok(flatten_and_crop(&flat, b, width, height))
}

/// Component D directly: Rice-encode `symbols` (already block-flattened
/// and predicted, `symbols.len()` a multiple of `block_len = B*B`) one
/// block per bit stream, all concatenated into a single padded buffer.
/// `k_table` must have length `Nblocks + 1` (trailing sentinel).
///
/// Returns `(bits, offsets)` where `offsets[i]` is the bit position at
/// which block `i`'s encoded bits begin.
pub fn encode_bits(
    symbols: &[u8],
    k_table: &[u8],
    block_len: usize,
) -> Result<(Vec<u8>, Vec<u32>), Error> {
    if symbols.len() % block_len != 0 {
        return Err(ParameterError::BadBlockDim(block_len as u8).into());
    }
    let num_blocks = symbols.len() / block_len;
    if k_table.len() != num_blocks + 1 {
        return Err(HeaderError::KTableLength {
            expected: num_blocks + 1,
            actual: k_table.len(),
        }
        .into());
    }
    validate_k_table(k_table)?;

    let mut writer = BitWriter::new();
    let mut offsets = Vec::with_capacity(num_blocks);

    for (i, block) in symbols.chunks_exact(block_len).enumerate() {
        offsets.push(writer.len_bits() as u32);
        encode_block_joint(&mut writer, block, k_table[i]);
    }

    Ok((writer.into_padded_bytes(TAIL_PADDING_BYTES), offsets))
}

/// Inverse of [`encode_bits`]: the sequential-form decoder operating on
/// one bit stream per block, spec §6's `decode_block_symbols`.
pub fn decode_block_symbols(
    bits: &[u8],
    offsets: &[u32],
    k_table: &[u8],
    num_blocks: usize,
    block_len: usize,
) -> Result<Vec<u8>, Error> {
    validate_k_table(k_table)?;

    let mut out = vec![0u8; num_blocks * block_len];
    for (i, block) in out.chunks_mut(block_len).enumerate() {
        let k = k_table[i];
        let mut reader =
            CachedBitReader::<DefaultCacheWord>::new(bits, offsets[i] as u64, DEFAULT_WORK_BITS);
        let mut work = WorkReg::new();
        for slot in block.iter_mut() {
            *slot = decode_symbol(&mut reader, &mut work, k, DEFAULT_WORK_BITS);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_4x4_all_zero_image_b4() {
        let image = vec![0u8; 16];
        let block_len = 16;
        let mut flat = split(&image, 4, 4, 4);
        for block in flat.chunks_mut(block_len) {
            predict_block(block, 4);
        }
        let k_table = opt_rice_k(&flat, block_len);
        assert_eq!(k_table, vec![0, 0]);

        let (bits, offsets) = encode_bits(&flat, &k_table, block_len).unwrap();
        assert!(bits.len() * 8 >= 16);

        let mut decoded_flat = decode_block_symbols(&bits, &offsets, &k_table, 1, block_len).unwrap();
        for block in decoded_flat.chunks_mut(block_len) {
            unpredict_block(block, 4);
        }
        let restored = flatten_and_crop(&decoded_flat, 4, 4, 4);
        assert_eq!(restored, image);
    }

    #[test]
    fn round_trips_image_through_full_container() {
        let width = 24;
        let height = 24;
        let image: Vec<u8> = (0..width * height).map(|i| ((i * 13 + 5) % 256) as u8).collect();

        let blob = encode_image(&image, width, height, 8).unwrap();
        let restored = decode_image(&blob).unwrap();

        assert_eq!(restored, image);
    }

    #[test]
    fn round_trips_non_multiple_of_big_block_dimensions() {
        // 24x24 at B=8 is a 3x3=9-block grid, not a multiple of 16:
        // exercises the zero-block padding path.
        let width = 17;
        let height = 11;
        let image: Vec<u8> = (0..width * height).map(|i| ((i * 31 + 2) % 256) as u8).collect();

        let blob = encode_image(&image, width, height, 8).unwrap();
        let restored = decode_image(&blob).unwrap();

        assert_eq!(restored, image);
    }

    #[test]
    fn rejects_block_dim_other_than_8_for_full_container() {
        let image = vec![0u8; 16];
        assert!(encode_image(&image, 4, 4, 4).is_err());
    }

    #[test]
    fn rejects_size_mismatched_header() {
        let image = vec![0u8; 15];
        assert!(encode_image(&image, 4, 4, 8).is_err());
    }

    #[test]
    fn rejects_out_of_range_k_in_encode_bits() {
        let symbols = vec![0u8; 16];
        let k_table = vec![8u8, 0]; // k=8 is outside [0,7]
        assert_eq!(
            encode_bits(&symbols, &k_table, 16).unwrap_err(),
            Error::InvalidParameter(ParameterError::BadK(8))
        );
    }

    #[test]
    fn rejects_out_of_range_k_in_decode_block_symbols() {
        let bits = vec![0u8; 8];
        let offsets = vec![0u32];
        let k_table = vec![9u8, 0];
        assert_eq!(
            decode_block_symbols(&bits, &offsets, &k_table, 1, 16).unwrap_err(),
            Error::InvalidParameter(ParameterError::BadK(9))
        );
    }

    #[test]
    fn rejects_out_of_range_k_in_decode_image_header() {
        let width = 8u32;
        let height = 8u32;
        let image = vec![0u8; 64];
        let mut blob = encode_image(&image, width, height, 8).unwrap();
        // k table starts right after the 10-byte header; corrupt its
        // first entry to an out-of-range value.
        blob[10] = 200;
        assert_eq!(
            decode_image(&blob).unwrap_err(),
            Error::InvalidParameter(ParameterError::BadK(200))
        );
    }

    #[test]
    fn sequential_and_parallel_agree_through_the_container() {
        let width = 32;
        let height = 32;
        let image: Vec<u8> = (0..width * height).map(|i| ((i * 91 + 7) % 256) as u8).collect();

        let (bw, bh) = block_grid(width, height, 8);
        let num_blocks = (bw * bh) as usize;
        let block_len = 64;

        let mut flat = split(&image, width, height, 8);
        for block in flat.chunks_mut(block_len) {
            predict_block(block, 8);
        }
        let padded_blocks = next_multiple_of_16(num_blocks);
        flat.resize(padded_blocks * block_len, 0);
        let k_table = opt_rice_k(&flat, block_len);
        let interleaved = encode_interleaved(&flat, &k_table).unwrap();

        let seq = sequential::decode_block_order(&interleaved.bits, &interleaved.offsets, &k_table, padded_blocks);
        let par = parallel::decode_block_order(&interleaved.bits, &interleaved.offsets, &k_table, padded_blocks);
        assert_eq!(seq, par);
    }
}
