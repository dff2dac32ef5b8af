//! Component A: the block reshaper.
//!
//! Splits a `width x height` grid of bytes into `B x B` blocks (zero
//! padded on the right/bottom edges when `width`/`height` are not
//! multiples of `B`), and reverses that split, cropping the padding back
//! off, to recover the original grid.

/// Number of `B`-wide/tall blocks needed to cover `extent`, rounding up.
///
/// Divides first and only then accounts for the remainder, rather than
/// adding `b - 1` before dividing, so an `extent` near `u32::MAX` (as can
/// reach here from an untrusted container header) can't overflow.
fn block_count(extent: u32, b: u8) -> u32 {
    let b = b as u32;
    extent / b + if extent % b != 0 { 1 } else { 0 }
}

/// `(blocks_wide, blocks_high)` for a `width x height` grid split into
/// `B x B` blocks.
pub fn block_grid(width: u32, height: u32, b: u8) -> (u32, u32) {
    (block_count(width, b), block_count(height, b))
}

/// Split a `width x height` byte grid into `B x B` blocks.
///
/// The result is a flat buffer of `blocks_wide * blocks_high * B * B`
/// bytes: block-major in row-major grid order, and row-major within
/// each block. Positions past the right or bottom edge of the source
/// image are filled with zero.
pub fn split(input: &[u8], width: u32, height: u32, b: u8) -> Vec<u8> {
    debug_assert_eq!(input.len(), (width as usize) * (height as usize));

    let (bw, bh) = block_grid(width, height, b);
    let bdim = b as u32;
    let mut out = vec![0u8; (bw * bh * bdim * bdim) as usize];

    for block_row in 0..bh {
        for block_col in 0..bw {
            let block_index = (block_row * bw + block_col) as usize;
            let block_out = &mut out[block_index * (bdim * bdim) as usize..][..(bdim * bdim) as usize];

            for r in 0..bdim {
                let src_y = block_row * bdim + r;
                if src_y >= height {
                    break;
                }
                for c in 0..bdim {
                    let src_x = block_col * bdim + c;
                    if src_x >= width {
                        break;
                    }
                    let src_index = (src_y * width + src_x) as usize;
                    block_out[(r * bdim + c) as usize] = input[src_index];
                }
            }
        }
    }

    out
}

/// Inverse of [`split`]: reassemble block-ordered bytes into a
/// `width x height` grid, dropping the padding introduced by `split`.
pub fn flatten_and_crop(blocks: &[u8], b: u8, width: u32, height: u32) -> Vec<u8> {
    let (bw, bh) = block_grid(width, height, b);
    let bdim = b as u32;
    debug_assert_eq!(blocks.len(), (bw * bh * bdim * bdim) as usize);

    let mut out = vec![0u8; (width as usize) * (height as usize)];

    for block_row in 0..bh {
        for block_col in 0..bw {
            let block_index = (block_row * bw + block_col) as usize;
            let block_in = &blocks[block_index * (bdim * bdim) as usize..][..(bdim * bdim) as usize];

            for r in 0..bdim {
                let dst_y = block_row * bdim + r;
                if dst_y >= height {
                    break;
                }
                for c in 0..bdim {
                    let dst_x = block_col * bdim + c;
                    if dst_x >= width {
                        break;
                    }
                    let dst_index = (dst_y * width + dst_x) as usize;
                    out[dst_index] = block_in[(r * bdim + c) as usize];
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_multiple_round_trips() {
        let width = 16;
        let height = 16;
        let image: Vec<u8> = (0..width * height).map(|i| (i % 256) as u8).collect();

        let blocks = split(&image, width, height, 8);
        assert_eq!(blocks.len(), (width * height) as usize);

        let restored = flatten_and_crop(&blocks, 8, width, height);
        assert_eq!(restored, image);
    }

    #[test]
    fn odd_dimensions_round_trip() {
        for (width, height) in [(5, 5), (1, 1), (9, 4), (4, 9), (13, 7)] {
            let image: Vec<u8> = (0..width * height).map(|i| ((i * 7 + 3) % 256) as u8).collect();

            let blocks = split(&image, width, height, 4);
            let (bw, bh) = block_grid(width, height, 4);
            assert_eq!(blocks.len(), (bw * bh * 16) as usize);

            let restored = flatten_and_crop(&blocks, 4, width, height);
            assert_eq!(restored, image, "mismatch for {width}x{height}");
        }
    }

    #[test]
    fn block_count_does_not_overflow_near_u32_max() {
        assert_eq!(block_count(u32::MAX, 8), u32::MAX / 8 + 1);
        assert_eq!(block_count(u32::MAX, 1), u32::MAX);
    }

    #[test]
    fn padding_positions_are_zero() {
        // 5x5 image split into 4x4 blocks pads a whole row/column of
        // zeros into the second block row/column.
        let width = 5;
        let height = 5;
        let image = vec![0xFFu8; (width * height) as usize];

        let blocks = split(&image, width, height, 4);
        let (bw, _bh) = block_grid(width, height, 4);

        // Block (0,1) (second block column, first row) pads column 1
        // of its 4x4 tile with zero since only x=4 is real data.
        let block_index = 1usize; // block_row=0, block_col=1
        let block = &blocks[block_index * 16..][..16];
        for r in 0..4 {
            // column 0 of this block is real source data (x=4), rest is padding
            assert_eq!(block[r * 4], 0xFF);
            for c in 1..4 {
                assert_eq!(block[r * 4 + c], 0, "expected padding at block col {c}");
            }
        }
        let _ = bw;
    }
}
