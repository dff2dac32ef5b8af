//! Shared per-symbol decode core used by both the sequential and
//! parallel forms of component G.
//!
//! The working register is the same "top `work_bits` bits of a `u32`"
//! representation [`crate::bitstream::reader::CachedBitReader::refill`]
//! fills; `leading_zeros` on its top 16 bits *is* the CLZ primitive spec
//! §4.G calls for (Rust's `u16::leading_zeros` compiles to the
//! corresponding hardware instruction where available), so no bit-by-bit
//! unary scan is needed.

use crate::bitstream::reader::{CacheWord, CachedBitReader};

/// The working register plus its valid-bit count, carried across
/// successive symbol decodes within one lane's half-block.
pub struct WorkReg {
    reg: u32,
    reg_n: u32,
}

impl WorkReg {
    pub fn new() -> Self {
        Self { reg: 0, reg_n: 0 }
    }

    fn ensure<C: CacheWord>(
        &mut self,
        reader: &mut CachedBitReader<C>,
        needed: u32,
        work_bits: u32,
    ) {
        debug_assert!(needed <= work_bits);
        if self.reg_n < needed {
            reader.refill(&mut self.reg, &mut self.reg_n);
        }
    }

    /// Peek the top 16 bits of the register (refilling first if needed)
    /// without consuming them.
    fn peek_top16<C: CacheWord>(&mut self, reader: &mut CachedBitReader<C>, work_bits: u32) -> u16 {
        self.ensure(reader, 16, work_bits);
        (self.reg >> 16) as u16
    }

    /// Consume and right-justify the top `width` bits of the register.
    fn take<C: CacheWord>(
        &mut self,
        reader: &mut CachedBitReader<C>,
        width: u32,
        work_bits: u32,
    ) -> u32 {
        if width == 0 {
            return 0;
        }
        self.ensure(reader, width, work_bits);
        let value = self.reg >> (32 - width);
        self.reg = self.reg.checked_shl(width).unwrap_or(0);
        self.reg_n -= width;
        value
    }
}

impl Default for WorkReg {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a single Rice-coded symbol from `reader`/`work` using
/// parameter `k`.
///
/// CLZ on the top 16 bits of the working register either yields the
/// unary quotient `q` directly, or — if all 16 bits were zero, meaning
/// no terminator fell inside the lookahead window — signals the escape
/// path: those 16 bits carry no terminator at all, and the symbol's high
/// `8-k` bits follow as a literal field instead.
pub fn decode_symbol<C: CacheWord>(
    reader: &mut CachedBitReader<C>,
    work: &mut WorkReg,
    k: u8,
    work_bits: u32,
) -> u8 {
    debug_assert!(k <= 7);

    let top16 = work.peek_top16(reader, work_bits);
    let clz = top16.leading_zeros();

    if clz == 16 {
        work.take(reader, 16, work_bits);
        let over_width = 8 - k as u32;
        let over = work.take(reader, over_width, work_bits);
        let suffix = work.take(reader, k as u32, work_bits);
        ((over << k) | suffix) as u8
    } else {
        let q = clz;
        work.take(reader, q + 1, work_bits);
        let suffix = work.take(reader, k as u32, work_bits);
        ((q << k) | suffix) as u8
    }
}

/// Decode just the unary prefix length of a single symbol — the
/// building block for
/// [`crate::decoder::sequential::decode_prefix_bits`]'s debugging view
/// of `k` quality — while still consuming (and discarding) that
/// symbol's suffix/over bits, so the reader is left at the next
/// symbol's boundary exactly as [`decode_symbol`] would leave it.
/// Returns the prefix length: `q` in the normal case, or `16` for an
/// escaped symbol.
pub fn decode_prefix_len<C: CacheWord>(
    reader: &mut CachedBitReader<C>,
    work: &mut WorkReg,
    k: u8,
    work_bits: u32,
) -> u8 {
    let top16 = work.peek_top16(reader, work_bits);
    let clz = top16.leading_zeros();

    if clz == 16 {
        work.take(reader, 16, work_bits);
        work.take(reader, 8 - k as u32, work_bits);
        work.take(reader, k as u32, work_bits);
        16
    } else {
        work.take(reader, clz + 1, work_bits);
        work.take(reader, k as u32, work_bits);
        clz as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::writer::{encode_symbol_joint, BitWriter, TAIL_PADDING_BYTES};

    fn decode_all(bytes: &[u8], k: u8, count: usize, work_bits: u32) -> Vec<u8> {
        let mut reader = CachedBitReader::<u64>::new(bytes, 0, work_bits);
        let mut work = WorkReg::new();
        (0..count)
            .map(|_| decode_symbol(&mut reader, &mut work, k, work_bits))
            .collect()
    }

    #[test]
    fn decodes_back_every_byte_value_at_every_k() {
        for k in 0..=7u8 {
            let symbols: Vec<u8> = (0..=255).collect();
            let mut writer = BitWriter::new();
            for &n in &symbols {
                encode_symbol_joint(&mut writer, n, k);
            }
            let bytes = writer.into_padded_bytes(TAIL_PADDING_BYTES);

            let decoded = decode_all(&bytes, k, symbols.len(), 32);
            assert_eq!(decoded, symbols, "round trip failed at k={k}");
        }
    }

    #[test]
    fn decodes_with_16_bit_working_register_too() {
        let symbols: Vec<u8> = (0..=255).collect();
        let k = 3u8;
        let mut writer = BitWriter::new();
        for &n in &symbols {
            encode_symbol_joint(&mut writer, n, k);
        }
        let bytes = writer.into_padded_bytes(TAIL_PADDING_BYTES);

        let mut reader = CachedBitReader::<u32>::new(&bytes, 0, 16);
        let mut work = WorkReg::new();
        let decoded: Vec<u8> = (0..symbols.len())
            .map(|_| decode_symbol(&mut reader, &mut work, k, 16))
            .collect();

        assert_eq!(decoded, symbols);
    }

    #[test]
    fn all_zero_block_decodes_symmetrically() {
        let symbols = vec![0u8; 64];
        let mut writer = BitWriter::new();
        for &n in &symbols {
            encode_symbol_joint(&mut writer, n, 0);
        }
        let bytes = writer.into_padded_bytes(TAIL_PADDING_BYTES);
        let decoded = decode_all(&bytes, 0, 64, 32);
        assert_eq!(decoded, symbols);
    }
}
