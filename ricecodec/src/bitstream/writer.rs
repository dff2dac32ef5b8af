//! Component D (encode side): split/escape Rice coding, joint
//! prefix+suffix layout only (the layout this crate's container and
//! interleaver actually produce and decode).
//!
//! The prefix is a run of `U1` (zero) bits terminated by a `U2` (one)
//! bit, except past the escape boundary: 16 consecutive `U1` bits with
//! no terminator signal that the symbol's high `8-k` bits follow
//! literally, then its low `k` bits as usual. Because `q = n >> k`
//! always fits within `8-k` bits for an 8-bit symbol, the escape's
//! "over" field is simply `q` written at a fixed width instead of in
//! unary.

use crate::kselect::ESCAPE_UNARY_LEN;

/// An MSB-first bit sink backed by a growable byte buffer.
///
/// Bits are packed into bytes most-significant-bit first, matching
/// `original_source/Shared/byte_bit_stream.hpp`'s packing convention.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    bytes: Vec<u8>,
    /// Number of bits already used in the last byte of `bytes` (0 means
    /// the buffer is empty or the last byte is full).
    bit_pos: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of real bits written so far (excludes any padding).
    pub fn len_bits(&self) -> usize {
        if self.bit_pos == 0 {
            self.bytes.len() * 8
        } else {
            (self.bytes.len() - 1) * 8 + self.bit_pos as usize
        }
    }

    /// Push a single bit (0 or 1).
    pub fn push_bit(&mut self, bit: u8) {
        debug_assert!(bit == 0 || bit == 1);
        if self.bit_pos == 0 {
            self.bytes.push(0);
        }
        let last = self.bytes.last_mut().expect("byte just pushed");
        *last |= bit << (7 - self.bit_pos);
        self.bit_pos = (self.bit_pos + 1) % 8;
    }

    /// Push the low `width` bits of `value`, most-significant bit first.
    pub fn push_bits_msb(&mut self, value: u32, width: u32) {
        for i in (0..width).rev() {
            self.push_bit(((value >> i) & 1) as u8);
        }
    }

    /// Pad with `U1` (zero) bits up to the next byte boundary. These
    /// padding bits are never counted as part of `numEncodedBits`.
    pub fn pad_to_byte(&mut self) {
        if self.bit_pos != 0 {
            while self.bit_pos != 0 {
                self.push_bit(0);
            }
        }
    }

    /// Append another writer's real bits (ignoring any padding it may
    /// already have accumulated — callers should only call this before
    /// padding either writer) onto the end of this one, bit-exactly.
    pub fn append_bits_from(&mut self, other: &BitWriter) {
        let mut remaining = other.len_bits();
        let mut byte_index = 0usize;
        while remaining > 0 {
            let byte = other.bytes[byte_index];
            let bits_in_byte = remaining.min(8);
            for i in 0..bits_in_byte {
                self.push_bit((byte >> (7 - i)) & 1);
            }
            remaining -= bits_in_byte;
            byte_index += 1;
        }
    }

    /// Consume the writer, byte-aligning and appending `tail_bytes` of
    /// zero padding so a cached reader's lookahead window never reads
    /// past the end of the buffer.
    pub fn into_padded_bytes(mut self, tail_bytes: usize) -> Vec<u8> {
        self.pad_to_byte();
        self.bytes.resize(self.bytes.len() + tail_bytes, 0);
        self.bytes
    }
}

/// Bytes of trailing zero padding appended after byte-alignment.
pub const TAIL_PADDING_BYTES: usize = 4;

/// Encode one symbol's *prefix* (unary run, or 16-bit escape plus its
/// literal "over" bits) into `prefix`.
///
/// Returns whether this symbol took the escape path, which the caller
/// must also pass to [`encode_suffix`].
pub fn encode_prefix(prefix: &mut BitWriter, n: u8, k: u8) -> bool {
    debug_assert!(k <= 7);
    let q = (n >> k) as u32;

    if q + 1 <= ESCAPE_UNARY_LEN {
        for _ in 0..q {
            prefix.push_bit(0);
        }
        prefix.push_bit(1);
        false
    } else {
        for _ in 0..ESCAPE_UNARY_LEN {
            prefix.push_bit(0);
        }
        let over_width = 8 - k as u32;
        if over_width > 0 {
            // q fits in `8-k` bits exactly: n is 8 bits wide and q = n >> k.
            prefix.push_bits_msb(q, over_width);
        }
        true
    }
}

/// Encode one symbol's fixed-width `k`-bit suffix into `suffix`.
///
/// `is_escape` only affects nothing here (the escape's over bits were
/// already written to the prefix stream by [`encode_prefix`]); it is
/// accepted for symmetry with the decode side's branch structure.
pub fn encode_suffix(suffix: &mut BitWriter, n: u8, k: u8, is_escape: bool) {
    let _ = is_escape;
    if k > 0 {
        let mask = (1u32 << k) - 1;
        suffix.push_bits_msb(n as u32 & mask, k as u32);
    }
}

/// Encode a single symbol into one joint prefix+suffix stream
/// (the "single stream" output variant).
pub fn encode_symbol_joint(out: &mut BitWriter, n: u8, k: u8) {
    let escape = encode_prefix(out, n, k);
    encode_suffix(out, n, k, escape);
}

/// Encode an entire block's symbols into one joint stream.
pub fn encode_block_joint(out: &mut BitWriter, block: &[u8], k: u8) {
    for &n in block {
        encode_symbol_joint(out, n, k);
    }
}
