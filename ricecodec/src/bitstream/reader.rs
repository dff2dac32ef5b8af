//! Component F: the cached bit reader, and a naive scalar reader used
//! as its reference implementation in tests.
//!
//! [`CachedBitReader`] is generic over the cache word width (`u32` or
//! `u64`, per spec §9's design note resolving the two legacy C++
//! variants in favor of the parametrised form) the same way
//! `h263-rs`'s `traits::BitReadable` generalizes bit-reading over
//! register width with `num-traits`. It keeps two cache-word registers,
//! `c1`/`c2`, and refills a caller-chosen working register width (16 or
//! 32 bits, stored left-aligned in the top bits of a `u32`) from them,
//! directly modeling `original_source/Shared/CachedBits.hpp`.

use num_traits::PrimInt;

/// A fixed-width unsigned word a [`CachedBitReader`] can use as its
/// cache register. Implemented for `u32` and `u64` — the two concrete
/// specializations spec §9 calls out ("reader32", "reader64").
pub trait CacheWord: PrimInt {
    /// Width of this word in bits (32 or 64).
    const BITS: u32;

    /// Interpret the first `Self::BITS / 8` bytes of `bytes` as a
    /// big-endian word (so the first bit read is the MSB of the first
    /// byte, matching the writer's MSB-first packing). Missing bytes at
    /// the end of the underlying buffer are treated as zero — the
    /// padded tail the format mandates should make this unreachable in
    /// practice, but it keeps the reader panic-free on malformed input.
    fn read_be(bytes: &[u8]) -> Self;

    fn to_u64_bits(self) -> u64;
    fn from_u64_bits(v: u64) -> Self;

    /// Left shift that yields zero when `amount >= Self::BITS`, instead
    /// of Rust's panicking (debug) / masking (release) behavior for an
    /// out-of-range shift. Mirrors `CachedBits.hpp`'s `zerodShiftLeft`.
    fn zerod_shl(self, amount: u32) -> Self {
        if amount >= Self::BITS {
            Self::zero()
        } else {
            self.unsigned_shl(amount)
        }
    }
}

impl CacheWord for u32 {
    const BITS: u32 = 32;

    fn read_be(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 4];
        let n = bytes.len().min(4);
        buf[..n].copy_from_slice(&bytes[..n]);
        u32::from_be_bytes(buf)
    }

    fn to_u64_bits(self) -> u64 {
        self as u64
    }

    fn from_u64_bits(v: u64) -> Self {
        v as u32
    }
}

impl CacheWord for u64 {
    const BITS: u32 = 64;

    fn read_be(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 8];
        let n = bytes.len().min(8);
        buf[..n].copy_from_slice(&bytes[..n]);
        u64::from_be_bytes(buf)
    }

    fn to_u64_bits(self) -> u64 {
        self
    }

    fn from_u64_bits(v: u64) -> Self {
        v
    }
}

/// Two-register lookahead bit reader.
///
/// The working register is always stored as a `u32` with its `work_bits`
/// logical bits left-aligned at the top (bits `31..=32-work_bits`); the
/// unused low bits, when `work_bits == 16`, are always zero. This lets
/// the escape check ("top 16 bits of the working register") be the same
/// `(reg >> 16) as u16` expression regardless of whether the logical
/// register width is 16 or 32.
pub struct CachedBitReader<'a, C: CacheWord> {
    data: &'a [u8],
    word_bytes: usize,
    next_word_index: usize,
    c1: C,
    c2: C,
    n1: u32,
    n2: u32,
    work_bits: u32,
}

impl<'a, C: CacheWord> CachedBitReader<'a, C> {
    /// Initialize a reader over `data`, starting `skip_bits` into the
    /// stream, with a working register of `work_bits` bits (16 or 32).
    pub fn new(data: &'a [u8], skip_bits: u64, work_bits: u32) -> Self {
        debug_assert!(work_bits == 16 || work_bits == 32);
        debug_assert!(work_bits <= C::BITS);

        let word_bytes = (C::BITS / 8) as usize;
        let num_cached_units = (skip_bits / C::BITS as u64) as usize;
        let bits_over = (skip_bits % C::BITS as u64) as u32;

        let mut reader = Self {
            data,
            word_bytes,
            next_word_index: num_cached_units,
            c1: C::zero(),
            c2: C::zero(),
            n1: 0,
            n2: 0,
            work_bits,
        };

        reader.c1 = reader.read_word();
        reader.n1 = C::BITS;
        reader.c2 = reader.read_word();
        reader.n2 = C::BITS;

        if bits_over > 0 {
            reader.c1 = reader.c1.zerod_shl(bits_over);
            reader.n1 -= bits_over;
        }

        reader
    }

    fn read_word(&mut self) -> C {
        let start = self.next_word_index * self.word_bytes;
        self.next_word_index += 1;
        if start >= self.data.len() {
            return C::zero();
        }
        let end = (start + self.word_bytes).min(self.data.len());
        C::read_be(&self.data[start..end])
    }

    /// Top `width` bits of `c1` (`width <= n1` must already hold),
    /// right-justified into a `u64`.
    fn take_from_c1(&mut self, width: u32) -> u64 {
        let shift = C::BITS - width;
        let bits = self.c1.to_u64_bits() >> shift;
        self.c1 = self.c1.zerod_shl(width);
        self.n1 -= width;
        bits
    }

    fn promote_c2(&mut self) {
        self.c1 = self.c2;
        self.n1 = C::BITS;
        self.c2 = self.read_word();
        self.n2 = C::BITS;
    }

    /// Refill `reg`/`reg_n` up to a full `work_bits`-bit register.
    ///
    /// `reg` stores its `reg_n` valid bits left-aligned at the top of
    /// the `u32` (i.e. in bits `31..=32-reg_n`); this call appends more
    /// bits immediately after those, until `reg_n == work_bits`.
    pub fn refill(&mut self, reg: &mut u32, reg_n: &mut u32) {
        let dst_full = self.work_bits;
        debug_assert!(*reg_n < dst_full);

        let mut needed = dst_full - *reg_n;

        if needed <= self.n1 {
            let bits = self.take_from_c1(needed);
            let shift = 32 - *reg_n - needed;
            *reg |= (bits as u32) << shift;
            *reg_n += needed;

            if self.n1 == 0 {
                self.promote_c2();
            }
        } else {
            let from_c1 = self.n1;
            if from_c1 > 0 {
                let bits = self.take_from_c1(from_c1);
                let shift = 32 - *reg_n - from_c1;
                *reg |= (bits as u32) << shift;
                *reg_n += from_c1;
                needed -= from_c1;
            }

            self.promote_c2();

            debug_assert!(self.n1 >= needed);
            let bits = self.take_from_c1(needed);
            let shift = 32 - *reg_n - needed;
            *reg |= (bits as u32) << shift;
            *reg_n += needed;
        }

        debug_assert_eq!(*reg_n, dst_full);
    }
}

/// A naive, unbuffered bit reader used only as a reference
/// implementation in tests: it reads one bit at a time directly from
/// the byte buffer with no lookahead cache. Spec testable property #7
/// requires [`CachedBitReader`] to expose the same next bit as this
/// reader initialized at the same position.
pub struct ScalarBitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> ScalarBitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    pub fn with_skip(data: &'a [u8], skip_bits: usize) -> Self {
        Self {
            data,
            bit_pos: skip_bits,
        }
    }

    pub fn read_bit(&mut self) -> u8 {
        let byte = self.data[self.bit_pos / 8];
        let bit = (byte >> (7 - (self.bit_pos % 8))) & 1;
        self.bit_pos += 1;
        bit
    }

    pub fn read_bits(&mut self, width: u32) -> u32 {
        let mut v = 0u32;
        for _ in 0..width {
            v = (v << 1) | self.read_bit() as u32;
        }
        v
    }
}
