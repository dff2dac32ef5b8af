//! Component C: per-block optimal Rice parameter selection.

/// Highest Rice parameter this format supports.
pub const MAX_K: u8 = 7;

/// Number of consecutive `U1` (zero) prefix bits that triggers the
/// escape path rather than a plain unary terminator.
pub const ESCAPE_UNARY_LEN: u32 = 16;

/// Bit cost of encoding symbol `n` with Rice parameter `k`.
///
/// `q = n >> k` is the unary quotient; its encoded length is `q + 1`
/// (the run of zeros plus its terminating one bit). If that would
/// exceed [`ESCAPE_UNARY_LEN`], the symbol instead escapes: 16 zero
/// bits, no terminator, followed by the `8-k` high bits of `n` and the
/// `k` low bits, for a fixed cost of `16 + 8`.
pub fn bits_cost(n: u8, k: u8) -> u32 {
    debug_assert!(k <= MAX_K);
    let q = (n >> k) as u32;
    if q + 1 > ESCAPE_UNARY_LEN {
        ESCAPE_UNARY_LEN + 8
    } else {
        (q + 1) + k as u32
    }
}

/// Total bit cost of encoding every symbol in `block` with parameter `k`.
pub fn block_cost(block: &[u8], k: u8) -> u64 {
    block.iter().map(|&n| bits_cost(n, k) as u64).sum()
}

/// Choose the Rice parameter in `[0, 7]` that minimizes the total
/// encoded bit count for `block`. Ties favor the smaller `k`.
pub fn optimal_k(block: &[u8]) -> u8 {
    (0..=MAX_K)
        .map(|k| (k, block_cost(block, k)))
        .min_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(k, _)| k)
        .unwrap_or(0)
}

/// Build the per-block `k` table for a whole image already split into
/// block order (see [`crate::reshape::split`] then
/// [`crate::predictor::predict_block`]).
///
/// Returns a table of length `num_blocks + 1`, the trailing byte always
/// `0` as the sentinel spec §3 requires.
pub fn opt_rice_k(block_order_symbols: &[u8], block_len: usize) -> Vec<u8> {
    debug_assert_eq!(block_order_symbols.len() % block_len, 0);
    let num_blocks = block_order_symbols.len() / block_len;

    let mut table = Vec::with_capacity(num_blocks + 1);
    for block in block_order_symbols.chunks_exact(block_len) {
        table.push(optimal_k(block));
    }
    table.push(0);
    table
}
