//! Crate-wide error type.

use thiserror::Error;

/// Errors produced while decoding a Rice-coded image container.
///
/// Every decode entry point validates header and table sizes against
/// `Error`'s `MalformedHeader`/`InvalidParameter`/`TruncatedStream`
/// variants before allocating any output; once past that point, the hot
/// decode loop is infallible because its preconditions are statically
/// guaranteed by the validation pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Width, height, or block dimension is inconsistent with the sizes
    /// of the tables or bit buffer that follow the header.
    #[error("malformed header: {0}")]
    MalformedHeader(#[from] HeaderError),

    /// The bit buffer is missing its trailing zero-padding word, so the
    /// cached bit reader's read-ahead window could run past the end of
    /// the buffer.
    #[error("truncated bit stream: expected at least {expected} bytes, found {actual}")]
    TruncatedStream {
        /// Minimum byte length required, including tail padding.
        expected: usize,
        /// Actual byte length supplied.
        actual: usize,
    },

    /// A parameter fell outside the range the format allows.
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),
}

/// Specific ways a container header can fail to match its payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// `width * height` does not match the number of symbols implied by
    /// the block table.
    #[error("width {width} x height {height} does not match {num_symbols} encoded symbols")]
    SizeMismatch {
        width: u32,
        height: u32,
        num_symbols: usize,
    },

    /// The `k` table's length is not `Nblocks + 1`.
    #[error("k table has length {actual}, expected {expected} (Nblocks + 1 sentinel)")]
    KTableLength { expected: usize, actual: usize },

    /// `flags.bit0` selects the split (prefix/suffix separate) layout,
    /// which this implementation never produces and cannot decode.
    #[error("split bit-stream layout (flags.bit0) is not supported by this decoder")]
    UnsupportedLayout,
}

/// Specific out-of-range parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    /// `k` must be in `[0,7]`.
    #[error("rice parameter k={0} is outside the valid range [0,7]")]
    BadK(u8),

    /// The block dimension must be one of the supported sizes.
    #[error("block dimension {0} is not one of the supported sizes {{4, 8}}")]
    BadBlockDim(u8),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
