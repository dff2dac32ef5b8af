//! Block-structured Rice codec for byte-valued residuals, with a
//! 32-way parallel decoder.
//!
//! The pipeline, in encode order: [`reshape`] (A) splits an image into
//! `B x B` blocks, [`predictor`] (B) delta-codes and zig-zag-maps each
//! block in place, [`kselect`] (C) picks each block's optimal Rice
//! parameter, [`bitstream::writer`] (D) Rice-encodes symbols with a
//! 16-bit escape hatch, [`interleave`] (E) rearranges blocks into 32
//! independent lanes, and [`bitstream::reader`]/[`decoder`] (F, G) read
//! them back, either sequentially or in parallel. [`container`] wires
//! the whole pipeline into the on-disk container format.

pub mod bitstream;
pub mod container;
pub mod decoder;
pub mod error;
pub mod interleave;
pub mod kselect;
pub mod predictor;
pub mod reshape;
pub mod zigzag;

pub use container::{decode_block_symbols, decode_image, encode_bits, encode_image};
pub use error::{Error, HeaderError, ParameterError, Result};
pub use kselect::opt_rice_k;
