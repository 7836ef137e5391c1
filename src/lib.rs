//! SALZ: suffix-array based LZ compression.
//!
//! Factorization is exact and global per block: a suffix array plus
//! PSV/NSV candidate selection yields the best previous occurrence on
//! each lexicographic side of every position, and a backward
//! shortest-path pass over bit-accurate code lengths picks the cheapest
//! parse. The bitstream mixes Golomb-Rice and variable-nibble codes with
//! raw bytes, laid out for single-pass decoding.
//!
//! Entry points: [`block::encode_block`] / [`block::decode_block`] for a
//! single block, [`container::compress`] / [`container::decompress`] for
//! a multi-block stream.

pub mod bitstream;
pub mod block;
pub mod container;
pub mod suffix_array;
pub mod vlc;

mod factor;
mod optimal;

#[cfg(test)]
mod validation;

use thiserror::Error;

/// Error types for salz operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SalzError {
    /// Input block is shorter than the 9-byte minimum.
    #[error("input block too small")]
    InputTooSmall,
    /// Input block cannot be represented in the 24-bit header length field.
    #[error("input block too large")]
    InputTooLarge,
    /// Output buffer is too small to hold the result.
    #[error("output buffer too small")]
    OutputTooSmall,
    /// The suffix sorter rejected its input.
    #[error("suffix sorting failed")]
    SortFailed,
    /// Encoded input is invalid or corrupt.
    #[error("malformed input")]
    Malformed,
}

pub type SalzResult<T> = Result<T, SalzError>;
