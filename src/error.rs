/*
 * @file error.rs
 * @author The dump_index developers
 * @copyright 2026 The dump_index developers
 *
 * Recoverable errors.  Misuse of the structures themselves (adding to a
 * closed array, reading an unclosed one, out-of-range indices) panics;
 * these are only for configuration and the checked accessors.
 */

use thiserror::Error;

/** Errors reported by constructors and checked accessors. */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /** Block size exponent outside `0..=MAX_BLOCK_SIZE_LOG2`. */
    #[error("block size 2^{log2} is out of range (max 2^{max})")]
    InvalidBlockSize { log2: u32, max: u32 },

    /** Records must have at least one field. */
    #[error("record size {0} is invalid; records need at least one field")]
    InvalidRecordSize(usize),

    /** A cache must be able to hold at least one entry. */
    #[error("cache capacity must be nonzero")]
    ZeroCapacity,

    /** Record arrays can only be read after `close()`. */
    #[error("record array is still open for writing")]
    NotClosed,

    /** Record number past the end of the array. */
    #[error("record {index} out of bounds (len {len})")]
    RecordOutOfBounds { index: usize, len: usize },

    /** Output buffer does not match the record width. */
    #[error("record buffer has {actual} fields, expected {expected}")]
    RecordWidth { expected: usize, actual: usize },
}

/** Result type used throughout the crate. */
pub type Result<T> = std::result::Result<T, Error>;
