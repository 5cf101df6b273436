//! Errors in the library.
use std::path::PathBuf;
use thiserror::Error;

/// Errors in the library.
///
/// All of them are invariant violations rather than transient faults.
/// A training loop that receives one of these should stop.
#[derive(Error, Debug, PartialEq)]
pub enum ArcadeError {
    /// The raw frame buffer does not match the geometry reported by the emulator.
    #[error("Geometry mismatch: expected {expected} bytes, got {actual}")]
    GeometryMismatch {
        /// Number of bytes implied by the emulator geometry.
        expected: usize,
        /// Number of bytes actually provided.
        actual: usize,
    },

    /// The codec failed to compress a state.
    #[error("Compression error: {0}")]
    Compression(String),

    /// The codec failed to reproduce a state of the original length.
    #[error("Decompression error: expected {expected} bytes, got {actual}")]
    Decompression {
        /// Length of the original state.
        expected: usize,
        /// Number of bytes the codec produced (0 on codec failure).
        actual: usize,
    },

    /// Sampling was requested before two transitions were stored.
    #[error("Cannot sample from a replay buffer holding {len} transitions (at least 2 required)")]
    SamplingUnderflow {
        /// Number of stored transitions.
        len: usize,
    },

    /// A sub-range of a batch lies outside of it.
    #[error("Batch range error: offset {offset} + count {count} exceeds capacity {capacity}")]
    BatchRange {
        /// First item of the range.
        offset: usize,
        /// Number of items in the range.
        count: usize,
        /// Number of items the batch can hold.
        capacity: usize,
    },

    /// A caller-provided buffer has the wrong length.
    #[error("Buffer length error ({what}): expected {expected}, got {actual}")]
    BufferLength {
        /// Name of the buffer.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Provided length.
        actual: usize,
    },

    /// An action index outside of the minimal action set.
    #[error("Invalid action {action}: the game has {n_actions} actions")]
    InvalidAction {
        /// The requested index.
        action: usize,
        /// Size of the minimal action set.
        n_actions: usize,
    },

    /// The ROM image of a game was not found.
    #[error("ROM not found: {0:?}")]
    RomNotFound(PathBuf),
}
