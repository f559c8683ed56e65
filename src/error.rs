//! Error types for psltab.

use thiserror::Error;

/// Error type for snapshot and accelerator operations.
///
/// The query path itself never returns errors; invalid or non-matching
/// inputs yield empty strings or `false`.
#[derive(Error, Debug)]
pub enum Error {
    /// Snapshot magic does not match the current table layout
    #[error("invalid snapshot magic: expected {expected}, got {actual}")]
    SelfieMagic { expected: u32, actual: u32 },

    /// Snapshot is too short to hold a table
    #[error("truncated snapshot: {0} bytes")]
    SelfieTruncated(usize),

    /// Accelerator backend could not be acquired
    #[error("accelerator unavailable: {0}")]
    AcceleratorUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for psltab operations.
pub type Result<T> = std::result::Result<T, Error>;
