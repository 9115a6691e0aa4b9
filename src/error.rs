//! Error types for radix-rs.

use thiserror::Error;

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when a key cannot be used with the tree.
///
/// A missing key or an empty key is not an error: those report `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("byte 0x{byte:02x} at offset {offset} is outside the key alphabet")]
    OutOfAlphabet { byte: u8, offset: usize },

    #[error("key of {len} bytes exceeds the maximum of {max}")]
    KeyTooLong { len: usize, max: usize },
}
