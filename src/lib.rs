//! # radix-rs
//!
//! A compressed prefix tree (radix / PATRICIA trie) over keys drawn from a
//! small fixed alphabet: ASCII digits, lowercase ASCII letters and the
//! punctuation `: + - _ . | / \ ( ) [ ] { }`.
//!
//! Edges carry multi-byte labels and every node indexes its children by the
//! alphabet rank of their first byte, so a lookup is one array access per
//! edge plus a label comparison.
//!
//! ## Example
//!
//! ```rust
//! use radix_rs::RadixTree;
//!
//! let mut tree: RadixTree<u64> = RadixTree::new();
//! tree.insert("banana", 1)?;
//! tree.insert("ban{ana", 2)?;
//!
//! assert_eq!(tree.get("banana")?, Some(&1));
//! assert_eq!(tree.get("ban")?, None);
//! assert!(tree.insert("Banana", 3).is_err());
//! # Ok::<(), radix_rs::Error>(())
//! ```

#![deny(unsafe_code)]

pub mod alphabet;
mod debug;
mod error;
mod iter;
mod node;
mod tree;

pub use debug::TreeStats;
pub use error::{Error, Result};
pub use iter::{Iter, Keys, Values};
pub use tree::RadixTree;

/// Advertised maximum key length.
///
/// Only enforced by trees built with [`Config::strict`].
pub const MAX_KEY_LEN: usize = 32;

/// Configuration for a [`RadixTree`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Reject insertions of keys longer than this. `None` accepts any length.
    pub max_key_len: Option<usize>,
}

impl Config {
    /// Enforce [`MAX_KEY_LEN`] on insertion.
    pub fn strict() -> Self {
        Self {
            max_key_len: Some(MAX_KEY_LEN),
        }
    }
}

#[cfg(test)]
mod proptests;
