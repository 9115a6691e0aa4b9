//! The fixed key alphabet.
//!
//! Keys may only contain the ten ASCII digits, the 26 lowercase ASCII letters
//! and fourteen punctuation symbols. Each permitted byte has a dense rank in
//! `0..ALPHABET_SIZE`, which is the child slot it selects in every node.

use std::fmt;

use crate::{Error, Result};

/// Number of permitted key bytes.
pub const ALPHABET_SIZE: usize = 50;

/// Permitted bytes, in rank order.
pub const SYMBOLS: &[u8; ALPHABET_SIZE] = b"0123456789abcdefghijklmnopqrstuvwxyz:+-_.|/\\()[]{}";

const NO_RANK: u8 = u8::MAX;

const RANKS: [u8; 256] = build_ranks();

const fn build_ranks() -> [u8; 256] {
    let mut ranks = [NO_RANK; 256];
    let mut i = 0;
    while i < ALPHABET_SIZE {
        ranks[SYMBOLS[i] as usize] = i as u8;
        i += 1;
    }
    ranks
}

/// Dense index of a permitted byte.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(u8);

impl Rank {
    /// Rank with the given index, if it is below [`ALPHABET_SIZE`].
    #[inline]
    pub fn new(index: usize) -> Option<Self> {
        (index < ALPHABET_SIZE).then_some(Rank(index as u8))
    }

    /// Rank of `byte`, or `None` if the byte is not in the alphabet.
    #[inline]
    pub fn of(byte: u8) -> Option<Self> {
        match RANKS[byte as usize] {
            NO_RANK => None,
            r => Some(Rank(r)),
        }
    }

    /// Rank of a byte that has already been checked against the alphabet.
    #[inline]
    pub(crate) fn of_valid(byte: u8) -> Self {
        debug_assert!(contains(byte), "unchecked byte 0x{byte:02x}");
        Rank(RANKS[byte as usize])
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn byte(self) -> u8 {
        SYMBOLS[self.index()]
    }
}

impl fmt::Debug for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rank({}, {:?})", self.0, self.byte() as char)
    }
}

#[inline]
pub fn rank_of(byte: u8) -> Option<Rank> {
    Rank::of(byte)
}

#[inline]
pub fn byte_of(rank: Rank) -> u8 {
    rank.byte()
}

#[inline]
pub fn contains(byte: u8) -> bool {
    RANKS[byte as usize] != NO_RANK
}

/// Check that every byte of `key` is in the alphabet.
///
/// Reports the first offending byte and its offset.
pub fn validate(key: &[u8]) -> Result<()> {
    match key.iter().position(|&b| !contains(b)) {
        Some(offset) => Err(Error::OutOfAlphabet {
            byte: key[offset],
            offset,
        }),
        None => Ok(()),
    }
}

/// Every rank, ascending.
pub fn ranks() -> impl DoubleEndedIterator<Item = Rank> + ExactSizeIterator {
    (0..ALPHABET_SIZE as u8).map(Rank)
}
