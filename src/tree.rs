use std::fmt;

use tracing::{debug, trace};

use crate::alphabet::{self, Rank};
use crate::iter::{Iter, Keys, Values};
use crate::node::{common_prefix_len, Entry, Node};
use crate::{Config, Error, Result};

/// Follow `$key` down from `$root`, picking children with `$get` (`get` or
/// `get_mut`). Evaluates to the node the key ends on, terminal or not.
macro_rules! descend {
    ($root:expr, $key:expr, $get:ident) => {{
        let mut node = $root;
        let mut rest: &[u8] = $key;
        loop {
            let Some(child) = node.children.$get(Rank::of_valid(rest[0])) else {
                break None;
            };
            let Some(tail) = rest.strip_prefix(&child.label[..]) else {
                break None;
            };
            if tail.is_empty() {
                break Some(child);
            }
            rest = tail;
            node = child;
        }
    }};
}

/// A compressed prefix tree mapping alphabet-restricted byte keys to values.
///
/// After every completed mutation the tree is maximally compressed: no
/// non-terminal node other than the root has fewer than two children, and no
/// two siblings share a leading byte.
pub struct RadixTree<V> {
    root: Node<V>,
    len: usize,
    config: Config,
}

impl<V> RadixTree<V> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            root: Node::root(),
            len: 0,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of stored keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.root = Node::root();
        self.len = 0;
    }

    #[inline]
    pub(crate) fn root(&self) -> &Node<V> {
        &self.root
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        if let Err(e) = alphabet::validate(key) {
            debug!(error = %e, "rejected key");
            return Err(e);
        }
        Ok(())
    }

    /// Insert `value` under `key`.
    ///
    /// Returns the previous value if the key was already present; the stored
    /// value is replaced. Inserting the empty key is a no-op that returns
    /// `Ok(None)` and drops `value`.
    pub fn insert(&mut self, key: impl AsRef<[u8]>, value: V) -> Result<Option<V>> {
        let key = key.as_ref();
        self.check_key(key)?;
        if let Some(max) = self.config.max_key_len {
            if key.len() > max {
                debug!(len = key.len(), max, "rejected overlong key");
                return Err(Error::KeyTooLong {
                    len: key.len(),
                    max,
                });
            }
        }
        if key.is_empty() {
            return Ok(None);
        }

        let old = Self::insert_below(&mut self.root, key, value);
        if old.is_none() {
            self.len += 1;
        }
        Ok(old)
    }

    /// Insert `key` (non-empty, validated) somewhere below `node`.
    fn insert_below(node: &mut Node<V>, key: &[u8], value: V) -> Option<V> {
        let mut node = node;
        let mut key = key;
        loop {
            let child = match node.children.entry(Rank::of_valid(key[0])) {
                Entry::Vacant(slot) => {
                    slot.insert(Box::new(Node::leaf(key, value)));
                    return None;
                }
                Entry::Occupied(child) => child,
            };

            // At least the leading byte matches, since the slot was selected by it.
            let common = common_prefix_len(&child.label, key);
            if common == child.label.len() {
                if common == key.len() {
                    return child.value.replace(value);
                }
            } else {
                trace!(
                    label = %String::from_utf8_lossy(&child.label),
                    at = common,
                    "split edge"
                );
                child.split_at(common);
                if common == key.len() {
                    // The key ends at the split point: the shortened node holds it.
                    child.value = Some(value);
                    return None;
                }
                // Genuine fork: the remainder starts with a byte the tail does not.
            }
            key = &key[common..];
            node = child;
        }
    }

    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<Option<&V>> {
        let key = key.as_ref();
        self.check_key(key)?;
        if key.is_empty() {
            return Ok(None);
        }
        Ok(descend!(&self.root, key, get).and_then(|node| node.value.as_ref()))
    }

    pub fn get_mut(&mut self, key: impl AsRef<[u8]>) -> Result<Option<&mut V>> {
        let key = key.as_ref();
        self.check_key(key)?;
        if key.is_empty() {
            return Ok(None);
        }
        Ok(descend!(&mut self.root, key, get_mut).and_then(|node| node.value.as_mut()))
    }

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove `key`, returning its value.
    ///
    /// Removing an absent key returns `Ok(None)` and leaves the tree untouched.
    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Result<Option<V>> {
        let key = key.as_ref();
        self.check_key(key)?;
        if key.is_empty() {
            return Ok(None);
        }

        let old = Self::remove_below(&mut self.root, key);
        if old.is_some() {
            self.len -= 1;
        }
        Ok(old)
    }

    fn remove_below(node: &mut Node<V>, key: &[u8]) -> Option<V> {
        let mut node = node;
        let mut rest = key;
        let mut at_root = true;
        loop {
            let rank = Rank::of_valid(rest[0]);
            let tail = rest.strip_prefix(&node.children.get(rank)?.label[..])?;
            if !tail.is_empty() {
                rest = tail;
                node = node.children.get_mut(rank)?;
                at_root = false;
                continue;
            }

            let child = node.children.get_mut(rank)?;
            let old = child.value.take()?;
            match child.children.len() {
                0 => {
                    trace!(label = %String::from_utf8_lossy(&child.label), "detach leaf");
                    node.children.detach(rank);
                    // Only the parent of a detached leaf can be left as a
                    // pass-through; merging it keeps every ancestor's child count.
                    if !at_root && !node.is_terminal() && node.children.len() == 1 {
                        Self::merge(node);
                    }
                }
                1 => Self::merge(child),
                // Still a branch point.
                _ => {}
            }
            return Some(old);
        }
    }

    fn merge(node: &mut Node<V>) {
        trace!(label = %String::from_utf8_lossy(&node.label), "merge only child");
        node.absorb_only_child();
    }

    /// Call `f` with every stored key and its value, in ascending rank order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&[u8], &V),
    {
        let mut iter = self.iter();
        while let Some((key, value)) = iter.next_ref() {
            f(key, value);
        }
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.root)
    }

    pub fn keys(&self) -> Keys<'_, V> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_, V> {
        Values::new(self.iter())
    }
}

impl<V> Default for RadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for RadixTree<V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
            config: self.config.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for RadixTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.iter()
                    .map(|(k, v)| (String::from_utf8_lossy(&k).into_owned(), v)),
            )
            .finish()
    }
}

impl<'a, V> IntoIterator for &'a RadixTree<V> {
    type Item = (Vec<u8>, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
