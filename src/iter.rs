//! Pre-order iteration over stored keys.

use crate::node::Node;

/// Iterator over `(key, &value)` pairs in ascending rank order.
///
/// Keys are rebuilt from the edge labels on the way down, so each item owns
/// its key bytes.
pub struct Iter<'a, V> {
    /// Pending nodes, each with the key length of its parent.
    stack: Vec<(&'a Node<V>, usize)>,
    key: Vec<u8>,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(root: &'a Node<V>) -> Self {
        let mut stack = Vec::new();
        for (_, child) in root.children.iter().rev() {
            stack.push((child, 0));
        }
        Self {
            stack,
            key: Vec::new(),
        }
    }
}

impl<'a, V> Iter<'a, V> {
    /// Advance to the next stored key without copying it out of the buffer.
    pub(crate) fn next_ref(&mut self) -> Option<(&[u8], &'a V)> {
        while let Some((node, depth)) = self.stack.pop() {
            self.key.truncate(depth);
            self.key.extend_from_slice(&node.label);

            let depth = self.key.len();
            for (_, child) in node.children.iter().rev() {
                self.stack.push((child, depth));
            }

            if let Some(value) = &node.value {
                return Some((self.key.as_slice(), value));
            }
        }
        None
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Vec<u8>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_ref().map(|(key, value)| (key.to_vec(), value))
    }
}

pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Keys<'a, V> {
    pub(crate) fn new(inner: Iter<'a, V>) -> Self {
        Self { inner }
    }
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Values<'a, V> {
    pub(crate) fn new(inner: Iter<'a, V>) -> Self {
        Self { inner }
    }
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}
