//! Tree node: one edge-compressed segment of a key.

use std::mem;

use smallvec::SmallVec;

use crate::alphabet::{Rank, ALPHABET_SIZE};

/// Labels up to this length are stored inline in the node.
const INLINE_LABEL: usize = 16;

pub(crate) type Label = SmallVec<[u8; INLINE_LABEL]>;

type Slots<V> = [Option<Box<Node<V>>>; ALPHABET_SIZE];

fn empty_slots<V>() -> Box<Slots<V>> {
    Box::new(std::array::from_fn(|_| None))
}

/// Child references indexed by the rank of each child's first label byte.
///
/// The slot array is only allocated once the first child is attached, so
/// leaves carry no slot storage.
pub(crate) struct Children<V> {
    slots: Option<Box<Slots<V>>>,
    len: u8,
}

impl<V> Children<V> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn get(&self, rank: Rank) -> Option<&Node<V>> {
        self.slots.as_ref()?[rank.index()].as_deref()
    }

    #[inline]
    pub fn get_mut(&mut self, rank: Rank) -> Option<&mut Node<V>> {
        self.slots.as_mut()?[rank.index()].as_deref_mut()
    }

    /// Put `child` into slot `rank`.
    ///
    /// # Panics
    ///
    /// Panics if the slot is already occupied.
    pub fn attach(&mut self, rank: Rank, child: Box<Node<V>>) {
        debug_assert_eq!(child.label.first().copied(), Some(rank.byte()));
        let slots = self.slots.get_or_insert_with(empty_slots);
        let slot = &mut slots[rank.index()];
        assert!(slot.is_none(), "slot {rank:?} already occupied");
        *slot = Some(child);
        self.len += 1;
    }

    /// The slot for `rank`, either holding a child or free to receive one.
    pub fn entry(&mut self, rank: Rank) -> Entry<'_, V> {
        let len = &mut self.len;
        let slots = self.slots.get_or_insert_with(empty_slots);
        let slot = &mut slots[rank.index()];
        match slot {
            Some(child) => Entry::Occupied(&mut **child),
            None => Entry::Vacant(VacantEntry { slot, len, rank }),
        }
    }

    pub fn detach(&mut self, rank: Rank) -> Option<Box<Node<V>>> {
        let slots = self.slots.as_mut()?;
        let child = slots[rank.index()].take()?;
        self.len -= 1;
        if self.len == 0 {
            self.slots = None;
        }
        Some(child)
    }

    /// Remove and return the sole child. Returns `None` unless exactly one child is present.
    pub fn take_only(&mut self) -> Option<Box<Node<V>>> {
        if self.len != 1 {
            return None;
        }
        let slots = self.slots.take()?;
        self.len = 0;
        (*slots).into_iter().flatten().next()
    }

    /// Empty the slot array, handing over every child.
    pub fn drain(&mut self) -> impl Iterator<Item = Box<Node<V>>> {
        self.len = 0;
        self.slots
            .take()
            .into_iter()
            .flat_map(|slots| (*slots).into_iter().flatten())
    }

    /// Present children in ascending rank order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Rank, &Node<V>)> + '_ {
        self.slots.iter().flat_map(|slots| {
            slots.iter().enumerate().filter_map(|(i, slot)| {
                let child = slot.as_deref()?;
                Some((Rank::new(i)?, child))
            })
        })
    }
}

impl<V> Default for Children<V> {
    fn default() -> Self {
        Self {
            slots: None,
            len: 0,
        }
    }
}

pub(crate) enum Entry<'a, V> {
    Occupied(&'a mut Node<V>),
    Vacant(VacantEntry<'a, V>),
}

pub(crate) struct VacantEntry<'a, V> {
    slot: &'a mut Option<Box<Node<V>>>,
    len: &'a mut u8,
    rank: Rank,
}

impl<'a, V> VacantEntry<'a, V> {
    pub fn insert(self, child: Box<Node<V>>) {
        debug_assert_eq!(child.label.first().copied(), Some(self.rank.byte()));
        *self.slot = Some(child);
        *self.len += 1;
    }
}

/// A node of the radix tree.
///
/// A node is terminal exactly when `value` is `Some`, so a payload can never
/// exist without the terminal flag or vice versa.
pub(crate) struct Node<V> {
    /// Bytes consumed along the edge from the parent. Empty only for the root.
    pub label: Label,
    pub value: Option<V>,
    pub children: Children<V>,
}

impl<V> Node<V> {
    pub fn root() -> Self {
        Self {
            label: Label::new(),
            value: None,
            children: Children::default(),
        }
    }

    pub fn leaf(label: &[u8], value: V) -> Self {
        debug_assert!(!label.is_empty());
        Self {
            label: Label::from_slice(label),
            value: Some(value),
            children: Children::default(),
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.value.is_some()
    }

    /// Rank of the slot this node occupies in its parent.
    #[inline]
    pub fn rank(&self) -> Rank {
        Rank::of_valid(self.label[0])
    }

    /// Cut the label at `at`, pushing everything after it into a new only child.
    ///
    /// The new child inherits this node's payload and children; this node keeps
    /// `label[..at]` and is left non-terminal. `at` must be strictly inside the label.
    pub fn split_at(&mut self, at: usize) {
        debug_assert!(0 < at && at < self.label.len());
        let tail = Node {
            label: Label::from_slice(&self.label[at..]),
            value: self.value.take(),
            children: mem::take(&mut self.children),
        };
        self.label.truncate(at);
        let rank = tail.rank();
        self.children.attach(rank, Box::new(tail));
    }

    /// Fuse this node with its sole child: labels are concatenated and the
    /// child's payload and children are adopted.
    ///
    /// Returns `false` without changes unless there is exactly one child.
    pub fn absorb_only_child(&mut self) -> bool {
        let Some(child) = self.children.take_only() else {
            return false;
        };
        let mut child = child;
        self.label.extend_from_slice(&child.label);
        self.value = child.value.take();
        self.children = mem::take(&mut child.children);
        true
    }
}

// Depth is bounded only by key length: teardown and copying use an explicit stack.

impl<V> Drop for Node<V> {
    fn drop(&mut self) {
        if self.children.len() == 0 {
            return;
        }
        let mut pending: Vec<Box<Node<V>>> = self.children.drain().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.children.drain());
        }
    }
}

impl<V: Clone> Clone for Node<V> {
    fn clone(&self) -> Self {
        /// A copy under construction and the source children still to copy into it.
        struct Frame<'a, V> {
            pending: Vec<&'a Node<V>>,
            copy: Node<V>,
        }

        fn frame<V: Clone>(src: &Node<V>) -> Frame<'_, V> {
            Frame {
                pending: src.children.iter().rev().map(|(_, c)| c).collect(),
                copy: Node {
                    label: src.label.clone(),
                    value: src.value.clone(),
                    children: Children::default(),
                },
            }
        }

        let mut stack = Vec::new();
        let mut current = frame(self);
        loop {
            if let Some(next) = current.pending.pop() {
                stack.push(mem::replace(&mut current, frame(next)));
                continue;
            }
            let Some(mut parent) = stack.pop() else {
                return current.copy;
            };
            let done = current.copy;
            parent.copy.children.attach(done.rank(), Box::new(done));
            current = parent;
        }
    }
}

/// Length of the longest common prefix of `a` and `b`.
#[inline]
pub(crate) fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}
