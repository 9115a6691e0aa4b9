//! Inspection helpers for tree structure.

use std::fmt::Write;

use crate::alphabet::{self, Rank};
use crate::node::Node;
use crate::RadixTree;

/// Structural statistics for a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Number of stored keys.
    pub keys: usize,
    /// Number of nodes, not counting the root.
    pub nodes: usize,
    /// Total bytes held in edge labels.
    pub label_bytes: usize,
    /// Longest root-to-node path, in nodes.
    pub max_depth: usize,
}

impl<V> RadixTree<V> {
    /// Render the node structure, one node per line, children in rank order.
    ///
    /// Terminal nodes are marked with `*`. Trees holding the same key set always
    /// render identically.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<(&Node<V>, usize)> =
            self.root().children.iter().rev().map(|(_, c)| (c, 0)).collect();
        while let Some((node, depth)) = stack.pop() {
            let marker = if node.is_terminal() { " *" } else { "" };
            let _ = writeln!(
                out,
                "{}{}{}",
                "  ".repeat(depth),
                String::from_utf8_lossy(&node.label),
                marker
            );
            stack.extend(node.children.iter().rev().map(|(_, c)| (c, depth + 1)));
        }
        out
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let mut stack: Vec<(&Node<V>, usize)> =
            self.root().children.iter().map(|(_, c)| (c, 1)).collect();
        while let Some((node, depth)) = stack.pop() {
            stats.nodes += 1;
            stats.label_bytes += node.label.len();
            stats.max_depth = stats.max_depth.max(depth);
            if node.is_terminal() {
                stats.keys += 1;
            }
            stack.extend(node.children.iter().map(|(_, c)| (c, depth + 1)));
        }
        stats
    }

    /// Verify tree integrity - returns list of issues found.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let root = self.root();
        if root.is_terminal() {
            issues.push("root is terminal".to_string());
        }
        if !root.label.is_empty() {
            issues.push(format!("root has label {:?}", String::from_utf8_lossy(&root.label)));
        }
        Self::check_child_count(root, &[], &mut issues);

        let mut terminals = 0;
        let mut path = Vec::new();
        // Pending (slot rank, node, key length above the node).
        let mut stack: Vec<(Rank, &Node<V>, usize)> =
            root.children.iter().rev().map(|(r, c)| (r, c, 0)).collect();
        while let Some((rank, node, depth)) = stack.pop() {
            path.truncate(depth);
            path.extend_from_slice(&node.label);
            let at = String::from_utf8_lossy(path.as_slice()).into_owned();

            match node.label.first() {
                None => issues.push(format!("empty label at {at:?}")),
                Some(&b) if b != rank.byte() => issues.push(format!(
                    "label {at:?} starts with {:?} but sits in slot {:?}",
                    b as char,
                    rank.byte() as char
                )),
                Some(_) => {}
            }
            if let Err(e) = alphabet::validate(&node.label) {
                issues.push(format!("label at {at:?}: {e}"));
            }
            if node.is_terminal() {
                terminals += 1;
            } else if node.children.len() < 2 {
                issues.push(format!(
                    "non-terminal node {at:?} has {} children",
                    node.children.len()
                ));
            }
            Self::check_child_count(node, &path, &mut issues);

            let depth = path.len();
            stack.extend(node.children.iter().rev().map(|(r, c)| (r, c, depth)));
        }

        if terminals != self.len() {
            issues.push(format!(
                "{} terminal nodes but len() = {}",
                terminals,
                self.len()
            ));
        }
        issues
    }

    fn check_child_count(node: &Node<V>, path: &[u8], issues: &mut Vec<String>) {
        let present = node.children.iter().count();
        if present != node.children.len() {
            issues.push(format!(
                "child count {} but {} slots occupied under {:?}",
                node.children.len(),
                present,
                String::from_utf8_lossy(path)
            ));
        }
    }
}
