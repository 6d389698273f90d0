// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rollup tree arena and its read-side accessors.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Identifier for a node in a [`RollupTree`].
///
/// A `NodeId` is a dense index into the tree it came from. Trees are immutable
/// once built and replaced wholesale on rebuild, so there is no slot reuse and
/// no generation counter; a `NodeId` must not be used with a different tree.
/// For identity that survives rebuilds, use [`RollupTree::path_to`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Reconstruct an id from a dense index.
    ///
    /// Only meaningful for indices in `0..tree.len()` of the tree the index
    /// was taken from; layout and animation crates use this to walk their
    /// per-node storage in lockstep with the arena.
    pub const fn from_index(idx: usize) -> Self {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        Self(idx as u32)
    }

    /// The dense index of this node within its tree.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Root-to-node sequence of grouping keys.
///
/// The root has an empty path. The `Option` carries the null-key bucket: a
/// `None` element means "the records with no key at this depth". Paths are
/// short in practice (one element per grouping layer), hence the inline
/// capacity.
pub type KeyPath<K> = SmallVec<[Option<K>; 4]>;

/// A single aggregate node.
#[derive(Clone, Debug)]
pub struct RollupNode<K> {
    /// Depth in the tree; the root is depth 0.
    pub depth: usize,
    /// The grouping key at this depth. `None` for the root and for null-key buckets.
    pub key: Option<K>,
    /// Sum of the values of all records below this node.
    pub value: f64,
    /// Position among siblings after the configured sort policy.
    pub sort_index: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Indices into the caller's record slice. Populated for leaves only, so
    /// memory stays proportional to the input rather than input × depth.
    pub(crate) records: Vec<usize>,
}

impl<K> RollupNode<K> {
    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// An immutable tree of aggregate nodes, addressed by [`NodeId`] or [`KeyPath`].
///
/// Built by [`build`](crate::build); see the crate docs for the contract.
#[derive(Clone, Debug)]
pub struct RollupTree<K> {
    pub(crate) nodes: Vec<RollupNode<K>>,
    pub(crate) by_path: HashMap<KeyPath<K>, NodeId>,
    pub(crate) max_depth: usize,
}

impl<K: Clone + Eq + Hash> RollupTree<K> {
    /// The root node. Always present, even for an empty record slice.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the tree, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds only the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// The deepest depth present in the tree. Zero for a root-only tree.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this tree.
    pub fn get(&self, id: NodeId) -> &RollupNode<K> {
        &self.nodes[id.index()]
    }

    /// The children of a node, in sibling-sorted order.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// The parent of a node, or `None` for the root.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Indices into the caller's record slice for a leaf node.
    ///
    /// Returns an empty slice for internal nodes; records are retained on
    /// leaves only.
    pub fn leaf_records(&self, id: NodeId) -> &[usize] {
        &self.nodes[id.index()].records
    }

    /// The root-to-node key path for a node.
    ///
    /// This is the rebuild-stable identity: two trees built from inputs that
    /// group the same way assign the same path to the corresponding node.
    pub fn path_to(&self, id: NodeId) -> KeyPath<K> {
        let mut path = KeyPath::new();
        let mut current = Some(id);
        while let Some(c) = current {
            let node = &self.nodes[c.index()];
            if node.depth > 0 {
                path.push(node.key.clone());
            }
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// Resolve a key path back to a node, or `None` if no node has that path.
    pub fn node_at_path(&self, path: &[Option<K>]) -> Option<NodeId> {
        if path.is_empty() {
            return Some(self.root());
        }
        self.by_path.get(path).copied()
    }

    /// Iterate all nodes in depth-first preorder, children in sibling-sorted
    /// order. The root comes first.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = Vec::with_capacity(self.nodes.len().min(16));
        stack.push(self.root());
        core::iter::from_fn(move || {
            let id = stack.pop()?;
            // Reverse push so children come off the stack in sibling order.
            for &child in self.nodes[id.index()].children.iter().rev() {
                stack.push(child);
            }
            Some(id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuildConfig, build};
    use alloc::vec;
    use smallvec::smallvec;

    struct Row(&'static str, &'static str, f64);

    fn two_layer_tree() -> RollupTree<&'static str> {
        let rows = [
            Row("A", "x", 1.0),
            Row("A", "y", 2.0),
            Row("B", "x", 4.0),
            Row("B", "y", 8.0),
        ];
        let g0 = |r: &Row| Some(r.0);
        let g1 = |r: &Row| Some(r.1);
        build(&rows, &[&g0, &g1], &|r| r.2, &BuildConfig::default()).unwrap()
    }

    #[test]
    fn path_round_trips_through_index() {
        let tree = two_layer_tree();
        for id in tree.iter() {
            let path = tree.path_to(id);
            assert_eq!(
                tree.node_at_path(&path),
                Some(id),
                "every node must be findable by its own path"
            );
        }
    }

    #[test]
    fn root_path_is_empty() {
        let tree = two_layer_tree();
        assert!(tree.path_to(tree.root()).is_empty());
        assert_eq!(tree.node_at_path(&[]), Some(tree.root()));
    }

    #[test]
    fn unknown_path_resolves_to_none() {
        let tree = two_layer_tree();
        let missing: KeyPath<&'static str> = smallvec![Some("Z")];
        assert_eq!(tree.node_at_path(&missing), None);
    }

    #[test]
    fn preorder_visits_every_node_once() {
        let tree = two_layer_tree();
        let visited: vec::Vec<NodeId> = tree.iter().collect();
        assert_eq!(visited.len(), tree.len());
        assert_eq!(visited[0], tree.root());
        for (i, id) in visited.iter().enumerate() {
            assert!(
                !visited[..i].contains(id),
                "preorder must not repeat nodes"
            );
        }
    }

    #[test]
    fn parent_links_are_consistent() {
        let tree = two_layer_tree();
        for id in tree.iter() {
            for &child in tree.children_of(id) {
                assert_eq!(tree.parent_of(child), Some(id));
            }
        }
        assert_eq!(tree.parent_of(tree.root()), None);
    }
}
