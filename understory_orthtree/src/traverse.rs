// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth-first traversal with early termination.

use core::fmt;
use core::hash::Hash;

use crate::node::{Node, NodeIdx};
use crate::tree::Orthtree;
use crate::types::{Aabb, Category, Scalar};

/// Visitor verdict returned for each node during [`Orthtree::iterate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Walk {
    /// Keep going.
    Continue,
    /// Stop the whole walk, not just the current subtree.
    Terminate,
}

/// Read-only view of one node handed to an [`Orthtree::iterate`] visitor.
///
/// Only items stored directly on this node are exposed, not those of its
/// descendants.
pub struct NodeView<'a, K, T, const N: usize> {
    node: &'a Node<K, T, N>,
}

impl<K, T, const N: usize> Clone for NodeView<'_, K, T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, T, const N: usize> Copy for NodeView<'_, K, T, N> {}

impl<K, T: fmt::Debug, const N: usize> fmt::Debug for NodeView<'_, K, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeView")
            .field("bounds", &self.node.aabb)
            .field("items", &self.node.items.len())
            .field("is_leaf", &self.node.is_leaf())
            .finish()
    }
}

impl<'a, K: Eq + Hash, T, const N: usize> NodeView<'a, K, T, N> {
    /// The node's box.
    #[inline]
    pub fn bounds(&self) -> &'a Aabb<T, N> {
        &self.node.aabb
    }

    /// Whether the node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    /// Number of items stored directly on this node.
    #[inline]
    pub fn len(&self) -> usize {
        self.node.items.len()
    }

    /// Whether no items are stored directly on this node.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node.items.is_empty()
    }

    /// The box of `item` if it is stored directly on this node.
    pub fn get(&self, item: &K) -> Option<&'a Aabb<T, N>> {
        self.node.items.get(item).map(|e| &e.aabb)
    }

    /// Items stored directly on this node, in unspecified order.
    pub fn items(&self) -> impl Iterator<Item = (&'a K, &'a Aabb<T, N>)> + 'a {
        self.node.items.iter().map(|(k, e)| (k, &e.aabb))
    }

    /// Items on this node together with their categories.
    pub fn items_with_category(&self) -> impl Iterator<Item = (&'a K, &'a Aabb<T, N>, Category)> + 'a {
        self.node.items.iter().map(|(k, e)| (k, &e.aabb, e.category))
    }
}

impl<K, T, const N: usize> Orthtree<K, T, N>
where
    K: Eq + Hash + Clone,
    T: Scalar,
{
    /// Walk every node depth-first, parents before children, children in child order.
    ///
    /// `visitor` receives `context`, a view of the node, and its depth (the
    /// root is at depth 0). Returning [`Walk::Terminate`] stops the walk at
    /// once; `iterate` then returns `Terminate` as well.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use understory_orthtree::{Aabb, Config, Quadtree, Walk};
    ///
    /// let mut tree: Quadtree<u32, i64> =
    ///     Quadtree::new(Config::with_bounds(Aabb::new([0, 0], [31, 31])));
    /// tree.insert(1, Aabb::new([0, 0], [1, 1]));
    ///
    /// // Count leaves.
    /// let mut leaves = 0;
    /// tree.iterate(&mut leaves, |leaves, node, _depth| {
    ///     if node.is_leaf() {
    ///         *leaves += 1;
    ///     }
    ///     Walk::Continue
    /// });
    /// assert_eq!(leaves, 13);
    /// ```
    pub fn iterate<C, F>(&self, context: &mut C, mut visitor: F) -> Walk
    where
        F: FnMut(&mut C, NodeView<'_, K, T, N>, usize) -> Walk,
    {
        self.iterate_rec(self.root(), 0, context, &mut visitor)
    }

    fn iterate_rec<C, F>(&self, idx: NodeIdx, depth: usize, context: &mut C, visitor: &mut F) -> Walk
    where
        F: FnMut(&mut C, NodeView<'_, K, T, N>, usize) -> Walk,
    {
        let node = self.nodes().get(idx);
        if visitor(context, NodeView { node }, depth) == Walk::Terminate {
            return Walk::Terminate;
        }
        for &child in node.children() {
            if self.iterate_rec(child, depth + 1, context, visitor) == Walk::Terminate {
                return Walk::Terminate;
            }
        }
        Walk::Continue
    }

    /// Depth of the deepest node; a tree with only a root has depth 0.
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        self.iterate(&mut deepest, |deepest, _, depth| {
            *deepest = (*deepest).max(depth);
            Walk::Continue
        });
        deepest
    }
}
